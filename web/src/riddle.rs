use gauntlet_core::{
    Completion, Fired, GameState, HoverBox, MiniGame, RiddleConfig, RiddleGame, RiddleTimer,
};
use web_sys::Element;
use yew::prelude::*;

use crate::timers::TimerHost;
use crate::utils::*;

pub(crate) enum Msg {
    Start,
    DragStart(usize),
    DragMove { x: f64, y: f64 },
    DragEnd,
    Timer(Fired<RiddleTimer>),
    Proceed,
}

#[derive(Properties, Clone, PartialEq)]
pub(crate) struct RiddleProps {
    pub seed: u64,
    pub on_complete: Callback<Completion>,
}

pub(crate) struct RiddleView {
    game: RiddleGame,
    timers: TimerHost<RiddleTimer>,
    items: Vec<NodeRef>,
}

/// Screen rectangle of a rendered item.
#[derive(Copy, Clone, Debug, PartialEq)]
struct Bounds {
    left: f64,
    right: f64,
    top: f64,
    bottom: f64,
}

impl Bounds {
    fn contains(&self, x: f64, y: f64) -> bool {
        (self.left..=self.right).contains(&x) && (self.top..=self.bottom).contains(&y)
    }

    fn hover_box(&self) -> HoverBox {
        HoverBox {
            left: self.left,
            right: self.right,
        }
    }
}

/// Index of the first item under the pointer.
fn hit_test(bounds: impl IntoIterator<Item = Option<Bounds>>, x: f64, y: f64) -> Option<(usize, Bounds)> {
    bounds
        .into_iter()
        .enumerate()
        .find_map(|(index, rect)| rect.filter(|rect| rect.contains(x, y)).map(|rect| (index, rect)))
}

fn bounds_of(node: &NodeRef) -> Option<Bounds> {
    let rect = node.cast::<Element>()?.get_bounding_client_rect();
    Some(Bounds {
        left: rect.left(),
        right: rect.right(),
        top: rect.top(),
        bottom: rect.bottom(),
    })
}

impl RiddleView {
    fn drag_move(&mut self, x: f64, y: f64) -> bool {
        if self.game.dragging().is_none() {
            return false;
        }
        let Some((index, rect)) = hit_test(self.items.iter().map(bounds_of), x, y) else {
            return false;
        };
        match self.game.drag_hover(index, x, rect.hover_box()) {
            Ok(outcome) => outcome.has_update(),
            Err(err) => {
                log::warn!("hover {}: {}", index, err);
                false
            }
        }
    }

    fn view_items(&self, ctx: &Context<Self>) -> Html {
        let dragging = self.game.dragging();
        let arrangement = self.game.arrangement().items().iter().copied();

        html! {
            <ol id="riddle-items">
                {
                    for arrangement.zip(self.items.iter()).enumerate().map(|(index, (id, node))| {
                        let class = classes!("riddle-item", (dragging == Some(index)).then_some("dragging"));
                        let onpointerdown = ctx.link().callback(move |e: PointerEvent| {
                            e.prevent_default();
                            Msg::DragStart(index)
                        });
                        html! {
                            <li key={id.0} ref={node.clone()} {class} {onpointerdown}>
                                {self.game.name_of(id)}
                            </li>
                        }
                    })
                }
            </ol>
        }
    }
}

impl Component for RiddleView {
    type Message = Msg;
    type Properties = RiddleProps;

    fn create(ctx: &Context<Self>) -> Self {
        let game = RiddleGame::new(RiddleConfig::default(), ctx.props().seed)
            .expect("default riddle config is valid");
        let items = (0..game.arrangement().len()).map(|_| NodeRef::default()).collect();
        Self {
            game,
            timers: TimerHost::new(),
            items,
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        use Msg::*;

        let updated = match msg {
            Start => match self.game.start() {
                Ok(()) => true,
                Err(err) => {
                    log::warn!("riddle start: {}", err);
                    false
                }
            },
            DragStart(index) => match self.game.begin_drag(index) {
                Ok(()) => true,
                Err(err) => {
                    log::warn!("drag {}: {}", index, err);
                    false
                }
            },
            DragMove { x, y } => self.drag_move(x, y),
            DragEnd => {
                let dragging = self.game.dragging().is_some();
                self.game.end_drag();
                dragging
            }
            Timer(fired) => {
                self.timers.release(fired);
                self.game.on_timer(fired)
            }
            Proceed => {
                match self.game.proceed() {
                    Ok(completion) => ctx.props().on_complete.emit(completion),
                    Err(err) => log::warn!("riddle proceed: {}", err),
                }
                false
            }
        };

        self.timers.sync(&mut self.game, &ctx.link().callback(Msg::Timer));
        updated
    }

    fn destroy(&mut self, ctx: &Context<Self>) {
        self.game.unmount();
        self.timers.sync(&mut self.game, &ctx.link().callback(Msg::Timer));
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        match self.game.state() {
            GameState::Intro => html! {
                <div class="game-container" id="riddle-container">
                    <Panel
                        title="Game 3"
                        subtitle="Who's who?"
                        button="Let's go!"
                        onclick={ctx.link().callback(|()| Msg::Start)}
                    />
                </div>
            },
            GameState::Playing => {
                let onpointermove = ctx.link().callback(|e: PointerEvent| Msg::DragMove {
                    x: f64::from(e.client_x()),
                    y: f64::from(e.client_y()),
                });
                let onpointerup = ctx.link().callback(|_: PointerEvent| Msg::DragEnd);
                let onpointerleave = ctx.link().callback(|_: PointerEvent| Msg::DragEnd);
                let onpointercancel = ctx.link().callback(|_: PointerEvent| Msg::DragEnd);

                html! {
                    <div
                        class="game-container playing"
                        id="riddle-container"
                        style="touch-action: none"
                        {onpointermove}
                        {onpointerup}
                        {onpointerleave}
                        {onpointercancel}
                    >
                        <ul id="riddle-clues">
                            { for self.game.clues().iter().map(|clue| html! { <li>{clue}</li> }) }
                        </ul>
                        {self.view_items(ctx)}
                    </div>
                }
            }
            GameState::Won => html! {
                <div class="game-container" id="riddle-container">
                    {self.view_items(ctx)}
                    <Panel
                        title="Well done!"
                        subtitle="Everyone is in place."
                        button="See the gift"
                        onclick={ctx.link().callback(|()| Msg::Proceed)}
                    />
                </div>
            },
        }
    }
}
