use gauntlet_core::{
    Completion, Fired, GameState, MiniGame, Placement, ReflexConfig, ReflexGame, ReflexTimer,
};
use gloo::events::EventListener;
use yew::prelude::*;

use crate::timers::TimerHost;
use crate::utils::*;

const TARGET_IMAGE: &str = "assets/reflex/target.jpg";

pub(crate) enum Msg {
    Start,
    ClickArea,
    ClickTarget,
    Resize,
    Timer(Fired<ReflexTimer>),
    Proceed,
}

#[derive(Properties, Clone, PartialEq)]
pub(crate) struct ReflexProps {
    pub seed: u64,
    pub on_complete: Callback<Completion>,
}

pub(crate) struct ReflexView {
    game: ReflexGame,
    timers: TimerHost<ReflexTimer>,
    _resize: EventListener,
}

/// Inline style for the target, hidden targets keep their place and shrink to nothing.
fn target_style(placement: Option<Placement>, visible: bool) -> String {
    let scale = if visible { 1 } else { 0 };
    match placement {
        Some(Placement {
            height_vh,
            width_vw,
            top_vh,
            left_vw,
        }) => format!(
            "height: {:.2}vh; width: {:.2}vw; top: {:.2}vh; left: {:.2}vw; transform: scale({})",
            height_vh, width_vw, top_vh, left_vw, scale
        ),
        None => format!("transform: scale({})", scale),
    }
}

impl Component for ReflexView {
    type Message = Msg;
    type Properties = ReflexProps;

    fn create(ctx: &Context<Self>) -> Self {
        let game = ReflexGame::new(ReflexConfig::default(), current_viewport(), ctx.props().seed)
            .expect("default reflex config is valid");
        let link = ctx.link().clone();
        let resize = EventListener::new(&gloo::utils::window(), "resize", move |_| {
            link.send_message(Msg::Resize)
        });

        Self {
            game,
            timers: TimerHost::new(),
            _resize: resize,
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        use Msg::*;

        let updated = match msg {
            Start => match self.game.start() {
                Ok(()) => true,
                Err(err) => {
                    log::warn!("reflex start: {}", err);
                    false
                }
            },
            ClickArea => self.game.click_area().has_update(),
            ClickTarget => {
                let outcome = self.game.click_target();
                log::debug!("target click: {:?}", outcome);
                outcome.has_update()
            }
            Resize => {
                self.game.set_viewport(current_viewport());
                false
            }
            Timer(fired) => {
                self.timers.release(fired);
                self.game.on_timer(fired)
            }
            Proceed => {
                match self.game.proceed() {
                    Ok(completion) => ctx.props().on_complete.emit(completion),
                    Err(err) => log::warn!("reflex proceed: {}", err),
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
        let onclick = ctx.link().callback(|_: MouseEvent| Msg::ClickArea);

        let content = match self.game.state() {
            GameState::Intro => html! {
                <Panel
                    title="Game 1"
                    subtitle="Catch me if you can"
                    button="Go!"
                    onclick={ctx.link().callback(|()| Msg::Start)}
                />
            },
            GameState::Playing => {
                let style = target_style(self.game.placement(), self.game.target_visible());
                let onclick = ctx.link().callback(|e: MouseEvent| {
                    e.stop_propagation();
                    Msg::ClickTarget
                });
                html! {
                    <img id="click-target" src={TARGET_IMAGE} {style} {onclick}/>
                }
            }
            GameState::Won => {
                let subtitle = format!(
                    "Caught after {}! Next game?",
                    count_noun(self.game.failures(), "failed attempt")
                );
                html! {
                    <Panel
                        title="Well done!"
                        {subtitle}
                        button="Yes!"
                        onclick={ctx.link().callback(|()| Msg::Proceed)}
                    />
                }
            }
        };

        html! {
            <div class="game-container" id="reflex-container" {onclick}>
                {content}
            </div>
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_style_scales_hidden_target_down() {
        let placement = Placement {
            height_vh: 10.0,
            width_vw: 5.5,
            top_vh: 42.0,
            left_vw: 7.0,
        };

        assert_eq!(
            target_style(Some(placement), true),
            "height: 10.00vh; width: 5.50vw; top: 42.00vh; left: 7.00vw; transform: scale(1)"
        );
        assert!(target_style(Some(placement), false).ends_with("scale(0)"));
        assert_eq!(target_style(None, false), "transform: scale(0)");
    }
}
