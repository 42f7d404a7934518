use gauntlet_core::{
    Completion, Fired, GameState, MiniGame, SimonConfig, SimonGame, SimonTimer, Symbol, Turn,
    TurnStatus,
};
use yew::prelude::*;

use crate::timers::TimerHost;
use crate::utils::*;

const SYMBOL_IMAGES: [&str; 6] = [
    "assets/simon/0.jpg",
    "assets/simon/1.jpg",
    "assets/simon/2.jpg",
    "assets/simon/3.jpg",
    "assets/simon/4.jpg",
    "assets/simon/5.jpg",
];

pub(crate) enum Msg {
    Start,
    Select(u8),
    Timer(Fired<SimonTimer>),
    Proceed,
}

#[derive(Properties, Clone, PartialEq)]
pub(crate) struct SimonProps {
    pub seed: u64,
    pub on_complete: Callback<Completion>,
}

pub(crate) struct SimonView {
    game: SimonGame,
    timers: TimerHost<SimonTimer>,
}

fn banner(turn: Turn, status: TurnStatus) -> &'static str {
    match (status, turn) {
        (TurnStatus::Failure, _) => "WRONG!!!",
        (TurnStatus::Success, _) => "WELL DONE!!!",
        (TurnStatus::Waiting, Turn::Computer) => "Watch closely",
        (TurnStatus::Waiting, Turn::Player) => "Your turn!",
    }
}

/// Unlit symbols are shown in grayscale.
fn symbol_style(lit: bool) -> &'static str {
    if lit {
        "border: 5px solid #880808"
    } else {
        "filter: grayscale(1); border: 5px solid black"
    }
}

fn win_subtitle(errors: u32) -> String {
    match errors {
        0 => "No mistakes! Next game?".to_string(),
        _ => format!("Only {}! Next game?", count_noun(errors, "mistake")),
    }
}

impl Component for SimonView {
    type Message = Msg;
    type Properties = SimonProps;

    fn create(ctx: &Context<Self>) -> Self {
        Self {
            game: SimonGame::new(SimonConfig::default(), ctx.props().seed)
                .expect("default simon config is valid"),
            timers: TimerHost::new(),
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        use Msg::*;

        let updated = match msg {
            Start => match self.game.start() {
                Ok(()) => true,
                Err(err) => {
                    log::warn!("simon start: {}", err);
                    false
                }
            },
            Select(index) => match self.game.select(index) {
                Ok(outcome) => {
                    log::trace!("select {}: {:?}", index, outcome);
                    outcome.has_update()
                }
                Err(err) => {
                    log::warn!("select {}: {}", index, err);
                    false
                }
            },
            Timer(fired) => {
                self.timers.release(fired);
                self.game.on_timer(fired)
            }
            Proceed => {
                match self.game.proceed() {
                    Ok(completion) => ctx.props().on_complete.emit(completion),
                    Err(err) => log::warn!("simon proceed: {}", err),
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
                <div class="game-container" id="simon-container">
                    <Panel
                        title="Game 2"
                        subtitle="Remember the path"
                        button="Let's go!"
                        onclick={ctx.link().callback(|()| Msg::Start)}
                    />
                </div>
            },
            GameState::Playing => {
                let lit = self.game.lit();
                html! {
                    <div class="game-container playing" id="simon-container">
                        <h2 class="title">
                            {format!("Level {} / {}", self.game.level(), self.game.levels())}
                        </h2>
                        <h3 class="title">{banner(self.game.turn(), self.game.status())}</h3>
                        <div id="symbols">
                            {
                                for Symbol::all().map(|symbol| {
                                    let index = symbol.index();
                                    let style = symbol_style(lit == Some(symbol));
                                    let onclick = ctx.link().callback(move |_: MouseEvent| Msg::Select(index));
                                    html! {
                                        <div key={index} class="symbol">
                                            <img src={SYMBOL_IMAGES[usize::from(index)]} {style} {onclick}/>
                                        </div>
                                    }
                                })
                            }
                        </div>
                    </div>
                }
            }
            GameState::Won => html! {
                <div class="game-container" id="simon-container">
                    <Panel
                        title="Well done!"
                        subtitle={win_subtitle(self.game.errors())}
                        button="Go go go"
                        onclick={ctx.link().callback(|()| Msg::Proceed)}
                    />
                </div>
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn banner_prefers_status_over_turn() {
        assert_eq!(banner(Turn::Player, TurnStatus::Failure), "WRONG!!!");
        assert_eq!(banner(Turn::Player, TurnStatus::Success), "WELL DONE!!!");
        assert_eq!(banner(Turn::Computer, TurnStatus::Waiting), "Watch closely");
        assert_eq!(banner(Turn::Player, TurnStatus::Waiting), "Your turn!");
    }

    #[test]
    fn win_subtitle_counts_errors() {
        assert_eq!(win_subtitle(0), "No mistakes! Next game?");
        assert_eq!(win_subtitle(1), "Only 1 mistake! Next game?");
        assert_eq!(win_subtitle(3), "Only 3 mistakes! Next game?");
    }

    #[test]
    fn unlit_symbols_are_grayscale() {
        assert!(symbol_style(false).contains("grayscale(1)"));
        assert!(!symbol_style(true).contains("grayscale"));
    }
}
