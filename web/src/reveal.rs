use gauntlet_core::{Completion, Stage};
use yew::prelude::*;

use crate::utils::*;

const GIFT_IMAGE: &str = "assets/reveal/gift.jpg";

#[derive(Properties, PartialEq)]
pub(crate) struct RevealProps {
    pub completions: Vec<Completion>,
}

fn stage_title(stage: Stage) -> &'static str {
    match stage {
        Stage::Reflex => "Catch me if you can",
        Stage::Simon => "Remember the path",
        Stage::Riddle => "Who's who?",
        Stage::Reveal => "Surprise",
    }
}

fn summary_line(completion: &Completion) -> String {
    format!(
        "{}: {}",
        stage_title(completion.stage),
        count_noun(completion.mistakes, "mistake")
    )
}

/// Last screen, nothing to play anymore.
#[function_component]
pub(crate) fn RevealView(props: &RevealProps) -> Html {
    html! {
        <div class="game-container" id="reveal-container">
            <h1 class="title">{"Happy birthday!"}</h1>
            <h2 class="title">{"You earned your gift"}</h2>
            <img id="gift" src={GIFT_IMAGE} alt="gift"/>
            <ul id="summary">
                { for props.completions.iter().map(|completion| html! { <li>{summary_line(completion)}</li> }) }
            </ul>
        </div>
    }
}
