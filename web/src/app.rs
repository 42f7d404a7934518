use gauntlet_core::{Completion, Sequencer, Stage};
use yew::prelude::*;

use crate::reflex::ReflexView;
use crate::reveal::RevealView;
use crate::riddle::RiddleView;
use crate::simon::SimonView;
use crate::utils::*;

pub(crate) enum Msg {
    Completed(Completion),
}

#[derive(Properties, Clone, PartialEq)]
pub(crate) struct GauntletProps {
    /// Fixed seed from the command line, random when absent.
    pub seed: Option<u64>,
}

pub(crate) struct GauntletView {
    sequencer: Sequencer,
    seed: u64,
}

/// Every stage gets its own seed so replaying with a fixed seed reproduces each game.
fn stage_seed(base: u64, stage: Stage) -> u64 {
    base.wrapping_add(stage.number().map_or(0, u64::from))
}

impl Component for GauntletView {
    type Message = Msg;
    type Properties = GauntletProps;

    fn create(ctx: &Context<Self>) -> Self {
        let seed = ctx.props().seed.unwrap_or_else(js_random_seed);
        log::info!("seed: {}", seed);
        Self {
            sequencer: Sequencer::new(),
            seed,
        }
    }

    fn update(&mut self, _ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            Msg::Completed(completion) => match self.sequencer.advance(completion) {
                Ok(stage) => {
                    log::info!("entering {:?}", stage);
                    true
                }
                Err(err) => {
                    log::error!("could not advance: {}", err);
                    false
                }
            },
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let stage = self.sequencer.stage();
        let seed = stage_seed(self.seed, stage);
        let on_complete = ctx.link().callback(Msg::Completed);

        // keyed by stage so every game mounts fresh
        match stage {
            Stage::Reflex => html! { <ReflexView key="reflex" {seed} {on_complete}/> },
            Stage::Simon => html! { <SimonView key="simon" {seed} {on_complete}/> },
            Stage::Riddle => html! { <RiddleView key="riddle" {seed} {on_complete}/> },
            Stage::Reveal => html! {
                <RevealView completions={self.sequencer.completions().to_vec()}/>
            },
        }
    }
}
