#![no_std]

extern crate alloc;

use serde::{Deserialize, Serialize};

pub use error::*;
pub use random::*;
pub use reflex::*;
pub use riddle::*;
pub use sequencer::*;
pub use simon::*;
pub use timer::*;

mod error;
mod random;
mod reflex;
mod riddle;
mod sequencer;
mod simon;
mod timer;

/// Tunables for the whole run, one block per mini-game.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GauntletConfig {
    pub reflex: ReflexConfig,
    pub simon: SimonConfig,
    pub riddle: RiddleConfig,
}

/// Valid transitions:
/// - Intro -> Playing
/// - Playing -> Won
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameState {
    /// Title screen, waiting for the player to start
    Intro,
    /// Game running
    Playing,
    /// Game ended, waiting for the player to move on
    Won,
}

impl GameState {
    pub const fn is_intro(self) -> bool {
        matches!(self, Self::Intro)
    }

    pub const fn is_playing(self) -> bool {
        matches!(self, Self::Playing)
    }

    pub const fn is_won(self) -> bool {
        matches!(self, Self::Won)
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::Intro
    }
}

/// Success notification emitted once per finished mini-game.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Completion {
    pub stage: Stage,
    pub mistakes: u32,
}

/// Lifecycle bookkeeping shared by every controller.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct Lifecycle {
    state: GameState,
    completed: bool,
}

impl Lifecycle {
    pub(crate) fn state(self) -> GameState {
        self.state
    }

    pub(crate) fn start(&mut self) -> Result<()> {
        if !self.state.is_intro() {
            return Err(GameError::NotInIntro);
        }
        self.state = GameState::Playing;
        Ok(())
    }

    pub(crate) fn win(&mut self) {
        if self.state.is_playing() {
            self.state = GameState::Won;
        }
    }

    pub(crate) fn complete(&mut self, stage: Stage, mistakes: u32) -> Result<Completion> {
        if !self.state.is_won() {
            return Err(GameError::NotWon);
        }
        if self.completed {
            return Err(GameError::AlreadyCompleted);
        }
        self.completed = true;
        Ok(Completion { stage, mistakes })
    }
}

/// Common surface of the three mini-game controllers.
///
/// Hosts drain [`TimerSet::take_requests`] after every call, run the delays on their clock and feed the
/// results back through [`MiniGame::on_timer`].
pub trait MiniGame {
    type Timer: TimerKey;

    /// Position of this game in the run.
    const STAGE: Stage;

    fn state(&self) -> GameState;

    /// Leaves the intro screen.
    fn start(&mut self) -> Result<()>;

    /// Returns whether the fired timer changed anything visible.
    fn on_timer(&mut self, fired: Fired<Self::Timer>) -> bool;

    fn timers(&mut self) -> &mut TimerSet<Self::Timer>;

    /// Failures or errors accumulated so far.
    fn mistakes(&self) -> u32;

    /// The one-shot success signal, only available once the game is won.
    fn proceed(&mut self) -> Result<Completion>;

    /// Cancels everything still pending, the game must not change after this.
    fn unmount(&mut self) {
        self.timers().cancel_all();
    }
}
