use thiserror::Error;

use crate::Stage;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Game can only be started from its intro screen")]
    NotInIntro,
    #[error("Game has not been won yet")]
    NotWon,
    #[error("Game already reported its completion")]
    AlreadyCompleted,
    #[error("Sequence has not been generated yet")]
    SequenceNotReady,
    #[error("Invalid symbol {0}")]
    InvalidSymbol(u8),
    #[error("Invalid index {0}")]
    InvalidIndex(usize),
    #[error("Completion for {got:?} received while on stage {current:?}")]
    StageMismatch { current: Stage, got: Stage },
    #[error("Final stage already reached")]
    AlreadyRevealed,
    #[error("Configuration can never be satisfied")]
    UnsatisfiableConfig,
}

pub type Result<T> = core::result::Result<T, GameError>;
