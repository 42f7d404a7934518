use alloc::vec::Vec;
use serde::{Deserialize, Serialize};

use crate::*;

/// Valid transitions:
/// - Reflex -> Simon
/// - Simon -> Riddle
/// - Riddle -> Reveal
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stage {
    Reflex,
    Simon,
    Riddle,
    /// Final screen, nothing left to play
    Reveal,
}

impl Stage {
    pub const fn next(self) -> Option<Self> {
        use Stage::*;
        match self {
            Reflex => Some(Simon),
            Simon => Some(Riddle),
            Riddle => Some(Reveal),
            Reveal => None,
        }
    }

    /// 1-based game number, `None` for the reveal screen.
    pub const fn number(self) -> Option<u8> {
        use Stage::*;
        match self {
            Reflex => Some(1),
            Simon => Some(2),
            Riddle => Some(3),
            Reveal => None,
        }
    }

    pub const fn is_final(self) -> bool {
        matches!(self, Self::Reveal)
    }
}

impl Default for Stage {
    fn default() -> Self {
        Self::Reflex
    }
}

/// Walks the player through the games in order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sequencer {
    stage: Stage,
    completions: Vec<Completion>,
}

impl Sequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn completions(&self) -> &[Completion] {
        &self.completions
    }

    pub fn total_mistakes(&self) -> u32 {
        self.completions
            .iter()
            .fold(0, |total, completion| total.saturating_add(completion.mistakes))
    }

    /// Moves exactly one stage forward for the game that just finished.
    pub fn advance(&mut self, completion: Completion) -> Result<Stage> {
        let next = self.stage.next().ok_or(GameError::AlreadyRevealed)?;
        if completion.stage != self.stage {
            return Err(GameError::StageMismatch {
                current: self.stage,
                got: completion.stage,
            });
        }

        log::debug!(
            "{:?} completed with {} mistakes, next: {:?}",
            completion.stage,
            completion.mistakes,
            next
        );
        self.completions.push(completion);
        self.stage = next;
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn done(stage: Stage, mistakes: u32) -> Completion {
        Completion { stage, mistakes }
    }

    #[test]
    fn advances_one_stage_per_completion() {
        let mut sequencer = Sequencer::new();
        assert_eq!(sequencer.stage(), Stage::Reflex);

        assert_eq!(sequencer.advance(done(Stage::Reflex, 4)), Ok(Stage::Simon));
        assert_eq!(sequencer.advance(done(Stage::Simon, 2)), Ok(Stage::Riddle));
        assert_eq!(sequencer.advance(done(Stage::Riddle, 0)), Ok(Stage::Reveal));

        assert!(sequencer.stage().is_final());
        assert_eq!(sequencer.total_mistakes(), 6);
        assert_eq!(sequencer.completions().len(), 3);
    }

    #[test]
    fn rejects_completion_from_other_stage() {
        let mut sequencer = Sequencer::new();

        assert_eq!(
            sequencer.advance(done(Stage::Riddle, 0)),
            Err(GameError::StageMismatch {
                current: Stage::Reflex,
                got: Stage::Riddle
            })
        );
        assert_eq!(sequencer.stage(), Stage::Reflex);
        assert!(sequencer.completions().is_empty());
    }

    #[test]
    fn reveal_is_terminal() {
        let mut sequencer = Sequencer::new();
        for stage in [Stage::Reflex, Stage::Simon, Stage::Riddle] {
            sequencer.advance(done(stage, 0)).unwrap();
        }

        assert_eq!(
            sequencer.advance(done(Stage::Reveal, 0)),
            Err(GameError::AlreadyRevealed)
        );
        assert_eq!(sequencer.stage(), Stage::Reveal);
    }

    #[test]
    fn stage_numbers() {
        assert_eq!(Stage::Reflex.number(), Some(1));
        assert_eq!(Stage::Riddle.number(), Some(3));
        assert_eq!(Stage::Reveal.number(), None);
        assert_eq!(Stage::Reveal.next(), None);
    }
}
