use bitflags::bitflags;
use rand::prelude::*;
use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::*;

/// Number of distinct symbols on the board.
pub const SYMBOL_COUNT: u8 = 6;

/// Default length of a sequence, and the number of levels.
pub const SEQUENCE_LEN: usize = 14;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Symbol(u8);

impl Symbol {
    pub fn new(index: u8) -> Result<Self> {
        if index < SYMBOL_COUNT {
            Ok(Self(index))
        } else {
            Err(GameError::InvalidSymbol(index))
        }
    }

    pub const fn index(self) -> u8 {
        self.0
    }

    pub fn all() -> impl Iterator<Item = Symbol> {
        (0..SYMBOL_COUNT).map(Symbol)
    }
}

bitflags! {
    /// Which symbols appear at least once.
    #[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct SymbolSet: u8 {
        const S0 = 1;
        const S1 = 1 << 1;
        const S2 = 1 << 2;
        const S3 = 1 << 3;
        const S4 = 1 << 4;
        const S5 = 1 << 5;
    }
}

impl SymbolSet {
    pub fn of(symbols: &[Symbol]) -> Self {
        symbols.iter().fold(Self::empty(), |set, symbol| {
            set | Self::from_bits_truncate(1 << symbol.index())
        })
    }
}

type Symbols = SmallVec<[Symbol; SEQUENCE_LEN]>;

/// The order the player has to reproduce, every symbol is present at least once.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sequence(Symbols);

impl Sequence {
    pub fn generate(rng: &mut SmallRng, len: usize) -> Result<Self> {
        if len < usize::from(SYMBOL_COUNT) {
            return Err(GameError::UnsatisfiableConfig);
        }

        let symbols = sample_until(
            rng,
            |rng| {
                (0..len)
                    .map(|_| Symbol(rng.random_range(0..SYMBOL_COUNT)))
                    .collect::<Symbols>()
            },
            |candidate| SymbolSet::of(candidate).is_all(),
        );
        Ok(Self(symbols))
    }

    pub fn from_symbols(symbols: &[Symbol]) -> Result<Self> {
        if !SymbolSet::of(symbols).is_all() {
            return Err(GameError::UnsatisfiableConfig);
        }
        Ok(Self(symbols.iter().copied().collect()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[Symbol] {
        &self.0
    }

    /// The first `level` symbols.
    pub fn prefix(&self, level: usize) -> &[Symbol] {
        &self.0[..level.min(self.0.len())]
    }
}

/// Display time of each symbol, shrinking as levels go up.
pub const fn interval_for_level(level: usize) -> Millis {
    if level < 3 {
        1200
    } else if level < 7 {
        900
    } else if level < 10 {
        660
    } else {
        420
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Verdict {
    /// Input diverged from the sequence at `index`
    Mismatch { index: usize },
    /// Input is a correct but incomplete prefix
    Partial,
    /// Input reproduces every expected symbol
    Complete,
}

/// Positional comparison of the player's input against the expected prefix.
pub fn validate(expected: &[Symbol], input: &[Symbol]) -> Verdict {
    if let Some(index) = input.iter().zip(expected).position(|(got, want)| got != want) {
        return Verdict::Mismatch { index };
    }

    match input.len().cmp(&expected.len()) {
        core::cmp::Ordering::Less => Verdict::Partial,
        core::cmp::Ordering::Equal => Verdict::Complete,
        core::cmp::Ordering::Greater => Verdict::Mismatch {
            index: expected.len(),
        },
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Frame {
    Symbol(Symbol),
    Blank,
}

/// Show `frame` once `delay` has elapsed since the previous cue.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Cue {
    pub delay: Millis,
    pub frame: Frame,
}

/// Lazy computer-turn playback.
///
/// Symbols are separated by blanks so repeated symbols stay distinguishable. A symbol following a blank
/// waits a quarter of the interval, any other frame waits the full interval. The last cue is a blank hold
/// after which the turn goes to the player.
#[derive(Clone, Debug)]
pub struct Playback {
    symbols: Symbols,
    interval: Millis,
    position: usize,
}

impl Playback {
    pub fn new(symbols: &[Symbol], interval: Millis) -> Self {
        Self {
            symbols: symbols.iter().copied().collect(),
            interval,
            position: 0,
        }
    }

    fn frame_count(&self) -> usize {
        (self.symbols.len() * 2).saturating_sub(1)
    }

    fn blank_interval(&self) -> Millis {
        self.interval / 4
    }
}

impl Iterator for Playback {
    type Item = Cue;

    fn next(&mut self) -> Option<Cue> {
        let frames = self.frame_count();
        let position = self.position;
        if position > frames {
            return None;
        }
        self.position += 1;

        let cue = if position == frames {
            Cue {
                delay: self.interval,
                frame: Frame::Blank,
            }
        } else if position % 2 == 0 {
            Cue {
                delay: if position == 0 {
                    self.interval
                } else {
                    self.blank_interval()
                },
                frame: Frame::Symbol(self.symbols[position / 2]),
            }
        } else {
            Cue {
                delay: self.interval,
                frame: Frame::Blank,
            }
        };
        Some(cue)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.frame_count() + 1).saturating_sub(self.position);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Playback {}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimonConfig {
    pub sequence_len: usize,
    /// How long a player selection stays lit, in ms.
    pub highlight_ms: Millis,
}

impl Default for SimonConfig {
    fn default() -> Self {
        Self {
            sequence_len: SEQUENCE_LEN,
            highlight_ms: 500,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SimonTimer {
    Playback,
    Highlight,
    Resolve,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Turn {
    Computer,
    Player,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnStatus {
    Waiting,
    Success,
    Failure,
}

/// Outcome of a player selection
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum SelectOutcome {
    Ignored,
    Accepted,
    Failed,
    LevelCleared,
    Won,
}

impl SelectOutcome {
    pub const fn has_update(self) -> bool {
        use SelectOutcome::*;
        match self {
            Ignored => false,
            Accepted => true,
            Failed => true,
            LevelCleared => true,
            Won => true,
        }
    }
}

/// Watch the computer light up a growing prefix of the sequence, then repeat it.
#[derive(Debug)]
pub struct SimonGame {
    config: SimonConfig,
    lifecycle: Lifecycle,
    rng: SmallRng,
    sequence: Option<Sequence>,
    level: usize,
    input: Symbols,
    errors: u32,
    turn: Turn,
    status: TurnStatus,
    lit: Option<Symbol>,
    playback: Option<Playback>,
    pending_cue: Option<Cue>,
    timers: TimerSet<SimonTimer>,
}

impl SimonGame {
    pub fn new(config: SimonConfig, seed: u64) -> Result<Self> {
        if config.sequence_len < usize::from(SYMBOL_COUNT) {
            return Err(GameError::UnsatisfiableConfig);
        }

        Ok(Self {
            config,
            lifecycle: Lifecycle::default(),
            rng: seeded_rng(seed),
            sequence: None,
            level: 1,
            input: SmallVec::new(),
            errors: 0,
            turn: Turn::Computer,
            status: TurnStatus::Waiting,
            lit: None,
            playback: None,
            pending_cue: None,
            timers: TimerSet::new(),
        })
    }

    /// Starts with a known sequence instead of a random one.
    pub fn start_with(&mut self, sequence: Sequence) -> Result<()> {
        self.lifecycle.start()?;
        self.begin(sequence);
        Ok(())
    }

    pub fn level(&self) -> usize {
        self.level
    }

    pub fn levels(&self) -> usize {
        self.config.sequence_len
    }

    pub fn errors(&self) -> u32 {
        self.errors
    }

    pub fn turn(&self) -> Turn {
        self.turn
    }

    pub fn status(&self) -> TurnStatus {
        self.status
    }

    /// Symbol currently lit, either by playback or by the player's last selection.
    pub fn lit(&self) -> Option<Symbol> {
        self.lit
    }

    pub fn input(&self) -> &[Symbol] {
        &self.input
    }

    pub fn sequence(&self) -> Option<&Sequence> {
        self.sequence.as_ref()
    }

    pub fn interval(&self) -> Millis {
        interval_for_level(self.level)
    }

    fn begin(&mut self, sequence: Sequence) {
        log::debug!("simon sequence: {:?}", sequence.as_slice());
        self.sequence = Some(sequence);
        self.level = 1;
        self.skip_if_not_ready();
    }

    fn skip_if_not_ready(&mut self) {
        if let Err(err) = self.play_computer_turn() {
            log::debug!("computer turn skipped: {}", err);
        }
    }

    /// Replays the current level, replacing any playback still running.
    pub fn play_computer_turn(&mut self) -> Result<()> {
        let sequence = self.sequence.as_ref().ok_or(GameError::SequenceNotReady)?;
        let playback = Playback::new(sequence.prefix(self.level), self.interval());

        self.turn = Turn::Computer;
        self.status = TurnStatus::Waiting;
        self.input.clear();
        self.lit = None;
        self.timers.cancel(SimonTimer::Highlight);
        self.timers.cancel(SimonTimer::Resolve);
        self.playback = Some(playback);
        log::debug!("computer turn, level {}", self.level);
        self.queue_next_cue();
        Ok(())
    }

    fn queue_next_cue(&mut self) {
        match self.playback.as_mut().and_then(|playback| playback.next()) {
            Some(cue) => {
                self.pending_cue = Some(cue);
                self.timers.schedule(SimonTimer::Playback, cue.delay);
            }
            None => {
                self.playback = None;
                self.pending_cue = None;
                self.turn = Turn::Player;
                log::debug!("player turn, level {}", self.level);
            }
        }
    }

    pub fn select(&mut self, index: u8) -> Result<SelectOutcome> {
        let symbol = Symbol::new(index)?;

        if !self.lifecycle.state().is_playing()
            || self.turn == Turn::Computer
            || self.status != TurnStatus::Waiting
        {
            return Ok(SelectOutcome::Ignored);
        }

        let sequence = self.sequence.as_ref().ok_or(GameError::SequenceNotReady)?;
        self.lit = Some(symbol);
        self.timers.schedule(SimonTimer::Highlight, self.config.highlight_ms);
        self.input.push(symbol);

        Ok(match validate(sequence.prefix(self.level), &self.input) {
            Verdict::Partial => SelectOutcome::Accepted,
            Verdict::Mismatch { index } => {
                log::debug!("wrong symbol at {} on level {}", index, self.level);
                self.input.clear();
                self.errors = self.errors.saturating_add(1);
                self.status = TurnStatus::Failure;
                self.timers.schedule(SimonTimer::Resolve, self.interval());
                SelectOutcome::Failed
            }
            Verdict::Complete if self.level >= sequence.len() => {
                self.input.clear();
                self.status = TurnStatus::Success;
                self.lit = None;
                self.lifecycle.win();
                self.timers.cancel_all();
                log::debug!("simon won with {} errors", self.errors);
                SelectOutcome::Won
            }
            Verdict::Complete => {
                self.input.clear();
                self.status = TurnStatus::Success;
                self.timers.schedule(SimonTimer::Resolve, self.interval());
                SelectOutcome::LevelCleared
            }
        })
    }
}

impl MiniGame for SimonGame {
    type Timer = SimonTimer;

    const STAGE: Stage = Stage::Simon;

    fn state(&self) -> GameState {
        self.lifecycle.state()
    }

    fn start(&mut self) -> Result<()> {
        self.lifecycle.start()?;
        let sequence = Sequence::generate(&mut self.rng, self.config.sequence_len)?;
        self.begin(sequence);
        Ok(())
    }

    fn on_timer(&mut self, fired: Fired<SimonTimer>) -> bool {
        if !self.timers.claim(fired) || !self.lifecycle.state().is_playing() {
            return false;
        }

        match fired.key {
            SimonTimer::Playback => {
                let Some(cue) = self.pending_cue.take() else {
                    return false;
                };
                self.lit = match cue.frame {
                    Frame::Symbol(symbol) => Some(symbol),
                    Frame::Blank => None,
                };
                self.queue_next_cue();
            }
            SimonTimer::Highlight => {
                self.lit = None;
            }
            SimonTimer::Resolve => {
                match self.status {
                    TurnStatus::Success => self.level += 1,
                    TurnStatus::Failure => {}
                    TurnStatus::Waiting => return false,
                }
                self.skip_if_not_ready();
            }
        }
        true
    }

    fn timers(&mut self) -> &mut TimerSet<SimonTimer> {
        &mut self.timers
    }

    fn mistakes(&self) -> u32 {
        self.errors
    }

    fn proceed(&mut self) -> Result<Completion> {
        self.lifecycle.complete(Self::STAGE, self.errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    fn symbols(indices: &[u8]) -> Vec<Symbol> {
        indices.iter().map(|&i| Symbol::new(i).unwrap()).collect()
    }

    fn fixed_sequence() -> Sequence {
        Sequence::from_symbols(&symbols(&[0, 1, 2, 3, 4, 5, 5, 4, 3, 2, 1, 0, 0, 1])).unwrap()
    }

    fn playing() -> (SimonGame, VirtualClock<SimonTimer>) {
        let mut game = SimonGame::new(SimonConfig::default(), 0).unwrap();
        game.start_with(fixed_sequence()).unwrap();
        (game, VirtualClock::new())
    }

    fn finish_playback(game: &mut SimonGame, clock: &mut VirtualClock<SimonTimer>) {
        while game.turn() == Turn::Computer {
            clock.fire_next(game).expect("playback should keep a timer pending");
        }
    }

    fn reproduce_level(game: &mut SimonGame) -> SelectOutcome {
        let expected: Vec<Symbol> = game.sequence().unwrap().prefix(game.level()).to_vec();
        let mut outcome = SelectOutcome::Ignored;
        for symbol in expected {
            outcome = game.select(symbol.index()).unwrap();
        }
        outcome
    }

    #[test]
    fn generated_sequences_cover_every_symbol() {
        let mut rng = seeded_rng(42);
        for _ in 0..200 {
            let sequence = Sequence::generate(&mut rng, SEQUENCE_LEN).unwrap();
            assert_eq!(sequence.len(), SEQUENCE_LEN);
            assert!(SymbolSet::of(sequence.as_slice()).is_all());
        }
    }

    #[test]
    fn short_sequences_are_unsatisfiable() {
        let mut rng = seeded_rng(0);
        assert_eq!(
            Sequence::generate(&mut rng, 5),
            Err(GameError::UnsatisfiableConfig)
        );
        assert_eq!(
            Sequence::from_symbols(&symbols(&[0, 1, 2])),
            Err(GameError::UnsatisfiableConfig)
        );
    }

    #[test]
    fn difficulty_steps_down_with_level() {
        assert_eq!(interval_for_level(1), 1200);
        assert_eq!(interval_for_level(2), 1200);
        assert_eq!(interval_for_level(3), 900);
        assert_eq!(interval_for_level(5), 900);
        assert_eq!(interval_for_level(7), 660);
        assert_eq!(interval_for_level(8), 660);
        assert_eq!(interval_for_level(10), 420);
        assert_eq!(interval_for_level(12), 420);
    }

    #[test]
    fn validate_reports_first_mismatch() {
        let expected = symbols(&[0, 1, 2, 3]);

        assert_eq!(validate(&expected, &symbols(&[0, 1])), Verdict::Partial);
        assert_eq!(validate(&expected, &symbols(&[0, 1, 2, 3])), Verdict::Complete);
        assert_eq!(
            validate(&expected, &symbols(&[0, 4, 2, 3])),
            Verdict::Mismatch { index: 1 }
        );
        assert_eq!(
            validate(&expected, &symbols(&[5, 1])),
            Verdict::Mismatch { index: 0 }
        );
        assert_eq!(
            validate(&expected, &symbols(&[0, 1, 2, 3, 4])),
            Verdict::Mismatch { index: 4 }
        );
        assert_eq!(validate(&expected, &[]), Verdict::Partial);
    }

    #[test]
    fn playback_interleaves_blanks_with_shortened_gaps() {
        let cues: Vec<Cue> = Playback::new(&symbols(&[3, 3, 1]), 1200).collect();
        let s = |i| Frame::Symbol(Symbol::new(i).unwrap());

        assert_eq!(
            cues,
            [
                Cue { delay: 1200, frame: s(3) },
                Cue { delay: 1200, frame: Frame::Blank },
                Cue { delay: 300, frame: s(3) },
                Cue { delay: 1200, frame: Frame::Blank },
                Cue { delay: 300, frame: s(1) },
                Cue { delay: 1200, frame: Frame::Blank },
            ]
        );
    }

    #[test]
    fn playback_reports_exact_length() {
        let playback = Playback::new(&symbols(&[0, 1, 2, 3]), 900);
        assert_eq!(playback.len(), 8);
        assert_eq!(Playback::new(&symbols(&[2]), 900).count(), 2);
    }

    #[test]
    fn computer_turn_without_sequence_is_not_ready() {
        let mut game = SimonGame::new(SimonConfig::default(), 0).unwrap();
        assert_eq!(game.play_computer_turn(), Err(GameError::SequenceNotReady));
        assert_eq!(game.timers().pending_count(), 0);
    }

    #[test]
    fn start_generates_sequence_and_plays_first_level() {
        let mut game = SimonGame::new(SimonConfig::default(), 17).unwrap();
        let mut clock = VirtualClock::new();
        game.start().unwrap();

        let first = game.sequence().unwrap().as_slice()[0];
        assert_eq!(game.turn(), Turn::Computer);
        assert_eq!(game.lit(), None);

        clock.advance(&mut game, 1200);
        assert_eq!(game.lit(), Some(first));
        assert_eq!(game.turn(), Turn::Computer);

        clock.advance(&mut game, 1200);
        assert_eq!(game.lit(), None);
        assert_eq!(game.turn(), Turn::Player);
    }

    #[test]
    fn selections_during_computer_turn_are_ignored() {
        let (mut game, _clock) = playing();
        assert_eq!(game.select(0), Ok(SelectOutcome::Ignored));
        assert!(game.input().is_empty());
        assert_eq!(game.select(9), Err(GameError::InvalidSymbol(9)));
    }

    #[test]
    fn highlight_restarts_on_fast_clicks() {
        let (mut game, mut clock) = playing();
        finish_playback(&mut game, &mut clock);
        game.level = 3;

        assert_eq!(game.select(0), Ok(SelectOutcome::Accepted));
        clock.advance(&mut game, 300);
        assert_eq!(game.select(1), Ok(SelectOutcome::Accepted));
        clock.advance(&mut game, 300);
        assert_eq!(game.lit(), Symbol::new(1).ok());
        clock.advance(&mut game, 200);
        assert_eq!(game.lit(), None);
    }

    #[test]
    fn mismatch_retries_same_level() {
        let (mut game, mut clock) = playing();
        finish_playback(&mut game, &mut clock);
        game.level = 2;
        assert_eq!(game.select(0), Ok(SelectOutcome::Accepted));

        assert_eq!(game.select(4), Ok(SelectOutcome::Failed));
        assert_eq!(game.errors(), 1);
        assert_eq!(game.status(), TurnStatus::Failure);
        assert!(game.input().is_empty());
        assert_eq!(game.select(0), Ok(SelectOutcome::Ignored));

        clock.advance(&mut game, interval_for_level(2));
        assert_eq!(game.level(), 2);
        assert_eq!(game.turn(), Turn::Computer);
        assert_eq!(game.status(), TurnStatus::Waiting);
    }

    #[test]
    fn cleared_level_advances_after_hold() {
        let (mut game, mut clock) = playing();
        finish_playback(&mut game, &mut clock);

        assert_eq!(reproduce_level(&mut game), SelectOutcome::LevelCleared);
        assert_eq!(game.status(), TurnStatus::Success);
        assert_eq!(game.level(), 1);

        clock.advance(&mut game, 1199);
        assert_eq!(game.level(), 1);
        clock.advance(&mut game, 1);
        assert_eq!(game.level(), 2);
        assert_eq!(game.turn(), Turn::Computer);
    }

    #[test]
    fn last_level_wins_without_incrementing() {
        let (mut game, mut clock) = playing();

        for level in 1..SEQUENCE_LEN {
            finish_playback(&mut game, &mut clock);
            assert_eq!(game.level(), level);
            assert_eq!(reproduce_level(&mut game), SelectOutcome::LevelCleared);
            let hold = game.interval();
            clock.advance(&mut game, hold);
        }

        finish_playback(&mut game, &mut clock);
        assert_eq!(game.level(), SEQUENCE_LEN);
        assert_eq!(reproduce_level(&mut game), SelectOutcome::Won);
        assert_eq!(game.state(), GameState::Won);
        assert_eq!(game.level(), SEQUENCE_LEN);
        assert_eq!(game.timers().pending_count(), 0);

        clock.advance(&mut game, 5000);
        assert_eq!(game.level(), SEQUENCE_LEN);
        assert_eq!(game.proceed().map(|c| c.mistakes), Ok(0));
    }

    #[test]
    fn win_reports_error_count() {
        let (mut game, mut clock) = playing();
        game.level = SEQUENCE_LEN;
        game.play_computer_turn().unwrap();
        finish_playback(&mut game, &mut clock);

        assert_eq!(game.select(5), Ok(SelectOutcome::Failed));
        let hold = game.interval();
        clock.advance(&mut game, hold);
        finish_playback(&mut game, &mut clock);
        assert_eq!(reproduce_level(&mut game), SelectOutcome::Won);

        assert_eq!(
            game.proceed(),
            Ok(Completion {
                stage: Stage::Simon,
                mistakes: 1
            })
        );
    }
}
