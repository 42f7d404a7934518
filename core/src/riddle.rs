use alloc::string::{String, ToString};
use alloc::vec::Vec;
use rand::prelude::*;
use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};

use crate::*;

const NAMES: [&str; 7] = [
    "Juliette", "Dorine", "Baloo", "Cecilia", "Elsa", "Ax", "Pierre",
];

const CLUES: [&str; 7] = [
    "Pierre and Ax stand next to each other",
    "Dorine is not at either end",
    "The boys are separated by exactly three girls",
    "The singles are in alphabetical order",
    "Everyone whose name contains an \"a\" stands together",
    "Juliette is further left than Cecilia",
    "Elsa and Baloo are not next to each other",
];

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiddleConfig {
    /// Item names, listed in the winning order.
    pub names: Vec<String>,
    pub clues: Vec<String>,
    /// Minimum number of misplaced items in the starting arrangement.
    pub min_distance: usize,
    /// Pause between a solving move and the win, in ms.
    pub confirm_ms: Millis,
}

impl Default for RiddleConfig {
    fn default() -> Self {
        Self {
            names: NAMES.iter().map(ToString::to_string).collect(),
            clues: CLUES.iter().map(ToString::to_string).collect(),
            min_distance: 4,
            confirm_ms: 800,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemId(pub u8);

/// Moves the element at `from` to `to`, shifting the ones in between.
pub fn move_in_place<T>(list: &mut Vec<T>, from: usize, to: usize) -> Result<()> {
    if from >= list.len() {
        return Err(GameError::InvalidIndex(from));
    }
    if to >= list.len() {
        return Err(GameError::InvalidIndex(to));
    }
    let item = list.remove(from);
    list.insert(to, item);
    Ok(())
}

/// Copying variant of [`move_in_place`].
pub fn moved<T: Clone>(list: &[T], from: usize, to: usize) -> Result<Vec<T>> {
    let mut list = list.to_vec();
    move_in_place(&mut list, from, to)?;
    Ok(list)
}

/// Number of positions holding different values, extra trailing elements included.
pub fn hamming_distance<T: PartialEq>(a: &[T], b: &[T]) -> usize {
    a.iter().zip(b).filter(|(x, y)| x != y).count() + a.len().abs_diff(b.len())
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Arrangement(Vec<ItemId>);

impl Arrangement {
    /// Identity ordering of `count` items.
    pub fn ordered(count: u8) -> Self {
        Self((0..count).map(ItemId).collect())
    }

    /// Shuffles `target` until at least `min_distance` items are out of place.
    pub fn shuffled(rng: &mut SmallRng, target: &Arrangement, min_distance: usize) -> Result<Self> {
        // a permutation can't differ from the target in exactly one place, so 1 behaves like 2
        let reachable = if target.len() < 2 {
            min_distance == 0
        } else {
            min_distance <= target.len()
        };
        if !reachable {
            return Err(GameError::UnsatisfiableConfig);
        }

        Ok(sample_until(
            rng,
            |rng| {
                let mut items = target.0.clone();
                items.shuffle(rng);
                Arrangement(items)
            },
            |candidate| candidate.distance_to(target) >= min_distance,
        ))
    }

    pub fn items(&self) -> &[ItemId] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn distance_to(&self, other: &Arrangement) -> usize {
        hamming_distance(&self.0, &other.0)
    }

    pub fn move_item(&mut self, from: usize, to: usize) -> Result<()> {
        move_in_place(&mut self.0, from, to)
    }
}

/// Horizontal extent of the item under the pointer.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HoverBox {
    pub left: f64,
    pub right: f64,
}

/// Whether hovering item `to` while dragging item `from` should move it there.
///
/// The move only fires once the pointer crossed the middle of the hovered item in the drag direction, so
/// an item swapped under the pointer doesn't immediately swap back.
pub fn should_commit(from: usize, to: usize, pointer_x: f64, hovered: HoverBox) -> bool {
    if from == to {
        return false;
    }

    let middle = (hovered.right - hovered.left) / 2.0;
    let offset = pointer_x - hovered.left;

    if from < to && offset < middle {
        return false;
    }
    if from > to && offset > middle {
        return false;
    }
    true
}

/// Tracks where the dragged item currently sits.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct DragGesture {
    dragging: Option<usize>,
}

impl DragGesture {
    pub fn begin(&mut self, index: usize) {
        self.dragging = Some(index);
    }

    pub fn dragging(&self) -> Option<usize> {
        self.dragging
    }

    /// Returns the `(from, to)` move to perform, if any, and follows the item to its new index.
    pub fn hover(&mut self, to: usize, pointer_x: f64, hovered: HoverBox) -> Option<(usize, usize)> {
        let from = self.dragging?;
        if !should_commit(from, to, pointer_x, hovered) {
            return None;
        }
        self.dragging = Some(to);
        Some((from, to))
    }

    pub fn end(&mut self) -> Option<usize> {
        self.dragging.take()
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum RiddleTimer {
    ConfirmWin,
}

/// Outcome of a reorder
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum MoveOutcome {
    Ignored,
    Moved,
    Solved,
}

impl MoveOutcome {
    pub const fn has_update(self) -> bool {
        match self {
            Self::Ignored => false,
            Self::Moved => true,
            Self::Solved => true,
        }
    }
}

/// Put the items back in order using the clues.
#[derive(Debug)]
pub struct RiddleGame {
    config: RiddleConfig,
    lifecycle: Lifecycle,
    target: Arrangement,
    arrangement: Arrangement,
    gesture: DragGesture,
    timers: TimerSet<RiddleTimer>,
}

impl RiddleGame {
    pub fn new(config: RiddleConfig, seed: u64) -> Result<Self> {
        let count =
            u8::try_from(config.names.len()).map_err(|_| GameError::UnsatisfiableConfig)?;
        let target = Arrangement::ordered(count);
        let arrangement = Arrangement::shuffled(&mut seeded_rng(seed), &target, config.min_distance)?;
        log::debug!("riddle starts {} moves away", arrangement.distance_to(&target));

        Ok(Self {
            config,
            lifecycle: Lifecycle::default(),
            target,
            arrangement,
            gesture: DragGesture::default(),
            timers: TimerSet::new(),
        })
    }

    pub fn arrangement(&self) -> &Arrangement {
        &self.arrangement
    }

    pub fn target(&self) -> &Arrangement {
        &self.target
    }

    pub fn clues(&self) -> &[String] {
        &self.config.clues
    }

    pub fn name_of(&self, id: ItemId) -> &str {
        self.config
            .names
            .get(usize::from(id.0))
            .map_or("", String::as_str)
    }

    pub fn is_solved(&self) -> bool {
        self.arrangement == self.target
    }

    pub fn dragging(&self) -> Option<usize> {
        self.gesture.dragging()
    }

    pub fn move_item(&mut self, from: usize, to: usize) -> Result<MoveOutcome> {
        if !self.lifecycle.state().is_playing() {
            return Ok(MoveOutcome::Ignored);
        }
        self.arrangement.move_item(from, to)?;
        log::trace!("moved item {} -> {}", from, to);
        Ok(self.check_solution())
    }

    pub fn begin_drag(&mut self, index: usize) -> Result<()> {
        if index >= self.arrangement.len() {
            return Err(GameError::InvalidIndex(index));
        }
        if self.lifecycle.state().is_playing() {
            self.gesture.begin(index);
        }
        Ok(())
    }

    pub fn drag_hover(&mut self, to: usize, pointer_x: f64, hovered: HoverBox) -> Result<MoveOutcome> {
        if to >= self.arrangement.len() {
            return Err(GameError::InvalidIndex(to));
        }
        match self.gesture.hover(to, pointer_x, hovered) {
            Some((from, to)) => self.move_item(from, to),
            None => Ok(MoveOutcome::Ignored),
        }
    }

    pub fn end_drag(&mut self) {
        self.gesture.end();
    }

    fn check_solution(&mut self) -> MoveOutcome {
        if self.is_solved() {
            if !self.timers.is_pending(RiddleTimer::ConfirmWin) {
                self.timers.schedule(RiddleTimer::ConfirmWin, self.config.confirm_ms);
            }
            MoveOutcome::Solved
        } else {
            self.timers.cancel(RiddleTimer::ConfirmWin);
            MoveOutcome::Moved
        }
    }
}

impl MiniGame for RiddleGame {
    type Timer = RiddleTimer;

    const STAGE: Stage = Stage::Riddle;

    fn state(&self) -> GameState {
        self.lifecycle.state()
    }

    fn start(&mut self) -> Result<()> {
        self.lifecycle.start()?;
        log::debug!("riddle game started");
        self.check_solution();
        Ok(())
    }

    fn on_timer(&mut self, fired: Fired<RiddleTimer>) -> bool {
        if !self.timers.claim(fired) || !self.lifecycle.state().is_playing() {
            return false;
        }

        match fired.key {
            RiddleTimer::ConfirmWin if self.is_solved() => {
                self.lifecycle.win();
                self.gesture.end();
                log::debug!("riddle solved");
                true
            }
            RiddleTimer::ConfirmWin => false,
        }
    }

    fn timers(&mut self) -> &mut TimerSet<RiddleTimer> {
        &mut self.timers
    }

    fn mistakes(&self) -> u32 {
        0
    }

    fn proceed(&mut self) -> Result<Completion> {
        self.lifecycle.complete(Self::STAGE, 0)
    }
}
