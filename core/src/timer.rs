use alloc::collections::BTreeMap;
use core::fmt::Debug;
use core::hash::Hash;
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::MiniGame;

/// Delay unit used by every timer in the crate.
pub type Millis = u32;

/// Anything usable as the name of a timer slot.
pub trait TimerKey: Copy + Eq + Hash + Debug {}

impl<T: Copy + Eq + Hash + Debug> TimerKey for T {}

/// Identifies one particular scheduling of a timer slot.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimerToken(u64);

/// Handed back to the owning game by the host once a scheduled delay elapsed.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Fired<K> {
    pub key: K,
    pub token: TimerToken,
}

/// Work the host has to carry out on its real (or virtual) clock.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TimerRequest<K> {
    Schedule {
        key: K,
        token: TimerToken,
        delay: Millis,
    },
    Cancel {
        key: K,
        token: TimerToken,
    },
}

pub type TimerRequests<K> = SmallVec<[TimerRequest<K>; 4]>;

/// The set of timers a single mini-game owns.
///
/// Each key is a slot holding at most one pending timer: scheduling an occupied slot cancels the previous
/// timer first. A fired timer is only honored when its token is still the current one for its slot, so
/// late callbacks from cancelled timers are dropped instead of mutating the game.
#[derive(Debug)]
pub struct TimerSet<K> {
    next_token: u64,
    active: HashMap<K, TimerToken>,
    requests: TimerRequests<K>,
}

impl<K: TimerKey> TimerSet<K> {
    pub fn new() -> Self {
        Self {
            next_token: 0,
            active: HashMap::new(),
            requests: SmallVec::new(),
        }
    }

    pub fn schedule(&mut self, key: K, delay: Millis) -> TimerToken {
        self.cancel(key);

        let token = TimerToken(self.next_token);
        self.next_token += 1;
        self.active.insert(key, token);
        self.requests.push(TimerRequest::Schedule { key, token, delay });
        log::trace!("schedule {:?} in {}ms ({:?})", key, delay, token);
        token
    }

    pub fn cancel(&mut self, key: K) -> bool {
        match self.active.remove(&key) {
            Some(token) => {
                self.requests.push(TimerRequest::Cancel { key, token });
                true
            }
            None => false,
        }
    }

    pub fn cancel_all(&mut self) {
        let mut pending: SmallVec<[(K, TimerToken); 4]> = self.active.drain().collect();
        pending.sort_unstable_by_key(|&(_, token)| token);
        self.requests.extend(
            pending
                .into_iter()
                .map(|(key, token)| TimerRequest::Cancel { key, token }),
        );
    }

    pub fn is_pending(&self, key: K) -> bool {
        self.active.contains_key(&key)
    }

    pub fn pending_count(&self) -> usize {
        self.active.len()
    }

    /// Consumes a fired timer, returning whether it is the live one for its slot.
    pub fn claim(&mut self, fired: Fired<K>) -> bool {
        match self.active.get(&fired.key) {
            Some(&token) if token == fired.token => {
                self.active.remove(&fired.key);
                true
            }
            _ => {
                log::trace!("discard stale timer {:?} ({:?})", fired.key, fired.token);
                false
            }
        }
    }

    pub fn take_requests(&mut self) -> TimerRequests<K> {
        core::mem::take(&mut self.requests)
    }
}

impl<K: TimerKey> Default for TimerSet<K> {
    fn default() -> Self {
        Self::new()
    }
}

/// Deterministic host that keeps time in memory instead of using real timers.
#[derive(Debug)]
pub struct VirtualClock<K> {
    now: u64,
    queue: BTreeMap<(u64, TimerToken), K>,
}

impl<K: TimerKey> VirtualClock<K> {
    pub fn new() -> Self {
        Self {
            now: 0,
            queue: BTreeMap::new(),
        }
    }

    pub fn now(&self) -> u64 {
        self.now
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn apply(&mut self, requests: impl IntoIterator<Item = TimerRequest<K>>) {
        for request in requests {
            match request {
                TimerRequest::Schedule { key, token, delay } => {
                    self.queue.insert((self.now + u64::from(delay), token), key);
                }
                TimerRequest::Cancel { token, .. } => {
                    self.queue.retain(|&(_, pending), _| pending != token);
                }
            }
        }
    }

    /// Fires the earliest pending timer into `game`, jumping the clock to its deadline.
    pub fn fire_next<G>(&mut self, game: &mut G) -> Option<K>
    where
        G: MiniGame<Timer = K>,
    {
        self.apply(game.timers().take_requests());
        let ((deadline, token), key) = self.queue.pop_first()?;
        self.now = deadline;
        game.on_timer(Fired { key, token });
        self.apply(game.timers().take_requests());
        Some(key)
    }

    /// Moves the clock forward by `elapsed`, firing every timer that comes due on the way, including the
    /// ones scheduled by earlier fires. Returns how many timers fired.
    pub fn advance<G>(&mut self, game: &mut G, elapsed: Millis) -> usize
    where
        G: MiniGame<Timer = K>,
    {
        let target = self.now + u64::from(elapsed);
        let mut fired = 0;

        loop {
            self.apply(game.timers().take_requests());
            let Some((&(deadline, token), &key)) = self.queue.first_key_value() else {
                break;
            };
            if deadline > target {
                break;
            }
            self.queue.remove(&(deadline, token));
            self.now = deadline;
            game.on_timer(Fired { key, token });
            fired += 1;
        }

        self.now = target;
        fired
    }
}

impl<K: TimerKey> Default for VirtualClock<K> {
    fn default() -> Self {
        Self::new()
    }
}
