use std::collections::HashMap;

use gauntlet_core::{Fired, MiniGame, TimerKey, TimerRequest, TimerToken};
use gloo::timers::callback::Timeout;
use yew::Callback;

/// Runs a game's timer requests on browser timeouts.
///
/// Dropping the host clears every timeout it still holds, so a component owning one can't receive
/// callbacks after it is destroyed.
pub(crate) struct TimerHost<K> {
    timeouts: HashMap<K, (TimerToken, Timeout)>,
}

impl<K: TimerKey + 'static> TimerHost<K> {
    pub(crate) fn new() -> Self {
        Self {
            timeouts: HashMap::new(),
        }
    }

    pub(crate) fn sync<G>(&mut self, game: &mut G, callback: &Callback<Fired<K>>)
    where
        G: MiniGame<Timer = K>,
    {
        for request in game.timers().take_requests() {
            match request {
                TimerRequest::Schedule { key, token, delay } => {
                    let callback = callback.clone();
                    let timeout = Timeout::new(delay, move || callback.emit(Fired { key, token }));
                    self.timeouts.insert(key, (token, timeout));
                }
                TimerRequest::Cancel { key, token } => {
                    if self.timeouts.get(&key).is_some_and(|(live, _)| *live == token) {
                        self.timeouts.remove(&key);
                    }
                }
            }
        }
    }

    /// Drops the handle of a timeout that already ran.
    pub(crate) fn release(&mut self, fired: Fired<K>) {
        if self
            .timeouts
            .get(&fired.key)
            .is_some_and(|(live, _)| *live == fired.token)
        {
            self.timeouts.remove(&fired.key);
        }
    }
}
