use rand::prelude::*;
use rand::rngs::SmallRng;

/// Builds the deterministic generator every controller draws from.
pub fn seeded_rng(seed: u64) -> SmallRng {
    SmallRng::seed_from_u64(seed)
}

/// Uniform integer in `[min, max]`, both ends included. A collapsed or inverted range yields `min`.
pub fn random_between(rng: &mut SmallRng, min: u32, max: u32) -> u32 {
    if max <= min {
        return min;
    }
    rng.random_range(min..=max)
}

/// Rejection sampling: draws candidates until one is accepted.
///
/// There is no attempt cap, callers must only ask for outcomes with a non-zero probability.
pub fn sample_until<T>(
    rng: &mut SmallRng,
    mut generate: impl FnMut(&mut SmallRng) -> T,
    mut accept: impl FnMut(&T) -> bool,
) -> T {
    let mut attempts: u32 = 0;
    loop {
        attempts = attempts.saturating_add(1);
        let candidate = generate(rng);
        if accept(&candidate) {
            log::trace!("sample accepted after {} attempts", attempts);
            return candidate;
        }
    }
}
