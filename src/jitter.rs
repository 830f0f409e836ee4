//! Jitter added on top of whatever the wait strategy computed.
//!
//! Independent callers that fail together tend to retry together. Adding a bounded random amount
//! to every delay spreads them out again.
//!
//! Notes:
//! - `Additive(max)` adds a value drawn uniformly from `[0, max)`; the result is never below
//!   the base delay.
//! - RNG: uses `rand`'s thread-local RNG by default; deterministic RNGs can be injected via
//!   `apply_with_rng`.
//!
//! Example:
//! ```rust
//! use persevere::Jitter;
//! use std::time::Duration;
//!
//! let jitter = Jitter::additive(Duration::from_millis(50));
//! let delay = jitter.apply(Duration::from_millis(100));
//! assert!(delay >= Duration::from_millis(100) && delay < Duration::from_millis(150));
//! ```

use rand::{rng, Rng};
use std::time::Duration;

/// Jitter strategy for randomizing retry delays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Jitter {
    /// No jitter - use exact wait delay
    #[default]
    None,
    /// Add a random amount in `[0, max)` to each delay
    Additive(Duration),
}

impl Jitter {
    /// Create an additive jitter bounded by `max`
    pub fn additive(max: Duration) -> Self {
        if max.is_zero() {
            Jitter::None
        } else {
            Jitter::Additive(max)
        }
    }

    /// Apply jitter to a delay duration
    pub fn apply(&self, delay: Duration) -> Duration {
        let mut rng = rng();
        self.apply_with_rng(delay, &mut rng)
    }

    /// Apply jitter with a custom RNG (for testing)
    pub fn apply_with_rng<R: Rng + ?Sized>(&self, delay: Duration, rng: &mut R) -> Duration {
        match self {
            Jitter::None => delay,
            Jitter::Additive(max) => {
                let mut extra = max.mul_f64(rng.random::<f64>());
                if extra >= *max {
                    // float rounding can land on the bound; keep the interval half-open
                    extra = max.saturating_sub(Duration::from_nanos(1));
                }
                delay.saturating_add(extra)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn none_jitter_returns_exact_delay() {
        let jitter = Jitter::None;
        let delay = Duration::from_secs(1);
        assert_eq!(jitter.apply(delay), delay);
    }

    #[test]
    fn additive_jitter_stays_in_half_open_range() {
        let jitter = Jitter::additive(Duration::from_millis(50));
        let delay = Duration::from_millis(100);

        for _ in 0..500 {
            let jittered = jitter.apply(delay);
            assert!(jittered >= Duration::from_millis(100));
            assert!(jittered < Duration::from_millis(150));
        }
    }

    #[test]
    fn additive_jitter_with_deterministic_rng() {
        let jitter = Jitter::additive(Duration::from_millis(1000));
        let mut a = StdRng::seed_from_u64(42);
        let mut b = StdRng::seed_from_u64(42);

        let first = jitter.apply_with_rng(Duration::ZERO, &mut a);
        let second = jitter.apply_with_rng(Duration::ZERO, &mut b);
        assert_eq!(first, second);
        assert!(first < Duration::from_millis(1000));
    }

    #[test]
    fn zero_max_disables_jitter() {
        assert_eq!(Jitter::additive(Duration::ZERO), Jitter::None);
    }

    #[test]
    fn saturates_large_durations_without_panicking() {
        let jitter = Jitter::additive(Duration::from_secs(10));
        let mut rng = StdRng::seed_from_u64(999);
        assert_eq!(jitter.apply_with_rng(Duration::MAX, &mut rng), Duration::MAX);
    }
}
