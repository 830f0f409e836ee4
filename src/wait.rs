//! Wait strategies for retry policies.
//!
//! A wait strategy maps `(previous_attempt, elapsed)` to the delay before the next attempt.
//! `previous_attempt` is the 1-based number of the attempt that was just rejected, and `elapsed`
//! is measured from the start of `execute` to the end of that attempt. Every strategy clamps its
//! result at zero and saturates instead of overflowing.
//!
//! Example
//! ```rust
//! use std::time::Duration;
//! use persevere::{Wait, WaitStrategy};
//!
//! let wait = Wait::exponential(Duration::from_millis(100))
//!     .with_max(Duration::from_secs(2))
//!     .unwrap();
//! assert_eq!(wait.wait(1, Duration::ZERO), Duration::from_millis(200)); // 100 * 2^1
//! assert_eq!(wait.wait(2, Duration::ZERO), Duration::from_millis(400));
//! assert_eq!(wait.wait(10, Duration::ZERO), Duration::from_secs(2)); // capped
//! ```

use crate::error::ConfigError;
use rand::{rng, Rng};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Default cap for incrementing and exponential waits (2^30 - 1 ms, roughly 12.4 days).
pub const MAX_WAIT: Duration = Duration::from_millis(1_073_741_823);

/// Trait implemented by all wait strategies.
pub trait WaitStrategy: Send + Sync + fmt::Debug {
    fn wait(&self, previous_attempt: usize, elapsed: Duration) -> Duration;
}

fn as_millis(duration: Duration) -> u64 {
    duration.as_millis().try_into().unwrap_or(u64::MAX)
}

fn clamp_millis(millis: i128, max: Duration) -> Duration {
    let capped = millis.clamp(0, i128::from(as_millis(max)));
    Duration::from_millis(capped as u64)
}

fn from_nanos(nanos: u128) -> Duration {
    let secs = u64::try_from(nanos / 1_000_000_000).unwrap_or(u64::MAX);
    Duration::new(secs, (nanos % 1_000_000_000) as u32)
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct RandomWait {
    min: Duration,
    max: Duration,
}

impl RandomWait {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        let nanos = rng.random_range(self.min.as_nanos()..=self.max.as_nanos());
        from_nanos(nanos)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct IncrementingWait {
    start: i128,
    increment: i128,
    max: Duration,
}

impl WaitStrategy for IncrementingWait {
    fn wait(&self, previous_attempt: usize, _elapsed: Duration) -> Duration {
        let steps = (previous_attempt as i128).saturating_sub(1);
        let total = self.start.saturating_add(self.increment.saturating_mul(steps));
        clamp_millis(total, self.max)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ExponentialWait {
    multiplier: Duration,
    base: u32,
    max: Duration,
}

impl WaitStrategy for ExponentialWait {
    fn wait(&self, previous_attempt: usize, _elapsed: Duration) -> Duration {
        // clamp to prevent truncation
        let exponent = previous_attempt.min(u32::MAX as usize) as u32;
        let factor = u128::from(self.base).saturating_pow(exponent);
        let millis = u128::from(as_millis(self.multiplier)).saturating_mul(factor);
        let capped = millis.min(u128::from(as_millis(self.max)));
        Duration::from_millis(capped as u64)
    }
}

type WaitFn = dyn Fn(usize, Duration) -> Duration + Send + Sync;

#[derive(Clone)]
struct CustomWait(Arc<WaitFn>);

impl fmt::Debug for CustomWait {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<custom wait>")
    }
}

#[derive(Debug, Clone)]
enum WaitKind {
    None,
    Fixed(Duration),
    Random(RandomWait),
    Incrementing(IncrementingWait),
    Exponential(ExponentialWait),
    Custom(CustomWait),
}

impl WaitKind {
    fn name(&self) -> &'static str {
        match self {
            WaitKind::None => "none",
            WaitKind::Fixed(_) => "fixed",
            WaitKind::Random(_) => "random",
            WaitKind::Incrementing(_) => "incrementing",
            WaitKind::Exponential(_) => "exponential",
            WaitKind::Custom(_) => "custom",
        }
    }
}

/// Wait strategy: one of the built-in policies, or a user-supplied function.
#[derive(Debug, Clone)]
pub struct Wait {
    kind: WaitKind,
}

impl Default for Wait {
    fn default() -> Self {
        Self::none()
    }
}

impl Wait {
    /// Retry immediately.
    pub fn none() -> Self {
        Self { kind: WaitKind::None }
    }

    /// Wait the same amount before every retry.
    pub fn fixed(delay: Duration) -> Self {
        Self { kind: WaitKind::Fixed(delay) }
    }

    /// Wait a uniformly random duration in `[min, max]`, at nanosecond resolution.
    /// Fails eagerly when `min > max`.
    pub fn random(min: Duration, max: Duration) -> Result<Self, ConfigError> {
        if min > max {
            return Err(ConfigError::InvalidRandomRange { min, max });
        }
        Ok(Self { kind: WaitKind::Random(RandomWait { min, max }) })
    }

    /// Wait `start + increment * (previous_attempt - 1)`, capped at [`MAX_WAIT`].
    pub fn incrementing(start: Duration, increment: Duration) -> Self {
        Self::stepped(i128::from(as_millis(start)), i128::from(as_millis(increment)))
    }

    /// Like [`Wait::incrementing`] with a negative step; the delay bottoms out at zero.
    pub fn decrementing(start: Duration, decrement: Duration) -> Self {
        Self::stepped(i128::from(as_millis(start)), -i128::from(as_millis(decrement)))
    }

    fn stepped(start: i128, increment: i128) -> Self {
        Self {
            kind: WaitKind::Incrementing(IncrementingWait { start, increment, max: MAX_WAIT }),
        }
    }

    /// Wait `multiplier * 2^previous_attempt`, capped at [`MAX_WAIT`].
    pub fn exponential(multiplier: Duration) -> Self {
        Self {
            kind: WaitKind::Exponential(ExponentialWait { multiplier, base: 2, max: MAX_WAIT }),
        }
    }

    /// Wait `multiplier * base^previous_attempt`. A zero base is rejected.
    pub fn exponential_with_base(multiplier: Duration, base: u32) -> Result<Self, ConfigError> {
        if base == 0 {
            return Err(ConfigError::ZeroExponentBase);
        }
        let exponential = ExponentialWait { multiplier, base, max: MAX_WAIT };
        Ok(Self { kind: WaitKind::Exponential(exponential) })
    }

    /// Compute the delay with a user-supplied function. Negative results cannot be expressed,
    /// so clamping at zero holds by construction.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(usize, Duration) -> Duration + Send + Sync + 'static,
    {
        Self { kind: WaitKind::Custom(CustomWait(Arc::new(f))) }
    }

    /// Set the maximum delay for an incrementing or exponential wait.
    /// Returns an error for strategies that do not grow.
    pub fn with_max(mut self, max: Duration) -> Result<Self, ConfigError> {
        let existing = match &mut self.kind {
            WaitKind::Incrementing(IncrementingWait { max: existing, .. })
            | WaitKind::Exponential(ExponentialWait { max: existing, .. }) => existing,
            other => return Err(ConfigError::MaxNotSupported { strategy: other.name() }),
        };
        *existing = max;
        Ok(self)
    }

    /// Compute the delay drawing randomness from `rng` (for testing).
    pub fn wait_with_rng<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        previous_attempt: usize,
        elapsed: Duration,
    ) -> Duration {
        match &self.kind {
            WaitKind::None => Duration::ZERO,
            WaitKind::Fixed(delay) => *delay,
            WaitKind::Random(random) => random.sample(rng),
            WaitKind::Incrementing(inc) => inc.wait(previous_attempt, elapsed),
            WaitKind::Exponential(exp) => exp.wait(previous_attempt, elapsed),
            WaitKind::Custom(CustomWait(f)) => f(previous_attempt, elapsed),
        }
    }
}

impl WaitStrategy for Wait {
    fn wait(&self, previous_attempt: usize, elapsed: Duration) -> Duration {
        let mut rng = rng();
        self.wait_with_rng(&mut rng, previous_attempt, elapsed)
    }
}
