//! Stop strategies: when to give up.
//!
//! A stop strategy is consulted after every rejected attempt with the 1-based number of that
//! attempt and the time elapsed since `execute` began. Returning `true` ends the sequence.
//!
//! "Retry forever" is spelled [`Stop::Never`]. It is the builder default, so an unbounded policy
//! is always a visible choice in `Debug` output rather than a missing value.
//!
//! `AfterDelay` is advisory: it is checked between attempts and cannot interrupt an attempt
//! that is already running.

use crate::error::ConfigError;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Trait implemented by all stop strategies.
pub trait StopStrategy: Send + Sync + fmt::Debug {
    fn should_stop(&self, previous_attempt: usize, elapsed: Duration) -> bool;
}

type StopFn = dyn Fn(usize, Duration) -> bool + Send + Sync;

/// When the retry loop should give up.
#[derive(Clone, Default)]
pub enum Stop {
    /// Never give up.
    #[default]
    Never,
    /// Give up once `previous_attempt >= n`.
    AfterAttempt(usize),
    /// Give up once `elapsed >= delay`.
    AfterDelay(Duration),
    /// Give up when any of the inner strategies would.
    Any(Vec<Stop>),
    /// Give up only when all of the inner strategies would.
    All(Vec<Stop>),
    /// User-supplied predicate.
    Custom(Arc<StopFn>),
}

impl fmt::Debug for Stop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stop::Never => f.write_str("Never"),
            Stop::AfterAttempt(n) => f.debug_tuple("AfterAttempt").field(n).finish(),
            Stop::AfterDelay(d) => f.debug_tuple("AfterDelay").field(d).finish(),
            Stop::Any(inner) => f.debug_tuple("Any").field(inner).finish(),
            Stop::All(inner) => f.debug_tuple("All").field(inner).finish(),
            Stop::Custom(_) => f.write_str("Custom(<predicate>)"),
        }
    }
}

impl Stop {
    /// Retry without an upper bound.
    pub fn never() -> Self {
        Stop::Never
    }

    /// Stop after `max_attempts` total attempts (initial call included).
    pub fn after_attempt(max_attempts: usize) -> Self {
        Stop::AfterAttempt(max_attempts)
    }

    /// Stop once `max_delay` has passed since the first attempt started.
    pub fn after_delay(max_delay: Duration) -> Self {
        Stop::AfterDelay(max_delay)
    }

    /// Stop when `f(previous_attempt, elapsed)` returns true.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(usize, Duration) -> bool + Send + Sync + 'static,
    {
        Stop::Custom(Arc::new(f))
    }

    /// Stop when either `self` or `other` would.
    pub fn or(self, other: Stop) -> Self {
        match self {
            Stop::Any(mut inner) => {
                inner.push(other);
                Stop::Any(inner)
            }
            this => Stop::Any(vec![this, other]),
        }
    }

    /// Stop only when both `self` and `other` would.
    pub fn and(self, other: Stop) -> Self {
        match self {
            Stop::All(mut inner) => {
                inner.push(other);
                Stop::All(inner)
            }
            this => Stop::All(vec![this, other]),
        }
    }

    /// True when this strategy can never signal give-up on its own.
    pub fn is_unbounded(&self) -> bool {
        match self {
            Stop::Never => true,
            Stop::Any(inner) => inner.iter().all(Stop::is_unbounded),
            Stop::All(inner) => inner.is_empty() || inner.iter().any(Stop::is_unbounded),
            _ => false,
        }
    }

    /// Reject `AfterAttempt(0)` and empty combinations anywhere in the tree.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self {
            Stop::AfterAttempt(0) => Err(ConfigError::ZeroAttempts),
            Stop::Any(inner) | Stop::All(inner) if inner.is_empty() => {
                Err(ConfigError::EmptyStopCombination)
            }
            Stop::Any(inner) | Stop::All(inner) => inner.iter().try_for_each(Stop::validate),
            _ => Ok(()),
        }
    }
}

impl StopStrategy for Stop {
    fn should_stop(&self, previous_attempt: usize, elapsed: Duration) -> bool {
        match self {
            Stop::Never => false,
            Stop::AfterAttempt(max) => previous_attempt >= *max,
            Stop::AfterDelay(max) => elapsed >= *max,
            Stop::Any(inner) => inner.iter().any(|s| s.should_stop(previous_attempt, elapsed)),
            Stop::All(inner) => {
                !inner.is_empty() && inner.iter().all(|s| s.should_stop(previous_attempt, elapsed))
            }
            Stop::Custom(f) => f(previous_attempt, elapsed),
        }
    }
}
