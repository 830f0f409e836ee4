//! Error types for retry policies
use crate::attempt::Attempt;
use std::fmt;
use std::time::Duration;
/// Invalid strategy parameters. Raised eagerly at construction time and never retried.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// `Wait::random` was given a lower bound above its upper bound.
    #[error("random wait: min ({min:?}) must not exceed max ({max:?})")]
    InvalidRandomRange { min: Duration, max: Duration },
    /// `with_max` was called on a strategy that has no growth to cap.
    #[error("with_max is only valid for incrementing or exponential waits (got {strategy})")]
    MaxNotSupported { strategy: &'static str },
    /// `Stop::after_attempt(0)` would stop before the first attempt is judged.
    #[error("stop after attempt must be > 0")]
    ZeroAttempts,
    /// `Stop::Any` or `Stop::All` with no members would never stop.
    #[error("stop combination must have at least one member")]
    EmptyStopCombination,
    /// An exponential base of zero never grows.
    #[error("exponential base must be > 0")]
    ZeroExponentBase,
}
/// Terminal error: the last rejected attempt, kept when the stop strategy gives up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryError<T, E> {
    last_attempt: Attempt<T, E>,
}
impl<T, E> RetryError<T, E> {
    /// Take ownership of the final attempt.
    pub fn new(last_attempt: Attempt<T, E>) -> Self {
        Self { last_attempt }
    }
    /// Number of attempts made before giving up.
    pub fn attempts(&self) -> usize {
        self.last_attempt.number()
    }
    /// Borrow the final attempt.
    pub fn last_attempt(&self) -> &Attempt<T, E> {
        &self.last_attempt
    }
    /// Consume the error, yielding the final attempt.
    pub fn into_last_attempt(self) -> Attempt<T, E> {
        self.last_attempt
    }
    /// The captured error of the final attempt, if it failed.
    pub fn last_error(&self) -> Option<&E> {
        self.last_attempt.error()
    }
}
impl<T: fmt::Debug, E: fmt::Display> fmt::Display for RetryError<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.last_attempt.outcome() {
            Err(e) => {
                write!(f, "retry exhausted after {} attempts; last error: {}", self.attempts(), e)
            }
            Ok(value) => write!(
                f,
                "retry exhausted after {} attempts; last result was rejected: {:?}",
                self.attempts(),
                value
            ),
        }
    }
}
impl<T: fmt::Debug, E: std::error::Error + 'static> std::error::Error for RetryError<T, E> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.last_attempt.error().map(|e| e as &dyn std::error::Error)
    }
}
/// Everything `RetryPolicy::execute` can surface to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResilienceError<T, E> {
    /// The original captured error, unchanged: either an accepted failure or the last failure
    /// of an exhausted sequence when errors are not wrapped.
    Inner(E),
    /// The stop strategy gave up; the final attempt is kept for inspection.
    RetryExhausted(RetryError<T, E>),
    /// The policy could not be built. Only per-call wrappers produce this.
    InvalidConfig(ConfigError),
}
impl<T: fmt::Debug, E: fmt::Display> fmt::Display for ResilienceError<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inner(e) => write!(f, "{}", e),
            Self::RetryExhausted(err) => write!(f, "{}", err),
            Self::InvalidConfig(err) => write!(f, "invalid retry configuration: {}", err),
        }
    }
}
impl<T: fmt::Debug, E: std::error::Error + 'static> std::error::Error for ResilienceError<T, E> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Inner(e) => Some(e),
            Self::RetryExhausted(err) => err.last_error().map(|e| e as &dyn std::error::Error),
            Self::InvalidConfig(err) => Some(err),
        }
    }
}
impl<T, E> From<ConfigError> for ResilienceError<T, E> {
    fn from(err: ConfigError) -> Self {
        Self::InvalidConfig(err)
    }
}
impl<T, E> ResilienceError<T, E> {
    /// Check if this error is due to retry exhaustion
    pub fn is_retry_exhausted(&self) -> bool {
        matches!(self, Self::RetryExhausted(_))
    }
    /// Check if this error wraps an inner error.
    pub fn is_inner(&self) -> bool {
        matches!(self, Self::Inner(_))
    }
    /// Check if this error is a configuration failure.
    pub fn is_invalid_config(&self) -> bool {
        matches!(self, Self::InvalidConfig(_))
    }
    /// Get the inner error if this is an Inner variant
    pub fn into_inner(self) -> Option<E> {
        match self {
            Self::Inner(e) => Some(e),
            _ => None,
        }
    }
    /// Borrow the inner error if present.
    pub fn as_inner(&self) -> Option<&E> {
        match self {
            Self::Inner(e) => Some(e),
            _ => None,
        }
    }
    /// Borrow the final attempt of an exhausted sequence.
    pub fn last_attempt(&self) -> Option<&Attempt<T, E>> {
        match self {
            Self::RetryExhausted(err) => Some(err.last_attempt()),
            _ => None,
        }
    }
    /// Access retry exhaustion info as (attempts, last_attempt_failed).
    pub fn retry_exhausted_info(&self) -> Option<(usize, bool)> {
        match self {
            Self::RetryExhausted(err) => Some((err.attempts(), err.last_attempt().is_failure())),
            _ => None,
        }
    }
}
