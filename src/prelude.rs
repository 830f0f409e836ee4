//! Convenient re-exports for common Persevere types.
pub use crate::{
    attempt::Attempt,
    error::{ConfigError, ResilienceError, RetryError},
    jitter::Jitter,
    reject::{Predicate, Reject},
    retry::{RetryPolicy, RetryPolicyBuilder},
    retrying,
    stop::{Stop, StopStrategy},
    wait::{Wait, WaitStrategy, MAX_WAIT},
    wrap::{retry, Retryable},
};
