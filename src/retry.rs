//! Retry controller
//!
//! Blocking retry loop for fallible operations.
//!
//! Semantics, per attempt (numbers start at 1):
//! 1. the `before_attempt` hook sees the attempt number;
//! 2. the operation runs and its `Result` becomes an [`Attempt`];
//! 3. the reject strategy judges the attempt. An accepted value is returned; an accepted error
//!    is returned unchanged as `ResilienceError::Inner`;
//! 4. the `after_attempt` hook sees the number of the rejected attempt;
//! 5. the stop strategy sees `(attempt, elapsed)`. On give-up the last error is returned as
//!    `Inner` unless `wrap_errors` is set, or the last attempt was a rejected value; both of
//!    those cases produce `ResilienceError::RetryExhausted` holding the attempt;
//! 6. otherwise the wait strategy plus jitter gives the delay, the sleeper blocks for it, and
//!    the loop goes round again.
//!
//! Invariants:
//! - Attempts are strictly sequential and no state survives between `execute` calls.
//! - Only the final attempt is ever surfaced; every earlier rejected outcome is dropped.
//! - `Stop::Never` (the default) retries until an attempt is accepted.
//!
//! Example
//! ```rust
//! use std::time::Duration;
//! use persevere::{RetryPolicy, ResilienceError, Stop, Wait, InstantSleeper};
//!
//! let policy = RetryPolicy::<u32, std::io::Error>::builder()
//!     .stop(Stop::after_attempt(3))
//!     .wait(Wait::fixed(Duration::from_millis(100)))
//!     .with_sleeper(InstantSleeper)
//!     .build()
//!     .unwrap();
//! let mut calls = 0;
//! let result = policy.execute(|| {
//!     calls += 1;
//!     Err(std::io::Error::new(std::io::ErrorKind::Other, "oops"))
//! });
//! assert!(matches!(result, Err(ResilienceError::Inner(_))));
//! assert_eq!(calls, 3);
//! ```

use crate::attempt::Attempt;
use crate::clock::{Clock, MonotonicClock};
use crate::error::{ConfigError, ResilienceError, RetryError};
use crate::jitter::Jitter;
use crate::reject::{Predicate, Reject};
use crate::sleeper::{Sleeper, ThreadSleeper};
use crate::stop::{Stop, StopStrategy};
use crate::telemetry::{NullSink, RetryEvent, TelemetrySink};
use crate::wait::{Wait, WaitStrategy};
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

type Hook = Arc<dyn Fn(usize) + Send + Sync>;

fn clamp_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Retry controller combining stop, wait, jitter and reject strategies.
pub struct RetryPolicy<T, E> {
    stop: Stop,
    wait: Wait,
    jitter: Jitter,
    reject: Reject<T, E>,
    wrap_errors: bool,
    before_attempt: Option<Hook>,
    after_attempt: Option<Hook>,
    sleeper: Arc<dyn Sleeper>,
    clock: Arc<dyn Clock>,
    sink: Arc<dyn TelemetrySink>,
}

impl<T, E> Clone for RetryPolicy<T, E> {
    fn clone(&self) -> Self {
        Self {
            stop: self.stop.clone(),
            wait: self.wait.clone(),
            jitter: self.jitter,
            reject: self.reject.clone(),
            wrap_errors: self.wrap_errors,
            before_attempt: self.before_attempt.clone(),
            after_attempt: self.after_attempt.clone(),
            sleeper: self.sleeper.clone(),
            clock: self.clock.clone(),
            sink: self.sink.clone(),
        }
    }
}

impl<T, E> std::fmt::Debug for RetryPolicy<T, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetryPolicy")
            .field("stop", &self.stop)
            .field("wait", &self.wait)
            .field("jitter", &self.jitter)
            .field("reject", &self.reject)
            .field("wrap_errors", &self.wrap_errors)
            .field("before_attempt", &self.before_attempt.as_ref().map(|_| "<hook>"))
            .field("after_attempt", &self.after_attempt.as_ref().map(|_| "<hook>"))
            .field("sleeper", &self.sleeper)
            .field("clock", &self.clock)
            .field("sink", &self.sink)
            .finish()
    }
}

impl<T, E> RetryPolicy<T, E> {
    /// Construct a new builder with defaults.
    pub fn builder() -> RetryPolicyBuilder<T, E> {
        RetryPolicyBuilder::new()
    }

    /// Run `operation` until an attempt is accepted or the stop strategy gives up.
    pub fn execute<Op>(&self, mut operation: Op) -> Result<T, ResilienceError<T, E>>
    where
        Op: FnMut() -> Result<T, E>,
    {
        let start = self.clock.now_millis();
        let mut attempt_number: usize = 1;

        loop {
            if let Some(hook) = &self.before_attempt {
                hook(attempt_number);
            }

            let attempt = Attempt::new(attempt_number, operation());

            if !self.reject.should_reject(&attempt) {
                return self.accept(attempt, start);
            }

            if let Some(hook) = &self.after_attempt {
                hook(attempt_number);
            }

            let elapsed = self.elapsed_since(start);
            if self.stop.should_stop(attempt_number, elapsed) {
                return Err(self.give_up(attempt, elapsed));
            }

            let delay = self.jitter.apply(self.wait.wait(attempt_number, elapsed));
            tracing::debug!(
                attempt = attempt_number,
                failed = attempt.is_failure(),
                elapsed_ms = clamp_millis(elapsed),
                delay_ms = clamp_millis(delay),
                "attempt rejected; retrying"
            );
            self.sink.emit(&RetryEvent::Attempt { attempt: attempt_number, delay });

            self.sleeper.sleep(delay);
            attempt_number = attempt_number.saturating_add(1);
        }
    }

    /// Run `f` with `args` threaded through unchanged on every attempt.
    pub fn call<A, F>(&self, mut f: F, args: &A) -> Result<T, ResilienceError<T, E>>
    where
        A: ?Sized,
        F: FnMut(&A) -> Result<T, E>,
    {
        self.execute(|| f(args))
    }

    /// Whether give-up always produces `RetryExhausted`.
    pub fn wraps_errors(&self) -> bool {
        self.wrap_errors
    }

    /// The configured stop strategy.
    pub fn stop_strategy(&self) -> &Stop {
        &self.stop
    }

    fn elapsed_since(&self, start: u64) -> Duration {
        Duration::from_millis(self.clock.now_millis().saturating_sub(start))
    }

    fn accept(&self, attempt: Attempt<T, E>, start: u64) -> Result<T, ResilienceError<T, E>> {
        let (number, outcome) = attempt.into_parts();
        match outcome {
            Ok(value) => {
                tracing::trace!(attempt = number, "attempt accepted");
                self.sink.emit(&RetryEvent::Succeeded {
                    attempts: number,
                    total_duration: self.elapsed_since(start),
                });
                Ok(value)
            }
            outcome => {
                tracing::debug!(attempt = number, "error not retryable; returning it");
                self.sink.emit(&RetryEvent::NonRetryable { attempt: number });
                match outcome {
                    Err(e) if !self.wrap_errors => Err(ResilienceError::Inner(e)),
                    outcome => Err(ResilienceError::RetryExhausted(RetryError::new(
                        Attempt::new(number, outcome),
                    ))),
                }
            }
        }
    }

    fn give_up(&self, attempt: Attempt<T, E>, elapsed: Duration) -> ResilienceError<T, E> {
        let (number, outcome) = attempt.into_parts();
        tracing::warn!(
            attempts = number,
            last_failed = outcome.is_err(),
            elapsed_ms = clamp_millis(elapsed),
            "retry exhausted"
        );
        self.sink.emit(&RetryEvent::Exhausted { total_attempts: number, total_duration: elapsed });
        match outcome {
            Err(e) if !self.wrap_errors => ResilienceError::Inner(e),
            // a rejected value has no original error to hand back, so it is always wrapped
            outcome => {
                ResilienceError::RetryExhausted(RetryError::new(Attempt::new(number, outcome)))
            }
        }
    }
}

/// Builder for `RetryPolicy`.
///
/// Defaults: never stop, no wait, no jitter, retry every error, accept every value, return the
/// original error on give-up, block with `ThreadSleeper`, measure with `MonotonicClock`,
/// discard telemetry.
pub struct RetryPolicyBuilder<T, E> {
    stop: Stop,
    wait: Wait,
    jitter: Jitter,
    reject: Reject<T, E>,
    wrap_errors: bool,
    before_attempt: Option<Hook>,
    after_attempt: Option<Hook>,
    sleeper: Arc<dyn Sleeper>,
    clock: Arc<dyn Clock>,
    sink: Arc<dyn TelemetrySink>,
}

impl<T, E> RetryPolicyBuilder<T, E> {
    /// Create a builder with the defaults listed on the type.
    pub fn new() -> Self {
        Self {
            stop: Stop::Never,
            wait: Wait::none(),
            jitter: Jitter::None,
            reject: Reject::new(),
            wrap_errors: false,
            before_attempt: None,
            after_attempt: None,
            sleeper: Arc::new(ThreadSleeper),
            clock: Arc::new(MonotonicClock::default()),
            sink: Arc::new(NullSink),
        }
    }

    /// Set the stop strategy.
    pub fn stop(mut self, stop: Stop) -> Self {
        self.stop = stop;
        self
    }

    /// Set the wait strategy.
    pub fn wait(mut self, wait: Wait) -> Self {
        self.wait = wait;
        self
    }

    /// Set jitter strategy.
    pub fn with_jitter(mut self, jitter: Jitter) -> Self {
        self.jitter = jitter;
        self
    }

    /// Add a uniformly random `[0, max)` to every computed wait.
    pub fn wait_jitter_max(self, max: Duration) -> Self {
        self.with_jitter(Jitter::additive(max))
    }

    /// Retry an error only when `predicate` returns true.
    pub fn retry_on_error<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&E) -> bool + Send + Sync + 'static,
    {
        self.reject = self.reject.on_error(Predicate::from_fn(predicate));
        self
    }

    /// Retry an error only when its category is one of `kinds`.
    pub fn retry_on_error_kinds<K, I, C>(mut self, kinds: I, classify: C) -> Self
    where
        K: Eq + Hash + Send + Sync + 'static,
        I: IntoIterator<Item = K>,
        C: Fn(&E) -> K + Send + Sync + 'static,
    {
        self.reject = self.reject.on_error_kinds(kinds, classify);
        self
    }

    /// Retry a successful value when `predicate` returns true.
    pub fn retry_on_result<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.reject = self.reject.on_result(Predicate::from_fn(predicate));
        self
    }

    /// Replace the whole reject strategy.
    pub fn reject(mut self, reject: Reject<T, E>) -> Self {
        self.reject = reject;
        self
    }

    /// Always surface give-up as `RetryExhausted`, even when the last attempt failed.
    pub fn wrap_errors(mut self, wrap: bool) -> Self {
        self.wrap_errors = wrap;
        self
    }

    /// Hook run before every attempt with its number.
    pub fn before_attempt<F>(mut self, hook: F) -> Self
    where
        F: Fn(usize) + Send + Sync + 'static,
    {
        self.before_attempt = Some(Arc::new(hook));
        self
    }

    /// Hook run after every rejected attempt with its number.
    pub fn after_attempt<F>(mut self, hook: F) -> Self
    where
        F: Fn(usize) + Send + Sync + 'static,
    {
        self.after_attempt = Some(Arc::new(hook));
        self
    }

    /// Provide a custom sleeper implementation.
    pub fn with_sleeper<S>(mut self, sleeper: S) -> Self
    where
        S: Sleeper + 'static,
    {
        self.sleeper = Arc::new(sleeper);
        self
    }

    /// Provide a custom clock implementation.
    pub fn with_clock<C>(mut self, clock: C) -> Self
    where
        C: Clock + 'static,
    {
        self.clock = Arc::new(clock);
        self
    }

    /// Send retry events to `sink`.
    pub fn with_sink<S>(mut self, sink: S) -> Self
    where
        S: TelemetrySink + 'static,
    {
        self.sink = Arc::new(sink);
        self
    }

    /// Build the retry policy, validating inputs.
    pub fn build(self) -> Result<RetryPolicy<T, E>, ConfigError> {
        self.stop.validate()?;
        Ok(self.into_policy())
    }

    fn into_policy(self) -> RetryPolicy<T, E> {
        RetryPolicy {
            stop: self.stop,
            wait: self.wait,
            jitter: self.jitter,
            reject: self.reject,
            wrap_errors: self.wrap_errors,
            before_attempt: self.before_attempt,
            after_attempt: self.after_attempt,
            sleeper: self.sleeper,
            clock: self.clock,
            sink: self.sink,
        }
    }
}

impl<T, E> Default for RetryPolicy<T, E> {
    /// The builder defaults, which always validate.
    fn default() -> Self {
        RetryPolicyBuilder::new().into_policy()
    }
}

impl<T, E> Default for RetryPolicyBuilder<T, E> {
    fn default() -> Self {
        Self::new()
    }
}
