//! Telemetry for retry policies.
//!
//! The controller reports what it decided through a [`TelemetrySink`]. Sinks are best effort:
//! `emit` cannot fail and must not block for long, since it runs on the retrying thread.
//!
//! # Event Types
//!
//! - `Attempt`: an attempt was rejected and a retry is scheduled after `delay`
//! - `Succeeded`: a value was accepted
//! - `NonRetryable`: an error was accepted and is returned unchanged
//! - `Exhausted`: the stop strategy gave up
//!
//! ```rust
//! use persevere::telemetry::{MemorySink, RetryEvent, TelemetrySink};
//! use std::time::Duration;
//!
//! let sink = MemorySink::with_capacity(16);
//! sink.emit(&RetryEvent::Attempt { attempt: 1, delay: Duration::from_millis(100) });
//! assert_eq!(sink.len(), 1);
//! ```

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Events emitted by retry policies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryEvent {
    /// A retry is about to be made.
    ///
    /// Emitted before sleeping, after the stop strategy allowed another attempt.
    Attempt {
        /// The number of the attempt that was just rejected (1-indexed)
        attempt: usize,
        /// The delay before the next attempt, jitter included
        delay: Duration,
    },
    /// An attempt produced an accepted value.
    Succeeded {
        /// Total number of attempts made
        attempts: usize,
        /// Time from the start of `execute` to acceptance
        total_duration: Duration,
    },
    /// An attempt failed with an error the reject strategy does not retry.
    NonRetryable {
        /// The attempt that failed
        attempt: usize,
    },
    /// The stop strategy gave up.
    Exhausted {
        /// Total number of attempts made
        total_attempts: usize,
        /// Total time spent retrying
        total_duration: Duration,
    },
}

impl fmt::Display for RetryEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RetryEvent::Attempt { attempt, delay } => {
                write!(f, "Attempt(#{}, delay={:?})", attempt, delay)
            }
            RetryEvent::Succeeded { attempts, total_duration } => {
                write!(f, "Succeeded(attempts={}, duration={:?})", attempts, total_duration)
            }
            RetryEvent::NonRetryable { attempt } => write!(f, "NonRetryable(#{})", attempt),
            RetryEvent::Exhausted { total_attempts, total_duration } => {
                write!(f, "Exhausted(attempts={}, duration={:?})", total_attempts, total_duration)
            }
        }
    }
}

/// A telemetry sink that consumes retry events.
pub trait TelemetrySink: Send + Sync + fmt::Debug {
    fn emit(&self, event: &RetryEvent);
}

/// A no-op telemetry sink that discards all events.
#[derive(Clone, Debug, Default)]
pub struct NullSink;

impl TelemetrySink for NullSink {
    fn emit(&self, _event: &RetryEvent) {}
}

/// A telemetry sink that logs events using the `tracing` crate.
#[derive(Clone, Debug, Default)]
pub struct LogSink;

impl TelemetrySink for LogSink {
    fn emit(&self, event: &RetryEvent) {
        tracing::info!(event = %event, "retry_event");
    }
}

/// A telemetry sink that stores events in memory.
///
/// Once `capacity` is reached the oldest event is dropped and counted in `evicted`.
#[derive(Clone, Debug)]
pub struct MemorySink {
    events: Arc<Mutex<Vec<RetryEvent>>>,
    capacity: usize,
    evicted: Arc<AtomicU64>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::with_capacity(10_000)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            events: Arc::new(Mutex::new(Vec::new())),
            capacity: capacity.max(1),
            evicted: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn events(&self) -> Vec<RetryEvent> {
        self.lock().clone()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn evicted(&self) -> u64 {
        self.evicted.load(Ordering::Relaxed)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<RetryEvent>> {
        self.events.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for MemorySink {
    fn default() -> Self {
        Self::new()
    }
}

impl TelemetrySink for MemorySink {
    fn emit(&self, event: &RetryEvent) {
        let mut guard = self.lock();
        if guard.len() >= self.capacity {
            guard.remove(0);
            self.evicted.fetch_add(1, Ordering::Relaxed);
        }
        guard.push(event.clone());
    }
}

#[cfg_attr(not(feature = "telemetry-json"), allow(dead_code))]
#[inline]
fn clamp_u64(val: u128) -> u64 {
    val.min(u128::from(u64::MAX)) as u64
}

/// Convert a RetryEvent into a JSON value for sinks.
#[cfg(feature = "telemetry-json")]
pub fn event_to_json(event: &RetryEvent) -> serde_json::Value {
    use serde_json::json;

    match event {
        RetryEvent::Attempt { attempt, delay } => json!({
            "kind": "retry_attempt",
            "attempt": *attempt,
            "delay_ms": clamp_u64(delay.as_millis()),
        }),
        RetryEvent::Succeeded { attempts, total_duration } => json!({
            "kind": "retry_succeeded",
            "attempts": *attempts,
            "duration_ms": clamp_u64(total_duration.as_millis()),
        }),
        RetryEvent::NonRetryable { attempt } => json!({
            "kind": "retry_non_retryable",
            "attempt": *attempt,
        }),
        RetryEvent::Exhausted { total_attempts, total_duration } => json!({
            "kind": "retry_exhausted",
            "attempts": *total_attempts,
            "duration_ms": clamp_u64(total_duration.as_millis()),
        }),
    }
}


#[cfg(all(test, feature = "telemetry-json"))]
mod json_tests {
    use super::*;

    #[test]
    fn retry_attempt_json() {
        let v = event_to_json(&RetryEvent::Attempt {
            attempt: 3,
            delay: Duration::from_millis(150),
        });
        assert_eq!(v["kind"], "retry_attempt");
        assert_eq!(v["attempt"], 3);
        assert_eq!(v["delay_ms"], 150);
    }

    #[test]
    fn retry_exhausted_json() {
        let v = event_to_json(&RetryEvent::Exhausted {
            total_attempts: 5,
            total_duration: Duration::from_millis(1200),
        });
        assert_eq!(v["kind"], "retry_exhausted");
        assert_eq!(v["attempts"], 5);
        assert_eq!(v["duration_ms"], 1200);
    }
}
