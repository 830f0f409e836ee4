#![forbid(unsafe_code)]
#![deny(warnings)]
#![cfg_attr(not(test), deny(clippy::all))]

//! # Persevere
//!
//! A blocking retry controller: run an operation until its outcome is accepted or a stop
//! condition is reached, sleeping between attempts.
//!
//! ## Features
//!
//! - **Stop strategies**: after N attempts, after a delay, combinations, or never
//! - **Wait strategies**: none, fixed, random, incrementing, exponential, or a custom function
//! - **Jitter** added on top of any wait
//! - **Reject strategies** over both errors and successful values
//! - **Hooks and telemetry** for every decision the loop makes
//! - **Wrappers** binding a policy to a function, including the `retrying!` macro
//!
//! ## Quick Start
//!
//! ```rust
//! use persevere::{RetryPolicy, Stop, Wait, ResilienceError};
//! use std::time::Duration;
//!
//! let policy = RetryPolicy::<String, std::io::Error>::builder()
//!     .stop(Stop::after_attempt(3))
//!     .wait(Wait::exponential(Duration::from_millis(1)).with_max(Duration::from_millis(4))?)
//!     .wait_jitter_max(Duration::from_millis(2))
//!     .build()?;
//!
//! let result = policy.execute(|| {
//!     // Your fallible operation here
//!     Ok("done".to_string())
//! });
//! assert_eq!(result.unwrap(), "done");
//! # Ok::<(), persevere::ConfigError>(())
//! ```

pub mod attempt;
pub mod clock;
pub mod error;
pub mod jitter;
pub mod prelude;
pub mod reject;
pub mod retry;
pub mod sleeper;
pub mod stop;
pub mod telemetry;
pub mod wait;
pub mod wrap;

// Re-exports
pub use attempt::Attempt;
pub use clock::{Clock, ManualClock, MonotonicClock};
pub use error::{ConfigError, ResilienceError, RetryError};
pub use jitter::Jitter;
pub use reject::{Predicate, Reject};
pub use retry::{RetryPolicy, RetryPolicyBuilder};
pub use sleeper::{InstantSleeper, Sleeper, ThreadSleeper, TrackingSleeper};
pub use stop::{Stop, StopStrategy};
pub use telemetry::{LogSink, MemorySink, NullSink, RetryEvent, TelemetrySink};
pub use wait::{Wait, WaitStrategy, MAX_WAIT};
pub use wrap::{retry, Retryable};
