//! Abstraction for sleeping/waiting
//!
//! The controller blocks the calling thread between attempts. Swapping the sleeper enables
//! fast, deterministic tests without real time delays.

use crate::clock::ManualClock;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Abstraction for sleeping/waiting
pub trait Sleeper: Send + Sync + std::fmt::Debug {
    fn sleep(&self, duration: Duration);
}

/// Production sleeper: blocks the current thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        if !duration.is_zero() {
            std::thread::sleep(duration);
        }
    }
}

/// Test sleeper that doesn't actually sleep
#[derive(Debug, Default, Clone, Copy)]
pub struct InstantSleeper;

impl Sleeper for InstantSleeper {
    fn sleep(&self, _duration: Duration) {}
}

/// Test sleeper that tracks all sleep calls
///
/// When paired with a [`ManualClock`], each recorded sleep also advances the clock, so
/// time-based stop strategies can be exercised without waiting.
#[derive(Debug, Clone)]
pub struct TrackingSleeper {
    calls: Arc<Mutex<Vec<Duration>>>,
    clock: Option<ManualClock>,
}

impl TrackingSleeper {
    pub fn new() -> Self {
        Self { calls: Arc::new(Mutex::new(Vec::new())), clock: None }
    }

    /// Advance `clock` by every duration slept.
    pub fn with_clock(clock: ManualClock) -> Self {
        Self { calls: Arc::new(Mutex::new(Vec::new())), clock: Some(clock) }
    }

    pub fn calls(&self) -> usize {
        self.lock().len()
    }

    pub fn call_at(&self, idx: usize) -> Option<Duration> {
        self.lock().get(idx).copied()
    }

    pub fn durations(&self) -> Vec<Duration> {
        self.lock().clone()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Duration>> {
        self.calls.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for TrackingSleeper {
    fn default() -> Self {
        Self::new()
    }
}

impl Sleeper for TrackingSleeper {
    fn sleep(&self, duration: Duration) {
        self.lock().push(duration);
        if let Some(clock) = &self.clock {
            clock.advance(u64::try_from(duration.as_millis()).unwrap_or(u64::MAX));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::Clock;

    #[test]
    fn instant_sleeper_doesnt_sleep() {
        let sleeper = InstantSleeper;
        let start = std::time::Instant::now();
        sleeper.sleep(Duration::from_secs(10));
        let elapsed = start.elapsed();
        // Should complete almost instantly
        assert!(elapsed < Duration::from_millis(100));
    }

    #[test]
    fn tracking_sleeper_records_calls() {
        let sleeper = TrackingSleeper::new();

        sleeper.sleep(Duration::from_millis(100));
        sleeper.sleep(Duration::from_millis(200));
        sleeper.sleep(Duration::from_millis(400));

        assert_eq!(sleeper.calls(), 3);
        assert_eq!(sleeper.call_at(0), Some(Duration::from_millis(100)));
        assert_eq!(sleeper.call_at(1), Some(Duration::from_millis(200)));
        assert_eq!(sleeper.call_at(2), Some(Duration::from_millis(400)));
        assert_eq!(sleeper.call_at(3), None);
    }

    #[test]
    fn tracking_sleeper_can_clear() {
        let sleeper = TrackingSleeper::new();

        sleeper.sleep(Duration::from_millis(100));
        assert_eq!(sleeper.calls(), 1);

        sleeper.clear();
        assert_eq!(sleeper.calls(), 0);

        sleeper.sleep(Duration::from_millis(200));
        assert_eq!(sleeper.durations(), vec![Duration::from_millis(200)]);
    }

    #[test]
    fn tracking_sleeper_advances_manual_clock() {
        let clock = ManualClock::new();
        let sleeper = TrackingSleeper::with_clock(clock.clone());
        sleeper.sleep(Duration::from_millis(150));
        sleeper.sleep(Duration::from_millis(50));
        assert_eq!(clock.now_millis(), 200);
    }

    #[test]
    fn thread_sleeper_actually_sleeps() {
        let sleeper = ThreadSleeper;
        let start = std::time::Instant::now();
        sleeper.sleep(Duration::from_millis(50));
        let elapsed = start.elapsed();
        // Should take at least the requested duration
        assert!(elapsed >= Duration::from_millis(45)); // Small tolerance for timing jitter
    }
}
