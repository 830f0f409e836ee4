//! Reject strategy: does this outcome warrant another attempt?
//!
//! Two predicates make up a [`Reject`]: one over captured errors and one over success values.
//! Exactly one of them runs per attempt, chosen by the attempt's outcome. Defaults retry every
//! error and accept every value.

use crate::attempt::Attempt;
use std::collections::HashSet;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

/// A boolean test over `X`: a fixed answer or a user-supplied function.
pub enum Predicate<X: ?Sized> {
    /// Always true.
    Always,
    /// Always false.
    Never,
    /// Delegate to a function.
    Custom(Arc<dyn Fn(&X) -> bool + Send + Sync>),
}

impl<X: ?Sized> Predicate<X> {
    /// Wrap a function as a predicate.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(&X) -> bool + Send + Sync + 'static,
    {
        Predicate::Custom(Arc::new(f))
    }

    /// Evaluate the predicate.
    pub fn test(&self, value: &X) -> bool {
        match self {
            Predicate::Always => true,
            Predicate::Never => false,
            Predicate::Custom(f) => f(value),
        }
    }
}

impl<X: ?Sized> Clone for Predicate<X> {
    fn clone(&self) -> Self {
        match self {
            Predicate::Always => Predicate::Always,
            Predicate::Never => Predicate::Never,
            Predicate::Custom(f) => Predicate::Custom(Arc::clone(f)),
        }
    }
}

impl<X: ?Sized> fmt::Debug for Predicate<X> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::Always => f.write_str("Always"),
            Predicate::Never => f.write_str("Never"),
            Predicate::Custom(_) => f.write_str("Custom(<predicate>)"),
        }
    }
}

/// Decides whether an attempt counts as retryable.
pub struct Reject<T, E> {
    on_error: Predicate<E>,
    on_result: Predicate<T>,
}

impl<T, E> Clone for Reject<T, E> {
    fn clone(&self) -> Self {
        Self { on_error: self.on_error.clone(), on_result: self.on_result.clone() }
    }
}

impl<T, E> fmt::Debug for Reject<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reject")
            .field("on_error", &self.on_error)
            .field("on_result", &self.on_result)
            .finish()
    }
}

impl<T, E> Default for Reject<T, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, E> Reject<T, E> {
    /// Retry on any error, accept any value.
    pub fn new() -> Self {
        Self { on_error: Predicate::Always, on_result: Predicate::Never }
    }

    /// Replace the error predicate.
    pub fn on_error(mut self, predicate: Predicate<E>) -> Self {
        self.on_error = predicate;
        self
    }

    /// Replace the result predicate.
    pub fn on_result(mut self, predicate: Predicate<T>) -> Self {
        self.on_result = predicate;
        self
    }

    /// Retry only errors whose category, as reported by `classify`, is in `kinds`.
    pub fn on_error_kinds<K, I, C>(self, kinds: I, classify: C) -> Self
    where
        K: Eq + Hash + Send + Sync + 'static,
        I: IntoIterator<Item = K>,
        C: Fn(&E) -> K + Send + Sync + 'static,
    {
        let kinds: HashSet<K> = kinds.into_iter().collect();
        self.on_error(Predicate::from_fn(move |e: &E| kinds.contains(&classify(e))))
    }

    /// True when the attempt should be retried.
    pub fn should_reject(&self, attempt: &Attempt<T, E>) -> bool {
        match attempt.outcome() {
            Err(e) => self.on_error.test(e),
            Ok(value) => self.on_result.test(value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn defaults_retry_errors_and_accept_values() {
        let reject: Reject<i32, String> = Reject::new();
        assert!(reject.should_reject(&Attempt::new(1, Err("boom".to_string()))));
        assert!(!reject.should_reject(&Attempt::new(1, Ok(0))));
        assert!(!reject.should_reject(&Attempt::new(9, Ok(-1))));
    }

    #[test]
    fn result_predicate_rejects_sentinel() {
        let reject: Reject<Option<u8>, io::Error> =
            Reject::new().on_result(Predicate::from_fn(|v: &Option<u8>| v.is_none()));
        assert!(reject.should_reject(&Attempt::new(1, Ok(None))));
        assert!(!reject.should_reject(&Attempt::new(1, Ok(Some(3)))));
    }

    #[test]
    fn only_one_predicate_runs_per_attempt() {
        let error_calls = Arc::new(AtomicUsize::new(0));
        let result_calls = Arc::new(AtomicUsize::new(0));
        let (ec, rc) = (error_calls.clone(), result_calls.clone());
        let reject: Reject<u8, u8> = Reject::new()
            .on_error(Predicate::from_fn(move |_| {
                ec.fetch_add(1, Ordering::SeqCst);
                true
            }))
            .on_result(Predicate::from_fn(move |_| {
                rc.fetch_add(1, Ordering::SeqCst);
                true
            }));

        reject.should_reject(&Attempt::new(1, Err(1)));
        assert_eq!(error_calls.load(Ordering::SeqCst), 1);
        assert_eq!(result_calls.load(Ordering::SeqCst), 0);

        reject.should_reject(&Attempt::new(2, Ok(1)));
        assert_eq!(error_calls.load(Ordering::SeqCst), 1);
        assert_eq!(result_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn error_kinds_membership() {
        let reject: Reject<(), io::Error> = Reject::new().on_error_kinds(
            [io::ErrorKind::TimedOut, io::ErrorKind::ConnectionReset],
            io::Error::kind,
        );
        let timed_out = Attempt::new(1, Err(io::Error::new(io::ErrorKind::TimedOut, "slow")));
        let denied =
            Attempt::new(1, Err(io::Error::new(io::ErrorKind::PermissionDenied, "nope")));
        assert!(reject.should_reject(&timed_out));
        assert!(!reject.should_reject(&denied));
    }

    #[test]
    fn never_error_predicate_accepts_failures() {
        let reject: Reject<u8, &str> = Reject::new().on_error(Predicate::Never);
        assert!(!reject.should_reject(&Attempt::new(1, Err("fatal"))));
    }
}
