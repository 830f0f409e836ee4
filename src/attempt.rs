//! A single invocation of a retried operation.
//!
//! An `Attempt` is built fresh after every call and is read-only from then on. The controller
//! drops it once a decision has been made, except for the final rejected attempt, which moves
//! into [`RetryError`](crate::RetryError) when the policy gives up.

use std::fmt;

/// Outcome of one invocation plus its 1-based position in the retry sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attempt<T, E> {
    number: usize,
    outcome: Result<T, E>,
}

impl<T, E> Attempt<T, E> {
    /// Record the outcome of attempt `number` (1-based).
    pub fn new(number: usize, outcome: Result<T, E>) -> Self {
        debug_assert!(number >= 1, "attempt numbers are 1-based");
        Self { number, outcome }
    }

    /// Ordinal of this attempt, starting at 1.
    pub fn number(&self) -> usize {
        self.number
    }

    /// Borrow the captured outcome.
    pub fn outcome(&self) -> &Result<T, E> {
        &self.outcome
    }

    /// True when the operation returned an error.
    pub fn is_failure(&self) -> bool {
        self.outcome.is_err()
    }

    /// The success value, if any.
    pub fn value(&self) -> Option<&T> {
        self.outcome.as_ref().ok()
    }

    /// The captured error, if any.
    pub fn error(&self) -> Option<&E> {
        self.outcome.as_ref().err()
    }

    /// Consume the attempt, yielding the original outcome unchanged.
    pub fn into_result(self) -> Result<T, E> {
        self.outcome
    }

    /// Consume the attempt, yielding its number and outcome.
    pub fn into_parts(self) -> (usize, Result<T, E>) {
        (self.number, self.outcome)
    }
}

impl<T: fmt::Debug, E: fmt::Debug> fmt::Display for Attempt<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            Ok(value) => write!(f, "Attempts: {}, Value: {:?}", self.number, value),
            Err(error) => write!(f, "Attempts: {}, Error: {:?}", self.number, error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_attempt_exposes_value_only() {
        let attempt: Attempt<u32, &str> = Attempt::new(2, Ok(7));
        assert_eq!(attempt.number(), 2);
        assert!(!attempt.is_failure());
        assert_eq!(attempt.value(), Some(&7));
        assert!(attempt.error().is_none());
        assert_eq!(attempt.into_result(), Ok(7));
    }

    #[test]
    fn failure_attempt_keeps_original_error() {
        let attempt: Attempt<u32, std::io::Error> =
            Attempt::new(1, Err(std::io::Error::new(std::io::ErrorKind::TimedOut, "slow")));
        assert!(attempt.is_failure());
        assert!(attempt.value().is_none());
        let (number, outcome) = attempt.into_parts();
        assert_eq!(number, 1);
        let err = outcome.unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::TimedOut);
        assert_eq!(err.to_string(), "slow");
    }

    #[test]
    fn display_mentions_number_and_outcome() {
        let ok: Attempt<&str, &str> = Attempt::new(3, Ok("ready"));
        assert_eq!(ok.to_string(), "Attempts: 3, Value: \"ready\"");
        let err: Attempt<&str, &str> = Attempt::new(4, Err("boom"));
        assert_eq!(err.to_string(), "Attempts: 4, Error: \"boom\"");
    }
}
