//! Compile-time prelude coverage test.
use persevere::prelude::*;
use std::time::Duration;

#[test]
fn prelude_reexports_core_types() {
    let _jitter = Jitter::additive(Duration::from_millis(5));
    let _reject: Reject<u8, std::io::Error> = Reject::new().on_result(Predicate::Never);
    let policy: RetryPolicy<u8, std::io::Error> = RetryPolicy::builder()
        .stop(Stop::after_attempt(1).or(Stop::after_delay(Duration::from_secs(1))))
        .wait(Wait::fixed(Duration::ZERO))
        .build()
        .expect("valid policy");

    let wrapped: Retryable<_, u8, std::io::Error> = policy.wrap(|| Ok(1));
    assert_eq!(wrapped.run().ok(), Some(1));
    assert!(MAX_WAIT > Duration::ZERO);
}
