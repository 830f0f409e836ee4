//! Minimal retry-only example.
use persevere::prelude::*;
use persevere::LogSink;
use std::time::Duration;

fn main() -> Result<(), ResilienceError<&'static str, std::io::Error>> {
    tracing_subscriber::fmt::init();

    let policy = RetryPolicy::builder()
        .stop(Stop::after_attempt(3))
        .wait(
            Wait::exponential(Duration::from_millis(200))
                .with_max(Duration::from_secs(2))
                .expect("valid wait cap"),
        )
        .wait_jitter_max(Duration::from_millis(50))
        .with_sink(LogSink)
        .build()
        .expect("valid retry policy");

    let mut calls = 0;
    let value = policy.execute(|| {
        calls += 1;
        if calls < 2 {
            Err(std::io::Error::new(std::io::ErrorKind::Interrupted, "flaky"))
        } else {
            // Replace with your real fallible work
            Ok("hello from retry")
        }
    })?;

    println!("{}", value);
    Ok(())
}
