use criterion::{black_box, criterion_group, criterion_main, Criterion};
use persevere::{InstantSleeper, Jitter, RetryPolicy, Stop, Wait};
use std::time::Duration;

fn bench_retry_loop(c: &mut Criterion) {
    let mut group = c.benchmark_group("retry_loop");

    let immediate = RetryPolicy::<u64, &'static str>::builder()
        .stop(Stop::after_attempt(3))
        .with_sleeper(InstantSleeper)
        .build()
        .unwrap();
    group.bench_function("accepted_first_attempt", |b| {
        b.iter(|| black_box(immediate.execute(|| Ok(black_box(42)))))
    });

    let exhausting = RetryPolicy::<u64, &'static str>::builder()
        .stop(Stop::after_attempt(10))
        .wait(Wait::exponential(Duration::from_millis(1)))
        .with_jitter(Jitter::additive(Duration::from_millis(1)))
        .with_sleeper(InstantSleeper)
        .build()
        .unwrap();
    group.bench_function("exhausts_after_ten_attempts", |b| {
        b.iter(|| black_box(exhausting.execute(|| Err(black_box("down")))))
    });

    group.finish();
}

criterion_group!(benches, bench_retry_loop);
criterion_main!(benches);
