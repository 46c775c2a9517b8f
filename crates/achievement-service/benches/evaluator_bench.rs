//! 徽章评估性能基准测试
//!
//! 测试覆盖：
//! - 不同天数下的连续发帖计算
//! - 内存存储上的单用户全量规则评估

use std::collections::BTreeSet;
use std::hint::black_box;

use achievement::{BadgeCatalog, InMemoryStore, evaluate_user, rules::longest_streak};
use chrono::{Duration, NaiveDate, TimeZone, Utc};
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};

/// 生成日期集合，每 `gap_every` 天空一天
fn create_dates(count: usize, gap_every: usize) -> BTreeSet<NaiveDate> {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    (0..count)
        .filter(|i| gap_every == 0 || i % gap_every != gap_every - 1)
        .map(|i| start + Duration::days(i as i64))
        .collect()
}

fn bench_longest_streak(c: &mut Criterion) {
    let mut group = c.benchmark_group("longest_streak");

    for days in [10usize, 100, 1000] {
        let dates = create_dates(days, 7);
        group.throughput(Throughput::Elements(dates.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(days), &dates, |b, dates| {
            b.iter(|| longest_streak(black_box(dates)))
        });
    }

    group.finish();
}

fn bench_evaluate_user(c: &mut Criterion) {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap();

    let mut group = c.benchmark_group("evaluate_user");

    for posts in [10i64, 100, 1000] {
        // 活动均未达到阈值，每次评估都会执行全部规则
        let store = InMemoryStore::new();
        let catalog = runtime
            .block_on(BadgeCatalog::bootstrap(&store))
            .unwrap();
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        for i in 0..posts {
            store.add_post(2, start + Duration::days(i * 2));
        }
        for _ in 0..3 {
            store.add_comment(2);
        }
        runtime
            .block_on(evaluate_user(2, &catalog, &store, &store))
            .unwrap();

        group.bench_with_input(BenchmarkId::new("posts", posts), &posts, |b, _| {
            b.iter(|| {
                runtime
                    .block_on(evaluate_user(
                        black_box(2),
                        &catalog,
                        &store,
                        &store,
                    ))
                    .unwrap()
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_longest_streak, bench_evaluate_user);
criterion_main!(benches);
