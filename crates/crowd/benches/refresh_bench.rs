//! Criterion benchmarks for the refresh cycle and the full fixed tick.
//!
//! Benchmarks:
//!   - run_refresh_cycle on sites of 4, 100 and 1000 zones
//!   - classify for a single zone
//!   - one `FixedUpdate` of the reference site (needs the `bench` feature)
//!
//! Run with: cargo bench -p crowd --bench refresh_bench --features bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use crowd::config::{SiteConfig, ZoneConfig};
use crowd::occupancy::classify;
use crowd::refresh::run_refresh_cycle;
use crowd::sim_rng::SimRng;
use crowd::timers::TimerSchedule;
use crowd::warning::WarningController;
use crowd::ZoneRegistry;

/// A site of `zone_count` zones with mixed capacities; every tenth zone is
/// warning-eligible.
fn generated_site(zone_count: usize) -> SiteConfig {
    let zones = (0..zone_count)
        .map(|i| {
            let capacity = 100 + (i as u32 % 7) * 50;
            let zone = ZoneConfig::new(
                &format!("Z{i}"),
                &format!("Zone {i}"),
                capacity,
                (capacity as i64 * (i as i64 % 10)) / 10,
            );
            if i % 10 == 0 {
                zone.warning_eligible()
            } else {
                zone
            }
        })
        .collect();
    SiteConfig {
        zones,
        ..SiteConfig::reference()
    }
}

// ---------------------------------------------------------------------------
// Benchmark: refresh cycle
// ---------------------------------------------------------------------------

fn bench_refresh_cycle(c: &mut Criterion) {
    let mut group = c.benchmark_group("refresh_cycle");
    let controller = WarningController::new(1200);

    for zone_count in [4usize, 100, 1000] {
        let config = if zone_count == 4 {
            SiteConfig::reference()
        } else {
            generated_site(zone_count)
        };
        let Ok(base) = ZoneRegistry::from_config(&config) else {
            panic!("generated site must be valid");
        };
        group.bench_with_input(
            BenchmarkId::from_parameter(zone_count),
            &zone_count,
            |b, _| {
                let mut registry = base.clone();
                let mut timers = TimerSchedule::default();
                let mut rng = SimRng::from_seed_u64(42);
                let mut now = 0;
                b.iter(|| {
                    now += 300;
                    black_box(run_refresh_cycle(
                        &mut registry,
                        &controller,
                        &mut timers,
                        &mut rng.0,
                        now,
                        true,
                    ))
                });
            },
        );
    }
    group.finish();
}

// ---------------------------------------------------------------------------
// Benchmark: classify
// ---------------------------------------------------------------------------

fn bench_classify(c: &mut Criterion) {
    let mut rng = SimRng::from_seed_u64(7);
    c.bench_function("classify_single_zone", |b| {
        b.iter(|| black_box(classify(black_box(190), black_box(200), true, &mut rng.0)));
    });
}

// ---------------------------------------------------------------------------
// Benchmark: full tick
// ---------------------------------------------------------------------------

#[cfg(feature = "bench")]
fn bench_full_tick(c: &mut Criterion) {
    use crowd::test_harness::TestSite;

    let mut site = TestSite::new();
    c.bench_function("fixed_tick_reference_site", |b| {
        b.iter(|| site.tick(1));
    });
}

#[cfg(not(feature = "bench"))]
fn bench_full_tick(_c: &mut Criterion) {}

// ---------------------------------------------------------------------------
// Register groups
// ---------------------------------------------------------------------------

criterion_group!(benches, bench_refresh_cycle, bench_classify, bench_full_tick);
criterion_main!(benches);
