use criterion::*;
use std::hint::black_box;

use market_ca_sim::sim::Simulation;
use market_ca_sim::types::UnitKind;

fn seeded_market(rows: u32, cols: u32) -> Simulation {
    let mut sim = Simulation::new(rows, cols, 0xC0FFEE);
    sim.generate_units(UnitKind::Company, 2).unwrap();
    sim.generate_units(UnitKind::Client, 10).unwrap();
    // Let products spread out before measuring.
    for _ in 0..20 {
        sim.run_tick();
    }
    sim
}

fn tick_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("tick");

    for &(rows, cols) in &[(32u32, 32u32), (100, 100)] {
        group.bench_function(format!("run_tick_{rows}x{cols}"), |b| {
            b.iter_batched(
                || seeded_market(rows, cols),
                |mut sim| {
                    black_box(sim.run_tick());
                },
                BatchSize::LargeInput,
            );
        });
    }

    group.bench_function("step_100x100_x40", |b| {
        b.iter_batched(
            || seeded_market(100, 100),
            |mut sim| {
                for _ in 0..40 {
                    black_box(sim.step());
                }
            },
            BatchSize::LargeInput,
        );
    });

    group.finish();
}

criterion_group!(benches, tick_benchmark);
criterion_main!(benches);
