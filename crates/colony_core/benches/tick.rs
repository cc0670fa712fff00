//! Tick and map generation benchmarks for colony_core.
//!
//! Run with: `cargo bench -p colony_core`

// Benchmark binaries don't need docs on macro-generated functions
#![allow(missing_docs)]

use std::collections::BTreeMap;
use std::sync::Arc;

use colony_core::prelude::*;
use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};

const T0: u64 = 1_700_000_000_000;

/// A colony with busy queues and fleets in flight.
fn busy_engine(map: &Arc<MapData>, data: &Arc<StaticData>) -> ColonyEngine {
    let mut colony = Colony::new("bench", "Bench", map.center(), ResourceBundle::new(9_000, 9_000, 9_000), T0);
    for (kind, level) in [
        (BuildingKind::MetallumMine, 8),
        (BuildingKind::KristallinMine, 6),
        (BuildingKind::SolarPlant, 10),
        (BuildingKind::RoboticsFactory, 2),
        (BuildingKind::Shipyard, 4),
    ] {
        colony.buildings.insert(kind, level);
    }
    colony.units.insert(UnitKind::ExplorationProbe, 20);
    let mut engine = ColonyEngine::new(Arc::clone(map), Arc::clone(data), EngineConfig::default(), colony);

    let _ = engine.start_construction(ConstructionTarget::Building(BuildingKind::MetallumMine), 1, T0);
    let _ = engine.start_construction(ConstructionTarget::Unit(UnitKind::LightFighter), 1, T0);
    for step in 0..10 {
        let probe = BTreeMap::from([(UnitKind::ExplorationProbe, 1)]);
        let target = Coord::new(step * 4, 40 - step * 3);
        let _ = engine.dispatch_fleet(&probe, target, Mission::Explore, T0);
    }
    engine
}

pub fn tick_benchmark(c: &mut Criterion) {
    let data = Arc::new(StaticData::builtin());
    let map = Arc::new(generate(51, 1337));

    c.bench_function("tick_5s", |b| {
        b.iter_batched(
            || busy_engine(&map, &data),
            |mut engine| black_box(engine.tick(T0 + 5_000)),
            BatchSize::SmallInput,
        )
    });

    c.bench_function("tick_offline_day", |b| {
        b.iter_batched(
            || busy_engine(&map, &data),
            |mut engine| black_box(engine.tick(T0 + 86_400_000)),
            BatchSize::SmallInput,
        )
    });

    c.bench_function("tick_1000_steps", |b| {
        b.iter_batched(
            || busy_engine(&map, &data),
            |mut engine| {
                for step in 1..=1_000 {
                    engine.tick(T0 + step * 5_000);
                }
                black_box(engine.colony().state_hash())
            },
            BatchSize::SmallInput,
        )
    });
}

pub fn map_generation_benchmark(c: &mut Criterion) {
    c.bench_function("generate_51", |b| b.iter(|| generate(black_box(51), black_box(1337))));
    c.bench_function("generate_201", |b| b.iter(|| generate(black_box(201), black_box(1337))));
}

criterion_group!(benches, tick_benchmark, map_generation_benchmark);
criterion_main!(benches);
