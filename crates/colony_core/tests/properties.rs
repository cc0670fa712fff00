//! Property tests for the engine invariants.

use std::collections::BTreeMap;

use colony_core::prelude::*;
use colony_core::map_generation::MAX_MAP_SIZE;
use colony_test_utils::determinism::{strategies, tick_times};
use colony_test_utils::fixtures::{developed_colony, engine_for, engine_on, garrison_tile, test_map, T0};
use proptest::prelude::*;

const TARGET: Coord = Coord { x: 13, y: 10 };
const FAR_FUTURE: u64 = 10 * 24 * 3_600_000;

fn busy_engine() -> ColonyEngine {
    let mut engine = engine_for(developed_colony(T0));
    let _ = engine.start_construction(ConstructionTarget::Building(BuildingKind::MetallumStorage), 1, T0);
    let _ = engine.start_construction(ConstructionTarget::Building(BuildingKind::SolarPlant), 1, T0);
    let _ = engine.start_construction(ConstructionTarget::Unit(UnitKind::LightFighter), 1, T0);
    engine
}

#[test]
fn test_oversized_map_is_clamped() {
    let map = generate(MAX_MAP_SIZE + 1, 9);
    assert_eq!(map.size(), MAX_MAP_SIZE);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Stock never leaves `[0, storage]`, however the ticks are spaced.
    #[test]
    fn prop_stock_stays_within_storage(gaps in strategies::arb_tick_gaps(40)) {
        let mut engine = busy_engine();
        for now in tick_times(T0, &gaps) {
            engine.tick(now);
            let violations = engine.colony().invariant_violations();
            prop_assert!(violations.is_empty(), "at {}: {:?}", now, violations);
        }
    }

    /// Orders placed with random stock never leave it negative.
    #[test]
    fn prop_orders_never_overdraw(
        resources in strategies::arb_resources(6_000),
        target in strategies::arb_construction_target(),
        amount in 1u32..5,
    ) {
        let mut colony = developed_colony(T0);
        colony.resources = resources;
        let mut engine = engine_for(colony);
        engine.tick(T0);
        let before = engine.colony().resources;

        match engine.start_construction(target, amount, T0) {
            Ok(_) => {
                for resource in ResourceKind::STORABLE {
                    prop_assert!(engine.colony().resources.get(resource) >= Fixed::ZERO);
                }
            }
            Err(_) => prop_assert_eq!(engine.colony().resources, before),
        }
    }

    /// The same size and seed always produce the same map.
    #[test]
    fn prop_map_generation_is_deterministic(size in 1u32..40, seed in any::<u32>()) {
        let first = generate(size, seed);
        let second = generate(size, seed);
        prop_assert_eq!(first.len(), (size * size) as usize);
        prop_assert_eq!(first, second);
    }

    /// Identical forces always produce identical reports, and nobody loses
    /// more than they brought.
    #[test]
    fn prop_combat_is_deterministic(
        attacker in strategies::arb_forces(200),
        defender in strategies::arb_forces(200),
    ) {
        let data = StaticData::builtin();
        let first = simulate_combat(&attacker, &defender, &data, "A", "D");
        let second = simulate_combat(&attacker, &defender, &data, "A", "D");
        prop_assert_eq!(&first, &second);
        prop_assert!(first.attacker.lost_value <= first.attacker.initial_value);
        prop_assert!(first.defender.lost_value <= first.defender.initial_value);
        prop_assert!(first.attacker.loss_ratio <= Fixed::ONE);
    }

    /// Ships that come home are the ships that left minus the losses.
    #[test]
    fn prop_dispatch_and_return_conserve_ships(
        fleet in strategies::arb_fleet_from(developed_colony(T0).units),
        fighters in 0u32..30,
        launchers in 0u32..60,
    ) {
        let requested: BTreeMap<UnitKind, u32> =
            fleet.into_iter().filter(|&(_, n)| n > 0).collect();
        prop_assume!(!requested.is_empty());

        let map = test_map().with_tile(TARGET, garrison_tile(fighters, launchers, ResourceBundle::new(1_000, 1_000, 0)));
        let original = developed_colony(T0);
        let mut engine = engine_on(map, original.clone());
        engine.dispatch_fleet(&requested, TARGET, Mission::Attack, T0).unwrap();

        engine.tick(T0 + FAR_FUTURE);
        engine.tick(T0 + 2 * FAR_FUTURE);

        let report = &engine.colony().combat_reports[0];
        for &kind in UnitKind::ALL {
            let sent = requested.get(&kind).copied().unwrap_or(0);
            let lost = report.attacker.losses.units.get(&kind).copied().unwrap_or(0);
            let expected = match report.winner {
                Winner::Attacker => original.unit_count(kind) - lost,
                _ => original.unit_count(kind) - sent,
            };
            prop_assert_eq!(engine.colony().unit_count(kind), expected, "{}", kind);
        }
        prop_assert!(engine.colony().active_fleets.is_empty());
    }

    /// A finished order is promoted exactly once.
    #[test]
    fn prop_completion_is_idempotent(extra_ticks in 1usize..6, late in 0u64..3_600_000) {
        let mut engine = engine_for(developed_colony(T0));
        engine
            .start_construction(ConstructionTarget::Building(BuildingKind::KristallinMine), 1, T0)
            .unwrap();
        let done = engine.colony().building_queue[0].end_time + late;

        let first = engine.tick(done);
        prop_assert_eq!(first.completed.len(), 1);
        for _ in 0..extra_ticks {
            prop_assert!(engine.tick(done).completed.is_empty());
        }
        prop_assert_eq!(engine.colony().building_level(BuildingKind::KristallinMine), 5);
    }

    /// Visibility older than the fog duration is dropped; home never is.
    #[test]
    fn prop_fog_expiry(coord in strategies::arb_coord(21), seen_offset in 0u64..3_600_000) {
        let mut colony = developed_colony(T0);
        let seen = T0 + seen_offset;
        colony.reveal(coord, seen);
        let home = colony.home;
        let mut engine = engine_for(colony);
        let fog = engine.config().fog_of_war_ms;

        engine.tick(seen + fog);
        prop_assert!(engine.colony().map_visibility.contains_key(&coord));

        engine.tick(seen + fog + 1);
        prop_assert_eq!(engine.colony().map_visibility.contains_key(&coord), coord == home);
        prop_assert!(engine.colony().map_visibility.contains_key(&home));
    }
}
