//! Test fixtures and helpers.
//!
//! Pre-built colonies, maps and garrisons for consistent testing.

use std::collections::BTreeMap;
use std::sync::Arc;

use colony_core::colony::Colony;
use colony_core::config::EngineConfig;
use colony_core::coords::Coord;
use colony_core::data::StaticData;
use colony_core::kinds::{BuildingKind, DefenseKind, UnitKind};
use colony_core::map_generation::{generate, Elevation, MapData, NpcGarrison, PlanetKind, Tile};
use colony_core::resources::ResourceBundle;
use colony_core::simulation::ColonyEngine;
use fixed::types::I32F32;

/// A fixed Unix time (November 2023) to start scenarios from.
pub const T0: u64 = 1_700_000_000_000;

/// Side of the small test map.
pub const TEST_MAP_SIZE: u32 = 21;

/// Seed of the small test map.
pub const TEST_MAP_SEED: u32 = 42;

/// Create a fixed-point number from an integer.
#[must_use]
pub fn fixed(n: i32) -> I32F32 {
    I32F32::from_num(n)
}

/// Create a fixed-point number from a float (for tests only).
///
/// Note: In real simulation code, never use floats.
/// This is only for convenient test setup.
#[must_use]
pub fn fixed_f(n: f64) -> I32F32 {
    I32F32::from_num(n)
}

/// Engine settings for the small test map.
#[must_use]
pub fn test_config() -> EngineConfig {
    EngineConfig::default()
        .with_map_size(TEST_MAP_SIZE)
        .with_map_seed(TEST_MAP_SEED)
}

/// The small test map, centred on `10:10`.
#[must_use]
pub fn test_map() -> MapData {
    generate(TEST_MAP_SIZE, TEST_MAP_SEED)
}

/// Built-in data with flat production growth, so a level-1 building yields
/// exactly its base rate.
#[must_use]
pub fn flat_data() -> StaticData {
    let mut data = StaticData::builtin();
    data.tuning.production_growth = I32F32::ONE;
    data
}

/// A planet holding an NPC garrison.
#[must_use]
pub fn garrison_tile(fighters: u32, launchers: u32, cache: ResourceBundle) -> Tile {
    let mut tile = Tile::planet(PlanetKind::Volcanic, Elevation::High);
    tile.npc = Some(NpcGarrison {
        name: "Test Garrison".to_string(),
        units: BTreeMap::from([(UnitKind::LightFighter, fighters)]),
        defenses: BTreeMap::from([(DefenseKind::RocketLauncher, launchers)]),
        cache,
    });
    tile
}

/// A well-stocked colony at the test map's centre with a working economy,
/// a shipyard and a few docked ships.
#[must_use]
pub fn developed_colony(now: u64) -> Colony {
    let mut colony = Colony::new(
        "tester",
        "Proving Grounds",
        Coord::new(10, 10),
        ResourceBundle::new(8_000, 8_000, 4_000),
        now,
    );
    for (kind, level) in [
        (BuildingKind::MetallumMine, 5),
        (BuildingKind::KristallinMine, 4),
        (BuildingKind::PlasmaSynthesizer, 2),
        (BuildingKind::SolarPlant, 6),
        (BuildingKind::RoboticsFactory, 2),
        (BuildingKind::Shipyard, 3),
        (BuildingKind::ResearchArchive, 1),
    ] {
        colony.buildings.insert(kind, level);
    }
    colony.units.insert(UnitKind::LightFighter, 20);
    colony.units.insert(UnitKind::HeavyFighter, 5);
    colony.units.insert(UnitKind::SmallCargo, 4);
    colony.units.insert(UnitKind::ExplorationProbe, 3);
    colony
}

/// Engine over the test map with built-in data and `colony`.
#[must_use]
pub fn engine_for(colony: Colony) -> ColonyEngine {
    engine_on(test_map(), colony)
}

/// Engine over `map` with built-in data and `colony`.
#[must_use]
pub fn engine_on(map: MapData, colony: Colony) -> ColonyEngine {
    ColonyEngine::new(
        Arc::new(map),
        Arc::new(StaticData::builtin()),
        test_config(),
        colony,
    )
}

/// A freshly founded colony on the test map.
#[must_use]
pub fn founded_engine(now: u64) -> ColonyEngine {
    let config = test_config();
    let map = Arc::new(generate(config.map_size, config.map_seed));
    ColonyEngine::new_colony(map, Arc::new(StaticData::builtin()), config, "tester", "First Light", now)
}
