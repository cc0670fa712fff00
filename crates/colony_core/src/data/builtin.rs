//! Built-in data tables.

use std::collections::BTreeMap;

use super::{
    BuildingData, DefenseData, ProductionData, Requirement, ResearchData, ResourceCost,
    StaticData, StorageData, TuningData, UnitData,
};
use crate::kinds::{BuildingKind, DefenseKind, ResearchKind, UnitKind};
use crate::math::{ratio, Fixed};
use crate::resources::ResourceKind;

const fn needs_building(kind: BuildingKind, level: u32) -> Requirement {
    Requirement::Building { kind, level }
}

const fn needs_research(kind: ResearchKind, level: u32) -> Requirement {
    Requirement::Research { kind, level }
}

fn building(
    name: &str,
    cost: ResourceCost,
    cost_factor: Fixed,
    requirements: Vec<Requirement>,
) -> BuildingData {
    BuildingData {
        name: name.to_string(),
        cost,
        cost_factor,
        production: None,
        energy_consumption: 0,
        storage: None,
        requirements,
    }
}

fn producer(
    name: &str,
    cost: ResourceCost,
    cost_factor: Fixed,
    resource: ResourceKind,
    base_per_hour: u32,
    energy_consumption: u32,
) -> BuildingData {
    BuildingData {
        production: Some(ProductionData {
            resource,
            base_per_hour,
        }),
        energy_consumption,
        ..building(name, cost, cost_factor, Vec::new())
    }
}

fn storage(name: &str, cost: ResourceCost, resource: ResourceKind) -> BuildingData {
    BuildingData {
        storage: Some(StorageData {
            resource,
            base_capacity: 5_000,
            growth_factor: ratio(3, 2),
        }),
        ..building(name, cost, Fixed::from_num(2), Vec::new())
    }
}

fn buildings() -> BTreeMap<BuildingKind, BuildingData> {
    use BuildingKind as B;

    let mut fusion = producer(
        "Fusion Reactor",
        ResourceCost::new(900, 360, 180),
        ratio(9, 5),
        ResourceKind::Energy,
        30,
        0,
    );
    fusion.requirements = vec![
        needs_building(B::PlasmaSynthesizer, 5),
        needs_research(ResearchKind::EnergyTechnology, 3),
    ];

    BTreeMap::from([
        (
            B::MetallumMine,
            producer(
                "Metallum Mine",
                ResourceCost::new(60, 15, 0),
                ratio(3, 2),
                ResourceKind::Metallum,
                30,
                10,
            ),
        ),
        (
            B::KristallinMine,
            producer(
                "Kristallin Mine",
                ResourceCost::new(48, 24, 0),
                ratio(8, 5),
                ResourceKind::Kristallin,
                20,
                10,
            ),
        ),
        (
            B::PlasmaSynthesizer,
            producer(
                "Plasma Synthesizer",
                ResourceCost::new(225, 75, 0),
                ratio(3, 2),
                ResourceKind::Plasma,
                10,
                20,
            ),
        ),
        (
            B::SolarPlant,
            producer(
                "Solar Plant",
                ResourceCost::new(75, 30, 0),
                ratio(3, 2),
                ResourceKind::Energy,
                20,
                0,
            ),
        ),
        (B::FusionReactor, fusion),
        (
            B::MetallumStorage,
            storage("Metallum Storage", ResourceCost::new(1000, 0, 0), ResourceKind::Metallum),
        ),
        (
            B::KristallinStorage,
            storage(
                "Kristallin Storage",
                ResourceCost::new(1000, 500, 0),
                ResourceKind::Kristallin,
            ),
        ),
        (
            B::PlasmaTank,
            storage("Plasma Tank", ResourceCost::new(1000, 1000, 0), ResourceKind::Plasma),
        ),
        (
            B::RoboticsFactory,
            building(
                "Robotics Factory",
                ResourceCost::new(400, 120, 200),
                Fixed::from_num(2),
                Vec::new(),
            ),
        ),
        (
            B::Shipyard,
            building(
                "Shipyard",
                ResourceCost::new(400, 200, 100),
                Fixed::from_num(2),
                vec![needs_building(B::RoboticsFactory, 2)],
            ),
        ),
        (
            B::ResearchArchive,
            building(
                "Research Archive",
                ResourceCost::new(200, 400, 200),
                Fixed::from_num(2),
                Vec::new(),
            ),
        ),
    ])
}

fn research() -> BTreeMap<ResearchKind, ResearchData> {
    let archive = needs_building(BuildingKind::ResearchArchive, 1);
    let entry = |name: &str, cost, bonus_pct_per_level, requirements| ResearchData {
        name: name.to_string(),
        cost,
        cost_factor: Fixed::from_num(2),
        bonus_pct_per_level,
        requirements,
    };

    BTreeMap::from([
        (
            ResearchKind::EnergyTechnology,
            entry(
                "Energy Technology",
                ResourceCost::new(0, 800, 400),
                10,
                vec![archive],
            ),
        ),
        (
            ResearchKind::ExtractionEfficiency,
            entry(
                "Extraction Efficiency",
                ResourceCost::new(400, 600, 0),
                5,
                vec![archive],
            ),
        ),
        (
            ResearchKind::WarpDrive,
            entry(
                "Warp Drive",
                ResourceCost::new(200, 1000, 200),
                10,
                vec![archive, needs_research(ResearchKind::EnergyTechnology, 1)],
            ),
        ),
    ])
}

fn units() -> BTreeMap<UnitKind, UnitData> {
    use UnitKind as U;

    let entry = |name: &str, cost, build_time_secs, speed, shipyard| UnitData {
        name: name.to_string(),
        cost,
        build_time_secs,
        speed,
        requirements: vec![needs_building(BuildingKind::Shipyard, shipyard)],
    };

    BTreeMap::from([
        (
            U::LightFighter,
            entry("Light Fighter", ResourceCost::new(3000, 1000, 0), 120, 12_500, 1),
        ),
        (
            U::HeavyFighter,
            entry("Heavy Fighter", ResourceCost::new(6000, 4000, 0), 240, 10_000, 3),
        ),
        (
            U::Cruiser,
            entry("Cruiser", ResourceCost::new(20_000, 7000, 2000), 600, 15_000, 5),
        ),
        (
            U::Battleship,
            entry("Battleship", ResourceCost::new(45_000, 15_000, 0), 1200, 10_000, 7),
        ),
        (
            U::SmallCargo,
            entry("Small Cargo", ResourceCost::new(2000, 2000, 0), 120, 5_000, 2),
        ),
        (
            U::LargeCargo,
            entry("Large Cargo", ResourceCost::new(6000, 6000, 0), 300, 7_500, 4),
        ),
        (
            U::ExplorationProbe,
            entry("Exploration Probe", ResourceCost::new(0, 1000, 0), 30, 100_000, 1),
        ),
    ])
}

fn defenses() -> BTreeMap<DefenseKind, DefenseData> {
    use DefenseKind as D;

    let entry = |name: &str, cost, build_time_secs, shipyard| DefenseData {
        name: name.to_string(),
        cost,
        build_time_secs,
        requirements: vec![needs_building(BuildingKind::Shipyard, shipyard)],
    };

    BTreeMap::from([
        (
            D::RocketLauncher,
            entry("Rocket Launcher", ResourceCost::new(2000, 0, 0), 60, 1),
        ),
        (
            D::LaserTurret,
            entry("Laser Turret", ResourceCost::new(1500, 500, 0), 80, 2),
        ),
        (
            D::IonCannon,
            entry("Ion Cannon", ResourceCost::new(5000, 3000, 0), 300, 4),
        ),
        (
            D::PlasmaCannon,
            entry("Plasma Cannon", ResourceCost::new(50_000, 50_000, 30_000), 1800, 8),
        ),
        (
            D::ShieldDome,
            entry("Shield Dome", ResourceCost::new(10_000, 10_000, 0), 900, 6),
        ),
    ])
}

pub(super) fn tables() -> StaticData {
    StaticData {
        tuning: TuningData::default(),
        buildings: buildings(),
        research: research(),
        units: units(),
        defenses: defenses(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_energy_producers() {
        let data = tables();
        let producers: Vec<_> = data
            .buildings
            .iter()
            .filter(|(_, b)| b.produces(ResourceKind::Energy))
            .map(|(k, _)| *k)
            .collect();
        assert_eq!(producers, vec![BuildingKind::SolarPlant, BuildingKind::FusionReactor]);
    }

    #[test]
    fn test_every_ship_is_mobile() {
        assert!(tables().units.values().all(UnitData::is_mobile));
    }

    #[test]
    fn test_shipyard_gates_everything_it_builds() {
        let data = tables();
        let gated = |reqs: &[Requirement]| {
            reqs.iter()
                .any(|r| matches!(r, Requirement::Building { kind: BuildingKind::Shipyard, level } if *level >= 1))
        };
        assert!(data.units.values().all(|u| gated(&u.requirements)));
        assert!(data.defenses.values().all(|d| gated(&d.requirements)));
    }
}
