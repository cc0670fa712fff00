//! Closed sets of entity types: buildings, research, ships and defenses.
//!
//! Every kind has a stable snake-case name used as its key in data files,
//! persisted colonies and on the command line. Names are unique across all
//! four categories, so a bare name identifies a [`ConstructionTarget`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A name that matches no known kind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {category} '{name}'")]
pub struct UnknownKind {
    /// Category that was searched.
    pub category: &'static str,
    /// The offending name.
    pub name: String,
}

macro_rules! closed_kind {
    (
        $(#[$meta:meta])*
        $name:ident, $category:literal {
            $($(#[$vmeta:meta])* $variant:ident => $key:literal,)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($(#[$vmeta])* $variant,)+
        }

        impl $name {
            /// Every variant in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant,)+];

            /// Snake-case key of this kind.
            #[must_use]
            pub const fn name(self) -> &'static str {
                match self {
                    $(Self::$variant => $key,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.name())
            }
        }

        impl FromStr for $name {
            type Err = UnknownKind;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::ALL
                    .iter()
                    .copied()
                    .find(|kind| kind.name() == s)
                    .ok_or_else(|| UnknownKind {
                        category: $category,
                        name: s.to_string(),
                    })
            }
        }
    };
}

closed_kind! {
    /// Colony buildings, upgraded one level at a time.
    BuildingKind, "building" {
        /// Extracts Metallum.
        MetallumMine => "metallum_mine",
        /// Extracts Kristallin.
        KristallinMine => "kristallin_mine",
        /// Synthesizes Plasma.
        PlasmaSynthesizer => "plasma_synthesizer",
        /// Basic energy producer.
        SolarPlant => "solar_plant",
        /// Advanced energy producer.
        FusionReactor => "fusion_reactor",
        /// Raises Metallum capacity.
        MetallumStorage => "metallum_storage",
        /// Raises Kristallin capacity.
        KristallinStorage => "kristallin_storage",
        /// Raises Plasma capacity.
        PlasmaTank => "plasma_tank",
        /// Shortens building construction.
        RoboticsFactory => "robotics_factory",
        /// Builds ships and defenses; higher levels build faster.
        Shipyard => "shipyard",
        /// Enables research; higher levels research faster.
        ResearchArchive => "research_archive",
    }
}

closed_kind! {
    /// Colony-wide research, advanced one level at a time.
    ResearchKind, "research" {
        /// Boosts all energy production.
        EnergyTechnology => "energy_technology",
        /// Boosts Metallum and Kristallin extraction.
        ExtractionEfficiency => "extraction_efficiency",
        /// Boosts fleet speed.
        WarpDrive => "warp_drive",
    }
}

closed_kind! {
    /// Mobile ships built in the shipyard.
    UnitKind, "unit" {
        /// Cheap fighter.
        LightFighter => "light_fighter",
        /// Armoured fighter.
        HeavyFighter => "heavy_fighter",
        /// Fast raider.
        Cruiser => "cruiser",
        /// Capital ship.
        Battleship => "battleship",
        /// Small freighter.
        SmallCargo => "small_cargo",
        /// Large freighter.
        LargeCargo => "large_cargo",
        /// Unarmed scout.
        ExplorationProbe => "exploration_probe",
    }
}

closed_kind! {
    /// Stationary planetary defenses built in the shipyard.
    DefenseKind, "defense" {
        /// Entry-level launcher.
        RocketLauncher => "rocket_launcher",
        /// Energy turret.
        LaserTurret => "laser_turret",
        /// Heavy ion battery.
        IonCannon => "ion_cannon",
        /// Top-tier plasma battery.
        PlasmaCannon => "plasma_cannon",
        /// Planetary shield.
        ShieldDome => "shield_dome",
    }
}

/// The three construction queues of a colony.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueueKind {
    /// Building upgrades.
    Building,
    /// Research upgrades.
    Research,
    /// Ships and defenses.
    Shipyard,
}

impl QueueKind {
    /// All queues.
    pub const ALL: [Self; 3] = [Self::Building, Self::Research, Self::Shipyard];

    /// Snake-case key of this queue.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Building => "building",
            Self::Research => "research",
            Self::Shipyard => "shipyard",
        }
    }
}

impl fmt::Display for QueueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for QueueKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|queue| queue.name() == s)
            .ok_or_else(|| UnknownKind {
                category: "queue",
                name: s.to_string(),
            })
    }
}

/// Anything that can be ordered through a construction queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstructionTarget {
    /// Upgrade a building by one level.
    Building(BuildingKind),
    /// Advance a research by one level.
    Research(ResearchKind),
    /// Build a batch of ships.
    Unit(UnitKind),
    /// Build a batch of defenses.
    Defense(DefenseKind),
}

impl ConstructionTarget {
    /// Queue this target is ordered through.
    #[must_use]
    pub const fn queue(self) -> QueueKind {
        match self {
            Self::Building(_) => QueueKind::Building,
            Self::Research(_) => QueueKind::Research,
            Self::Unit(_) | Self::Defense(_) => QueueKind::Shipyard,
        }
    }

    /// Whether this target is levelled (one step per order) rather than
    /// built in batches.
    #[must_use]
    pub const fn is_levelled(self) -> bool {
        matches!(self, Self::Building(_) | Self::Research(_))
    }

    /// Snake-case key of the underlying kind.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Building(kind) => kind.name(),
            Self::Research(kind) => kind.name(),
            Self::Unit(kind) => kind.name(),
            Self::Defense(kind) => kind.name(),
        }
    }
}

impl fmt::Display for ConstructionTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ConstructionTarget {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(kind) = s.parse() {
            return Ok(Self::Building(kind));
        }
        if let Ok(kind) = s.parse() {
            return Ok(Self::Research(kind));
        }
        if let Ok(kind) = s.parse() {
            return Ok(Self::Unit(kind));
        }
        if let Ok(kind) = s.parse() {
            return Ok(Self::Defense(kind));
        }
        Err(UnknownKind {
            category: "construction target",
            name: s.to_string(),
        })
    }
}

impl From<BuildingKind> for ConstructionTarget {
    fn from(kind: BuildingKind) -> Self {
        Self::Building(kind)
    }
}

impl From<ResearchKind> for ConstructionTarget {
    fn from(kind: ResearchKind) -> Self {
        Self::Research(kind)
    }
}

impl From<UnitKind> for ConstructionTarget {
    fn from(kind: UnitKind) -> Self {
        Self::Unit(kind)
    }
}

impl From<DefenseKind> for ConstructionTarget {
    fn from(kind: DefenseKind) -> Self {
        Self::Defense(kind)
    }
}
