//! Static data tables for every entity type.
//!
//! This module contains pure data structures that define buildings,
//! research, ships and defenses, plus the global tuning constants. All
//! structs deserialize from RON; [`StaticData::builtin`] provides the
//! default tables.
//!
//! **Note:** This module contains no IO - it only defines data types and
//! parses text handed to it. File loading is handled by `colony_tools`.
//!
//! Lookups return `Option`: a missing entry is a misconfiguration that
//! callers log and skip rather than a panic.

mod builtin;
mod building_data;
mod tech_data;
mod tuning_data;
mod unit_data;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub use building_data::{BuildingData, ProductionData, StorageData};
pub use tech_data::ResearchData;
pub use tuning_data::TuningData;
pub use unit_data::{DefenseData, UnitData};

use crate::error::{ColonyError, Result};
use crate::kinds::{BuildingKind, ConstructionTarget, DefenseKind, ResearchKind, UnitKind};
use crate::math::Fixed;
use crate::resources::{ResourceBundle, ResourceKind};

/// Whole-number cost in storable resources, as written in data files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ResourceCost {
    /// Metallum.
    #[serde(default)]
    pub metallum: u32,
    /// Kristallin.
    #[serde(default)]
    pub kristallin: u32,
    /// Plasma.
    #[serde(default)]
    pub plasma: u32,
}

impl ResourceCost {
    /// Create a cost.
    #[must_use]
    pub const fn new(metallum: u32, kristallin: u32, plasma: u32) -> Self {
        Self {
            metallum,
            kristallin,
            plasma,
        }
    }

    /// Convert to a fixed-point bundle.
    #[must_use]
    pub fn to_bundle(self) -> ResourceBundle {
        ResourceBundle {
            metallum: Fixed::saturating_from_num(self.metallum),
            kristallin: Fixed::saturating_from_num(self.kristallin),
            plasma: Fixed::saturating_from_num(self.plasma),
            energy: Fixed::ZERO,
        }
    }

    /// Metallum + Kristallin + Plasma, the combat value of one entity.
    #[must_use]
    pub const fn total(self) -> u64 {
        self.metallum as u64 + self.kristallin as u64 + self.plasma as u64
    }
}

/// A prerequisite for ordering something.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Requirement {
    /// A building at or above a level.
    Building {
        /// Required building.
        kind: BuildingKind,
        /// Minimum level.
        level: u32,
    },
    /// A research at or above a level.
    Research {
        /// Required research.
        kind: ResearchKind,
        /// Minimum level.
        level: u32,
    },
}

impl Requirement {
    /// Check the requirement against current levels. Absent keys count as
    /// level zero.
    #[must_use]
    pub fn is_met(
        &self,
        buildings: &BTreeMap<BuildingKind, u32>,
        research: &BTreeMap<ResearchKind, u32>,
    ) -> bool {
        match *self {
            Self::Building { kind, level } => buildings.get(&kind).copied().unwrap_or(0) >= level,
            Self::Research { kind, level } => research.get(&kind).copied().unwrap_or(0) >= level,
        }
    }
}

impl std::fmt::Display for Requirement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Building { kind, level } => write!(f, "{kind} level {level}"),
            Self::Research { kind, level } => write!(f, "{kind} level {level}"),
        }
    }
}

/// Immutable lookup tables for every entity type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticData {
    /// Global balance constants.
    #[serde(default)]
    pub tuning: TuningData,
    /// Building definitions.
    pub buildings: BTreeMap<BuildingKind, BuildingData>,
    /// Research definitions.
    pub research: BTreeMap<ResearchKind, ResearchData>,
    /// Ship definitions.
    pub units: BTreeMap<UnitKind, UnitData>,
    /// Defense definitions.
    pub defenses: BTreeMap<DefenseKind, DefenseData>,
}

impl Default for StaticData {
    fn default() -> Self {
        Self::builtin()
    }
}

impl StaticData {
    /// The built-in tables.
    #[must_use]
    pub fn builtin() -> Self {
        builtin::tables()
    }

    /// Parse tables from RON text and validate them.
    ///
    /// `origin` names the source in error messages.
    ///
    /// # Errors
    ///
    /// Returns [`ColonyError::DataParseError`] for malformed RON and
    /// [`ColonyError::InvalidData`] for tables that fail [`Self::validate`].
    pub fn from_ron_str(text: &str, origin: &str) -> Result<Self> {
        let data: Self = ron::from_str(text).map_err(|e| ColonyError::DataParseError {
            path: origin.to_string(),
            message: e.to_string(),
        })?;
        data.validate()?;
        Ok(data)
    }

    /// Render the tables as pretty RON.
    ///
    /// # Errors
    ///
    /// Returns [`ColonyError::Serialization`] if encoding fails.
    pub fn to_ron_string(&self) -> Result<String> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| ColonyError::Serialization(e.to_string()))
    }

    /// Check the tables for missing entries and nonsensical numbers.
    ///
    /// # Errors
    ///
    /// Returns [`ColonyError::InvalidData`] listing every problem found.
    pub fn validate(&self) -> Result<()> {
        let issues = self.issues();
        if issues.is_empty() {
            Ok(())
        } else {
            Err(ColonyError::InvalidData(issues))
        }
    }

    /// Every validation problem, in a stable order.
    #[must_use]
    pub fn issues(&self) -> Vec<String> {
        let mut issues = Vec::new();
        let tuning = &self.tuning;

        if tuning.production_growth < Fixed::ONE {
            issues.push("tuning.production_growth must be at least 1".to_string());
        }
        if tuning.build_cost_per_hour == 0 {
            issues.push("tuning.build_cost_per_hour must be positive".to_string());
        }
        if tuning.travel_constant == 0 {
            issues.push("tuning.travel_constant must be positive".to_string());
        }

        for &kind in BuildingKind::ALL {
            let Some(data) = self.buildings.get(&kind) else {
                issues.push(format!("missing building '{kind}'"));
                continue;
            };
            if data.cost_factor < Fixed::ONE {
                issues.push(format!("building '{kind}' cost_factor must be at least 1"));
            }
            if let Some(storage) = data.storage {
                if !storage.resource.is_storable() {
                    issues.push(format!("building '{kind}' stores unstorable {}", storage.resource));
                }
                if storage.growth_factor < Fixed::ONE {
                    issues.push(format!("building '{kind}' storage growth_factor must be at least 1"));
                }
            }
            check_requirements(&mut issues, kind.name(), &data.requirements, |r| {
                matches!(r, Requirement::Building { kind: k, .. } if *k == kind)
            });
        }

        for resource in ResourceKind::STORABLE {
            if !self.buildings.values().any(|b| b.stores(resource)) {
                issues.push(format!("no storage building for {resource}"));
            }
        }

        for &kind in ResearchKind::ALL {
            let Some(data) = self.research.get(&kind) else {
                issues.push(format!("missing research '{kind}'"));
                continue;
            };
            if data.cost_factor < Fixed::ONE {
                issues.push(format!("research '{kind}' cost_factor must be at least 1"));
            }
            check_requirements(&mut issues, kind.name(), &data.requirements, |r| {
                matches!(r, Requirement::Research { kind: k, .. } if *k == kind)
            });
        }

        for &kind in UnitKind::ALL {
            let Some(data) = self.units.get(&kind) else {
                issues.push(format!("missing unit '{kind}'"));
                continue;
            };
            if data.build_time_secs == 0 {
                issues.push(format!("unit '{kind}' build_time_secs must be positive"));
            }
            check_requirements(&mut issues, kind.name(), &data.requirements, |_| false);
        }

        for &kind in DefenseKind::ALL {
            let Some(data) = self.defenses.get(&kind) else {
                issues.push(format!("missing defense '{kind}'"));
                continue;
            };
            if data.build_time_secs == 0 {
                issues.push(format!("defense '{kind}' build_time_secs must be positive"));
            }
            check_requirements(&mut issues, kind.name(), &data.requirements, |_| false);
        }

        issues
    }

    /// Get building data.
    #[must_use]
    pub fn building(&self, kind: BuildingKind) -> Option<&BuildingData> {
        self.buildings.get(&kind)
    }

    /// Get research data.
    #[must_use]
    pub fn research(&self, kind: ResearchKind) -> Option<&ResearchData> {
        self.research.get(&kind)
    }

    /// Get ship data.
    #[must_use]
    pub fn unit(&self, kind: UnitKind) -> Option<&UnitData> {
        self.units.get(&kind)
    }

    /// Get defense data.
    #[must_use]
    pub fn defense(&self, kind: DefenseKind) -> Option<&DefenseData> {
        self.defenses.get(&kind)
    }

    /// Base (first level or single item) cost of a construction target.
    #[must_use]
    pub fn base_cost(&self, target: ConstructionTarget) -> Option<ResourceCost> {
        match target {
            ConstructionTarget::Building(kind) => self.building(kind).map(|d| d.cost),
            ConstructionTarget::Research(kind) => self.research(kind).map(|d| d.cost),
            ConstructionTarget::Unit(kind) => self.unit(kind).map(|d| d.cost),
            ConstructionTarget::Defense(kind) => self.defense(kind).map(|d| d.cost),
        }
    }

    /// Prerequisites of a construction target.
    #[must_use]
    pub fn requirements(&self, target: ConstructionTarget) -> Option<&[Requirement]> {
        match target {
            ConstructionTarget::Building(kind) => {
                self.building(kind).map(|d| d.requirements.as_slice())
            }
            ConstructionTarget::Research(kind) => {
                self.research(kind).map(|d| d.requirements.as_slice())
            }
            ConstructionTarget::Unit(kind) => self.unit(kind).map(|d| d.requirements.as_slice()),
            ConstructionTarget::Defense(kind) => {
                self.defense(kind).map(|d| d.requirements.as_slice())
            }
        }
    }

    /// Research multiplier at `level`, or one when the research has no data.
    #[must_use]
    pub fn research_multiplier(&self, kind: ResearchKind, level: u32) -> Fixed {
        match self.research(kind) {
            Some(data) => data.multiplier(level),
            None => {
                if level > 0 {
                    tracing::warn!(research = %kind, "no static data, bonus ignored");
                }
                Fixed::ONE
            }
        }
    }
}

fn check_requirements(
    issues: &mut Vec<String>,
    owner: &str,
    requirements: &[Requirement],
    is_self: impl Fn(&Requirement) -> bool,
) {
    for requirement in requirements {
        if is_self(requirement) {
            issues.push(format!("'{owner}' requires itself"));
        }
    }
}
