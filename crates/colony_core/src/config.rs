//! Engine configuration.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::data::ResourceCost;
use crate::error::{ColonyError, Result};
use crate::kinds::BuildingKind;
use crate::map_generation::MAX_MAP_SIZE;

/// Runtime settings for a [`ColonyEngine`](crate::simulation::ColonyEngine).
///
/// Every field has a default, so a RON file only needs the values it
/// overrides:
///
/// ```
/// use colony_core::config::EngineConfig;
///
/// let config = EngineConfig::from_ron_str("(map_seed: 7)", "inline").unwrap();
/// assert_eq!(config.map_seed, 7);
/// assert_eq!(config.map_size, 51);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Side length of the square map.
    pub map_size: u32,
    /// Seed for map generation.
    pub map_seed: u32,
    /// Interval between scheduled ticks.
    pub tick_interval_ms: u64,
    /// How long a revealed tile stays visible without being re-observed.
    pub fog_of_war_ms: u64,
    /// Combat reports kept per colony, newest first.
    pub combat_report_limit: usize,
    /// Stock of a newly founded colony.
    pub starting_resources: ResourceCost,
    /// Building levels of a newly founded colony.
    pub starting_buildings: BTreeMap<BuildingKind, u32>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            map_size: 51,
            map_seed: 1337,
            tick_interval_ms: 5_000,
            fog_of_war_ms: 86_400_000,
            combat_report_limit: 20,
            starting_resources: ResourceCost::new(500, 300, 0),
            starting_buildings: BTreeMap::from([
                (BuildingKind::MetallumMine, 1),
                (BuildingKind::KristallinMine, 1),
                (BuildingKind::SolarPlant, 1),
            ]),
        }
    }
}

impl EngineConfig {
    /// Parse a RON document and validate it.
    ///
    /// `origin` names the source in error messages.
    pub fn from_ron_str(text: &str, origin: &str) -> Result<Self> {
        let config: Self = ron::from_str(text).map_err(|e| ColonyError::DataParseError {
            path: origin.to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Render as pretty RON.
    pub fn to_ron_string(&self) -> Result<String> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| ColonyError::Serialization(format!("Failed to write config: {e}")))
    }

    /// Reject settings the engine cannot run with.
    pub fn validate(&self) -> Result<()> {
        let mut issues = Vec::new();
        if self.map_size == 0 || self.map_size > MAX_MAP_SIZE {
            issues.push(format!("map_size must be within 1..={MAX_MAP_SIZE}, got {}", self.map_size));
        }
        if self.tick_interval_ms == 0 {
            issues.push("tick_interval_ms must be positive".to_string());
        }
        if issues.is_empty() {
            Ok(())
        } else {
            Err(ColonyError::InvalidData(issues))
        }
    }

    /// Set the map size.
    #[must_use]
    pub const fn with_map_size(mut self, size: u32) -> Self {
        self.map_size = size;
        self
    }

    /// Set the map seed.
    #[must_use]
    pub const fn with_map_seed(mut self, seed: u32) -> Self {
        self.map_seed = seed;
        self
    }

    /// Set the scheduler interval.
    #[must_use]
    pub const fn with_tick_interval_ms(mut self, interval_ms: u64) -> Self {
        self.tick_interval_ms = interval_ms;
        self
    }

    /// Set the fog-of-war duration.
    #[must_use]
    pub const fn with_fog_of_war_ms(mut self, fog_ms: u64) -> Self {
        self.fog_of_war_ms = fog_ms;
        self
    }

    /// Set how many combat reports a colony keeps.
    #[must_use]
    pub const fn with_combat_report_limit(mut self, limit: usize) -> Self {
        self.combat_report_limit = limit;
        self
    }

    /// Set the starting stock.
    #[must_use]
    pub const fn with_starting_resources(mut self, resources: ResourceCost) -> Self {
        self.starting_resources = resources;
        self
    }

    /// Set a starting building level.
    #[must_use]
    pub fn with_starting_building(mut self, kind: BuildingKind, level: u32) -> Self {
        self.starting_buildings.insert(kind, level);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.map_size, 51);
        assert_eq!(config.fog_of_war_ms, 24 * 3_600_000);
        assert_eq!(config.starting_resources, ResourceCost::new(500, 300, 0));
        assert_eq!(config.starting_buildings.get(&BuildingKind::SolarPlant), Some(&1));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = EngineConfig::default()
            .with_map_size(21)
            .with_map_seed(42)
            .with_combat_report_limit(3)
            .with_starting_building(BuildingKind::Shipyard, 2);
        assert_eq!(config.map_size, 21);
        assert_eq!(config.map_seed, 42);
        assert_eq!(config.combat_report_limit, 3);
        assert_eq!(config.starting_buildings.get(&BuildingKind::Shipyard), Some(&2));
    }

    #[test]
    fn test_ron_round_trip() {
        let config = EngineConfig::default().with_fog_of_war_ms(60_000);
        let text = config.to_ron_string().unwrap();
        let parsed = EngineConfig::from_ron_str(&text, "test").unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let result = EngineConfig::from_ron_str("(map_size: 0, tick_interval_ms: 0)", "bad.ron");
        match result {
            Err(ColonyError::InvalidData(issues)) => assert_eq!(issues.len(), 2),
            other => panic!("expected InvalidData, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_error_names_origin() {
        let result = EngineConfig::from_ron_str("(map_size: \"big\")", "bad.ron");
        assert!(matches!(result, Err(ColonyError::DataParseError { path, .. }) if path == "bad.ron"));
    }
}
