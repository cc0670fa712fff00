//! Global balance constants shared by the economy, queues and fleets.

use serde::{Deserialize, Serialize};

use crate::math::{fixed_serde, ratio, Fixed};

/// Colony-wide balance numbers that are not tied to one entity type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TuningData {
    /// Per-level growth applied to building output and consumption.
    #[serde(with = "fixed_serde")]
    pub production_growth: Fixed,

    /// Capacity every storable resource has before storage buildings.
    pub storage_baseline: u32,

    /// Metallum+Kristallin cost that takes one hour to build at level 0
    /// of the speed-up building.
    pub build_cost_per_hour: u32,

    /// Distance-to-seconds scale for fleet travel, divided by speed.
    pub travel_constant: u64,

    /// Low-elevation bonus to Metallum and Kristallin, in percent.
    pub low_elevation_bonus_pct: u32,

    /// Mid-elevation bonus to every storable resource, in percent.
    pub mid_elevation_bonus_pct: u32,

    /// High-elevation bonus to Plasma, in percent.
    pub high_elevation_bonus_pct: u32,
}

impl Default for TuningData {
    fn default() -> Self {
        Self {
            production_growth: ratio(11, 10),
            storage_baseline: 5_000,
            build_cost_per_hour: 2_500,
            travel_constant: 6_000_000,
            low_elevation_bonus_pct: 10,
            mid_elevation_bonus_pct: 5,
            high_elevation_bonus_pct: 10,
        }
    }
}
