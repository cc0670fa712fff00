//! Research data structures.

use serde::{Deserialize, Serialize};

use super::{Requirement, ResourceCost};
use crate::math::{fixed_serde, percent, Fixed};

/// Data-driven research definition.
///
/// # Example RON
///
/// ```ron
/// (
///     name: "Warp Drive",
///     cost: (metallum: 200, kristallin: 1000, plasma: 200),
///     cost_factor: 8589934592,  // Fixed-point for 2.0
///     bonus_pct_per_level: 10,
///     requirements: [Building(kind: research_archive, level: 1)],
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResearchData {
    /// Display name.
    pub name: String,

    /// Cost of the first level.
    pub cost: ResourceCost,

    /// Cost multiplier per additional level.
    #[serde(with = "fixed_serde")]
    pub cost_factor: Fixed,

    /// Percentage bonus granted per researched level.
    pub bonus_pct_per_level: u32,

    /// Prerequisites for ordering any level.
    #[serde(default)]
    pub requirements: Vec<Requirement>,
}

impl ResearchData {
    /// Multiplier granted at `level`: `1 + bonus% * level`.
    ///
    /// # Example
    ///
    /// ```
    /// use colony_core::data::{ResearchData, ResourceCost};
    /// use colony_core::math::Fixed;
    ///
    /// let warp = ResearchData {
    ///     name: "Warp Drive".into(),
    ///     cost: ResourceCost::new(200, 1000, 200),
    ///     cost_factor: Fixed::from_num(2),
    ///     bonus_pct_per_level: 10,
    ///     requirements: Vec::new(),
    /// };
    /// assert_eq!(warp.multiplier(0), Fixed::ONE);
    /// assert_eq!(warp.multiplier(5), Fixed::from_num(1.5));
    /// ```
    #[must_use]
    pub fn multiplier(&self, level: u32) -> Fixed {
        let bonus = i32::try_from(self.bonus_pct_per_level.saturating_mul(level)).unwrap_or(i32::MAX);
        Fixed::ONE.saturating_add(percent(bonus))
    }
}
