//! Ship and defense data structures for data-driven shipyard definitions.

use serde::{Deserialize, Serialize};

use super::{Requirement, ResourceCost};

/// Data-driven ship definition.
///
/// # Example RON
///
/// ```ron
/// (
///     name: "Light Fighter",
///     cost: (metallum: 3000, kristallin: 1000, plasma: 0),
///     build_time_secs: 120,
///     speed: 12500,
///     requirements: [Building(kind: shipyard, level: 1)],
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitData {
    /// Display name.
    pub name: String,

    /// Cost of a single ship. Also its combat value.
    pub cost: ResourceCost,

    /// Seconds to build one ship with a level-0 shipyard.
    pub build_time_secs: u32,

    /// Travel speed. Zero means the ship cannot leave orbit.
    pub speed: u32,

    /// Prerequisites for ordering.
    #[serde(default)]
    pub requirements: Vec<Requirement>,
}

/// Data-driven defense definition. Defenses never move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefenseData {
    /// Display name.
    pub name: String,

    /// Cost of a single structure. Also its combat value.
    pub cost: ResourceCost,

    /// Seconds to build one structure with a level-0 shipyard.
    pub build_time_secs: u32,

    /// Prerequisites for ordering.
    #[serde(default)]
    pub requirements: Vec<Requirement>,
}

impl UnitData {
    /// Check if this ship can be dispatched at all.
    #[must_use]
    pub const fn is_mobile(&self) -> bool {
        self.speed > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kinds::BuildingKind;

    fn create_test_unit() -> UnitData {
        UnitData {
            name: "Test Fighter".to_string(),
            cost: ResourceCost::new(3000, 1000, 0),
            build_time_secs: 120,
            speed: 12_500,
            requirements: vec![Requirement::Building {
                kind: BuildingKind::Shipyard,
                level: 1,
            }],
        }
    }

    #[test]
    fn test_is_mobile() {
        let mut unit = create_test_unit();
        assert!(unit.is_mobile());

        unit.speed = 0;
        assert!(!unit.is_mobile());
    }

    #[test]
    fn test_ron_requirements() {
        let text = r#"(
            name: "Probe",
            cost: (kristallin: 1000),
            build_time_secs: 30,
            speed: 100000,
            requirements: [Building(kind: shipyard, level: 1)],
        )"#;
        let unit: UnitData = ron::from_str(text).unwrap();
        assert_eq!(unit.cost.kristallin, 1000);
        assert_eq!(unit.requirements, create_test_unit().requirements);
    }
}
