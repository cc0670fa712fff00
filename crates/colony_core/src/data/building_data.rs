//! Building data structures for data-driven building definitions.

use serde::{Deserialize, Serialize};

use super::{Requirement, ResourceCost};
use crate::math::{fixed_serde, Fixed};
use crate::resources::ResourceKind;

/// Hourly output of a producing building at level 1 before growth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductionData {
    /// Resource produced. `Energy` marks a power plant.
    pub resource: ResourceKind,
    /// Base amount per hour.
    pub base_per_hour: u32,
}

/// Capacity contributed by a storage building.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageData {
    /// Resource whose capacity this building raises.
    pub resource: ResourceKind,
    /// Capacity at level 0, before the shared baseline is added.
    pub base_capacity: u32,
    /// Multiplier applied per building level.
    #[serde(with = "fixed_serde")]
    pub growth_factor: Fixed,
}

/// Data-driven building definition.
///
/// # Example RON
///
/// ```ron
/// (
///     name: "Metallum Mine",
///     cost: (metallum: 60, kristallin: 15, plasma: 0),
///     cost_factor: 6442450944,  // Fixed-point for 1.5
///     production: Some((resource: metallum, base_per_hour: 30)),
///     energy_consumption: 10,
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildingData {
    /// Display name.
    pub name: String,

    /// Cost of the first level.
    pub cost: ResourceCost,

    /// Cost multiplier per additional level.
    #[serde(with = "fixed_serde")]
    pub cost_factor: Fixed,

    /// What the building produces, if anything.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub production: Option<ProductionData>,

    /// Base energy drawn per hour at level 1 before growth.
    #[serde(default)]
    pub energy_consumption: u32,

    /// Storage raised by this building, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage: Option<StorageData>,

    /// Prerequisites for ordering any level.
    #[serde(default)]
    pub requirements: Vec<Requirement>,
}

impl BuildingData {
    /// Check if this building produces the given resource.
    #[must_use]
    pub fn produces(&self, resource: ResourceKind) -> bool {
        self.production.is_some_and(|p| p.resource == resource)
    }

    /// Check if this building raises storage for the given resource.
    #[must_use]
    pub fn stores(&self, resource: ResourceKind) -> bool {
        self.storage.is_some_and(|s| s.resource == resource)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_building() -> BuildingData {
        BuildingData {
            name: "Test Mine".to_string(),
            cost: ResourceCost::new(60, 15, 0),
            cost_factor: Fixed::from_num(1.5),
            production: Some(ProductionData {
                resource: ResourceKind::Metallum,
                base_per_hour: 30,
            }),
            energy_consumption: 10,
            storage: None,
            requirements: Vec::new(),
        }
    }

    #[test]
    fn test_produces() {
        let building = create_test_building();
        assert!(building.produces(ResourceKind::Metallum));
        assert!(!building.produces(ResourceKind::Energy));
        assert!(!building.stores(ResourceKind::Metallum));
    }

    #[test]
    fn test_ron_defaults() {
        let text = r#"(
            name: "Depot",
            cost: (metallum: 1000),
            cost_factor: 8589934592,
            storage: Some((resource: metallum, base_capacity: 5000, growth_factor: 6442450944)),
        )"#;
        let building: BuildingData = ron::from_str(text).unwrap();
        assert_eq!(building.cost, ResourceCost::new(1000, 0, 0));
        assert_eq!(building.cost_factor, Fixed::from_num(2));
        assert_eq!(building.energy_consumption, 0);
        assert!(building.stores(ResourceKind::Metallum));
        assert!(building.requirements.is_empty());
    }
}
