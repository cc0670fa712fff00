//! Economy model: building output, energy balance and storage caps.
//!
//! Every producing building yields `base * level * growth^level` per hour.
//! Planetary modifiers (elevation, tile biome) and research multipliers are
//! applied per resource, then non-energy output is throttled by the energy
//! factor. Stock is clamped to storage after every application.
//!
//! All calculations use fixed-point math for deterministic simulation.

use serde::{Deserialize, Serialize};

use crate::colony::Colony;
use crate::data::StaticData;
use crate::kinds::{BuildingKind, ResearchKind};
use crate::map_generation::{Elevation, Tile};
use crate::math::{fixed_serde, hours_from_ms, percent, pow, Fixed};
use crate::resources::{ResourceBundle, ResourceKind};

/// Hourly economy of a colony after every modifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProductionRates {
    /// Net hourly gain per storable resource, energy factor applied.
    pub per_hour: ResourceBundle,
    /// Hourly energy produced, research applied.
    #[serde(with = "fixed_serde")]
    pub energy_production: Fixed,
    /// Hourly energy drawn by buildings.
    #[serde(with = "fixed_serde")]
    pub energy_consumption: Fixed,
    /// Throttle on non-energy output, in `[0, 1]`.
    #[serde(with = "fixed_serde")]
    pub energy_factor: Fixed,
}

impl ProductionRates {
    /// Net energy flow, possibly negative.
    #[must_use]
    pub fn net_energy(&self) -> Fixed {
        self.energy_production.saturating_sub(self.energy_consumption)
    }
}

/// Output of one building: `base * level * growth^level`.
///
/// # Example
///
/// ```
/// use colony_core::economy::building_output;
/// use colony_core::math::Fixed;
///
/// assert_eq!(building_output(30, 1, Fixed::ONE), Fixed::from_num(30));
/// assert_eq!(building_output(30, 2, Fixed::from_num(1.5)), Fixed::from_num(135));
/// ```
#[must_use]
pub fn building_output(base_per_hour: u32, level: u32, growth: Fixed) -> Fixed {
    Fixed::saturating_from_num(base_per_hour)
        .saturating_mul(Fixed::saturating_from_num(level))
        .saturating_mul(pow(growth, level))
}

/// Combined planetary multiplier for `resource` on `tile`.
///
/// Elevation applies first, then a matching tile biome scales by
/// `1 + delta_pct / 100`. Energy is never affected.
#[must_use]
pub fn planetary_multiplier(tile: Option<&Tile>, resource: ResourceKind, data: &StaticData) -> Fixed {
    let Some(tile) = tile else {
        return Fixed::ONE;
    };
    if !resource.is_storable() {
        return Fixed::ONE;
    }

    let tuning = &data.tuning;
    let elevation_pct = match (tile.elevation, resource) {
        (Elevation::Low, ResourceKind::Metallum | ResourceKind::Kristallin) => {
            tuning.low_elevation_bonus_pct
        }
        (Elevation::Mid, _) => tuning.mid_elevation_bonus_pct,
        (Elevation::High, ResourceKind::Plasma) => tuning.high_elevation_bonus_pct,
        _ => 0,
    };
    let mut multiplier =
        Fixed::ONE.saturating_add(percent(i32::try_from(elevation_pct).unwrap_or(i32::MAX)));

    if let Some(biome) = tile.biome.filter(|b| b.resource == resource) {
        let factor = Fixed::ONE.saturating_add(percent(biome.delta_pct));
        multiplier = multiplier.saturating_mul(factor.max(Fixed::ZERO));
    }
    multiplier
}

/// Compute hourly rates for a colony on `tile`.
///
/// Buildings without static data are logged and skipped.
#[must_use]
pub fn production_rates(colony: &Colony, tile: Option<&Tile>, data: &StaticData) -> ProductionRates {
    let growth = data.tuning.production_growth;
    let mut raw = ResourceBundle::ZERO;
    let mut energy_production = Fixed::ZERO;
    let mut energy_consumption = Fixed::ZERO;

    for (&kind, &level) in &colony.buildings {
        if level == 0 {
            continue;
        }
        let Some(info) = data.building(kind) else {
            tracing::warn!(building = %kind, level, "no static data, skipped in economy");
            continue;
        };
        energy_consumption =
            energy_consumption.saturating_add(building_output(info.energy_consumption, level, growth));
        if let Some(production) = info.production {
            let output = building_output(production.base_per_hour, level, growth);
            if production.resource == ResourceKind::Energy {
                energy_production = energy_production.saturating_add(output);
            } else {
                let modified = output.saturating_mul(planetary_multiplier(tile, production.resource, data));
                let slot = raw.get_mut(production.resource);
                *slot = slot.saturating_add(modified);
            }
        }
    }

    energy_production = energy_production.saturating_mul(
        data.research_multiplier(ResearchKind::EnergyTechnology, colony.research_level(ResearchKind::EnergyTechnology)),
    );
    let energy_factor = energy_factor(energy_production, energy_consumption);

    let extraction = data.research_multiplier(
        ResearchKind::ExtractionEfficiency,
        colony.research_level(ResearchKind::ExtractionEfficiency),
    );
    let mut per_hour = raw.scaled(energy_factor);
    per_hour.metallum = per_hour.metallum.saturating_mul(extraction);
    per_hour.kristallin = per_hour.kristallin.saturating_mul(extraction);

    ProductionRates {
        per_hour,
        energy_production,
        energy_consumption,
        energy_factor,
    }
}

/// `min(1, production / max(1, consumption))` when anything is produced,
/// otherwise zero.
#[must_use]
pub fn energy_factor(production: Fixed, consumption: Fixed) -> Fixed {
    if production <= Fixed::ZERO {
        return Fixed::ZERO;
    }
    let consumption = consumption.max(Fixed::ONE);
    production.saturating_div(consumption).min(Fixed::ONE)
}

/// Storage capacity per storable resource:
/// `base * growth^level + baseline` for each storage building.
#[must_use]
pub fn storage_capacity(colony: &Colony, data: &StaticData) -> ResourceBundle {
    let baseline = Fixed::saturating_from_num(data.tuning.storage_baseline);
    let mut capacity = ResourceBundle {
        metallum: baseline,
        kristallin: baseline,
        plasma: baseline,
        energy: Fixed::ZERO,
    };

    for &kind in BuildingKind::ALL {
        let Some(storage) = data.building(kind).and_then(|info| info.storage) else {
            continue;
        };
        let level = colony.building_level(kind);
        let extra = Fixed::saturating_from_num(storage.base_capacity)
            .saturating_mul(pow(storage.growth_factor, level));
        let slot = capacity.get_mut(storage.resource);
        *slot = slot.saturating_add(extra);
    }
    capacity
}

/// Clamp every storable resource into `[0, storage]`.
pub fn clamp_to_storage(colony: &mut Colony) {
    for resource in ResourceKind::STORABLE {
        let cap = colony.storage.get(resource).max(Fixed::ZERO);
        let amount = colony.resources.get(resource).clamp(Fixed::ZERO, cap);
        colony.resources.set(resource, amount);
    }
}

/// Advance the colony economy by `elapsed_ms`.
///
/// Recomputes storage, adds production, stores the net energy flow and
/// clamps stock to storage.
///
/// # Arguments
///
/// * `colony` - The colony to update
/// * `tile` - The colony's home tile, `None` for no planetary modifiers
/// * `data` - Static data tables
/// * `elapsed_ms` - Time since the last application
///
/// # Returns
///
/// The rates that were applied.
pub fn apply_economy(
    colony: &mut Colony,
    tile: Option<&Tile>,
    data: &StaticData,
    elapsed_ms: u64,
) -> ProductionRates {
    colony.storage = storage_capacity(colony, data);
    let rates = production_rates(colony, tile, data);
    let hours = hours_from_ms(elapsed_ms);

    for resource in ResourceKind::STORABLE {
        let gained = rates.per_hour.get(resource).saturating_mul(hours);
        let slot = colony.resources.get_mut(resource);
        *slot = slot.saturating_add(gained);
    }
    colony.resources.energy = rates.net_energy();
    clamp_to_storage(colony);

    rates
}
