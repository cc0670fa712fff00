//! Value-based combat resolution.
//!
//! This module implements a single-exchange combat model:
//! - Each side is worth the summed base cost of everything it fields
//! - Loss ratios compare the two values with a structural defender edge
//! - Losses are whole units, rounded down per type
//! - The side that lost less value wins; ties go to the defender
//!
//! All ratios are evaluated as exact integer fractions, so identical inputs
//! always produce an identical [`CombatReport`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::colony::EntityId;
use crate::coords::Coord;
use crate::data::{ResourceCost, StaticData};
use crate::kinds::{DefenseKind, UnitKind};
use crate::math::Fixed;
use crate::resources::ResourceBundle;

/// Attacker loss ratio is `D / (A * 6/5 + 1)`, i.e. `5D / (6A + 5)`.
const ATTACKER_EDGE: (u128, u128) = (6, 5);
/// Defender loss ratio is `A / (D * 3/2 + 1)`, i.e. `2A / (3D + 2)`.
const DEFENDER_EDGE: (u128, u128) = (3, 2);
/// Share of lost Metallum and Kristallin left as debris, in percent.
const DEBRIS_PCT: u64 = 30;

/// A fighting force: ships plus planetary defenses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Forces {
    /// Ships by kind.
    #[serde(default)]
    pub units: BTreeMap<UnitKind, u32>,
    /// Defenses by kind.
    #[serde(default)]
    pub defenses: BTreeMap<DefenseKind, u32>,
}

impl Forces {
    /// A force of ships only.
    #[must_use]
    pub fn from_units(units: BTreeMap<UnitKind, u32>) -> Self {
        Self {
            units,
            defenses: BTreeMap::new(),
        }
    }

    /// Add ships of a kind.
    #[must_use]
    pub fn with_units(mut self, kind: UnitKind, count: u32) -> Self {
        *self.units.entry(kind).or_insert(0) += count;
        self
    }

    /// Add defenses of a kind.
    #[must_use]
    pub fn with_defenses(mut self, kind: DefenseKind, count: u32) -> Self {
        *self.defenses.entry(kind).or_insert(0) += count;
        self
    }

    /// Total number of ships and defenses.
    #[must_use]
    pub fn total_count(&self) -> u64 {
        self.units
            .values()
            .chain(self.defenses.values())
            .map(|&c| u64::from(c))
            .sum()
    }

    /// Check if the force has nothing in it.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total_count() == 0
    }

    /// Summed base cost of every entity, the combat value.
    #[must_use]
    pub fn value(&self, data: &StaticData) -> u64 {
        self.costed_entries(data)
            .map(|(cost, count)| cost.total().saturating_mul(u64::from(count)))
            .fold(0, u64::saturating_add)
    }

    /// Metallum and Kristallin locked up in the force.
    fn hull_materials(&self, data: &StaticData) -> (u64, u64) {
        self.costed_entries(data).fold((0, 0), |(m, k), (cost, count)| {
            (
                m.saturating_add(u64::from(cost.metallum).saturating_mul(u64::from(count))),
                k.saturating_add(u64::from(cost.kristallin).saturating_mul(u64::from(count))),
            )
        })
    }

    /// This force minus `losses`, with zero entries dropped.
    #[must_use]
    pub fn survivors(&self, losses: &Self) -> Self {
        let units = self
            .units
            .iter()
            .map(|(k, &c)| (*k, c.saturating_sub(losses.units.get(k).copied().unwrap_or(0))))
            .filter(|&(_, c)| c > 0)
            .collect();
        let defenses = self
            .defenses
            .iter()
            .map(|(k, &c)| (*k, c.saturating_sub(losses.defenses.get(k).copied().unwrap_or(0))))
            .filter(|&(_, c)| c > 0)
            .collect();
        Self { units, defenses }
    }

    /// Whole-unit losses `floor(count * numerator / denominator)`, capped at
    /// the count. Zero entries are dropped.
    fn losses(&self, numerator: u128, denominator: u128) -> Self {
        let lose = |count: u32| -> u32 {
            if denominator == 0 {
                return count;
            }
            let lost = u128::from(count) * numerator / denominator;
            u32::try_from(lost.min(u128::from(count))).unwrap_or(count)
        };
        Self {
            units: self
                .units
                .iter()
                .map(|(k, &c)| (*k, lose(c)))
                .filter(|&(_, c)| c > 0)
                .collect(),
            defenses: self
                .defenses
                .iter()
                .map(|(k, &c)| (*k, lose(c)))
                .filter(|&(_, c)| c > 0)
                .collect(),
        }
    }

    fn costed_entries<'a>(
        &'a self,
        data: &'a StaticData,
    ) -> impl Iterator<Item = (ResourceCost, u32)> + 'a {
        let units = self.units.iter().filter_map(move |(kind, &count)| {
            if count == 0 {
                return None;
            }
            match data.unit(*kind) {
                Some(info) => Some((info.cost, count)),
                None => {
                    tracing::warn!(unit = %kind, "no static data, valued at zero");
                    None
                }
            }
        });
        let defenses = self.defenses.iter().filter_map(move |(kind, &count)| {
            if count == 0 {
                return None;
            }
            match data.defense(*kind) {
                Some(info) => Some((info.cost, count)),
                None => {
                    tracing::warn!(defense = %kind, "no static data, valued at zero");
                    None
                }
            }
        });
        units.chain(defenses)
    }
}

/// Outcome of a battle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Winner {
    /// The attacker lost strictly less value.
    Attacker,
    /// The defender lost no more value than the attacker.
    Defender,
    /// Neither side had anything to fight with.
    Draw,
}

/// One side of a battle.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CombatSide {
    /// Display name.
    pub name: String,
    /// Force before the battle.
    pub initial: Forces,
    /// Whole units lost.
    pub losses: Forces,
    /// Value before the battle.
    pub initial_value: u64,
    /// Value of the losses.
    pub lost_value: u64,
    /// Fraction of every stack lost, in `[0, 1]`.
    #[serde(with = "crate::math::fixed_serde")]
    pub loss_ratio: Fixed,
}

impl CombatSide {
    /// What is left after the battle.
    #[must_use]
    pub fn survivors(&self) -> Forces {
        self.initial.survivors(&self.losses)
    }
}

/// Per-round detail. The single-exchange model records none.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CombatRound {
    /// Attacker value remaining after the round.
    pub attacker_value: u64,
    /// Defender value remaining after the round.
    pub defender_value: u64,
}

/// Fully computed battle result. Immutable once recorded.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CombatReport {
    /// Unique id within the colony; zero until recorded.
    pub id: EntityId,
    /// Unix milliseconds of the battle; zero until recorded.
    pub timestamp: u64,
    /// Where the battle happened.
    pub location: Coord,
    /// Attacking side.
    pub attacker: CombatSide,
    /// Defending side.
    pub defender: CombatSide,
    /// Who won.
    pub winner: Winner,
    /// Wreckage left in orbit.
    pub debris: ResourceBundle,
    /// Resources carried off by a winning attacker.
    pub plunder: ResourceBundle,
    /// Round-by-round log.
    pub rounds: Vec<CombatRound>,
}

/// Resolve a battle between two forces.
///
/// Pure and deterministic. The returned report has zero `id`, `timestamp`
/// and `plunder`; the fleet subsystem fills those in when it records the
/// battle.
///
/// # Example
///
/// ```
/// use colony_core::combat::{simulate_combat, Forces, Winner};
/// use colony_core::data::StaticData;
/// use colony_core::kinds::{DefenseKind, UnitKind};
///
/// let data = StaticData::builtin();
/// let fleet = Forces::default().with_units(UnitKind::Battleship, 10);
/// let garrison = Forces::default().with_defenses(DefenseKind::RocketLauncher, 5);
///
/// let report = simulate_combat(&fleet, &garrison, &data, "Alice", "Raiders");
/// assert_eq!(report.winner, Winner::Attacker);
/// assert!(report.rounds.is_empty());
/// ```
#[must_use]
pub fn simulate_combat(
    attacker: &Forces,
    defender: &Forces,
    data: &StaticData,
    attacker_name: &str,
    defender_name: &str,
) -> CombatReport {
    let attacker_value = attacker.value(data);
    let defender_value = defender.value(data);

    if attacker_value == 0 && defender_value == 0 {
        return CombatReport {
            id: 0,
            timestamp: 0,
            location: Coord::default(),
            attacker: untouched_side(attacker_name, attacker),
            defender: untouched_side(defender_name, defender),
            winner: Winner::Draw,
            debris: ResourceBundle::ZERO,
            plunder: ResourceBundle::ZERO,
            rounds: Vec::new(),
        };
    }

    let a = u128::from(attacker_value);
    let d = u128::from(defender_value);
    let attacker_ratio = (ATTACKER_EDGE.1 * d, ATTACKER_EDGE.0 * a + ATTACKER_EDGE.1);
    let defender_ratio = (DEFENDER_EDGE.1 * a, DEFENDER_EDGE.0 * d + DEFENDER_EDGE.1);

    let attacker_losses = attacker.losses(attacker_ratio.0, attacker_ratio.1);
    let defender_losses = defender.losses(defender_ratio.0, defender_ratio.1);
    let attacker_lost_value = attacker_losses.value(data);
    let defender_lost_value = defender_losses.value(data);

    let winner = if attacker_lost_value < defender_lost_value {
        Winner::Attacker
    } else {
        Winner::Defender
    };

    let (am, ak) = attacker_losses.hull_materials(data);
    let (dm, dk) = defender_losses.hull_materials(data);
    let debris = ResourceBundle {
        metallum: Fixed::saturating_from_num(am.saturating_add(dm).saturating_mul(DEBRIS_PCT) / 100),
        kristallin: Fixed::saturating_from_num(ak.saturating_add(dk).saturating_mul(DEBRIS_PCT) / 100),
        plasma: Fixed::ZERO,
        energy: Fixed::ZERO,
    };

    tracing::debug!(
        attacker_value,
        defender_value,
        attacker_lost_value,
        defender_lost_value,
        ?winner,
        "combat resolved"
    );

    CombatReport {
        id: 0,
        timestamp: 0,
        location: Coord::default(),
        attacker: CombatSide {
            name: attacker_name.to_string(),
            initial: attacker.clone(),
            losses: attacker_losses,
            initial_value: attacker_value,
            lost_value: attacker_lost_value,
            loss_ratio: capped_ratio(attacker_ratio.0, attacker_ratio.1),
        },
        defender: CombatSide {
            name: defender_name.to_string(),
            initial: defender.clone(),
            losses: defender_losses,
            initial_value: defender_value,
            lost_value: defender_lost_value,
            loss_ratio: capped_ratio(defender_ratio.0, defender_ratio.1),
        },
        winner,
        debris,
        plunder: ResourceBundle::ZERO,
        rounds: Vec::new(),
    }
}

fn untouched_side(name: &str, forces: &Forces) -> CombatSide {
    CombatSide {
        name: name.to_string(),
        initial: forces.clone(),
        losses: Forces::default(),
        initial_value: 0,
        lost_value: 0,
        loss_ratio: Fixed::ZERO,
    }
}

/// `min(1, numerator / denominator)` as a fixed-point number.
fn capped_ratio(numerator: u128, denominator: u128) -> Fixed {
    let one = 1u128 << 32;
    if denominator == 0 || numerator >= denominator {
        return Fixed::ONE;
    }
    let bits = (numerator.saturating_mul(one) / denominator).min(one);
    Fixed::from_bits(i64::try_from(bits).unwrap_or(i64::MAX))
}
