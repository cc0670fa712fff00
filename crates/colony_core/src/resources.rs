//! Resource kinds and fixed-point resource bundles.
//!
//! Metallum, Kristallin and Plasma are storable stock. Energy is a signed
//! net flow: it is recomputed every tick and never capped by storage.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::math::{fixed_serde, Fixed};

/// A resource tracked by a colony.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    /// Structural metal, the most common building material.
    Metallum,
    /// Crystalline compounds used by electronics and research.
    Kristallin,
    /// Refined plasma fuel for advanced ships and defenses.
    Plasma,
    /// Net power balance of the colony.
    Energy,
}

impl ResourceKind {
    /// All resource kinds in a stable order.
    pub const ALL: [Self; 4] = [Self::Metallum, Self::Kristallin, Self::Plasma, Self::Energy];

    /// Resources that are held as stock and limited by storage.
    pub const STORABLE: [Self; 3] = [Self::Metallum, Self::Kristallin, Self::Plasma];

    /// Whether this resource is capped by storage.
    #[must_use]
    pub const fn is_storable(self) -> bool {
        !matches!(self, Self::Energy)
    }

    /// Snake-case name used in data files and the CLI.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Metallum => "metallum",
            Self::Kristallin => "kristallin",
            Self::Plasma => "plasma",
            Self::Energy => "energy",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An amount of every resource kind.
///
/// Used for stock, storage capacity, costs, cargo, debris and plunder.
/// Fields serialize as raw fixed-point bits so persisted colonies restore
/// exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ResourceBundle {
    /// Metallum amount.
    #[serde(with = "fixed_serde", default)]
    pub metallum: Fixed,
    /// Kristallin amount.
    #[serde(with = "fixed_serde", default)]
    pub kristallin: Fixed,
    /// Plasma amount.
    #[serde(with = "fixed_serde", default)]
    pub plasma: Fixed,
    /// Energy amount (net flow when used as colony stock).
    #[serde(with = "fixed_serde", default)]
    pub energy: Fixed,
}

impl ResourceBundle {
    /// The empty bundle.
    pub const ZERO: Self = Self {
        metallum: Fixed::ZERO,
        kristallin: Fixed::ZERO,
        plasma: Fixed::ZERO,
        energy: Fixed::ZERO,
    };

    /// Create a bundle of storable resources from whole numbers.
    #[must_use]
    pub fn new(metallum: i32, kristallin: i32, plasma: i32) -> Self {
        Self {
            metallum: Fixed::from_num(metallum),
            kristallin: Fixed::from_num(kristallin),
            plasma: Fixed::from_num(plasma),
            energy: Fixed::ZERO,
        }
    }

    /// Amount of a single resource.
    #[must_use]
    pub const fn get(&self, kind: ResourceKind) -> Fixed {
        match kind {
            ResourceKind::Metallum => self.metallum,
            ResourceKind::Kristallin => self.kristallin,
            ResourceKind::Plasma => self.plasma,
            ResourceKind::Energy => self.energy,
        }
    }

    /// Mutable access to a single resource.
    pub fn get_mut(&mut self, kind: ResourceKind) -> &mut Fixed {
        match kind {
            ResourceKind::Metallum => &mut self.metallum,
            ResourceKind::Kristallin => &mut self.kristallin,
            ResourceKind::Plasma => &mut self.plasma,
            ResourceKind::Energy => &mut self.energy,
        }
    }

    /// Set a single resource.
    pub fn set(&mut self, kind: ResourceKind, amount: Fixed) {
        *self.get_mut(kind) = amount;
    }

    /// Multiply every component by a scalar.
    #[must_use]
    pub fn scaled(&self, factor: Fixed) -> Self {
        Self {
            metallum: self.metallum.saturating_mul(factor),
            kristallin: self.kristallin.saturating_mul(factor),
            plasma: self.plasma.saturating_mul(factor),
            energy: self.energy.saturating_mul(factor),
        }
    }

    /// Multiply every component by a whole count.
    #[must_use]
    pub fn times(&self, count: u64) -> Self {
        self.scaled(Fixed::saturating_from_num(count))
    }

    /// Round every component down to a whole amount.
    #[must_use]
    pub fn floored(&self) -> Self {
        Self {
            metallum: self.metallum.floor(),
            kristallin: self.kristallin.floor(),
            plasma: self.plasma.floor(),
            energy: self.energy.floor(),
        }
    }

    /// First storable resource that this stock cannot cover.
    #[must_use]
    pub fn first_shortfall(&self, cost: &Self) -> Option<ResourceKind> {
        ResourceKind::STORABLE
            .into_iter()
            .find(|&kind| self.get(kind) < cost.get(kind))
    }
}

impl std::ops::Add for ResourceBundle {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            metallum: self.metallum.saturating_add(rhs.metallum),
            kristallin: self.kristallin.saturating_add(rhs.kristallin),
            plasma: self.plasma.saturating_add(rhs.plasma),
            energy: self.energy.saturating_add(rhs.energy),
        }
    }
}

impl std::ops::Sub for ResourceBundle {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self {
            metallum: self.metallum.saturating_sub(rhs.metallum),
            kristallin: self.kristallin.saturating_sub(rhs.kristallin),
            plasma: self.plasma.saturating_sub(rhs.plasma),
            energy: self.energy.saturating_sub(rhs.energy),
        }
    }
}

impl std::ops::AddAssign for ResourceBundle {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl std::ops::SubAssign for ResourceBundle {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}
