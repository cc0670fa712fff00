//! The colony aggregate: everything one player owns.
//!
//! A [`Colony`] is plain serializable data. It is mutated only by the tick
//! orchestrator ([`ColonyEngine`](crate::simulation::ColonyEngine)) and the
//! explicit command functions; nothing else holds a mutable reference.

use std::collections::hash_map::DefaultHasher;
use std::collections::{BTreeMap, VecDeque};
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::combat::CombatReport;
use crate::coords::Coord;
use crate::error::{ColonyError, Result};
use crate::fleet::ActiveFleet;
use crate::kinds::{BuildingKind, DefenseKind, QueueKind, ResearchKind, UnitKind};
use crate::math::Fixed;
use crate::production::QueueItem;
use crate::resources::{ResourceBundle, ResourceKind};

/// Identifier for queue items, fleets and combat reports.
pub type EntityId = u64;

/// When a tile was last observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Visibility {
    /// Unix milliseconds of the last reveal.
    pub last_seen: u64,
}

/// A player's persistent game state.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Colony {
    /// Owning player id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Home tile.
    pub home: Coord,
    /// Current stock. Energy holds the signed net flow.
    pub resources: ResourceBundle,
    /// Capacity per storable resource. The energy component is unused.
    pub storage: ResourceBundle,
    /// Building levels.
    pub buildings: BTreeMap<BuildingKind, u32>,
    /// Research levels.
    pub research: BTreeMap<ResearchKind, u32>,
    /// Docked ships.
    pub units: BTreeMap<UnitKind, u32>,
    /// Built defenses.
    pub defenses: BTreeMap<DefenseKind, u32>,
    /// Pending building upgrades, front first.
    pub building_queue: VecDeque<QueueItem>,
    /// Pending research, front first.
    pub research_queue: VecDeque<QueueItem>,
    /// Pending ships and defenses in order of acceptance.
    pub shipyard_queue: VecDeque<QueueItem>,
    /// Fleets in transit.
    pub active_fleets: Vec<ActiveFleet>,
    /// Revealed tiles and when they were last seen.
    pub map_visibility: BTreeMap<Coord, Visibility>,
    /// Combat history, most recent first.
    pub combat_reports: VecDeque<CombatReport>,
    /// Unix milliseconds of the last tick.
    pub last_updated: u64,
    /// Next identifier to hand out.
    #[serde(default = "first_id")]
    pub next_id: EntityId,
}

const fn first_id() -> EntityId {
    1
}

impl Colony {
    /// Create a colony at `home` with the given starting stock, empty queues
    /// and its home tile revealed.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        home: Coord,
        resources: ResourceBundle,
        now: u64,
    ) -> Self {
        let mut colony = Self {
            id: id.into(),
            name: name.into(),
            home,
            resources,
            storage: ResourceBundle::ZERO,
            buildings: BTreeMap::new(),
            research: BTreeMap::new(),
            units: BTreeMap::new(),
            defenses: BTreeMap::new(),
            building_queue: VecDeque::new(),
            research_queue: VecDeque::new(),
            shipyard_queue: VecDeque::new(),
            active_fleets: Vec::new(),
            map_visibility: BTreeMap::new(),
            combat_reports: VecDeque::new(),
            last_updated: now,
            next_id: first_id(),
        };
        colony.map_visibility.insert(home, Visibility { last_seen: now });
        colony.normalize();
        colony
    }

    /// Fill every missing enum key with zero.
    ///
    /// Persisted colonies written by older data sets may lack newer kinds;
    /// after `normalize` every lookup finds an entry.
    pub fn normalize(&mut self) {
        for &kind in BuildingKind::ALL {
            self.buildings.entry(kind).or_insert(0);
        }
        for &kind in ResearchKind::ALL {
            self.research.entry(kind).or_insert(0);
        }
        for &kind in UnitKind::ALL {
            self.units.entry(kind).or_insert(0);
        }
        for &kind in DefenseKind::ALL {
            self.defenses.entry(kind).or_insert(0);
        }
        if self.next_id == 0 {
            self.next_id = first_id();
        }
    }

    /// Hand out the next identifier.
    pub fn allocate_id(&mut self) -> EntityId {
        let id = self.next_id;
        self.next_id = self.next_id.saturating_add(1);
        id
    }

    /// Current level of a building.
    #[must_use]
    pub fn building_level(&self, kind: BuildingKind) -> u32 {
        self.buildings.get(&kind).copied().unwrap_or(0)
    }

    /// Current level of a research.
    #[must_use]
    pub fn research_level(&self, kind: ResearchKind) -> u32 {
        self.research.get(&kind).copied().unwrap_or(0)
    }

    /// Docked ships of a kind.
    #[must_use]
    pub fn unit_count(&self, kind: UnitKind) -> u32 {
        self.units.get(&kind).copied().unwrap_or(0)
    }

    /// Built defenses of a kind.
    #[must_use]
    pub fn defense_count(&self, kind: DefenseKind) -> u32 {
        self.defenses.get(&kind).copied().unwrap_or(0)
    }

    /// A construction queue.
    #[must_use]
    pub const fn queue(&self, kind: QueueKind) -> &VecDeque<QueueItem> {
        match kind {
            QueueKind::Building => &self.building_queue,
            QueueKind::Research => &self.research_queue,
            QueueKind::Shipyard => &self.shipyard_queue,
        }
    }

    /// Mutable access to a construction queue.
    pub fn queue_mut(&mut self, kind: QueueKind) -> &mut VecDeque<QueueItem> {
        match kind {
            QueueKind::Building => &mut self.building_queue,
            QueueKind::Research => &mut self.research_queue,
            QueueKind::Shipyard => &mut self.shipyard_queue,
        }
    }

    /// Mark a tile as seen at `now`.
    pub fn reveal(&mut self, coord: Coord, now: u64) {
        self.map_visibility
            .insert(coord, Visibility { last_seen: now });
    }

    /// Broken invariants, empty when the colony is consistent.
    ///
    /// Checks stock against storage and that identifiers stay below
    /// `next_id`.
    #[must_use]
    pub fn invariant_violations(&self) -> Vec<String> {
        let mut violations = Vec::new();
        for resource in ResourceKind::STORABLE {
            let amount = self.resources.get(resource);
            if amount < Fixed::ZERO {
                violations.push(format!("{resource} is negative ({amount})"));
            }
            if amount > self.storage.get(resource) {
                violations.push(format!(
                    "{resource} {amount} exceeds storage {}",
                    self.storage.get(resource)
                ));
            }
        }
        let ids = QueueKind::ALL
            .iter()
            .flat_map(|&q| self.queue(q).iter().map(|item| item.id))
            .chain(self.active_fleets.iter().map(|f| f.id))
            .chain(self.combat_reports.iter().map(|r| r.id));
        for id in ids {
            if id >= self.next_id {
                violations.push(format!("id {id} not below next_id {}", self.next_id));
            }
        }
        violations
    }

    /// Hash of the full colony state, for determinism checks.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.hash(&mut hasher);
        hasher.finish()
    }

    /// Serialize the colony to bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn serialize(&self) -> Result<Vec<u8>> {
        bincode::serialize(self)
            .map_err(|e| ColonyError::Serialization(format!("Failed to serialize colony: {e}")))
    }

    /// Deserialize a colony from bytes and normalize it.
    ///
    /// # Errors
    ///
    /// Returns an error if deserialization fails.
    pub fn deserialize(data: &[u8]) -> Result<Self> {
        let mut colony: Self = bincode::deserialize(data).map_err(|e| {
            ColonyError::Serialization(format!("Failed to deserialize colony: {e}"))
        })?;
        colony.normalize();
        Ok(colony)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_colony() -> Colony {
        Colony::new(
            "player-1",
            "New Eden",
            Coord::new(25, 25),
            ResourceBundle::new(500, 300, 0),
            1_000,
        )
    }

    #[test]
    fn test_new_colony_is_normalized() {
        let colony = sample_colony();
        assert_eq!(colony.buildings.len(), BuildingKind::ALL.len());
        assert_eq!(colony.units.len(), UnitKind::ALL.len());
        assert_eq!(colony.building_level(BuildingKind::Shipyard), 0);
        assert_eq!(
            colony.map_visibility.get(&Coord::new(25, 25)),
            Some(&Visibility { last_seen: 1_000 })
        );
        assert_eq!(colony.next_id, 1);
    }

    #[test]
    fn test_allocate_id_is_monotonic() {
        let mut colony = sample_colony();
        assert_eq!(colony.allocate_id(), 1);
        assert_eq!(colony.allocate_id(), 2);
        assert_eq!(colony.next_id, 3);
    }

    #[test]
    fn test_normalize_fills_missing_keys() {
        let mut colony = sample_colony();
        colony.research.clear();
        colony.defenses.remove(&DefenseKind::ShieldDome);
        colony.normalize();
        assert_eq!(colony.research.len(), ResearchKind::ALL.len());
        assert_eq!(colony.defense_count(DefenseKind::ShieldDome), 0);
    }

    #[test]
    fn test_serialization_round_trip() {
        let mut colony = sample_colony();
        colony.buildings.insert(BuildingKind::MetallumMine, 4);
        let bytes = colony.serialize().unwrap();
        let restored = Colony::deserialize(&bytes).unwrap();
        assert_eq!(colony, restored);
        assert_eq!(colony.state_hash(), restored.state_hash());
    }

    #[test]
    fn test_state_hash_tracks_changes() {
        let colony = sample_colony();
        let mut changed = colony.clone();
        changed.units.insert(UnitKind::SmallCargo, 1);
        assert_ne!(colony.state_hash(), changed.state_hash());
    }

    #[test]
    fn test_invariant_violations() {
        let mut colony = sample_colony();
        colony.storage = ResourceBundle::new(10_000, 10_000, 10_000);
        assert!(colony.invariant_violations().is_empty());

        colony.resources.metallum = Fixed::from_num(20_000);
        let violations = colony.invariant_violations();
        assert_eq!(violations.len(), 1);
        assert!(violations[0].contains("metallum"));
    }

    #[test]
    fn test_corrupt_bytes_rejected() {
        let result = Colony::deserialize(&[1, 2, 3]);
        assert!(matches!(result, Err(ColonyError::Serialization(_))));
    }
}
