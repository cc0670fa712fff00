//! Colony persistence.
//!
//! Stores hold whole documents keyed by player id; there are no partial
//! updates. The core ships an in-memory store, file-backed stores live with
//! the binaries.

use std::collections::BTreeMap;

use crate::colony::Colony;
use crate::error::{ColonyError, Result};

/// Load and save whole colonies.
pub trait ColonyStore {
    /// Load a player's colony, `None` if they have none yet.
    fn load(&self, player: &str) -> Result<Option<Colony>>;

    /// Replace a player's colony.
    fn save(&mut self, player: &str, colony: &Colony) -> Result<()>;
}

/// Keeps colonies as bincode blobs in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    blobs: BTreeMap<String, Vec<u8>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored colonies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    /// Check if the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }

    /// Players with a stored colony, in order.
    pub fn players(&self) -> impl Iterator<Item = &str> {
        self.blobs.keys().map(String::as_str)
    }
}

impl ColonyStore for MemoryStore {
    fn load(&self, player: &str) -> Result<Option<Colony>> {
        let Some(bytes) = self.blobs.get(player) else {
            return Ok(None);
        };
        Colony::deserialize(bytes)
            .map(Some)
            .map_err(|e| ColonyError::Storage {
                player: player.to_string(),
                message: e.to_string(),
            })
    }

    fn save(&mut self, player: &str, colony: &Colony) -> Result<()> {
        let bytes = colony.serialize()?;
        self.blobs.insert(player.to_string(), bytes);
        tracing::debug!(player, "colony saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::Coord;
    use crate::kinds::UnitKind;
    use crate::resources::ResourceBundle;

    fn colony(id: &str) -> Colony {
        Colony::new(id, "Outpost", Coord::new(5, 5), ResourceBundle::new(100, 50, 0), 0)
    }

    #[test]
    fn test_missing_player_is_none() {
        let store = MemoryStore::new();
        assert!(store.load("nobody").unwrap().is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_save_then_load() {
        let mut store = MemoryStore::new();
        let mut saved = colony("alice");
        saved.units.insert(UnitKind::Cruiser, 3);
        store.save("alice", &saved).unwrap();

        let loaded = store.load("alice").unwrap().unwrap();
        assert_eq!(loaded, saved);
        assert_eq!(store.players().collect::<Vec<_>>(), vec!["alice"]);
    }

    #[test]
    fn test_save_replaces_document() {
        let mut store = MemoryStore::new();
        store.save("bob", &colony("bob")).unwrap();
        let mut updated = colony("bob");
        updated.name = "Renamed".to_string();
        store.save("bob", &updated).unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(store.load("bob").unwrap().unwrap().name, "Renamed");
    }

    #[test]
    fn test_corrupt_blob_reports_player() {
        let mut store = MemoryStore::new();
        store.blobs.insert("eve".to_string(), vec![0xff; 4]);
        let result = store.load("eve");
        assert!(matches!(result, Err(ColonyError::Storage { player, .. }) if player == "eve"));
    }
}
