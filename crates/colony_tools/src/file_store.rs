//! Colony store backed by one JSON document per player.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use colony_core::colony::Colony;
use colony_core::error::{ColonyError, Result};
use colony_core::store::ColonyStore;

/// Keeps each colony at `<dir>/<player>.json`.
///
/// Saves go through a temporary file and a rename, so a crash mid-write
/// leaves the previous document intact.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    /// Store under `dir`, created on first save.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory holding the documents.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of a player's document.
    ///
    /// # Errors
    ///
    /// Rejects ids that are empty or could escape the directory.
    pub fn path_for(&self, player: &str) -> Result<PathBuf> {
        let valid = !player.is_empty()
            && player
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(storage_error(player, "player id must be ASCII letters, digits, '-' or '_'"));
        }
        Ok(self.dir.join(format!("{player}.json")))
    }
}

fn storage_error(player: &str, message: impl ToString) -> ColonyError {
    ColonyError::Storage {
        player: player.to_string(),
        message: message.to_string(),
    }
}

impl ColonyStore for JsonFileStore {
    fn load(&self, player: &str) -> Result<Option<Colony>> {
        let path = self.path_for(player)?;
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(storage_error(player, format!("{}: {e}", path.display()))),
        };
        let mut colony: Colony = serde_json::from_slice(&bytes)
            .map_err(|e| storage_error(player, format!("{}: {e}", path.display())))?;
        colony.normalize();
        Ok(Some(colony))
    }

    fn save(&mut self, player: &str, colony: &Colony) -> Result<()> {
        let path = self.path_for(player)?;
        fs::create_dir_all(&self.dir)
            .map_err(|e| storage_error(player, format!("{}: {e}", self.dir.display())))?;

        let data = serde_json::to_vec_pretty(colony).map_err(|e| storage_error(player, e))?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, data).map_err(|e| storage_error(player, format!("{}: {e}", tmp.display())))?;
        fs::rename(&tmp, &path).map_err(|e| storage_error(player, format!("{}: {e}", path.display())))?;

        tracing::debug!(player, path = %path.display(), "colony saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use colony_core::kinds::{BuildingKind, UnitKind};
    use colony_test_utils::fixtures::{developed_colony, T0};

    #[test]
    fn test_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());
        assert!(store.load("alice").unwrap().is_none());
    }

    #[test]
    fn test_save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = JsonFileStore::new(dir.path().join("saves"));
        let mut colony = developed_colony(T0);
        colony.buildings.insert(BuildingKind::Shipyard, 5);
        colony.units.insert(UnitKind::Battleship, 2);
        colony.reveal(colony_core::coords::Coord::new(3, 4), T0);

        store.save("alice", &colony).unwrap();
        assert!(dir.path().join("saves/alice.json").exists());

        let loaded = store.load("alice").unwrap().unwrap();
        assert_eq!(loaded, colony);
    }

    #[test]
    fn test_document_uses_readable_keys() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = JsonFileStore::new(dir.path());
        store.save("bob", &developed_colony(T0)).unwrap();

        let text = fs::read_to_string(dir.path().join("bob.json")).unwrap();
        assert!(text.contains("\"metallum_mine\""));
        assert!(text.contains("\"10:10\""));
    }

    #[test]
    fn test_rejects_path_like_ids() {
        let store = JsonFileStore::new("/tmp");
        for bad in ["", "../etc", "a/b", "x.json"] {
            assert!(store.path_for(bad).is_err(), "{bad:?} accepted");
        }
        assert!(store.path_for("player_1").is_ok());
    }

    #[test]
    fn test_corrupt_document_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("eve.json"), b"{ not json").unwrap();
        let store = JsonFileStore::new(dir.path());
        assert!(matches!(store.load("eve"), Err(ColonyError::Storage { .. })));
    }
}
