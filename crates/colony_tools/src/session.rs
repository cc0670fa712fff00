//! Loading settings and colonies for one CLI invocation.

use std::path::Path;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use colony_core::config::EngineConfig;
use colony_core::data::StaticData;
use colony_core::map_generation::{generate, MapData};
use colony_core::simulation::ColonyEngine;
use colony_core::store::ColonyStore;

use crate::error::{Result, ToolError};
use crate::file_store::JsonFileStore;

/// Wall-clock Unix milliseconds.
#[must_use]
pub fn unix_now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
}

/// Engine settings from a RON file, or the defaults.
pub fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    let Some(path) = path else {
        return Ok(EngineConfig::default());
    };
    let text = std::fs::read_to_string(path).map_err(|e| ToolError::io(path, e))?;
    Ok(EngineConfig::from_ron_str(&text, &path.display().to_string())?)
}

/// Static data from a RON file, or the built-in tables.
pub fn load_data(path: Option<&Path>) -> Result<StaticData> {
    let Some(path) = path else {
        return Ok(StaticData::builtin());
    };
    let text = std::fs::read_to_string(path).map_err(|e| ToolError::io(path, e))?;
    Ok(StaticData::from_ron_str(&text, &path.display().to_string())?)
}

/// Everything a command needs: the store, the shared map and data, and the
/// settings they were built from.
#[derive(Debug)]
pub struct Session {
    store: JsonFileStore,
    map: Arc<MapData>,
    data: Arc<StaticData>,
    config: EngineConfig,
}

impl Session {
    /// Generate the map for `config` and wrap the store.
    #[must_use]
    pub fn new(store: JsonFileStore, data: StaticData, config: EngineConfig) -> Self {
        let map = Arc::new(generate(config.map_size, config.map_seed));
        Self {
            store,
            map,
            data: Arc::new(data),
            config,
        }
    }

    /// The generated map.
    #[must_use]
    pub fn map(&self) -> &MapData {
        &self.map
    }

    /// The colony store.
    pub fn store_mut(&mut self) -> &mut JsonFileStore {
        &mut self.store
    }

    /// Load a player's colony, founding one at `now` if none is saved.
    pub fn open(&self, player: &str, now: u64) -> Result<ColonyEngine> {
        let engine = match self.store.load(player)? {
            Some(colony) => {
                tracing::debug!(player, last_updated = colony.last_updated, "colony loaded");
                ColonyEngine::new(
                    Arc::clone(&self.map),
                    Arc::clone(&self.data),
                    self.config.clone(),
                    colony,
                )
            }
            None => ColonyEngine::new_colony(
                Arc::clone(&self.map),
                Arc::clone(&self.data),
                self.config.clone(),
                player,
                player,
                now,
            ),
        };
        Ok(engine)
    }

    /// Persist the engine's colony under its player id.
    pub fn save(&mut self, engine: &ColonyEngine) -> Result<()> {
        let colony = engine.colony();
        self.store.save(&colony.id, colony)?;
        Ok(())
    }
}
