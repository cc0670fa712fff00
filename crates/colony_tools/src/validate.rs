//! Data validation utilities.

use std::path::Path;

use colony_core::config::EngineConfig;
use colony_core::data::StaticData;

use crate::error::{Result, ToolError};

/// Parse and validate a static data file.
///
/// # Errors
///
/// Returns an error if the file cannot be read, is not valid RON or fails
/// [`StaticData::validate`].
pub fn validate_data_file(path: &Path) -> Result<StaticData> {
    let text = std::fs::read_to_string(path).map_err(|e| ToolError::io(path, e))?;
    let data = StaticData::from_ron_str(&text, &path.display().to_string())?;
    tracing::info!(
        path = %path.display(),
        buildings = data.buildings.len(),
        research = data.research.len(),
        units = data.units.len(),
        defenses = data.defenses.len(),
        "static data valid"
    );
    Ok(data)
}

/// Parse and validate an engine configuration file.
///
/// # Errors
///
/// Returns an error if the file cannot be read, is not valid RON or fails
/// [`EngineConfig::validate`].
pub fn validate_config_file(path: &Path) -> Result<EngineConfig> {
    let text = std::fs::read_to_string(path).map_err(|e| ToolError::io(path, e))?;
    let config = EngineConfig::from_ron_str(&text, &path.display().to_string())?;
    tracing::info!(path = %path.display(), map_size = config.map_size, "config valid");
    Ok(config)
}

/// Validate every `.ron` file in a directory as static data, returning how
/// many were checked.
///
/// # Errors
///
/// Stops at the first unreadable directory or invalid file.
pub fn validate_data_directory(dir: &Path) -> Result<usize> {
    let mut paths: Vec<_> = std::fs::read_dir(dir)
        .map_err(|e| ToolError::io(dir, e))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().is_some_and(|ext| ext == "ron"))
        .collect();
    paths.sort();
    for path in &paths {
        validate_data_file(path)?;
    }
    Ok(paths.len())
}
