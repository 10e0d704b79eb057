//! Config file resolution.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{info, warn};
use warpsync::WarpsyncConfig;

fn default_config_path() -> Result<PathBuf> {
    let config_dir = dirs::config_dir().context("Failed to determine config directory")?;
    Ok(config_dir.join("warpsync").join("config.toml"))
}

fn default_data_dir() -> Result<PathBuf> {
    let data_dir = dirs::data_dir().context("Failed to determine data directory")?;
    Ok(data_dir.join("warpsync"))
}

/// Load the config at `path` (or the default location).
///
/// A missing file yields the defaults with the platform data directory.
pub fn load(path: Option<&Path>) -> Result<WarpsyncConfig> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => default_config_path()?,
    };

    match WarpsyncConfig::load(&path) {
        Ok(config) => {
            info!("Loaded config from {}", path.display());
            Ok(config)
        }
        Err(e) if e.is_not_found() => {
            warn!("No config at {}, using defaults", path.display());
            Ok(WarpsyncConfig::builder()
                .data_dir(default_data_dir()?)
                .build())
        }
        Err(e) => Err(e).with_context(|| format!("Failed to load config {}", path.display())),
    }
}
