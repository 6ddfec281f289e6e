//! CLI configuration: config file loading and flag/config resolution.
//!
//! The config file lives at `~/.config/nebula/config.toml`. Every section
//! and key is optional.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::rank::ScoreWeights;
use crate::recent;

/// Top-level nebula configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NebulaConfig {
    pub index: IndexConfig,
    pub storage: StorageConfig,
    pub search: SearchConfig,
    pub weights: ScoreWeights,
}

/// `[index]` section: where the page index comes from.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// TOML page index. The built-in index is used when unset.
    pub path: Option<PathBuf>,
}

/// `[storage]` section: where recent searches are kept.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub dir: Option<PathBuf>,
}

/// `[search]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Paths shown as quick links on the empty-query panel.
    pub quick_links: Vec<String>,
}

/// Load configuration from `~/.config/nebula/config.toml`.
///
/// Returns defaults if the file is absent. Errors if present but malformed.
pub fn load_config() -> Result<NebulaConfig> {
    let path = config_dir().join("config.toml");
    if !path.is_file() {
        return Ok(NebulaConfig::default());
    }
    load_config_from(&path)
}

/// Load configuration from a specific path.
pub fn load_config_from(path: &Path) -> Result<NebulaConfig> {
    let raw = std::fs::read_to_string(path).map_err(|source| Error::ConfigRead {
        path: path.to_path_buf(),
        source,
    })?;
    let config: NebulaConfig = toml::from_str(&raw).map_err(|source| Error::ConfigParse {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(path = %path.display(), "Loaded config");
    Ok(config)
}

/// Page index path. Priority: flag > config > built-in (`None`).
pub fn resolve_index_path(flag: Option<&Path>, config: &NebulaConfig) -> Option<PathBuf> {
    flag.map(Path::to_path_buf)
        .or_else(|| config.index.path.clone())
}

/// Recent-search directory. Priority: flag > config > default state dir.
pub fn resolve_state_dir(flag: Option<&Path>, config: &NebulaConfig) -> PathBuf {
    flag.map(Path::to_path_buf)
        .or_else(|| config.storage.dir.clone())
        .unwrap_or_else(recent::default_state_dir)
}

/// The nebula config directory: `~/.config/nebula/`.
pub fn config_dir() -> PathBuf {
    if let Ok(home) = std::env::var("HOME") {
        PathBuf::from(home).join(".config").join("nebula")
    } else {
        PathBuf::from("/tmp").join("nebula").join("config")
    }
}
