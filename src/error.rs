//! Consolidated error types for the nebula library.
//!
//! All library modules use `crate::error::{Error, Result}`. The binary
//! crate (`main.rs`) uses `anyhow` for its own glue.

use std::path::PathBuf;

/// Convenience alias used throughout the library.
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for nebula library operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    // -- Config --
    #[error("failed to read config at {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config at {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    // -- Page index --
    #[error("failed to read page index at {path}: {source}")]
    IndexRead {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse page index {origin}: {source}")]
    IndexParse {
        origin: String,
        source: toml::de::Error,
    },
    #[error("invalid page record #{position}: {reason}")]
    InvalidRecord { position: usize, reason: String },

    // -- Storage --
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),
    #[error("failed to read stored value at {path}: {source}")]
    StorageRead {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to write stored value to {path}: {source}")]
    StorageWrite {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("stored value for '{key}' is corrupt: {source}")]
    StorageCorrupt {
        key: String,
        source: serde_json::Error,
    },
    #[error("failed to encode value for '{key}': {source}")]
    StorageEncode {
        key: String,
        source: serde_json::Error,
    },
}
