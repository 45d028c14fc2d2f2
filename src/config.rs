//! Runtime configuration loaded from TOML.
//!
//! ```toml
//! # Snapshot file; omit to keep rules in memory only.
//! store_path = "data/rules.rdck"
//! cache_capacity = 256
//! log_filter = "ruledeck=debug"
//! ```
//!
//! Every key is optional. The binary lets command-line flags and
//! environment variables override what the file says.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::cache::DEFAULT_CACHE_CAPACITY;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Snapshot file backing the registry.
    pub store_path: Option<PathBuf>,
    /// Decoded trees kept in memory.
    pub cache_capacity: usize,
    /// `tracing_subscriber::EnvFilter` directive used when `RUST_LOG` is unset.
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_path: None,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            log_filter: "info".to_owned(),
        }
    }
}

impl Config {
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML or unknown keys.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        debug!(path = %path.display(), ?config, "loaded config");
        Ok(config)
    }
}
