//! Trek configuration.
//!
//! Loaded from `~/.trek/config.toml`. The file is optional; every field
//! has a default.

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Trek configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    /// The trip used when `--trip` is not provided: a full UUID or an
    /// unambiguous prefix.
    pub default_trip: Option<String>,
}

impl Config {
    /// Load config from `~/.trek/config.toml`.
    /// A missing file yields the defaults; an unreadable or malformed
    /// file is an error.
    pub fn load() -> Result<Self, String> {
        let Some(path) = Self::path() else {
            return Ok(Self::default());
        };

        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .map_err(|e| format!("failed to read {}: {e}", path.display()))?;

        toml::from_str(&contents).map_err(|e| format!("invalid config at {}: {e}", path.display()))
    }

    /// The config file path: `~/.trek/config.toml`.
    pub fn path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".trek").join("config.toml"))
    }
}
