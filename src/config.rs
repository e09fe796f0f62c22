//! Hosting configuration

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{HostingError, Result};
use crate::resolve::DEFAULT_MEDIA_PLAYLIST_NAME;

/// Hosting tree layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostingSettings {
    /// Root directory, relative to the output directory, that the master
    /// playlist is written to
    pub root: String,

    /// File name of each media playlist inside its index directory
    pub media_playlist_name: String,
}

impl Default for HostingSettings {
    fn default() -> Self {
        Self {
            root: String::new(),
            media_playlist_name: DEFAULT_MEDIA_PLAYLIST_NAME.to_string(),
        }
    }
}

/// Rendered playlist cache configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Maximum memory usage for cached playlists in megabytes
    pub max_memory_mb: usize,

    /// Maximum number of cached playlists
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_memory_mb: 64,
            max_entries: 1024,
        }
    }
}

impl CacheConfig {
    /// Get maximum memory in bytes
    pub fn max_memory_bytes(&self) -> usize {
        self.max_memory_mb.saturating_mul(1024 * 1024)
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Output format (json, pretty)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl LoggingConfig {
    pub fn is_json(&self) -> bool {
        self.format.eq_ignore_ascii_case("json")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostingConfig {
    pub hosting: HostingSettings,
    pub cache: CacheConfig,
    pub logging: LoggingConfig,
}

impl HostingConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        toml::from_str(&content).map_err(|e| HostingError::Config(e.to_string()))
    }

    /// Save configuration to a TOML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| HostingError::Config(e.to_string()))?;
        std::fs::write(path.as_ref(), content)?;
        Ok(())
    }

    /// Load `path` when it exists, falling back to defaults otherwise
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            return Self::default();
        }
        match Self::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(
                    "Failed to load config file {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }
}
