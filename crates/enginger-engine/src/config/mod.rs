//! Project configuration (`config.json` at the project root).

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Window and shader selection read from `config.json`.
///
/// Every field is required.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigData {
    /// File name under `resources/shaders`.
    pub vertex_shader: String,
    /// File name under `resources/shaders`.
    pub fragment_shader: String,
    pub fullscreen: bool,
    pub borderless: bool,
    pub width: u32,
    pub height: u32,
}

impl ConfigData {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: Some(path.to_path_buf()),
            source,
        })?;
        log::info!(
            "config {}: {}x{} fullscreen={} borderless={}",
            path.display(),
            config.width,
            config.height,
            config.fullscreen,
            config.borderless
        );
        Ok(config)
    }

    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(text).map_err(|source| ConfigError::Parse { path: None, source })
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Read { path: PathBuf, source: io::Error },
    Parse { path: Option<PathBuf>, source: serde_json::Error },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Read { path, source } => {
                write!(f, "could not read config {}: {source}", path.display())
            }
            ConfigError::Parse { path: Some(path), source } => {
                write!(f, "invalid config {}: {source}", path.display())
            }
            ConfigError::Parse { path: None, source } => write!(f, "invalid config: {source}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Read { source, .. } => Some(source),
            ConfigError::Parse { source, .. } => Some(source),
        }
    }
}
