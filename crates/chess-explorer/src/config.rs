//! Optional TOML configuration for the explorer.

use chess_rules::{NotationError, NotationStyle, PieceSymbols};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error(transparent)]
    Symbols(#[from] NotationError),
}

/// Settings read from `explorer.toml`.
///
/// ```toml
/// notation = "long"
///
/// [symbols]
/// knight = "S"
/// bishop = "L"
/// ```
#[derive(Debug, Deserialize, Serialize, Default, PartialEq, Eq)]
pub struct ExplorerConfig {
    #[serde(default)]
    pub notation: NotationStyle,
    #[serde(default)]
    pub symbols: PieceSymbols,
}

impl ExplorerConfig {
    /// Loads the given file, or `explorer.toml` when none is given.
    ///
    /// A missing default file yields the default configuration; a missing
    /// file that was asked for by name is an error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let (path, required) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => (Self::config_path(), false),
        };
        if !required && !path.exists() {
            return Ok(Self::default());
        }
        let content =
            std::fs::read_to_string(&path).map_err(|source| ConfigError::Read { path, source })?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.symbols.validate()?;
        Ok(config)
    }

    pub fn config_path() -> PathBuf {
        PathBuf::from("explorer.toml")
    }
}
