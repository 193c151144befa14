//! Configuration file loading.
//!
//! Settings live in `karuah.toml` in the working directory. A missing file
//! means defaults.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use karuah_core::{FenError, FenParser};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::session::{SearchOptions, Session, SessionError};
use crate::tables::Tables;

/// Errors that can occur when loading or parsing configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse the configuration file as valid TOML.
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
    /// `start_fen` is not a valid FEN string.
    #[error("Invalid start position: {0}")]
    InvalidStartFen(#[from] FenError),
}

/// Engine settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct EngineConfig {
    /// Tracing filter used by front ends. Defaults to "info".
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Position new sessions start from; the standard start if unset.
    #[serde(default)]
    pub start_fen: Option<String>,
    /// Options handed to the search engine.
    #[serde(default)]
    pub search: SearchOptions,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            log_level: default_log_level(),
            start_fen: None,
            search: SearchOptions::default(),
        }
    }
}

impl EngineConfig {
    /// Loads `karuah.toml` from the working directory, or the defaults if
    /// there is no such file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ReadError`] if the file exists but cannot be
    /// read, [`ConfigError::ParseError`] for invalid TOML and
    /// [`ConfigError::InvalidStartFen`] for a bad `start_fen`.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path())
    }

    /// Like [`EngineConfig::load`] with an explicit path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            Self::parse(&content)
        } else {
            Ok(Self::default())
        }
    }

    /// Parses and validates configuration text.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = toml::from_str(content)?;
        if let Some(fen) = &config.start_fen {
            FenParser::parse(fen)?;
        }
        Ok(config)
    }

    /// Returns the path to the configuration file.
    pub fn config_path() -> PathBuf {
        PathBuf::from("karuah.toml")
    }

    /// A session set up from these settings.
    pub fn session(&self, tables: Arc<Tables>) -> Result<Session, SessionError> {
        let mut session = Session::with_start(tables, self.start_fen.as_deref())?;
        session.set_options(self.search.clone());
        Ok(session)
    }
}
