//! JSON configuration file adapter.
//!
//! Implements [`ConfigPort`] over an optional path.  With no path the
//! built-in defaults are used; with a path the file must exist, parse,
//! and validate.  A missing field inside the file takes its default.

use std::io::ErrorKind;
use std::path::PathBuf;

use log::{info, warn};

use crate::app::ports::{ConfigError, ConfigPort};
use crate::config::SystemConfig;

/// Upper bound on the file size; anything larger is not a config.
const MAX_FILE_SIZE: u64 = 64 * 1024;

#[derive(Debug, Clone, Default)]
pub struct JsonConfigFile {
    path: Option<PathBuf>,
}

impl JsonConfigFile {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }

    /// Parse and validate a config from raw bytes.
    pub fn parse(bytes: &[u8]) -> Result<SystemConfig, ConfigError> {
        let config: SystemConfig = serde_json::from_slice(bytes).map_err(|e| {
            warn!("Config parse error: {e}");
            ConfigError::Corrupted
        })?;
        config.validate().map_err(ConfigError::ValidationFailed)?;
        Ok(config)
    }
}

impl ConfigPort for JsonConfigFile {
    fn load(&self) -> Result<SystemConfig, ConfigError> {
        let Some(path) = &self.path else {
            info!("No config file given, using defaults");
            let config = SystemConfig::default();
            config.validate().map_err(ConfigError::ValidationFailed)?;
            return Ok(config);
        };

        let meta = std::fs::metadata(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => ConfigError::NotFound,
            _ => ConfigError::IoError,
        })?;
        if meta.len() > MAX_FILE_SIZE {
            warn!("Config file {} is {} bytes, refusing", path.display(), meta.len());
            return Err(ConfigError::Corrupted);
        }

        let bytes = std::fs::read(path).map_err(|_| ConfigError::IoError)?;
        let config = Self::parse(&bytes)?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }
}
