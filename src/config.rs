//! Configuration management for the launcher asset store
//!
//! Startup-only configuration: the storage root and bundled-asset root are
//! resolved once at process start and never change for the process
//! lifetime.

use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;

/// Complete store configuration, loaded once at startup
#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    /// Private writable directory this process is confined to
    pub storage_root: String,

    /// Read-only bundled asset tree shipped with the launcher
    pub asset_root: String,

    /// Chunk size for asset copies during initialization
    pub copy_buffer_size: usize,
}

impl StoreConfig {
    /// Load configuration from config.toml with environment overrides
    pub fn load() -> Result<Self, config::ConfigError> {
        let settings = Config::builder()
            .set_default("copy_buffer_size", 8192)?
            .add_source(File::with_name("config").required(false))
            .add_source(Environment::with_prefix("LAUNCHER"))
            .build()?;

        let config: StoreConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), config::ConfigError> {
        if self.storage_root.is_empty() {
            return Err(config::ConfigError::Message(
                "storage_root cannot be empty".into(),
            ));
        }

        if self.asset_root.is_empty() {
            return Err(config::ConfigError::Message(
                "asset_root cannot be empty".into(),
            ));
        }

        if self.copy_buffer_size == 0 {
            return Err(config::ConfigError::Message(
                "copy_buffer_size must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Get storage root as PathBuf
    pub fn storage_root_path(&self) -> PathBuf {
        PathBuf::from(&self.storage_root)
    }

    /// Get asset root as PathBuf
    pub fn asset_root_path(&self) -> PathBuf {
        PathBuf::from(&self.asset_root)
    }
}
