//! JSON Configuration Management
//!
//! Handles reading and writing the application configuration file.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::models::settings::AppConfig;
use crate::utils::error::{AppError, AppResult};
use crate::utils::paths::{config_path, ensure_parent_dir};

/// Configuration service for managing app settings
#[derive(Debug)]
pub struct ConfigService {
    config_path: PathBuf,
    config: AppConfig,
}

impl ConfigService {
    /// Load the config at the default location (~/.course-assistant/config.json)
    pub fn new() -> AppResult<Self> {
        Self::open(&config_path()?)
    }

    /// Load the config at `path`, writing defaults there if it does not exist.
    ///
    /// Environment overrides are applied to the in-memory copy only, so an
    /// API key from the environment never lands in the file.
    pub fn open(path: &Path) -> AppResult<Self> {
        let file_config = if path.exists() {
            debug!(path = %path.display(), "loading config");
            Self::load_from_file(path)?
        } else {
            info!(path = %path.display(), "writing default config");
            ensure_parent_dir(path)?;
            let default_config = AppConfig::default();
            Self::save_to_file(path, &default_config)?;
            default_config
        };

        let mut config = file_config;
        config.apply_env_overrides().map_err(AppError::config)?;
        config.validate().map_err(AppError::validation)?;

        Ok(Self {
            config_path: path.to_path_buf(),
            config,
        })
    }

    /// Load configuration from a file
    fn load_from_file(path: &Path) -> AppResult<AppConfig> {
        let content = fs::read_to_string(path)?;
        let config: AppConfig = serde_json::from_str(&content)?;
        config.validate().map_err(AppError::validation)?;
        Ok(config)
    }

    /// Save configuration to a file with pretty formatting
    fn save_to_file(path: &Path, config: &AppConfig) -> AppResult<()> {
        config.validate().map_err(AppError::validation)?;
        let content = serde_json::to_string_pretty(config)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Get the current configuration
    pub fn get_config(&self) -> &AppConfig {
        &self.config
    }

    /// Get a clone of the current configuration
    pub fn get_config_clone(&self) -> AppConfig {
        self.config.clone()
    }

    /// Path the configuration was loaded from
    pub fn path(&self) -> &Path {
        &self.config_path
    }
}
