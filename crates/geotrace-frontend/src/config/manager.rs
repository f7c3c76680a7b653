//! Loading and saving `config.ron`

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use thiserror::Error;

use super::AppConfig;

/// Config shared between the app and its panels
pub type SharedConfig = Arc<RwLock<ConfigManager>>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid config file: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("Serialization error: {0}")]
    Serialize(#[from] ron::Error),
}

/// Owns the current [`AppConfig`] and the file it is persisted to
pub struct ConfigManager {
    config: AppConfig,
    config_path: PathBuf,
    dirty: bool,
}

impl ConfigManager {
    /// Manager for `<config dir>/geotrace/config.ron`
    pub fn new() -> Self {
        let dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("geotrace");
        Self::with_path(dir.join("config.ron"))
    }

    /// Manager backed by `config_path`. A missing or unreadable file yields defaults.
    pub fn with_path(config_path: PathBuf) -> Self {
        let config = match Self::read(&config_path) {
            Ok(Some(config)) => {
                tracing::info!("Loaded config from {}", config_path.display());
                config
            }
            Ok(None) => {
                tracing::info!("No config at {}, using defaults", config_path.display());
                AppConfig::new()
            }
            Err(e) => {
                tracing::warn!("Ignoring config at {}: {}", config_path.display(), e);
                AppConfig::new()
            }
        };

        Self {
            config,
            config_path,
            dirty: false,
        }
    }

    fn read(path: &Path) -> Result<Option<AppConfig>, ConfigError> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(ron::from_str(&text)?))
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Mutable access; marks the config as needing a save
    pub fn config_mut(&mut self) -> &mut AppConfig {
        self.dirty = true;
        &mut self.config
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Write the config if it changed since the last save
    pub fn save(&mut self) -> Result<(), ConfigError> {
        if !self.dirty {
            return Ok(());
        }

        if let Some(parent) = self.config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let text = ron::ser::to_string_pretty(&self.config, ron::ser::PrettyConfig::default())?;
        std::fs::write(&self.config_path, text)?;

        tracing::info!("Saved config to {}", self.config_path.display());
        self.dirty = false;
        Ok(())
    }

    /// Replace every setting with its default; call [`save`](Self::save) to persist
    pub fn reset_to_defaults(&mut self) {
        self.config = AppConfig::new();
        self.dirty = true;
    }

    pub fn config_file_path(&self) -> &Path {
        &self.config_path
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

pub fn create_shared_config() -> SharedConfig {
    Arc::new(RwLock::new(ConfigManager::new()))
}
