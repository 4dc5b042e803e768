use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::LogLevel;

const APP_DIR_NAME: &str = "habitgem";
const CONFIG_FILE_NAME: &str = "app_config.json";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to access config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to encode config: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("No platform data directory available")]
    NoDataDir,
}

/// Which copy wins when a remote snapshot arrives during local writes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapshotPrecedence {
    /// Every snapshot replaces in-memory state on arrival.
    RemoteAlways,
    /// Snapshots are held back while this session has remote writes in
    /// flight; the newest one is applied once they settle.
    #[default]
    LocalWhileWriting,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Local cache key holding the serialized tracker document.
    pub cache_key: String,
    pub leaderboard_limit: u32,
    pub snapshot_precedence: SnapshotPrecedence,
    /// Enables the seven-day streak badge rule.
    pub week_streak_enabled: bool,
    pub subscription_buffer: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            cache_key: "habitgem.tracker".to_string(),
            leaderboard_limit: 20,
            snapshot_precedence: SnapshotPrecedence::default(),
            week_streak_enabled: false,
            subscription_buffer: 16,
        }
    }
}

/// Persistent configuration structure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub log_level: LogLevel,
    /// Overrides the platform data directory.
    pub data_dir: Option<PathBuf>,
    pub sync: SyncConfig,
}

impl AppConfig {
    /// `<config dir>/habitgem/app_config.json`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Loads the config file, falling back to defaults when it is missing
    /// or unreadable as JSON.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            info!("No config at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        match serde_json::from_str::<AppConfig>(&content) {
            Ok(config) => {
                info!("Config loaded from: {:?}", path);
                Ok(config)
            }
            Err(e) => {
                warn!("Ignoring malformed config {:?}: {}", path, e);
                Ok(Self::default())
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| ConfigError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        info!("Config saved to: {:?}", path);
        Ok(())
    }

    pub fn data_dir(&self) -> Result<PathBuf, ConfigError> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => dirs::data_local_dir()
                .map(|dir| dir.join(APP_DIR_NAME))
                .ok_or(ConfigError::NoDataDir),
        }
    }

    pub fn database_path(&self) -> Result<PathBuf, ConfigError> {
        let file_name = if cfg!(debug_assertions) {
            "habitgem-dev.db"
        } else {
            "habitgem.db"
        };
        Ok(self.data_dir()?.join(file_name))
    }

    pub fn cache_dir(&self) -> Result<PathBuf, ConfigError> {
        Ok(self.data_dir()?.join("cache"))
    }

    pub fn log_dir(&self) -> Result<PathBuf, ConfigError> {
        Ok(self.data_dir()?.join("logs"))
    }
}
