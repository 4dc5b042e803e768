mod app_config;
mod log_level;

pub use app_config::{AppConfig, ConfigError, SnapshotPrecedence, SyncConfig};
pub use log_level::LogLevel;
