//! Configuration management for the CNR game launcher
//!
//! Resolves where the record store, uploaded media and backups live, plus the
//! default log filter. Values are layered: built-in defaults, then an optional
//! TOML file, then `CNR_*` environment variables.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(PathBuf),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

/// Application name used for platform directories
pub const APP_NAME: &str = "cnr-game-launcher";

/// Prefix for environment overrides (`CNR_DATA_DIR`, `CNR_LOG_LEVEL`, ...)
pub const ENV_PREFIX: &str = "CNR";

/// File name of the record store inside the data directory
pub const DEFAULT_STORE_FILE: &str = "config.json";

/// Name of the uploads directory inside the data directory
pub const UPLOADS_DIR_NAME: &str = "uploads";

/// Name of the folder created inside an export destination
pub const DEFAULT_BACKUP_DIR_NAME: &str = "cnr-game-launcher-backup";

/// Launcher configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LauncherConfig {
    /// Directory holding the record store and uploads
    pub data_dir: PathBuf,

    /// Record store file name, relative to `data_dir`
    #[serde(default = "default_store_file")]
    pub store_file: String,

    /// Uploads directory; defaults to `<data_dir>/uploads`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uploads_dir: Option<PathBuf>,

    /// Default tracing filter directive
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Folder name used by backup export
    #[serde(default = "default_backup_dir_name")]
    pub backup_dir_name: String,
}

fn default_store_file() -> String {
    DEFAULT_STORE_FILE.to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_backup_dir_name() -> String {
    DEFAULT_BACKUP_DIR_NAME.to_string()
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self::with_data_dir(default_data_dir())
    }
}

/// Platform data directory for the launcher
///
/// - Linux: `~/.local/share/cnr-game-launcher`
/// - macOS: `~/Library/Application Support/cnr-game-launcher`
/// - Windows: `%APPDATA%\cnr-game-launcher`
/// - Fallback: `./cnr-data`
pub fn default_data_dir() -> PathBuf {
    directories::ProjectDirs::from("", "", APP_NAME)
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("./cnr-data"))
}

impl LauncherConfig {
    /// Configuration rooted at a specific data directory
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            store_file: default_store_file(),
            uploads_dir: None,
            log_level: default_log_level(),
            backup_dir_name: default_backup_dir_name(),
        }
    }

    /// Load configuration, layering an optional file and the environment over defaults
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let mut builder = config::Config::builder()
            .set_default("data_dir", defaults.data_dir.to_string_lossy().to_string())?
            .set_default("store_file", defaults.store_file)?
            .set_default("log_level", defaults.log_level)?
            .set_default("backup_dir_name", defaults.backup_dir_name)?;

        if let Some(path) = path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            builder = builder.add_source(config::File::from(path.to_path_buf()));
        }

        let settings = builder
            .add_source(config::Environment::with_prefix(ENV_PREFIX))
            .build()?;

        let config: Self = settings.try_deserialize()?;
        config.validate()?;

        tracing::debug!("Configuration loaded, data dir {}", config.data_dir.display());
        Ok(config)
    }

    /// Reject values that cannot name a file inside the data directory
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.store_file.trim().is_empty() {
            return Err(ConfigError::Invalid("store_file must not be empty".into()));
        }

        if Path::new(&self.store_file).components().count() != 1 {
            return Err(ConfigError::Invalid(format!(
                "store_file must be a plain file name, got {}",
                self.store_file
            )));
        }

        if self.backup_dir_name.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "backup_dir_name must not be empty".into(),
            ));
        }

        Ok(())
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(self)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, contents)?;
        tracing::info!("Configuration saved to {}", path.display());
        Ok(())
    }

    /// Absolute path of the record store file
    pub fn store_path(&self) -> PathBuf {
        self.data_dir.join(&self.store_file)
    }

    /// Absolute path of the uploads directory
    pub fn uploads_path(&self) -> PathBuf {
        self.uploads_dir
            .clone()
            .unwrap_or_else(|| self.data_dir.join(UPLOADS_DIR_NAME))
    }
}
