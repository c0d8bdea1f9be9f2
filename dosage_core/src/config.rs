//! Configuration file support for medfmt.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/medfmt/config.toml`, or from
//! the path in `MEDFMT_CONFIG` when that variable is set.

use crate::csv_io::InvalidRowPolicy;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable overriding the config file location
pub const CONFIG_ENV_VAR: &str = "MEDFMT_CONFIG";

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub import: ImportConfig,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// CSV import behaviour
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct ImportConfig {
    #[serde(default)]
    pub on_invalid: InvalidRowPolicy,
}

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from(".local/share"))
        .join("medfmt")
}

impl Config {
    /// Load configuration from `MEDFMT_CONFIG` or the standard config path
    pub fn load() -> Result<Self> {
        let config_path = std::env::var_os(CONFIG_ENV_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(Self::default_config_path);

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!(
                "No config file found at {:?}, using defaults",
                config_path
            );
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join("medfmt")
            .join("config.toml")
    }

    pub fn validate(&self) -> Result<()> {
        if self.data.data_dir.as_os_str().is_empty() {
            return Err(Error::Config("data.data_dir must not be empty".into()));
        }
        Ok(())
    }
}
