//! Configuration for entrysense-registrar

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default data directory for the two store files
pub fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("entrysense-registrar")
}

/// Configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding stakeholders.db and entrysense.db
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Override path for the stakeholders (identity) store
    #[serde(default)]
    pub identity_db_path: Option<PathBuf>,

    /// Override path for the entrysense (link/role) store
    #[serde(default)]
    pub access_db_path: Option<PathBuf>,

    /// HTTP API port
    #[serde(default = "default_http_port")]
    pub http_port: u16,
}

fn default_http_port() -> u16 {
    8070
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            identity_db_path: None,
            access_db_path: None,
            http_port: default_http_port(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        let config: Config =
            toml::from_str(&contents).with_context(|| format!("Invalid config file {:?}", path))?;
        Ok(config)
    }

    /// Path to the stakeholders store
    pub fn identity_db(&self) -> PathBuf {
        self.identity_db_path
            .clone()
            .unwrap_or_else(|| self.data_dir.join("stakeholders.db"))
    }

    /// Path to the entrysense store
    pub fn access_db(&self) -> PathBuf {
        self.access_db_path
            .clone()
            .unwrap_or_else(|| self.data_dir.join("entrysense.db"))
    }
}
