// config.rs - Pub/sub credentials and channel list
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigLoadError;

pub const DEFAULT_CHANNEL: &str = "cactuspi";

/// Bus client configuration, read once at startup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusConfig {
    #[serde(default)]
    pub subscribe_key: String,
    #[serde(default)]
    pub secret_key: String,
    #[serde(default)]
    pub publish_key: String,
    #[serde(default = "default_channels")]
    pub channels: Vec<String>,
}

fn default_channels() -> Vec<String> {
    vec![DEFAULT_CHANNEL.to_string()]
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            subscribe_key: String::new(),
            secret_key: String::new(),
            publish_key: String::new(),
            channels: default_channels(),
        }
    }
}

impl BusConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigLoadError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigLoadError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load, logging and falling back to an empty config on failure.
    /// The bus client then simply fails to authenticate.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => {
                log::info!("loaded bus config from {}", path.display());
                config
            }
            Err(e) => {
                log::error!("{e}; continuing with empty config");
                Self::default()
            }
        }
    }

    pub fn has_credentials(&self) -> bool {
        !self.subscribe_key.is_empty()
    }
}
