use crate::constants::{
    DEFAULT_FRAGMENT_SIZE, DEFAULT_LISTEN_ADDRESS, DEFAULT_MAX_MESSAGE_SIZE, DEFAULT_ROOT_DIR,
};
use crate::core_protocol::FrameLimits;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read configuration file {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse configuration file {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen_address: String,
    pub listen_port: u16,
    /// Directory enumerated by LIST and searched by GET.
    pub root_dir: PathBuf,
    pub max_message_size: usize,
    pub fragment_size: usize,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_address: String::from(DEFAULT_LISTEN_ADDRESS),
            listen_port: 0,
            root_dir: PathBuf::from(DEFAULT_ROOT_DIR),
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
            fragment_size: DEFAULT_FRAGMENT_SIZE,
        }
    }
}

impl ServerConfig {
    pub fn frame_limits(&self) -> FrameLimits {
        FrameLimits {
            max_message_size: self.max_message_size,
            fragment_size: self.fragment_size,
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.listen_address, self.listen_port)
    }
}

impl Config {
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let config_str = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&config_str).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml(config_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(config_str)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let server = &self.server;
        if server.max_message_size == 0 {
            return Err(ConfigError::Invalid(
                "max_message_size must be greater than zero".to_string(),
            ));
        }
        if server.fragment_size == 0 {
            return Err(ConfigError::Invalid(
                "fragment_size must be greater than zero".to_string(),
            ));
        }
        if server.fragment_size > server.max_message_size {
            return Err(ConfigError::Invalid(format!(
                "fragment_size ({}) cannot exceed max_message_size ({})",
                server.fragment_size, server.max_message_size
            )));
        }
        if server.listen_address.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "listen_address cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}
