//! Configuration resolution for MechCare.
//!
//! Implements hierarchical config resolution:
//! 1. Built-in defaults
//! 2. Global config (`<config dir>/mechcare/settings.json`)
//! 3. Environment variables
//! 4. CLI arguments (applied by the binaries, highest priority)

use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Port the original web frontend expects the API on.
pub const DEFAULT_PORT: u16 = 3000;

/// File name of the dataset document inside the data directory.
pub const DATA_FILE_NAME: &str = "mechcare-data.json";

/// Complete MechCare configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: IpAddr,
    pub port: u16,
    pub log_level: String,
    pub log_json: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            log_level: "info".to_string(),
            log_json: false,
        }
    }
}

impl ServerConfig {
    pub const fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind, self.port)
    }
}

/// Dataset storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StorageConfig {
    /// Dataset document path. Falls back to [`default_data_file`].
    pub data_file: Option<PathBuf>,
}

impl StorageConfig {
    /// The configured data file, or the platform default.
    pub fn resolve_data_file(&self) -> Result<PathBuf> {
        match &self.data_file {
            Some(path) => Ok(path.clone()),
            None => default_data_file()
                .ok_or_else(|| Error::Config("Cannot determine data directory".into())),
        }
    }
}

/// Load configuration with hierarchical resolution.
pub fn load_config() -> Result<Config> {
    let mut config = Config::default();

    if let Some(global_path) = global_config_path() {
        if global_path.exists() {
            let global = load_config_file(&global_path)?;
            merge_config(&mut config, global);
        }
    }

    apply_env_overrides(&mut config);

    Ok(config)
}

/// Get the global config file path.
pub fn global_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("mechcare").join("settings.json"))
}

/// Default location of the dataset document.
pub fn default_data_file() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("mechcare").join(DATA_FILE_NAME))
}

pub fn load_config_file(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::Config(format!("Failed to read config file {}: {}", path.display(), e))
    })?;
    serde_json::from_str(&content).map_err(|e| {
        Error::Config(format!("Failed to parse config file {}: {}", path.display(), e))
    })
}

fn merge_config(base: &mut Config, overlay: Config) {
    if overlay.storage.data_file.is_some() {
        base.storage.data_file = overlay.storage.data_file;
    }
    base.server = overlay.server;
}

fn apply_env_overrides(config: &mut Config) {
    apply_overrides(config, |key| std::env::var(key).ok());
}

fn apply_overrides(config: &mut Config, var: impl Fn(&str) -> Option<String>) {
    if let Some(val) = var("MECHCARE_PORT") {
        if let Ok(n) = val.parse() {
            config.server.port = n;
        }
    }
    if let Some(val) = var("MECHCARE_BIND") {
        if let Ok(ip) = val.parse() {
            config.server.bind = ip;
        }
    }
    if let Some(val) = var("MECHCARE_LOG_LEVEL") {
        config.server.log_level = val;
    }
    if let Some(val) = var("MECHCARE_DATA_FILE") {
        config.storage.data_file = Some(PathBuf::from(val));
    }
}
