//! Application configuration (~/.productpulse/config.json).
//!
//! Every field has a serde default, so a missing file or a partial document
//! both yield a usable config. Environment variables override the file.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::agent::{DELIVERY_AGENT_ID, GENERATION_AGENT_ID};
use crate::error::PulseError;

pub const API_KEY_ENV: &str = "PRODUCTPULSE_API_KEY";
pub const ENDPOINT_ENV: &str = "PRODUCTPULSE_AGENT_ENDPOINT";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    /// Where the file store keeps history and settings.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    #[serde(default = "default_agent_endpoint")]
    pub agent_endpoint: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default = "default_generation_agent_id")]
    pub generation_agent_id: String,
    #[serde(default = "default_delivery_agent_id")]
    pub delivery_agent_id: String,
}

fn default_data_dir() -> PathBuf {
    state_dir().join("data")
}

fn default_agent_endpoint() -> String {
    "http://localhost:3000/api/agent".to_string()
}

fn default_generation_agent_id() -> String {
    GENERATION_AGENT_ID.to_string()
}

fn default_delivery_agent_id() -> String {
    DELIVERY_AGENT_ID.to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            agent_endpoint: default_agent_endpoint(),
            api_key: None,
            generation_agent_id: default_generation_agent_id(),
            delivery_agent_id: default_delivery_agent_id(),
        }
    }
}

impl AppConfig {
    /// Apply `PRODUCTPULSE_*` overrides from the given lookup.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(key) = lookup(API_KEY_ENV).filter(|k| !k.trim().is_empty()) {
            self.api_key = Some(key);
        }
        if let Some(endpoint) = lookup(ENDPOINT_ENV).filter(|e| !e.trim().is_empty()) {
            self.agent_endpoint = endpoint;
        }
    }
}

/// The state directory (~/.productpulse)
fn state_dir() -> PathBuf {
    dirs::home_dir().unwrap_or_default().join(".productpulse")
}

/// Get the canonical config file path (~/.productpulse/config.json)
pub fn config_path() -> PathBuf {
    state_dir().join("config.json")
}

/// Load configuration from `path`, then apply environment overrides.
///
/// A missing file yields defaults; an unreadable or corrupt one is an error.
pub fn load_config(path: &Path) -> Result<AppConfig, PulseError> {
    let mut config = if path.exists() {
        let content = fs::read_to_string(path)
            .map_err(|e| PulseError::Config(format!("Failed to read config: {}", e)))?;
        serde_json::from_str(&content)
            .map_err(|e| PulseError::Config(format!("Failed to parse config: {}", e)))?
    } else {
        log::debug!("No config at {}, using defaults", path.display());
        AppConfig::default()
    };
    config.apply_env(|name| std::env::var(name).ok());
    Ok(config)
}

/// Read the config at `path` (or defaults), apply the mutator, and write it back.
pub fn create_or_update_config(
    path: &Path,
    mutator: impl FnOnce(&mut AppConfig),
) -> Result<AppConfig, PulseError> {
    let mut config = if path.exists() {
        let content = fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| PulseError::Config(format!("Failed to parse config: {}", e)))?
    } else {
        AppConfig::default()
    };

    mutator(&mut config);

    if let Some(parent) = path.parent() {
        if !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }
    let content = serde_json::to_string_pretty(&config)?;
    fs::write(path, content)?;

    Ok(config)
}
