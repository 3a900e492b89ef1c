//! Processor configuration
//!
//! Handles:
//! - Komtrax API settings (endpoint, key, equipment filter)
//! - Alert thresholds (carried, not yet consumed)
//! - TOML file loading with env overrides
//! - Field-level runtime updates (`update_config` command)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Default base URL of the Komtrax API (ISO-15143-3 / AEMP 2.0)
pub const DEFAULT_API_ENDPOINT: &str = "https://api.komtrax.komatsu.com/v1";

pub const DEFAULT_FUEL_ALERT_THRESHOLD: f64 = 20.0;
pub const DEFAULT_IDLE_HOURS_ALERT: f64 = 100.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessorConfig {
    pub api_endpoint: String,
    #[serde(skip_serializing)] // Never write the key back to disk
    pub api_key: Option<String>,
    /// Optional filter, blank means the whole fleet
    pub equipment_id: Option<String>,
    /// Low fuel alert, percent
    pub fuel_alert_threshold: f64,
    /// Excessive idle alert, hours
    pub idle_hours_alert: f64,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            api_endpoint: DEFAULT_API_ENDPOINT.to_string(),
            api_key: None,
            equipment_id: None,
            fuel_alert_threshold: DEFAULT_FUEL_ALERT_THRESHOLD,
            idle_hours_alert: DEFAULT_IDLE_HOURS_ALERT,
        }
    }
}

/// Field-level replacement set, built from an `update_config` payload.
///
/// `None` leaves the field as it is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigUpdate {
    pub api_endpoint: Option<String>,
    pub api_key: Option<String>,
    pub equipment_id: Option<String>,
}

impl ConfigUpdate {
    pub fn is_empty(&self) -> bool {
        self.api_endpoint.is_none() && self.api_key.is_none() && self.equipment_id.is_none()
    }
}

impl ProcessorConfig {
    /// Load config from `KOMTRAX_CONFIG` or the OS-specific location,
    /// then apply environment overrides
    pub async fn load() -> Result<Self> {
        let config_path = match std::env::var("KOMTRAX_CONFIG") {
            Ok(path) => PathBuf::from(path),
            Err(_) => Self::config_file_path()?,
        };

        let mut config = Self::load_from(&config_path).await?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load config from an explicit path; a missing file yields defaults
    pub async fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: ProcessorConfig = toml::from_str(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))?;

        debug!("Loaded config from {}", path.display());
        Ok(config.normalized())
    }

    /// Get OS-specific config file path
    pub fn config_file_path() -> Result<PathBuf> {
        let mut path = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;

        path.push("komtrax-processor");
        path.push("config.toml");
        Ok(path)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(endpoint) = std::env::var("KOMTRAX_API_ENDPOINT") {
            self.api_endpoint = endpoint;
        }
        if let Ok(key) = std::env::var("KOMTRAX_API_KEY") {
            self.api_key = Some(key);
        }
        if let Ok(equipment_id) = std::env::var("KOMTRAX_EQUIPMENT_ID") {
            self.equipment_id = Some(equipment_id);
        }
        *self = std::mem::take(self).normalized();
    }

    /// A blank endpoint at setup time falls back to the default one
    fn normalized(mut self) -> Self {
        if self.api_endpoint.trim().is_empty() {
            self.api_endpoint = DEFAULT_API_ENDPOINT.to_string();
        }
        self
    }

    /// API key, if one is set and non-empty
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|key| !key.is_empty())
    }

    /// Equipment filter, if one is set and non-empty
    pub fn equipment_id(&self) -> Option<&str> {
        self.equipment_id.as_deref().filter(|id| !id.is_empty())
    }

    /// Replace the fields carried by `update`, leave the others untouched.
    ///
    /// Runtime updates are taken verbatim: unlike setup, a blank endpoint is
    /// kept as given.
    pub fn apply(&mut self, update: &ConfigUpdate) {
        if let Some(endpoint) = &update.api_endpoint {
            self.api_endpoint = endpoint.clone();
        }
        if let Some(key) = &update.api_key {
            self.api_key = Some(key.clone());
        }
        if let Some(equipment_id) = &update.equipment_id {
            self.equipment_id = Some(equipment_id.clone());
        }
    }
}
