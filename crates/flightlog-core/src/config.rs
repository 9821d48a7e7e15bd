// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const NOMINATIM_SEARCH_URL: &str = "https://nominatim.openstreetmap.org/search";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where the `flights` slot lives. Defaults to the platform data dir.
    pub data_dir: Option<PathBuf>,
    /// External airport directory replacing the built-in table.
    pub airports_file: Option<PathBuf>,
    pub geocoding: GeocodingConfig,
    pub autocomplete: AutocompleteConfig,
    pub map: MapConfig,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: None,
            airports_file: None,
            geocoding: GeocodingConfig::default(),
            autocomplete: AutocompleteConfig::default(),
            map: MapConfig::default(),
            log_level: "warn".to_string(),
        }
    }
}

impl Config {
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(crate::get_data_root)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeocodingConfig {
    pub enabled: bool,
    pub endpoint: String,
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: NOMINATIM_SEARCH_URL.to_string(),
            timeout_secs: 10,
            user_agent: format!("FlightLog/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutocompleteConfig {
    pub debounce_ms: u64,
    pub blur_grace_ms: u64,
    pub max_results: usize,
}

impl Default for AutocompleteConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 150,
            blur_grace_ms: 200,
            max_results: crate::search::DEFAULT_MAX_RESULTS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    pub fit_padding_px: u32,
    /// `[lat, lon]` used when an airport cannot be resolved at all.
    pub fallback: [f64; 2],
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            fit_padding_px: 20,
            fallback: [39.8283, -98.5795],
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_path: PathBuf,
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new(crate::get_config_root().join("config.json"))
    }
}

impl ConfigManager {
    pub fn new<P: AsRef<Path>>(config_path: P) -> Self {
        Self {
            config_path: config_path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.config_path
    }

    pub fn load(&self) -> Result<Config> {
        if !self.config_path.exists() {
            log::debug!(
                "No config file; using defaults — path={}",
                self.config_path.display()
            );
            return Ok(Config::default());
        }

        let content = fs::read_to_string(&self.config_path).context("Failed to read config.json")?;

        serde_json::from_str(&content).context("Failed to parse config.json")
    }

    pub fn save(&self, config: &Config) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent).context("Failed to create config directory")?;
            }
        }

        let content = serde_json::to_string_pretty(config).context("Failed to serialize config")?;

        fs::write(&self.config_path, content).context("Failed to write config.json")
    }
}
