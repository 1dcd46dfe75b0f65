//! # Configuration Management
//!
//! This module handles loading and parsing configuration from the
//! forecast-config.toml file. It covers which periods of the day are shown,
//! how the initial period is chosen, and the size of the terminal canvas.

use crate::error::SelectionError;
use crate::offsets::{first_period_offset_for_longitude, PeriodPolicy, PERIODS_PER_DAY};
use crate::period_selector::{DefaultOffset, SelectionPolicy};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Default configuration file name, looked up in the working directory
pub const CONFIG_FILE: &str = "forecast-config.toml";

/// Largest canvas side accepted from the config file, in pixels
pub const MAX_DISPLAY_SIDE: u32 = 4096;

/// Application configuration loaded from forecast-config.toml
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Periods of interest and default selection
    pub periods: PeriodsConfig,
    /// Terminal canvas configuration
    pub display: DisplayConfig,
}

/// Periods-of-interest configuration
#[derive(Debug, Deserialize, Serialize)]
pub struct PeriodsConfig {
    /// UTC hour of the first period (multiple of 3 below 24).
    /// When absent it is derived from `longitude`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_period_offset: Option<u32>,
    /// Longitude of the map center, in degrees east
    pub longitude: f64,
    /// Number of periods shown per day
    pub periods_per_day: u32,
    /// How the period is chosen when a run is first shown
    pub default_offset: DefaultOffset,
}

/// Terminal canvas configuration
#[derive(Debug, Deserialize, Serialize)]
pub struct DisplayConfig {
    /// Canvas width in pixels
    pub width: u32,
    /// Canvas height in pixels
    pub height: u32,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            periods: PeriodsConfig {
                first_period_offset: None,
                longitude: 0.0,
                periods_per_day: PERIODS_PER_DAY,
                default_offset: DefaultOffset::NextAfterNow,
            },
            display: DisplayConfig {
                width: 96,
                height: 24,
            },
        }
    }
}

impl Config {
    /// Load configuration from forecast-config.toml
    /// Falls back to default configuration if file doesn't exist or is invalid
    pub fn load() -> Self {
        Self::load_from_path(CONFIG_FILE)
    }

    /// Load configuration from specified path
    /// Falls back to default configuration if file doesn't exist or is invalid
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Self {
        match fs::read_to_string(&path) {
            Ok(contents) => match toml::from_str::<Config>(&contents) {
                Ok(config) => {
                    info!("loaded configuration from {}", path.as_ref().display());
                    config
                }
                Err(e) => {
                    warn!("invalid config file format: {}", e);
                    warn!("using default configuration");
                    Self::default()
                }
            },
            Err(_) => {
                info!("no config file found, using default configuration");
                Self::default()
            }
        }
    }

    /// Save current configuration to `path`
    pub fn save_to_path<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let contents = toml::to_string_pretty(self)?;
        fs::write(&path, contents)?;
        info!("configuration saved to {}", path.as_ref().display());
        Ok(())
    }

    /// Build the validated selection policy
    pub fn selection_policy(&self) -> Result<SelectionPolicy, SelectionError> {
        let longitude = self.periods.longitude;
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(SelectionError::InvalidLongitude(longitude));
        }
        let first = self
            .periods
            .first_period_offset
            .unwrap_or_else(|| first_period_offset_for_longitude(longitude));
        Ok(SelectionPolicy {
            periods: PeriodPolicy::new(first, self.periods.periods_per_day)?,
            default_offset: self.periods.default_offset,
        })
    }

    /// Validated canvas size as `(width, height)`
    pub fn display_size(&self) -> Result<(u32, u32), SelectionError> {
        let DisplayConfig { width, height } = self.display;
        let valid = 1..=MAX_DISPLAY_SIDE;
        if !valid.contains(&width) || !valid.contains(&height) {
            return Err(SelectionError::InvalidDisplaySize { width, height });
        }
        Ok((width, height))
    }
}
