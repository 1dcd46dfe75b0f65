//! # Forecast Run Metadata
//!
//! Describes one model run: when it was initialized and how far ahead it
//! forecasts. Runs are supplied by an external metadata source; this module
//! only validates and orders them.
//!
//! ## File Format
//!
//! The binary reads a JSON array of runs:
//!
//! ```json
//! [
//!   { "init": "2024-01-01T00:00:00Z", "latest": 192 },
//!   { "init": "2024-01-01T06:00:00Z", "latest": 192 }
//! ]
//! ```
//!
//! `latest` must be a positive multiple of 3. Entries are sorted by `init`
//! after loading, so the last run is always the most recent one.

use crate::error::SelectionError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// One model run: initialization instant and maximum horizon in hours.
///
/// # Example
/// ```
/// use chrono::{TimeZone, Utc};
/// use forecast_periods_lib::ForecastMetadata;
///
/// let init = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
/// let run = ForecastMetadata::new(init, 192).unwrap();
/// assert_eq!(run.latest(), 192);
///
/// assert!(ForecastMetadata::new(init, 100).is_err());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawForecastMetadata")]
pub struct ForecastMetadata {
    init: DateTime<Utc>,
    latest: u32,
}

/// Unvalidated shape of a run as it appears in the metadata file
#[derive(Deserialize)]
struct RawForecastMetadata {
    init: DateTime<Utc>,
    latest: u32,
}

impl TryFrom<RawForecastMetadata> for ForecastMetadata {
    type Error = SelectionError;

    fn try_from(raw: RawForecastMetadata) -> Result<Self, Self::Error> {
        ForecastMetadata::new(raw.init, raw.latest)
    }
}

impl ForecastMetadata {
    /// Build a run, rejecting horizons that are zero or off the 3-hour grid.
    pub fn new(init: DateTime<Utc>, latest: u32) -> Result<Self, SelectionError> {
        if latest == 0 || latest % 3 != 0 {
            return Err(SelectionError::InvalidHorizon(latest));
        }
        Ok(Self { init, latest })
    }

    /// UTC instant the model run started
    pub fn init(&self) -> DateTime<Utc> {
        self.init
    }

    /// Maximum forecast horizon in hours
    pub fn latest(&self) -> u32 {
        self.latest
    }
}

/// Parse a JSON array of runs and return them ordered by `init` ascending.
pub fn parse_runs(json: &str) -> Result<Vec<ForecastMetadata>, SelectionError> {
    let mut runs: Vec<ForecastMetadata> = serde_json::from_str(json)?;
    runs.sort_by_key(|run| run.init);
    Ok(runs)
}

/// Load runs from a metadata file on disk.
pub fn load_runs<P: AsRef<Path>>(path: P) -> Result<Vec<ForecastMetadata>, SelectionError> {
    let contents = fs::read_to_string(&path)?;
    let runs = parse_runs(&contents)?;
    log::info!(
        "loaded {} forecast runs from {}",
        runs.len(),
        path.as_ref().display()
    );
    Ok(runs)
}
