//! # Selection Errors
//!
//! Every fallible operation in the crate reports through [`SelectionError`].
//! Most variants cover construction and loading (bad horizons, bad policies,
//! unreadable files). `OffsetNotCandidate` is different: it signals a broken
//! caller contract and is also asserted in debug builds.

use chrono::{DateTime, Utc};
use std::io;
use thiserror::Error;

/// Errors raised while building, configuring or driving a forecast selection.
#[derive(Error, Debug)]
pub enum SelectionError {
    /// Forecast horizon is zero or not on the 3-hour model grid
    #[error("invalid forecast horizon {0}h (expected a positive multiple of 3)")]
    InvalidHorizon(u32),

    /// First period offset is outside `[0, 24)` or not on the 3-hour grid
    #[error("invalid first period offset {0} (expected a multiple of 3 below 24)")]
    InvalidPeriodOffset(u32),

    /// Periods per day is zero or would repeat hours of the day
    #[error("invalid periods per day {0} (expected 1 to 8)")]
    InvalidPeriodsPerDay(u32),

    /// Configured longitude is not finite or outside `[-180, 180]`
    #[error("invalid longitude {0} (expected degrees in [-180, 180])")]
    InvalidLongitude(f64),

    /// Canvas size is zero or too large to allocate
    #[error("invalid display size {width}x{height}")]
    InvalidDisplaySize { width: u32, height: u32 },

    /// Requested hour offset is not part of the run's candidate sequence
    #[error("hour offset {hours}h is not a candidate for the run initialized at {init}")]
    OffsetNotCandidate { hours: u32, init: DateTime<Utc> },

    /// The metadata source returned no model runs
    #[error("no forecast runs available")]
    NoForecastRuns,

    /// Run-selection index does not name a known run
    #[error("unknown forecast run #{0}")]
    UnknownRun(usize),

    /// Metadata or configuration file could not be read or written
    #[error("IO: {0}")]
    Io(#[from] io::Error),

    /// Metadata file is not valid JSON for a list of runs
    #[error("metadata JSON: {0}")]
    Json(#[from] serde_json::Error),
}
