//! # Forecast Periods Core Library
//!
//! This library decides which forecast time-steps of a weather-model run are
//! shown to a user browsing a map, and keeps the period picker, the forecast
//! layer and the map view in agreement when the user changes run, period or
//! map location.
//!
//! ## Design Philosophy
//!
//! ### Pure Offset Calculation
//! - **Stateless**: [`offsets::forecast_offsets`] is a pure function of the run
//!   start, the period policy and the horizon
//! - **Small output**: at most three offsets per forecast day, so a week-long
//!   run yields a couple dozen entries
//!
//! ### Explicit Coordination
//! - **Typed events**: components never call each other. They emit
//!   [`events::Event`] values that the [`app::AppController`] dispatches
//! - **Single current selector**: a new run replaces the
//!   [`period_selector::PeriodSelector`] wholesale through
//!   [`period_selector::SelectorSlot::replace`]
//! - **Validated selection**: a [`period_selector::HourOffset`] can only be
//!   obtained from the candidate offsets of its run
//!
//! ### External Collaborators
//! Map rendering, forecast drawing and the picker/meteogram widgets are
//! reached through the traits in [`surface`]. The binary ships terminal
//! implementations of them.
//!
//! ## Core Types
//!
//! - [`ForecastMetadata`]: one model run
//! - [`PeriodOffset`]: a forecast offset that falls on a period of interest
//! - [`LatLon`]: a map location picked by the user

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub mod app;
pub mod config;
pub mod error;
pub mod events;
pub mod forecast_layer;
pub mod metadata;
pub mod offsets;
pub mod period_selector;
pub mod renderer;
pub mod surface;
pub mod terminal;

pub use error::SelectionError;
pub use metadata::ForecastMetadata;

/// A forecast offset that falls on a period of interest.
///
/// `gfs_offset` counts hours since the run's initialization and is always a
/// multiple of 3. `local_date` is the absolute instant of that offset, used
/// for display.
///
/// # Example
/// ```
/// use chrono::{TimeZone, Utc};
/// use forecast_periods_lib::PeriodOffset;
///
/// let noon = PeriodOffset {
///     gfs_offset: 12,
///     local_date: Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap(),
/// };
/// assert_eq!(noon.gfs_offset % 3, 0);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodOffset {
    /// Hours since the run's initialization
    pub gfs_offset: u32,
    /// Instant the offset corresponds to
    pub local_date: DateTime<Utc>,
}

/// A point on the map, in degrees.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

impl LatLon {
    pub fn new(lat: f64, lon: f64) -> Self {
        LatLon { lat, lon }
    }
}
