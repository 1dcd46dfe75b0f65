//! # Forecast Offset Calculation
//!
//! Picks which forecast time-steps of a model run are worth showing. Users care
//! about a few fixed periods of the day (morning, noon, afternoon), so only the
//! offsets whose UTC hour lands on one of those periods are kept.
//!
//! ## Model Grid
//! Runs publish a time-step every 3 hours. Offsets are therefore multiples of
//! 3, starting at `+3h` and stopping one step before the run's horizon.
//!
//! ## Periods of Interest
//! A [`PeriodPolicy`] names the UTC hour of the first period and how many
//! periods a day has. Around longitude 0 the default policy yields the UTC
//! hours `{9, 12, 15}`; [`first_period_offset_for_longitude`] shifts that
//! window so it follows local solar time elsewhere.

use crate::error::SelectionError;
use crate::{ForecastMetadata, PeriodOffset};
use chrono::{DateTime, Duration, FixedOffset, NaiveDate, Timelike, Utc};

/// We show three forecast periods per day: morning, noon, and afternoon
pub const PERIODS_PER_DAY: u32 = 3;

/// Hours between two model time-steps
pub const MODEL_STEP_HOURS: u32 = 3;

/// Most periods a day can hold before hours repeat
pub const MAX_PERIODS_PER_DAY: u32 = 24 / MODEL_STEP_HOURS;

/// UTC hour of the morning period at longitude 0
const MORNING_UTC_HOUR: i32 = 9;

/// Which hours of the day are periods of interest.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PeriodPolicy {
    first_period_offset: u32,
    periods_per_day: u32,
}

impl Default for PeriodPolicy {
    fn default() -> Self {
        PeriodPolicy {
            first_period_offset: MORNING_UTC_HOUR as u32,
            periods_per_day: PERIODS_PER_DAY,
        }
    }
}

impl PeriodPolicy {
    /// Build a policy. The first offset must already be reduced to `[0, 24)`
    /// and sit on the model grid; at most [`MAX_PERIODS_PER_DAY`] periods.
    pub fn new(first_period_offset: u32, periods_per_day: u32) -> Result<Self, SelectionError> {
        if first_period_offset >= 24 || first_period_offset % MODEL_STEP_HOURS != 0 {
            return Err(SelectionError::InvalidPeriodOffset(first_period_offset));
        }
        if !(1..=MAX_PERIODS_PER_DAY).contains(&periods_per_day) {
            return Err(SelectionError::InvalidPeriodsPerDay(periods_per_day));
        }
        Ok(PeriodPolicy {
            first_period_offset,
            periods_per_day,
        })
    }

    pub fn first_period_offset(&self) -> u32 {
        self.first_period_offset
    }

    pub fn periods_per_day(&self) -> u32 {
        self.periods_per_day
    }

    /// Hours past midnight UTC of the periods of interest, in period order.
    ///
    /// Values are not wrapped: a late first period yields hours of 24 and
    /// above, which no time-step's hour of day can match.
    pub fn utc_hours(&self) -> Vec<u32> {
        (0..self.periods_per_day)
            .map(|i| self.first_period_offset + i * MODEL_STEP_HOURS)
            .collect()
    }
}

/// First period UTC hour that keeps the periods around 09:00 local solar time.
///
/// The solar shift (`longitude / 15` hours) is rounded to the 3-hour grid.
///
/// ```
/// use forecast_periods_lib::offsets::first_period_offset_for_longitude;
///
/// assert_eq!(first_period_offset_for_longitude(0.0), 9);
/// assert_eq!(first_period_offset_for_longitude(45.0), 6);
/// assert_eq!(first_period_offset_for_longitude(-90.0), 15);
/// ```
pub fn first_period_offset_for_longitude(longitude: f64) -> u32 {
    let step = MODEL_STEP_HOURS as f64;
    let shift = ((longitude / 15.0) / step).round() as i32 * MODEL_STEP_HOURS as i32;
    (MORNING_UTC_HOUR - shift).rem_euclid(24) as u32
}

/// Compute the offsets of `metadata` that fall on a period of interest.
///
/// `init` is the run's initialization instant. The result is ordered by
/// ascending offset; identical inputs always give the identical sequence.
///
/// # Example
/// ```
/// use chrono::{TimeZone, Utc};
/// use forecast_periods_lib::offsets::{forecast_offsets, PeriodPolicy};
/// use forecast_periods_lib::ForecastMetadata;
///
/// let init = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
/// let run = ForecastMetadata::new(init, 24).unwrap();
/// let policy = PeriodPolicy::new(9, 3).unwrap();
///
/// let hours: Vec<u32> = forecast_offsets(init, &policy, &run)
///     .iter()
///     .map(|period| period.gfs_offset)
///     .collect();
/// assert_eq!(hours, vec![9, 12, 15]);
/// ```
pub fn forecast_offsets(
    init: DateTime<Utc>,
    policy: &PeriodPolicy,
    metadata: &ForecastMetadata,
) -> Vec<PeriodOffset> {
    let utc_hours = policy.utc_hours();
    let steps = metadata.latest() / MODEL_STEP_HOURS;

    (1..steps)
        .map(|i| i * MODEL_STEP_HOURS)
        .filter(|gfs_offset| utc_hours.contains(&((init.hour() + gfs_offset) % 24)))
        .map(|gfs_offset| PeriodOffset {
            gfs_offset,
            local_date: init + Duration::hours(i64::from(gfs_offset)),
        })
        .collect()
}

/// Group consecutive offsets by civil day in `zone`, preserving order.
pub fn group_by_day(offsets: &[PeriodOffset], zone: &FixedOffset) -> Vec<Vec<PeriodOffset>> {
    let mut days: Vec<(NaiveDate, Vec<PeriodOffset>)> = Vec::new();
    for period in offsets {
        let day = period.local_date.with_timezone(zone).date_naive();
        match days.last_mut() {
            Some((current, group)) if *current == day => group.push(*period),
            _ => days.push((day, vec![*period])),
        }
    }
    days.into_iter().map(|(_, group)| group).collect()
}
