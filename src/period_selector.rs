//! # Period Selection
//!
//! The [`PeriodSelector`] owns which period of a run is selected and whether
//! the detailed (meteogram) view is open. It computes the run's candidate
//! offsets once, picks a default, shows the picker, and reports every change
//! as an [`Event`].
//!
//! ## States
//!
//! ```text
//! NoSelection ──mount──▶ Selected(offset) ◀──show/hide──▶ Selected+Detailed(offset, point)
//!                              │                                   │
//!                              └──────────── unmount ──────────────┘──▶ (inert)
//! ```
//!
//! A run without any period of interest stays in `NoSelection`: no picker is
//! mounted and nothing is announced.
//!
//! ## Replacement
//! Only one selector is current at a time. [`SelectorSlot::replace`] unmounts
//! the old instance and drops its event receiver before the new one is built.

use crate::error::SelectionError;
use crate::events::{self, Event, EventSink};
use crate::offsets::{forecast_offsets, PeriodPolicy};
use crate::surface::{MountPoint, PeriodPicker};
use crate::{ForecastMetadata, LatLon, PeriodOffset};
use chrono::{DateTime, Utc};
use log::{debug, error, info};
use serde::{Deserialize, Serialize};
use std::sync::mpsc::Receiver;

/// Rule for the period selected when a run is first shown.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DefaultOffset {
    /// First period at or after the current time, else the earliest one
    #[default]
    NextAfterNow,
    /// Always the earliest period of the run
    Earliest,
}

/// Period policy plus default rule, everything a selector needs besides the run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SelectionPolicy {
    pub periods: PeriodPolicy,
    pub default_offset: DefaultOffset,
}

/// A selected forecast offset, guaranteed to be a candidate of its run.
///
/// Values only come out of [`CandidateOffsets`], so holding one proves the
/// offset is valid for the run initialized at [`HourOffset::run_init`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HourOffset {
    period: PeriodOffset,
    run_init: DateTime<Utc>,
}

impl HourOffset {
    /// Hours since the run's initialization
    pub fn hours(&self) -> u32 {
        self.period.gfs_offset
    }

    pub fn local_date(&self) -> DateTime<Utc> {
        self.period.local_date
    }

    /// Initialization instant of the run this offset belongs to
    pub fn run_init(&self) -> DateTime<Utc> {
        self.run_init
    }
}

/// Ordered candidate offsets of one run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CandidateOffsets {
    run_init: DateTime<Utc>,
    periods: Vec<PeriodOffset>,
}

impl CandidateOffsets {
    pub fn compute(metadata: &ForecastMetadata, policy: &PeriodPolicy) -> Self {
        CandidateOffsets {
            run_init: metadata.init(),
            periods: forecast_offsets(metadata.init(), policy, metadata),
        }
    }

    pub fn periods(&self) -> &[PeriodOffset] {
        &self.periods
    }

    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }

    /// Validate `hours` against the candidates.
    pub fn get(&self, hours: u32) -> Option<HourOffset> {
        self.periods
            .iter()
            .find(|period| period.gfs_offset == hours)
            .map(|period| self.wrap(*period))
    }

    /// Pick the default offset for `now`, or `None` when there are no candidates.
    pub fn default_offset(&self, rule: DefaultOffset, now: DateTime<Utc>) -> Option<HourOffset> {
        let earliest = self.periods.first();
        let period = match rule {
            DefaultOffset::NextAfterNow => self
                .periods
                .iter()
                .find(|period| period.local_date >= now)
                .or(earliest),
            DefaultOffset::Earliest => earliest,
        };
        period.map(|period| self.wrap(*period))
    }

    fn wrap(&self, period: PeriodOffset) -> HourOffset {
        HourOffset {
            period,
            run_init: self.run_init,
        }
    }
}

/// Whether the detailed (meteogram) view is open, and where.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum DetailedView {
    #[default]
    Hidden,
    Shown(LatLon),
}

impl DetailedView {
    pub fn is_shown(&self) -> bool {
        matches!(self, DetailedView::Shown(_))
    }
}

/// Selected period and detailed view for one model run.
pub struct PeriodSelector {
    metadata: ForecastMetadata,
    candidates: CandidateOffsets,
    hour_offset: Option<HourOffset>,
    detailed_view: DetailedView,
    picker: Option<Box<dyn PeriodPicker>>,
    events: Option<EventSink>,
}

impl PeriodSelector {
    /// Build the selector for `metadata` and announce its default period.
    ///
    /// `detailed_view` carries the view over from a previous selector; when it
    /// is shown, the meteogram is requested again for this run.
    pub fn mount(
        metadata: ForecastMetadata,
        policy: &SelectionPolicy,
        now: DateTime<Utc>,
        detailed_view: DetailedView,
        mount_point: &mut dyn MountPoint,
        events: EventSink,
    ) -> Self {
        let candidates = CandidateOffsets::compute(&metadata, &policy.periods);
        let hour_offset = candidates.default_offset(policy.default_offset, now);

        let mut selector = PeriodSelector {
            metadata,
            candidates,
            hour_offset,
            detailed_view: DetailedView::Hidden,
            picker: None,
            events: Some(events),
        };

        let Some(selected) = hour_offset else {
            info!(
                "run {} has no periods of interest within {}h, nothing to pick",
                metadata.init(),
                metadata.latest()
            );
            return selector;
        };

        let mut picker = mount_point.mount_picker();
        picker.show(selector.candidates.periods(), &selected);
        selector.picker = Some(picker);
        debug!(
            "selector for run {} starts at +{}h ({} candidates)",
            metadata.init(),
            selected.hours(),
            selector.candidates.periods().len()
        );
        selector.notify(Event::HourOffsetChanged(selected));

        if let DetailedView::Shown(point) = detailed_view {
            selector.show_detailed_view(point.lat, point.lon);
        }
        selector
    }

    pub fn metadata(&self) -> &ForecastMetadata {
        &self.metadata
    }

    pub fn candidates(&self) -> &CandidateOffsets {
        &self.candidates
    }

    /// Current period, `None` when the run has no candidates.
    pub fn hour_offset(&self) -> Option<HourOffset> {
        self.hour_offset
    }

    pub fn detailed_view(&self) -> DetailedView {
        self.detailed_view
    }

    pub fn is_mounted(&self) -> bool {
        self.events.is_some()
    }

    /// Replace the view without announcing it. The period is unchanged.
    pub fn update_detailed_view(&mut self, view: DetailedView) {
        if !self.is_mounted() || self.hour_offset.is_none() {
            return;
        }
        self.detailed_view = view;
    }

    /// Open the meteogram at a map point for the current period.
    pub fn show_detailed_view(&mut self, lat: f64, lon: f64) {
        if !self.is_mounted() {
            return;
        }
        let Some(hour_offset) = self.hour_offset else {
            debug!("no period selected, ignoring detail request at {lat},{lon}");
            return;
        };
        let point = LatLon::new(lat, lon);
        self.detailed_view = DetailedView::Shown(point);
        self.notify(Event::MeteogramRequested { point, hour_offset });
    }

    /// Close the meteogram. Does nothing when it is already closed.
    pub fn hide_meteogram(&mut self) {
        if !self.is_mounted() || !self.detailed_view.is_shown() {
            return;
        }
        self.detailed_view = DetailedView::Hidden;
        self.notify(Event::MeteogramHidden);
    }

    /// Select another period, as chosen in the picker.
    ///
    /// Panics in debug builds when `hours` is not a candidate: that means the
    /// picker offered an offset this run never produced.
    pub fn select_hour_offset(&mut self, hours: u32) -> Result<(), SelectionError> {
        if !self.is_mounted() {
            return Ok(());
        }
        let candidate = self.candidates.get(hours);
        debug_assert!(
            candidate.is_some(),
            "hour offset {hours}h is not a candidate for run {}",
            self.metadata.init()
        );
        let Some(selected) = candidate else {
            error!(
                "hour offset {hours}h is not a candidate for run {}",
                self.metadata.init()
            );
            return Err(SelectionError::OffsetNotCandidate {
                hours,
                init: self.metadata.init(),
            });
        };

        self.hour_offset = Some(selected);
        if let Some(picker) = self.picker.as_mut() {
            picker.highlight(&selected);
        }
        self.notify(Event::HourOffsetChanged(selected));
        Ok(())
    }

    /// Release the picker and detach from the coordinator. The instance is
    /// inert afterwards.
    pub fn unmount(&mut self) {
        if let Some(mut picker) = self.picker.take() {
            picker.unmount();
        }
        if self.events.take().is_some() {
            debug!("selector for run {} unmounted", self.metadata.init());
        }
    }

    fn notify(&self, event: Event) {
        if let Some(sink) = &self.events {
            events::notify(sink, event);
        }
    }
}

/// Owner of the single current [`PeriodSelector`] and its event receiver.
#[derive(Default)]
pub struct SelectorSlot {
    current: Option<(PeriodSelector, Receiver<Event>)>,
}

impl SelectorSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Unmount the current selector, then build its successor on a fresh
    /// channel. Events the old selector queued are discarded.
    pub fn replace<F>(&mut self, build: F) -> &mut PeriodSelector
    where
        F: FnOnce(EventSink) -> PeriodSelector,
    {
        if let Some((mut previous, _receiver)) = self.current.take() {
            previous.unmount();
        }
        let (sink, receiver) = events::channel();
        let selector = build(sink);
        &mut self.current.insert((selector, receiver)).0
    }

    pub fn current(&self) -> Option<&PeriodSelector> {
        self.current.as_ref().map(|(selector, _)| selector)
    }

    pub fn current_mut(&mut self) -> Option<&mut PeriodSelector> {
        self.current.as_mut().map(|(selector, _)| selector)
    }

    /// Next undelivered event of the current selector, if any.
    pub fn next_event(&self) -> Option<Event> {
        self.current
            .as_ref()
            .and_then(|(_, receiver)| receiver.try_recv().ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::mock::{CallLog, RecordingMount};
    use chrono::TimeZone;

    fn run(latest: u32) -> ForecastMetadata {
        let init = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        ForecastMetadata::new(init, latest).unwrap()
    }

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, day, hour, 0, 0).unwrap()
    }

    fn drain(receiver: &Receiver<Event>) -> Vec<Event> {
        receiver.try_iter().collect()
    }

    fn mounted(
        metadata: ForecastMetadata,
        now: DateTime<Utc>,
    ) -> (PeriodSelector, Receiver<Event>, CallLog) {
        let log = CallLog::default();
        let mut mount = RecordingMount::new(log.clone());
        let (sink, receiver) = events::channel();
        let selector = PeriodSelector::mount(
            metadata,
            &SelectionPolicy::default(),
            now,
            DetailedView::Hidden,
            &mut mount,
            sink,
        );
        (selector, receiver, log)
    }

    #[test]
    fn test_default_is_first_period_after_now() {
        let (selector, receiver, log) = mounted(run(72), at(1, 10));

        assert_eq!(selector.hour_offset().map(|o| o.hours()), Some(12));
        let events = drain(&receiver);
        assert_eq!(events.len(), 1);
        assert!(matches!(&events[0], Event::HourOffsetChanged(o) if o.hours() == 12));
        assert_eq!(
            log.borrow().as_slice(),
            ["picker.mount", "picker.show [9, 12, 15, 33, 36, 39, 57, 60, 63] @12"]
        );
    }

    #[test]
    fn test_default_falls_back_to_earliest_when_run_is_past() {
        let (selector, _receiver, _log) = mounted(run(24), at(5, 0));
        assert_eq!(selector.hour_offset().map(|o| o.hours()), Some(9));
    }

    #[test]
    fn test_earliest_rule_ignores_now() {
        let candidates = CandidateOffsets::compute(&run(72), &PeriodPolicy::default());
        let offset = candidates
            .default_offset(DefaultOffset::Earliest, at(2, 12))
            .unwrap();
        assert_eq!(offset.hours(), 9);
        assert_eq!(offset.run_init(), at(1, 0));
    }

    #[test]
    fn test_empty_run_mounts_nothing() {
        let (selector, receiver, log) = mounted(run(6), at(1, 0));

        assert!(selector.candidates().is_empty());
        assert_eq!(selector.hour_offset(), None);
        assert!(drain(&receiver).is_empty());
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_show_and_hide_detailed_view() {
        let (mut selector, receiver, _log) = mounted(run(72), at(1, 0));
        drain(&receiver);

        selector.show_detailed_view(45.5, 6.25);
        assert_eq!(
            selector.detailed_view(),
            DetailedView::Shown(LatLon::new(45.5, 6.25))
        );
        assert_eq!(selector.hour_offset().map(|o| o.hours()), Some(9));

        selector.hide_meteogram();
        selector.hide_meteogram();
        let events = drain(&receiver);
        assert_eq!(events.len(), 2);
        assert!(matches!(
            &events[0],
            Event::MeteogramRequested { point, hour_offset }
                if point.lat == 45.5 && hour_offset.hours() == 9
        ));
        assert_eq!(events[1], Event::MeteogramHidden);
        assert_eq!(selector.detailed_view(), DetailedView::Hidden);
    }

    #[test]
    fn test_selecting_offset_keeps_detailed_view() {
        let (mut selector, receiver, log) = mounted(run(72), at(1, 0));
        selector.show_detailed_view(1.0, 2.0);
        drain(&receiver);

        selector.select_hour_offset(36).unwrap();

        assert_eq!(selector.hour_offset().map(|o| o.hours()), Some(36));
        assert!(selector.detailed_view().is_shown());
        assert!(matches!(
            drain(&receiver).as_slice(),
            [Event::HourOffsetChanged(o)] if o.hours() == 36
        ));
        assert_eq!(log.borrow().last().unwrap(), "picker.highlight 36");
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "is not a candidate")]
    fn test_non_candidate_offset_panics_in_debug() {
        let (mut selector, _receiver, _log) = mounted(run(72), at(1, 0));
        let _ = selector.select_hour_offset(21);
    }

    #[test]
    fn test_update_detailed_view_is_silent() {
        let (mut selector, receiver, _log) = mounted(run(72), at(1, 0));
        drain(&receiver);

        selector.update_detailed_view(DetailedView::Shown(LatLon::new(3.0, 4.0)));
        assert!(selector.detailed_view().is_shown());
        assert_eq!(selector.hour_offset().map(|o| o.hours()), Some(9));
        assert!(drain(&receiver).is_empty());
    }

    #[test]
    fn test_unmount_detaches_listeners() {
        let (mut selector, receiver, log) = mounted(run(72), at(1, 0));
        drain(&receiver);

        selector.unmount();
        assert!(!selector.is_mounted());
        assert_eq!(log.borrow().last().unwrap(), "picker.unmount");

        selector.show_detailed_view(1.0, 1.0);
        selector.hide_meteogram();
        selector.select_hour_offset(12).unwrap();
        selector.update_detailed_view(DetailedView::Shown(LatLon::new(0.0, 0.0)));

        assert!(drain(&receiver).is_empty());
        assert_eq!(selector.hour_offset().map(|o| o.hours()), Some(9));
        assert_eq!(log.borrow().len(), 3);
    }

    #[test]
    fn test_mount_carries_detailed_view_over() {
        let log = CallLog::default();
        let mut mount = RecordingMount::new(log.clone());
        let (sink, receiver) = events::channel();
        let point = LatLon::new(46.0, 7.0);

        let selector = PeriodSelector::mount(
            run(72),
            &SelectionPolicy::default(),
            at(1, 0),
            DetailedView::Shown(point),
            &mut mount,
            sink,
        );

        assert_eq!(selector.detailed_view(), DetailedView::Shown(point));
        let events = drain(&receiver);
        assert!(matches!(events[0], Event::HourOffsetChanged(_)));
        assert!(matches!(events[1], Event::MeteogramRequested { .. }));
    }

    #[test]
    fn test_slot_replace_discards_pending_events() {
        let log = CallLog::default();
        let mut mount = RecordingMount::new(log.clone());
        let mut slot = SelectorSlot::new();
        assert!(slot.current().is_none());

        slot.replace(|sink| {
            PeriodSelector::mount(
                run(72),
                &SelectionPolicy::default(),
                at(1, 0),
                DetailedView::Hidden,
                &mut mount,
                sink,
            )
        });
        // Initial announcement of the first selector is never drained
        slot.replace(|sink| {
            PeriodSelector::mount(
                run(24),
                &SelectionPolicy::default(),
                at(1, 0),
                DetailedView::Hidden,
                &mut mount,
                sink,
            )
        });

        assert_eq!(slot.current().unwrap().metadata().latest(), 24);
        assert!(matches!(
            slot.next_event(),
            Some(Event::HourOffsetChanged(o)) if o.hours() == 9
        ));
        assert_eq!(slot.next_event(), None);
        assert_eq!(
            log.borrow().iter().filter(|call| *call == "picker.unmount").count(),
            1
        );
    }
}
