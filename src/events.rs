//! # Coordination Events
//!
//! Components report what happened by sending an [`Event`] down an
//! `mpsc` channel. The [`crate::app::AppController`] owns the receiving ends
//! and is the only place that reacts to them, which keeps the whole protocol
//! in one `match`.
//!
//! Each period selector gets its own channel. Dropping the receiver when a
//! selector is replaced discards anything it queued but never delivered, so
//! a superseded selector can never reach the controller.

use crate::period_selector::{DetailedView, HourOffset};
use crate::{ForecastMetadata, LatLon};
use std::sync::mpsc::{self, Receiver, Sender};

/// Something a component wants the coordinator to act on.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// The selected period changed (including the initial choice of a selector)
    HourOffsetChanged(HourOffset),
    /// The user picked another model run in the forecast layer
    ForecastSelected(ForecastMetadata),
    /// The forecast layer needs a redraw with the current selection
    RenderRequested,
    /// The forecast layer's view changed and the selector must follow
    DetailedViewChanged(DetailedView),
    /// Show the meteogram for a map point at the selected period
    MeteogramRequested { point: LatLon, hour_offset: HourOffset },
    /// Close the meteogram
    MeteogramHidden,
}

/// Sending half handed to components.
pub type EventSink = Sender<Event>;

/// Create a fresh event channel.
pub fn channel() -> (EventSink, Receiver<Event>) {
    mpsc::channel()
}

/// Send an event, logging instead of failing when the coordinator is gone.
pub(crate) fn notify(sink: &EventSink, event: Event) {
    if let Err(err) = sink.send(event) {
        log::warn!("dropped event with no receiver: {:?}", err.0);
    }
}
