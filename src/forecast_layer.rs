//! # Forecast Layer
//!
//! Tracks what is currently drawn on the map canvas (run, period and view)
//! and forwards drawing to the [`ForecastRenderer`] collaborator. It also
//! carries the run picker: choosing another run is reported as
//! [`Event::ForecastSelected`] and handled by the coordinator.
//!
//! Redraws are not deduplicated here. Callers only ask for one when the
//! selection actually changed.

use crate::error::SelectionError;
use crate::events::{self, Event, EventSink};
use crate::period_selector::{DetailedView, HourOffset};
use crate::surface::ForecastRenderer;
use crate::ForecastMetadata;
use log::debug;

/// The run/period/view triple last sent to the renderer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderedForecast {
    pub metadata: ForecastMetadata,
    pub hour_offset: HourOffset,
    pub view: DetailedView,
}

pub struct ForecastLayer<C> {
    runs: Vec<ForecastMetadata>,
    renderer: Box<dyn ForecastRenderer<C>>,
    rendered: Option<RenderedForecast>,
    view: DetailedView,
    events: EventSink,
}

impl<C> ForecastLayer<C> {
    pub fn new(
        runs: Vec<ForecastMetadata>,
        view: DetailedView,
        renderer: Box<dyn ForecastRenderer<C>>,
        events: EventSink,
    ) -> Self {
        ForecastLayer {
            runs,
            renderer,
            rendered: None,
            view,
            events,
        }
    }

    /// Draw `metadata` at `hour_offset` onto `canvas`.
    pub fn update_forecast(
        &mut self,
        metadata: &ForecastMetadata,
        hour_offset: HourOffset,
        canvas: &mut C,
    ) {
        debug_assert_eq!(
            hour_offset.run_init(),
            metadata.init(),
            "hour offset belongs to another run"
        );
        debug!(
            "rendering run {} at +{}h",
            metadata.init(),
            hour_offset.hours()
        );
        self.renderer.render(canvas, metadata, &hour_offset);
        self.rendered = Some(RenderedForecast {
            metadata: *metadata,
            hour_offset,
            view: self.view,
        });
    }

    /// Wipe the canvas, used when the active run has nothing to show.
    pub fn clear(&mut self, canvas: &mut C) {
        self.renderer.clear(canvas);
        self.rendered = None;
    }

    /// Switch view mode. A change is mirrored to the selector and triggers a
    /// redraw; setting the current view again does nothing.
    pub fn set_view(&mut self, view: DetailedView) {
        if self.view == view {
            return;
        }
        self.view = view;
        events::notify(&self.events, Event::DetailedViewChanged(view));
        events::notify(&self.events, Event::RenderRequested);
    }

    /// Pick another run from the run picker.
    pub fn select_run(&mut self, index: usize) -> Result<(), SelectionError> {
        let metadata = self
            .runs
            .get(index)
            .copied()
            .ok_or(SelectionError::UnknownRun(index))?;
        events::notify(&self.events, Event::ForecastSelected(metadata));
        Ok(())
    }

    pub fn runs(&self) -> &[ForecastMetadata] {
        &self.runs
    }

    pub fn view(&self) -> DetailedView {
        self.view
    }

    pub fn rendered(&self) -> Option<&RenderedForecast> {
        self.rendered.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::offsets::PeriodPolicy;
    use crate::period_selector::CandidateOffsets;
    use crate::surface::mock::{CallLog, RecordingRenderer};
    use crate::LatLon;
    use chrono::{TimeZone, Utc};

    fn runs() -> Vec<ForecastMetadata> {
        [0, 6]
            .iter()
            .map(|hour| {
                let init = Utc.with_ymd_and_hms(2024, 1, 1, *hour, 0, 0).unwrap();
                ForecastMetadata::new(init, 72).unwrap()
            })
            .collect()
    }

    fn layer(log: &CallLog) -> (ForecastLayer<Vec<String>>, std::sync::mpsc::Receiver<Event>) {
        let (sink, receiver) = events::channel();
        let layer = ForecastLayer::new(
            runs(),
            DetailedView::Hidden,
            Box::new(RecordingRenderer::new(log.clone())),
            sink,
        );
        (layer, receiver)
    }

    #[test]
    fn test_update_forecast_renders_every_call() {
        let log = CallLog::default();
        let (mut layer, _receiver) = layer(&log);
        let run = runs()[0];
        let offset = CandidateOffsets::compute(&run, &PeriodPolicy::default())
            .get(12)
            .unwrap();
        let mut canvas = Vec::new();

        layer.update_forecast(&run, offset, &mut canvas);
        layer.update_forecast(&run, offset, &mut canvas);

        assert_eq!(canvas, vec!["render 01T00 +12h", "render 01T00 +12h"]);
        let rendered = layer.rendered().unwrap();
        assert_eq!(rendered.hour_offset.hours(), 12);
        assert_eq!(rendered.view, DetailedView::Hidden);

        layer.clear(&mut canvas);
        assert!(canvas.is_empty());
        assert!(layer.rendered().is_none());
    }

    #[test]
    fn test_set_view_requests_redraw_on_change_only() {
        let log = CallLog::default();
        let (mut layer, receiver) = layer(&log);
        let view = DetailedView::Shown(LatLon::new(1.0, 2.0));

        layer.set_view(view);
        layer.set_view(view);

        let events: Vec<Event> = receiver.try_iter().collect();
        assert_eq!(
            events,
            vec![Event::DetailedViewChanged(view), Event::RenderRequested]
        );
        assert_eq!(layer.view(), view);
    }

    #[test]
    fn test_select_run() {
        let log = CallLog::default();
        let (mut layer, receiver) = layer(&log);

        layer.select_run(1).unwrap();
        assert!(matches!(layer.select_run(2), Err(SelectionError::UnknownRun(2))));

        let events: Vec<Event> = receiver.try_iter().collect();
        assert_eq!(events, vec![Event::ForecastSelected(runs()[1])]);
    }
}
