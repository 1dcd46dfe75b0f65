//! # Application Coordinator
//!
//! [`AppController`] is the single owner of the active model run. It builds
//! the map first, then the forecast layer and the period selector, and from
//! then on reacts to user input and component events:
//!
//! | Input / event          | Reaction                                          |
//! |------------------------|---------------------------------------------------|
//! | map click              | selector opens the detailed view at that point    |
//! | `Escape` key           | selector closes the meteogram                     |
//! | `HourOffsetChanged`    | redraw the active run at the new period           |
//! | `ForecastSelected`     | swap run, relabel map, replace selector, redraw   |
//! | `RenderRequested`      | redraw the current selection                      |
//! | `DetailedViewChanged`  | selector follows the layer's view                 |
//! | `MeteogramRequested`   | show meteogram, switch layer to detailed view     |
//! | `MeteogramHidden`      | hide meteogram, switch layer back                 |
//!
//! Every entry point drains all queued events before returning, so a handler
//! never observes a half-finished transition.

use crate::error::SelectionError;
use crate::events::{self, Event};
use crate::forecast_layer::ForecastLayer;
use crate::period_selector::{DetailedView, PeriodSelector, SelectionPolicy, SelectorSlot};
use crate::surface::{ForecastRenderer, MapProvider, MapView, MountPoint, MountedMap};
use crate::ForecastMetadata;
use chrono::{DateTime, Utc};
use log::{debug, info};
use std::sync::mpsc::Receiver;

/// Source of the current time, used to pick default periods.
pub type Clock = fn() -> DateTime<Utc>;

/// Label shown in the map's attribution area for a run.
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use forecast_periods_lib::{app::init_label, ForecastMetadata};
///
/// let init = Utc.with_ymd_and_hms(2024, 3, 5, 18, 0, 0).unwrap();
/// let run = ForecastMetadata::new(init, 96).unwrap();
/// assert_eq!(init_label(&run), "Initialization: Mar 05, 18:00 UTC");
/// ```
pub fn init_label(metadata: &ForecastMetadata) -> String {
    format!(
        "Initialization: {}",
        metadata.init().format("%b %d, %H:%M UTC")
    )
}

pub struct AppController<C> {
    active: ForecastMetadata,
    policy: SelectionPolicy,
    clock: Clock,
    canvas: C,
    map: Box<dyn MapView>,
    mount: Box<dyn MountPoint>,
    selector: SelectorSlot,
    forecast_layer: ForecastLayer<C>,
    layer_events: Receiver<Event>,
}

impl<C> AppController<C> {
    /// Mount the map, build the components and show the most recent run.
    ///
    /// `runs` must be ordered by initialization time.
    pub fn new(
        runs: Vec<ForecastMetadata>,
        provider: &mut dyn MapProvider<C>,
        renderer: Box<dyn ForecastRenderer<C>>,
        policy: SelectionPolicy,
        clock: Clock,
    ) -> Result<Self, SelectionError> {
        let active = *runs.last().ok_or(SelectionError::NoForecastRuns)?;

        // The map must be mounted before anything receives its canvas or mount point
        let MountedMap { canvas, map, mount } = provider.initialize();

        let (layer_sink, layer_events) = events::channel();
        let forecast_layer = ForecastLayer::new(runs, DetailedView::Hidden, renderer, layer_sink);

        let mut app = AppController {
            active,
            policy,
            clock,
            canvas,
            map,
            mount,
            selector: SelectorSlot::new(),
            forecast_layer,
            layer_events,
        };
        info!(
            "starting with {} runs, latest initialized at {}",
            app.runs().len(),
            active.init()
        );
        app.select_forecast(active);
        app.pump();
        Ok(app)
    }

    /// Map click: open the detailed view at that point.
    pub fn on_map_click(&mut self, lat: f64, lon: f64) {
        if let Some(selector) = self.selector.current_mut() {
            selector.show_detailed_view(lat, lon);
        }
        self.pump();
    }

    /// Key press on the map. Only `Escape` is handled.
    pub fn on_key_down(&mut self, key: &str) {
        if key == "Escape" {
            if let Some(selector) = self.selector.current_mut() {
                selector.hide_meteogram();
            }
        }
        self.pump();
    }

    /// Period chosen in the picker.
    pub fn on_hour_offset_picked(&mut self, hours: u32) -> Result<(), SelectionError> {
        let result = match self.selector.current_mut() {
            Some(selector) => selector.select_hour_offset(hours),
            None => Ok(()),
        };
        self.pump();
        result
    }

    /// Run chosen in the forecast layer's run picker.
    pub fn on_run_selected(&mut self, index: usize) -> Result<(), SelectionError> {
        let result = self.forecast_layer.select_run(index);
        self.pump();
        result
    }

    /// View mode toggled from the forecast layer's controls.
    pub fn on_view_toggled(&mut self, view: DetailedView) {
        self.forecast_layer.set_view(view);
        self.pump();
    }

    pub fn active(&self) -> &ForecastMetadata {
        &self.active
    }

    pub fn runs(&self) -> &[ForecastMetadata] {
        self.forecast_layer.runs()
    }

    pub fn selector(&self) -> Option<&PeriodSelector> {
        self.selector.current()
    }

    pub fn forecast_layer(&self) -> &ForecastLayer<C> {
        &self.forecast_layer
    }

    pub fn canvas(&self) -> &C {
        &self.canvas
    }

    /// Switch to another run and rebuild the selector against it.
    fn select_forecast(&mut self, metadata: ForecastMetadata) {
        self.active = metadata;
        self.map.set_label_prefix(&init_label(&metadata));

        let view = self
            .selector
            .current()
            .map(PeriodSelector::detailed_view)
            .unwrap_or_default();
        let policy = self.policy;
        let now = (self.clock)();
        let mount = self.mount.as_mut();
        let has_selection = self
            .selector
            .replace(|sink| PeriodSelector::mount(metadata, &policy, now, view, mount, sink))
            .hour_offset()
            .is_some();

        if !has_selection {
            if view.is_shown() {
                self.mount.hide_meteogram();
                self.forecast_layer.set_view(DetailedView::Hidden);
            }
            self.forecast_layer.clear(&mut self.canvas);
        }
    }

    /// Deliver queued events until every queue is empty. Selector events go
    /// first.
    fn pump(&mut self) {
        loop {
            let event = match self.selector.next_event() {
                Some(event) => event,
                None => match self.layer_events.try_recv() {
                    Ok(event) => event,
                    Err(_) => break,
                },
            };
            self.dispatch(event);
        }
    }

    fn dispatch(&mut self, event: Event) {
        debug!("dispatch {:?}", event);
        match event {
            Event::HourOffsetChanged(hour_offset) => {
                self.forecast_layer
                    .update_forecast(&self.active, hour_offset, &mut self.canvas);
            }
            Event::ForecastSelected(metadata) => self.select_forecast(metadata),
            Event::RenderRequested => {
                if let Some(hour_offset) = self.selector.current().and_then(|s| s.hour_offset()) {
                    self.forecast_layer
                        .update_forecast(&self.active, hour_offset, &mut self.canvas);
                }
            }
            Event::DetailedViewChanged(view) => {
                if let Some(selector) = self.selector.current_mut() {
                    let was_shown = selector.detailed_view().is_shown();
                    selector.update_detailed_view(view);
                    if was_shown && !view.is_shown() {
                        self.mount.hide_meteogram();
                    }
                }
            }
            Event::MeteogramRequested { point, hour_offset } => {
                self.mount
                    .show_meteogram(&self.active, point, &hour_offset);
                self.forecast_layer.set_view(DetailedView::Shown(point));
            }
            Event::MeteogramHidden => {
                self.mount.hide_meteogram();
                self.forecast_layer.set_view(DetailedView::Hidden);
            }
        }
    }
}
