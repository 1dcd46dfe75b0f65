//! # External Collaborators
//!
//! Traits for everything the core drives but does not implement: the map and
//! its canvas, the forecast renderer, the period picker and the meteogram
//! popup. The canvas type `C` is opaque to the core; it is only handed from
//! the map provider to the renderer.

use crate::period_selector::HourOffset;
use crate::{ForecastMetadata, LatLon, PeriodOffset};

/// Everything the map provider hands back once it is mounted.
pub struct MountedMap<C> {
    /// Surface the forecast layer draws into
    pub canvas: C,
    /// Map widget, used for the attribution/label area
    pub map: Box<dyn MapView>,
    /// Element the picker and meteogram mount into
    pub mount: Box<dyn MountPoint>,
}

/// Creates and mounts the map. Must run before any other component is built.
pub trait MapProvider<C> {
    fn initialize(&mut self) -> MountedMap<C>;
}

pub trait MapView {
    /// Replace the text prefix of the attribution/label area
    fn set_label_prefix(&mut self, prefix: &str);
}

/// Draws forecast fields. Side effects are confined to the canvas.
pub trait ForecastRenderer<C> {
    fn render(&mut self, canvas: &mut C, metadata: &ForecastMetadata, hour_offset: &HourOffset);

    /// Wipe whatever was drawn last
    fn clear(&mut self, canvas: &mut C);
}

/// Element shared by the picker and the meteogram popup.
pub trait MountPoint {
    /// Attach a fresh period picker to the element
    fn mount_picker(&mut self) -> Box<dyn PeriodPicker>;

    fn show_meteogram(
        &mut self,
        metadata: &ForecastMetadata,
        point: LatLon,
        hour_offset: &HourOffset,
    );

    fn hide_meteogram(&mut self);
}

/// Visual period picker. Only ever told what to show.
pub trait PeriodPicker {
    fn show(&mut self, periods: &[PeriodOffset], selected: &HourOffset);

    fn highlight(&mut self, selected: &HourOffset);

    /// Release the picker's visual nodes
    fn unmount(&mut self);
}
