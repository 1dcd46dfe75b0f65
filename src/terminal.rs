//! # Terminal Collaborators
//!
//! Stand-ins for the map, picker and meteogram widgets that print to stdout.
//! Every printed line is also appended to a shared [`Transcript`], which is
//! what the scenario tests inspect.

use crate::offsets::group_by_day;
use crate::period_selector::HourOffset;
use crate::renderer::{draw_period_strip, period_strip_width, FrameBuffer};
use crate::surface::{MapProvider, MapView, MountPoint, MountedMap, PeriodPicker};
use crate::{ForecastMetadata, LatLon, PeriodOffset};
use chrono::{FixedOffset, Offset, Utc};
use std::cell::RefCell;
use std::rc::Rc;

/// Lines printed by the terminal collaborators, in order.
pub type Transcript = Rc<RefCell<Vec<String>>>;

fn emit(transcript: &Transcript, line: String) {
    println!("{line}");
    transcript.borrow_mut().push(line);
}

/// Terminal "map": a frame buffer canvas plus printed label and popups.
pub struct TerminalMap {
    width: u32,
    height: u32,
    transcript: Transcript,
}

impl TerminalMap {
    pub fn new(width: u32, height: u32) -> Self {
        TerminalMap {
            width,
            height,
            transcript: Transcript::default(),
        }
    }

    pub fn transcript(&self) -> Transcript {
        self.transcript.clone()
    }
}

impl MapProvider<FrameBuffer> for TerminalMap {
    fn initialize(&mut self) -> MountedMap<FrameBuffer> {
        MountedMap {
            canvas: FrameBuffer::new(self.width, self.height),
            map: Box::new(TerminalLabel {
                transcript: self.transcript.clone(),
            }),
            mount: Box::new(TerminalMount {
                transcript: self.transcript.clone(),
                zone: Utc.fix(),
            }),
        }
    }
}

struct TerminalLabel {
    transcript: Transcript,
}

impl MapView for TerminalLabel {
    fn set_label_prefix(&mut self, prefix: &str) {
        emit(&self.transcript, format!("[map] {prefix}"));
    }
}

struct TerminalMount {
    transcript: Transcript,
    zone: FixedOffset,
}

impl MountPoint for TerminalMount {
    fn mount_picker(&mut self) -> Box<dyn PeriodPicker> {
        Box::new(TerminalPicker {
            transcript: self.transcript.clone(),
            zone: self.zone,
            periods: Vec::new(),
        })
    }

    fn show_meteogram(
        &mut self,
        metadata: &ForecastMetadata,
        point: LatLon,
        hour_offset: &HourOffset,
    ) {
        emit(
            &self.transcript,
            format!(
                "[meteogram] {:.2},{:.2} run {} from +{}h",
                point.lat,
                point.lon,
                metadata.init().format("%Y-%m-%d %H:%M"),
                hour_offset.hours()
            ),
        );
    }

    fn hide_meteogram(&mut self) {
        emit(&self.transcript, "[meteogram] closed".to_string());
    }
}

struct TerminalPicker {
    transcript: Transcript,
    zone: FixedOffset,
    periods: Vec<PeriodOffset>,
}

impl TerminalPicker {
    fn print(&self, selected: &HourOffset) {
        for line in format_periods(&self.periods, selected, &self.zone) {
            emit(&self.transcript, line);
        }
        let mut strip = FrameBuffer::new(period_strip_width(self.periods.len()), 3);
        if draw_period_strip(&self.periods, selected, &mut strip).is_ok() {
            println!("{}", strip.to_ascii());
        }
    }
}

impl PeriodPicker for TerminalPicker {
    fn show(&mut self, periods: &[PeriodOffset], selected: &HourOffset) {
        self.periods = periods.to_vec();
        self.print(selected);
    }

    fn highlight(&mut self, selected: &HourOffset) {
        self.print(selected);
    }

    fn unmount(&mut self) {
        self.periods.clear();
        emit(&self.transcript, "[picker] unmounted".to_string());
    }
}

/// One line per day, the selected period in brackets.
pub fn format_periods(
    periods: &[PeriodOffset],
    selected: &HourOffset,
    zone: &FixedOffset,
) -> Vec<String> {
    group_by_day(periods, zone)
        .iter()
        .map(|day| {
            let date = day[0].local_date.with_timezone(zone).format("%a %d");
            let entries: Vec<String> = day
                .iter()
                .map(|period| {
                    let time = period.local_date.with_timezone(zone).format("%H:%M");
                    if period.gfs_offset == selected.hours() {
                        format!("[+{}h {}]", period.gfs_offset, time)
                    } else {
                        format!(" +{}h {} ", period.gfs_offset, time)
                    }
                })
                .collect();
            format!("[picker] {} {}", date, entries.join(" "))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::offsets::PeriodPolicy;
    use crate::period_selector::CandidateOffsets;
    use chrono::TimeZone;

    #[test]
    fn test_format_periods_marks_selection() {
        let init = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let run = ForecastMetadata::new(init, 48).unwrap();
        let candidates = CandidateOffsets::compute(&run, &PeriodPolicy::default());
        let selected = candidates.get(36).unwrap();

        let lines = format_periods(candidates.periods(), &selected, &Utc.fix());

        assert_eq!(
            lines,
            vec![
                "[picker] Mon 01  +9h 09:00   +12h 12:00   +15h 15:00 ",
                "[picker] Tue 02  +33h 09:00  [+36h 12:00]  +39h 15:00 ",
            ]
        );
    }

    #[test]
    fn test_collaborators_write_transcript() {
        let mut map = TerminalMap::new(32, 8);
        let transcript = map.transcript();
        let MountedMap {
            canvas,
            mut map,
            mut mount,
        } = map.initialize();
        assert_eq!(canvas.width(), 32);

        map.set_label_prefix("Initialization: Jan 01, 00:00 UTC");
        mount.hide_meteogram();
        let mut picker = mount.mount_picker();
        picker.unmount();

        assert_eq!(
            transcript.borrow().as_slice(),
            [
                "[map] Initialization: Jan 01, 00:00 UTC",
                "[meteogram] closed",
                "[picker] unmounted",
            ]
        );
    }
}
