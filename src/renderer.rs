//! # Frame Rendering
//!
//! A small monochrome frame buffer and the drawing routines used by the
//! terminal front end. Drawing goes through `embedded-graphics`, so the same
//! routines work on any `DrawTarget` with binary colors; the terminal simply
//! prints the buffer as text.
//!
//! The forecast fields themselves are not rasterized here. [`FrameRenderer`]
//! stamps the run/period being shown plus a bar marking how far into the
//! run's horizon the period lies.

use crate::period_selector::HourOffset;
use crate::surface::ForecastRenderer;
use crate::{ForecastMetadata, PeriodOffset};
use embedded_graphics::{
    mono_font::{ascii::FONT_6X10, MonoTextStyle},
    pixelcolor::BinaryColor,
    prelude::*,
    primitives::{PrimitiveStyle, Rectangle},
    text::Text,
};

/// Width of one period cell in the period strip, gap included
const CELL_WIDTH: u32 = 6;

/// Monochrome pixel grid, row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameBuffer {
    width: u32,
    height: u32,
    pixels: Vec<bool>,
}

impl FrameBuffer {
    pub fn new(width: u32, height: u32) -> Self {
        FrameBuffer {
            width,
            height,
            pixels: vec![false; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Whether the pixel is lit. Out-of-range pixels are off.
    pub fn is_on(&self, x: u32, y: u32) -> bool {
        x < self.width && y < self.height && self.pixels[self.index(x, y)]
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    pub fn lit_pixels(&self) -> usize {
        self.pixels.iter().filter(|on| **on).count()
    }

    pub fn clear_pixels(&mut self) {
        self.pixels.iter_mut().for_each(|on| *on = false);
    }

    /// Render the buffer as text, one line per pixel row.
    pub fn to_ascii(&self) -> String {
        self.pixels
            .chunks(self.width.max(1) as usize)
            .map(|row| row.iter().map(|on| if *on { '#' } else { ' ' }).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl DrawTarget for FrameBuffer {
    type Color = BinaryColor;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if point.x < 0 || point.y < 0 {
                continue;
            }
            let (x, y) = (point.x as u32, point.y as u32);
            if x < self.width && y < self.height {
                let idx = self.index(x, y);
                self.pixels[idx] = color == BinaryColor::On;
            }
        }
        Ok(())
    }
}

impl OriginDimensions for FrameBuffer {
    fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

/// Draw one cell per period, filling the selected one.
pub fn draw_period_strip<D>(
    periods: &[PeriodOffset],
    selected: &HourOffset,
    display: &mut D,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    let outline = PrimitiveStyle::with_stroke(BinaryColor::On, 1);
    let filled = PrimitiveStyle::with_fill(BinaryColor::On);
    let cell = Size::new(CELL_WIDTH - 1, display.bounding_box().size.height);

    for (index, period) in periods.iter().enumerate() {
        let top_left = Point::new((index as u32 * CELL_WIDTH) as i32, 0);
        let style = if period.gfs_offset == selected.hours() {
            filled
        } else {
            outline
        };
        Rectangle::new(top_left, cell)
            .into_styled(style)
            .draw(display)?;
    }
    Ok(())
}

/// Width in pixels of a period strip for `count` periods.
pub fn period_strip_width(count: usize) -> u32 {
    count as u32 * CELL_WIDTH
}

/// Stamps the selection onto a [`FrameBuffer`].
#[derive(Debug, Default)]
pub struct FrameRenderer;

impl FrameRenderer {
    pub fn new() -> Self {
        FrameRenderer
    }
}

impl ForecastRenderer<FrameBuffer> for FrameRenderer {
    fn render(
        &mut self,
        canvas: &mut FrameBuffer,
        metadata: &ForecastMetadata,
        hour_offset: &HourOffset,
    ) {
        canvas.clear_pixels();
        let (width, height) = (canvas.width(), canvas.height());

        Rectangle::new(Point::zero(), Size::new(width, height))
            .into_styled(PrimitiveStyle::with_stroke(BinaryColor::On, 1))
            .draw(canvas)
            .ok();

        let label = format!(
            "+{}h {}",
            hour_offset.hours(),
            hour_offset.local_date().format("%a %H:%M")
        );
        let text_style = MonoTextStyle::new(&FONT_6X10, BinaryColor::On);
        Text::new(&label, Point::new(3, 10), text_style)
            .draw(canvas)
            .ok();

        // Horizon bar along the bottom edge
        let inner = width.saturating_sub(4);
        let filled = inner * hour_offset.hours() / metadata.latest();
        if filled > 0 {
            Rectangle::new(
                Point::new(2, height as i32 - 4),
                Size::new(filled, 2),
            )
            .into_styled(PrimitiveStyle::with_fill(BinaryColor::On))
            .draw(canvas)
            .ok();
        }
    }

    fn clear(&mut self, canvas: &mut FrameBuffer) {
        canvas.clear_pixels();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::offsets::PeriodPolicy;
    use crate::period_selector::CandidateOffsets;
    use chrono::{TimeZone, Utc};

    fn run() -> ForecastMetadata {
        let init = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        ForecastMetadata::new(init, 72).unwrap()
    }

    #[test]
    fn test_render_draws_border_label_and_bar() {
        let metadata = run();
        let candidates = CandidateOffsets::compute(&metadata, &PeriodPolicy::default());
        let mut canvas = FrameBuffer::new(96, 24);
        let mut renderer = FrameRenderer::new();

        renderer.render(&mut canvas, &metadata, &candidates.get(36).unwrap());

        // Border corners
        assert!(canvas.is_on(0, 0));
        assert!(canvas.is_on(95, 23));
        // Bar reaches half of the inner width for +36h of a 72h run
        assert!(canvas.is_on(2, 20));
        assert!(canvas.is_on(2 + 45, 20));
        assert!(!canvas.is_on(2 + 47, 20));
        assert!(canvas.lit_pixels() > 96 * 2 + 24 * 2);

        renderer.clear(&mut canvas);
        assert_eq!(canvas.lit_pixels(), 0);
    }

    #[test]
    fn test_period_strip_fills_selected_cell() {
        let metadata = run();
        let candidates = CandidateOffsets::compute(&metadata, &PeriodPolicy::default());
        let periods = candidates.periods();
        let mut strip = FrameBuffer::new(period_strip_width(periods.len()), 3);

        draw_period_strip(periods, &candidates.get(12).unwrap(), &mut strip).unwrap();

        // Second cell is filled, first one only outlined
        assert!(strip.is_on(CELL_WIDTH + 2, 1));
        assert!(!strip.is_on(2, 1));
        assert!(strip.is_on(0, 1));
        let ascii = strip.to_ascii();
        assert_eq!(ascii.lines().count(), 3);
        assert_eq!(ascii.lines().next().unwrap().len(), periods.len() * 6);
    }

    #[test]
    fn test_out_of_range_pixels_are_ignored() {
        let mut canvas = FrameBuffer::new(4, 4);
        canvas
            .draw_iter([
                Pixel(Point::new(-1, 0), BinaryColor::On),
                Pixel(Point::new(10, 10), BinaryColor::On),
                Pixel(Point::new(1, 1), BinaryColor::On),
            ])
            .unwrap();
        assert_eq!(canvas.lit_pixels(), 1);
        assert!(canvas.is_on(1, 1));
    }
}
