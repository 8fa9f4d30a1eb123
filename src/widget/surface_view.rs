//! Half-block surface widget
//!
//! Draws an RGB bitmap into terminal cells using the upper-half-block
//! glyph: each cell carries two vertically stacked pixels, the top one in
//! the foreground color and the bottom one in the background color.

use ratatui::{buffer::Buffer, layout::Rect, style::Color, widgets::Widget};

use crate::surface::RgbBitmap;

const UPPER_HALF_BLOCK: &str = "\u{2580}";

/// Renders a bitmap scaled into a cell area with nearest-neighbor sampling
pub struct SurfaceView<'a> {
    bitmap: &'a RgbBitmap,
}

impl<'a> SurfaceView<'a> {
    #[must_use]
    pub fn new(bitmap: &'a RgbBitmap) -> Self {
        Self { bitmap }
    }

    fn sample(&self, area: Rect, cx: u16, cy: u16, bottom: bool) -> (u8, u8, u8) {
        let sub_row = u32::from(cy - area.y) * 2 + u32::from(bottom);
        let px = (u32::from(cx - area.x) * self.bitmap.width) / u32::from(area.width.max(1));
        let py = (sub_row * self.bitmap.height) / (u32::from(area.height.max(1)) * 2);
        self.bitmap
            .pixel(px.min(self.bitmap.width.saturating_sub(1)), py.min(self.bitmap.height.saturating_sub(1)))
    }
}

impl Widget for SurfaceView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if self.bitmap.width == 0 || self.bitmap.height == 0 {
            return;
        }

        let buffer_area = buf.area();
        let x_end = area.x.saturating_add(area.width).min(buffer_area.right());
        let y_end = area.y.saturating_add(area.height).min(buffer_area.bottom());
        let x_start = area.x.max(buffer_area.left());
        let y_start = area.y.max(buffer_area.top());

        for y in y_start..y_end {
            for x in x_start..x_end {
                let (tr, tg, tb) = self.sample(area, x, y, false);
                let (br, bg, bb) = self.sample(area, x, y, true);
                buf[(x, y)]
                    .set_symbol(UPPER_HALF_BLOCK)
                    .set_fg(Color::Rgb(tr, tg, tb))
                    .set_bg(Color::Rgb(br, bg, bb));
            }
        }
    }
}
