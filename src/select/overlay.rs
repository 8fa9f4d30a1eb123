//! Selection overlay compositing
//!
//! The overlay is composited into a copy of the surface bitmap at display
//! time; the base pixels are never modified. That way region capture can
//! read the surface directly with no clear step and no settle delay, and
//! the highlight can never leak into the pixels handed to OCR.

use super::mapping::SurfacePoint;
use crate::surface::RgbBitmap;

/// Highlight color (semi-transparent yellow when blended)
const HIGHLIGHT_RGB: (u8, u8, u8) = (0xFF, 0xE0, 0x00);
/// Stroke width in surface pixels
const STROKE_WIDTH: u32 = 2;
/// Fill opacity out of 256
const FILL_ALPHA: u16 = 64;
/// Stroke opacity out of 256
const STROKE_ALPHA: u16 = 208;

/// Normalize two opposite corners into clamped pixel bounds.
///
/// Dragging up or left produces the same rectangle as dragging down or
/// right. Returns `(x0, y0, x1, y1)` with the max edge exclusive, clamped
/// to the bitmap dimensions.
#[must_use]
pub fn normalized_rect(
    anchor: SurfacePoint,
    current: SurfacePoint,
    width: u32,
    height: u32,
) -> (u32, u32, u32, u32) {
    let clamp = |v: f32, max: u32| v.max(0.0).min(max as f32) as u32;
    let x0 = clamp(anchor.x.min(current.x), width);
    let x1 = clamp(anchor.x.max(current.x).ceil(), width);
    let y0 = clamp(anchor.y.min(current.y), height);
    let y1 = clamp(anchor.y.max(current.y).ceil(), height);
    (x0, y0, x1, y1)
}

#[inline]
fn blend(base: (u8, u8, u8), alpha: u16) -> (u8, u8, u8) {
    let mix = |b: u8, h: u8| -> u8 {
        ((u16::from(b) * (256 - alpha) + u16::from(h) * alpha) >> 8) as u8
    };
    (
        mix(base.0, HIGHLIGHT_RGB.0),
        mix(base.1, HIGHLIGHT_RGB.1),
        mix(base.2, HIGHLIGHT_RGB.2),
    )
}

/// Produce the display frame for a surface with the in-progress selection
/// rectangle blended over it.
#[must_use]
pub fn composite(base: &RgbBitmap, anchor: SurfacePoint, current: SurfacePoint) -> RgbBitmap {
    let (x0, y0, x1, y1) = normalized_rect(anchor, current, base.width, base.height);
    if x1 <= x0 || y1 <= y0 {
        return base.clone();
    }

    let mut out = base.clone();
    for y in y0..y1 {
        for x in x0..x1 {
            let on_stroke = x < x0 + STROKE_WIDTH
                || x >= x1.saturating_sub(STROKE_WIDTH)
                || y < y0 + STROKE_WIDTH
                || y >= y1.saturating_sub(STROKE_WIDTH);
            let alpha = if on_stroke { STROKE_ALPHA } else { FILL_ALPHA };
            out.set_pixel(x, y, blend(out.pixel(x, y), alpha));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_is_normalized_for_any_drag_direction() {
        let down_right = normalized_rect(
            SurfacePoint::new(10.0, 10.0),
            SurfacePoint::new(50.0, 80.0),
            200,
            300,
        );
        let up_left = normalized_rect(
            SurfacePoint::new(50.0, 80.0),
            SurfacePoint::new(10.0, 10.0),
            200,
            300,
        );
        assert_eq!(down_right, (10, 10, 50, 80));
        assert_eq!(up_left, down_right);
    }

    #[test]
    fn rect_clamps_to_surface_bounds() {
        let r = normalized_rect(
            SurfacePoint::new(-20.0, 5.0),
            SurfacePoint::new(500.0, 900.0),
            200,
            300,
        );
        assert_eq!(r, (0, 5, 200, 300));
    }

    #[test]
    fn composite_leaves_base_untouched() {
        let base = RgbBitmap::new(20, 20);
        let snapshot = base.clone();

        let framed = composite(
            &base,
            SurfacePoint::new(2.0, 2.0),
            SurfacePoint::new(15.0, 15.0),
        );

        assert_eq!(base, snapshot);
        assert_ne!(framed, base);
    }

    #[test]
    fn highlight_covers_selection_interior() {
        let base = RgbBitmap::new(20, 20);
        let framed = composite(
            &base,
            SurfacePoint::new(4.0, 4.0),
            SurfacePoint::new(16.0, 16.0),
        );

        // Interior pixel tinted, outside pixel unchanged
        assert_ne!(framed.pixel(10, 10), base.pixel(10, 10));
        assert_eq!(framed.pixel(1, 1), base.pixel(1, 1));
        // Stroke is more opaque than the fill
        assert_ne!(framed.pixel(4, 10), framed.pixel(10, 10));
    }

    #[test]
    fn degenerate_selection_draws_nothing() {
        let base = RgbBitmap::new(20, 20);
        let framed = composite(
            &base,
            SurfacePoint::new(5.0, 5.0),
            SurfacePoint::new(5.0, 5.0),
        );
        assert_eq!(framed, base);
    }
}
