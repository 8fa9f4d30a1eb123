//! Viewport-to-surface coordinate mapping

use crate::surface::Surface;

/// A point in a surface's intrinsic pixel space
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SurfacePoint {
    pub x: f32,
    pub y: f32,
}

impl SurfacePoint {
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Map a viewport cell position to the surface's intrinsic pixel space.
///
/// Scale factors are intrinsic size over displayed size per axis, so the
/// displayed top-left corner maps to (0, 0) and the bottom-right corner to
/// (width, height). No clamping: a point outside the displayed area maps to
/// coordinates outside the pixel bounds, and callers clamp downstream.
#[must_use]
pub fn map_to_surface(surface: &Surface, column: u16, row: u16) -> SurfacePoint {
    let area = surface.area;
    let scale_x = surface.width() as f32 / f32::from(area.width.max(1));
    let scale_y = surface.height() as f32 / f32::from(area.height.max(1));

    SurfacePoint {
        x: (f32::from(column) - f32::from(area.x)) * scale_x,
        y: (f32::from(row) - f32::from(area.y)) * scale_y,
    }
}
