//! Rendered surfaces and the registry that owns them
//!
//! A surface is one rendered page or image: an RGB bitmap at its intrinsic
//! pixel size, plus the terminal-cell rectangle it is displayed in. All
//! surfaces for the currently loaded document live in a [`SurfaceRegistry`]
//! and are addressed by [`SurfaceId`] handles rather than references, so a
//! handle that outlives a document reload resolves to `None` instead of
//! touching surfaces that no longer exist.

use ratatui::layout::Rect;

/// Raw RGB bitmap (3 bytes per pixel: R, G, B)
#[derive(Clone, PartialEq, Eq)]
pub struct RgbBitmap {
    pub pixels: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl RgbBitmap {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            pixels: vec![0xFF; (width * height * 3) as usize],
            width,
            height,
        }
    }

    /// Pixel at (x, y), or white if out of bounds
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> (u8, u8, u8) {
        if x >= self.width || y >= self.height {
            return (0xFF, 0xFF, 0xFF);
        }
        let i = ((y * self.width + x) * 3) as usize;
        (self.pixels[i], self.pixels[i + 1], self.pixels[i + 2])
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, rgb: (u8, u8, u8)) {
        if x >= self.width || y >= self.height {
            return;
        }
        let i = ((y * self.width + x) * 3) as usize;
        self.pixels[i] = rgb.0;
        self.pixels[i + 1] = rgb.1;
        self.pixels[i + 2] = rgb.2;
    }

    /// Copy the rectangle from (x0, y0) to (x1, y1) (exclusive) into a new bitmap.
    ///
    /// Coordinates are clamped to the bitmap bounds; an empty intersection
    /// yields a 0x0 bitmap.
    #[must_use]
    pub fn crop(&self, x0: u32, y0: u32, x1: u32, y1: u32) -> RgbBitmap {
        let x0 = x0.min(self.width);
        let y0 = y0.min(self.height);
        let x1 = x1.clamp(x0, self.width);
        let y1 = y1.clamp(y0, self.height);

        let w = x1 - x0;
        let h = y1 - y0;
        let mut pixels = Vec::with_capacity((w * h * 3) as usize);
        for y in y0..y1 {
            let row_start = ((y * self.width + x0) * 3) as usize;
            let row_end = row_start + (w * 3) as usize;
            pixels.extend_from_slice(&self.pixels[row_start..row_end]);
        }
        RgbBitmap {
            pixels,
            width: w,
            height: h,
        }
    }
}

impl std::fmt::Debug for RgbBitmap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RgbBitmap")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

/// One rendered page or image
#[derive(Clone, Debug)]
pub struct Surface {
    /// Intrinsic pixel content
    pub bitmap: RgbBitmap,
    /// Displayed area in terminal cells
    pub area: Rect,
}

impl Surface {
    #[must_use]
    pub fn new(bitmap: RgbBitmap, area: Rect) -> Self {
        Self { bitmap, area }
    }

    /// Intrinsic width in pixels
    #[must_use]
    pub fn width(&self) -> u32 {
        self.bitmap.width
    }

    /// Intrinsic height in pixels
    #[must_use]
    pub fn height(&self) -> u32 {
        self.bitmap.height
    }
}

/// Handle to a surface, valid only for the document epoch it was issued in
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SurfaceId {
    index: usize,
    epoch: u64,
}

impl SurfaceId {
    #[must_use]
    pub fn epoch(&self) -> u64 {
        self.epoch
    }
}

/// Owns all surfaces for the currently loaded document.
///
/// Loading a new document clears the surfaces and bumps the epoch, which
/// invalidates every previously issued [`SurfaceId`].
#[derive(Debug, Default)]
pub struct SurfaceRegistry {
    surfaces: Vec<Surface>,
    epoch: u64,
}

impl SurfaceRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current document epoch
    #[must_use]
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Discard all surfaces and invalidate outstanding handles
    pub fn clear(&mut self) {
        self.surfaces.clear();
        self.epoch += 1;
    }

    /// Register a surface, returning its handle
    pub fn register(&mut self, surface: Surface) -> SurfaceId {
        self.surfaces.push(surface);
        SurfaceId {
            index: self.surfaces.len() - 1,
            epoch: self.epoch,
        }
    }

    /// Resolve a handle; `None` if it belongs to a discarded document
    #[must_use]
    pub fn get(&self, id: SurfaceId) -> Option<&Surface> {
        if id.epoch != self.epoch {
            return None;
        }
        self.surfaces.get(id.index)
    }

    /// Find the surface whose displayed area contains the given cell
    #[must_use]
    pub fn surface_at(&self, column: u16, row: u16) -> Option<SurfaceId> {
        self.surfaces
            .iter()
            .position(|s| {
                column >= s.area.x
                    && column < s.area.x + s.area.width
                    && row >= s.area.y
                    && row < s.area.y + s.area.height
            })
            .map(|index| SurfaceId {
                index,
                epoch: self.epoch,
            })
    }

    /// Iterate over all surfaces with their handles
    pub fn iter(&self) -> impl Iterator<Item = (SurfaceId, &Surface)> {
        let epoch = self.epoch;
        self.surfaces
            .iter()
            .enumerate()
            .map(move |(index, s)| (SurfaceId { index, epoch }, s))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.surfaces.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.surfaces.is_empty()
    }
}
