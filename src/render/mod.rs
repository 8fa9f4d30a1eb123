//! Page rendering collaborator
//!
//! The loader only depends on [`PageRenderer`]; the MuPDF implementation
//! is compiled in with the `pdf` feature.

#[cfg(feature = "pdf")]
mod mupdf_renderer;

#[cfg(feature = "pdf")]
pub use mupdf_renderer::MupdfRenderer;

use anyhow::Result;

use crate::surface::RgbBitmap;

/// Renders pages of a loaded document into RGB bitmaps
pub trait PageRenderer {
    /// Number of pages in the document
    fn page_count(&self) -> usize;

    /// Render one page at the given oversampling scale (1.0 = the page's
    /// natural point size)
    fn render_page(&mut self, index: usize, scale: f32) -> Result<RgbBitmap>;
}
