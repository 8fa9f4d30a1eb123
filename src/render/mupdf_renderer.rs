//! MuPDF-backed page renderer

use std::path::Path;

use anyhow::{Context, Result, anyhow};
use mupdf::{Colorspace, Document, Matrix};

use super::PageRenderer;
use crate::surface::RgbBitmap;

pub struct MupdfRenderer {
    doc: Document,
    page_count: usize,
}

impl MupdfRenderer {
    pub fn open(path: &Path) -> Result<Self> {
        let doc = Document::open(path.to_string_lossy().as_ref())
            .with_context(|| format!("failed to open document {}", path.display()))?;
        let page_count = doc.page_count().context("failed to read page count")? as usize;
        Ok(Self { doc, page_count })
    }
}

impl PageRenderer for MupdfRenderer {
    fn page_count(&self) -> usize {
        self.page_count
    }

    fn render_page(&mut self, index: usize, scale: f32) -> Result<RgbBitmap> {
        let page = self
            .doc
            .load_page(index as i32)
            .with_context(|| format!("failed to load page {index}"))?;

        let transform = Matrix::new_scale(scale, scale);
        let rgb = Colorspace::device_rgb();
        let pixmap = page
            .to_pixmap(&transform, &rgb, false, false)
            .with_context(|| format!("failed to rasterize page {index}"))?;

        pixmap_to_rgb(&pixmap)
    }
}

fn pixmap_to_rgb(pixmap: &mupdf::Pixmap) -> Result<RgbBitmap> {
    let n = pixmap.n() as usize;
    if n < 3 {
        return Err(anyhow!("unsupported pixmap format: {n} channels"));
    }

    let width = pixmap.width() as usize;
    let height = pixmap.height() as usize;
    let stride = pixmap.stride() as usize;
    let samples = pixmap.samples();
    let row_bytes = width * n;
    if samples.len() < stride.saturating_mul(height) || row_bytes > stride {
        return Err(anyhow!("pixmap buffer size mismatch"));
    }

    let mut pixels = Vec::with_capacity(width * height * 3);
    for y in 0..height {
        let row_start = y * stride;
        let row = &samples[row_start..row_start + row_bytes];
        if n == 3 {
            pixels.extend_from_slice(row);
        } else {
            for px in row.chunks_exact(n) {
                pixels.extend_from_slice(&px[..3]);
            }
        }
    }

    Ok(RgbBitmap {
        pixels,
        width: width as u32,
        height: height as u32,
    })
}
