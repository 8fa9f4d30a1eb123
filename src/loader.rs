//! Document loading and dispatch
//!
//! Routes an input file to the right rendering path: paged documents get
//! one surface per page, raster images one surface, plain text a preview
//! pane and no surfaces. Anything else is a silent no-op. Previous
//! surfaces and preview content are always cleared (and the document epoch
//! bumped) before any new rendering begins.

use std::path::Path;

use anyhow::{Context, Result};
use log::{info, warn};
use ratatui::layout::Rect;

use crate::render::PageRenderer;
use crate::surface::{RgbBitmap, Surface, SurfaceRegistry};

/// Vertical gap between page surfaces, in cells
const PAGE_GAP: u16 = 1;

/// Recognized media categories
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MediaKind {
    Pdf,
    Image,
    Text,
}

/// Classify a file by extension; `None` means unsupported.
#[must_use]
pub fn sniff_media(path: &Path) -> Option<MediaKind> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "pdf" => Some(MediaKind::Pdf),
        "png" | "jpg" | "jpeg" | "gif" | "webp" => Some(MediaKind::Image),
        "txt" => Some(MediaKind::Text),
        _ => None,
    }
}

/// Result of a load: what was recognized and any text preview
#[derive(Debug, Default)]
pub struct LoadOutcome {
    pub kind: Option<MediaKind>,
    pub preview: Option<String>,
}

type RendererFactory = Box<dyn Fn(&Path) -> Result<Box<dyn PageRenderer>>>;

pub struct DocumentLoader {
    /// Oversampling factor for page rasterization
    render_scale: f32,
    open_renderer: RendererFactory,
}

impl DocumentLoader {
    #[must_use]
    pub fn new(render_scale: f32) -> Self {
        Self {
            render_scale,
            open_renderer: Box::new(default_renderer_factory),
        }
    }

    /// Replace the page-renderer factory (used by tests)
    #[must_use]
    pub fn with_renderer_factory(mut self, factory: RendererFactory) -> Self {
        self.open_renderer = factory;
        self
    }

    /// Load a file, replacing whatever document is currently shown.
    ///
    /// `viewport` is the cell area available for surfaces; layout stacks
    /// pages vertically in content coordinates starting at row 0.
    pub fn load(
        &self,
        path: &Path,
        registry: &mut SurfaceRegistry,
        viewport: Rect,
    ) -> Result<LoadOutcome> {
        // Clear before dispatch, even for unsupported types
        registry.clear();

        let Some(kind) = sniff_media(path) else {
            info!("ignoring unsupported file {}", path.display());
            return Ok(LoadOutcome::default());
        };

        let preview = match kind {
            MediaKind::Pdf => {
                self.load_pdf(path, registry, viewport)?;
                None
            }
            MediaKind::Image => {
                self.load_image(path, registry, viewport)?;
                None
            }
            MediaKind::Text => Some(
                std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read {}", path.display()))?,
            ),
        };

        info!(
            "loaded {} as {:?}: {} surface(s)",
            path.display(),
            kind,
            registry.len()
        );
        Ok(LoadOutcome {
            kind: Some(kind),
            preview,
        })
    }

    fn load_pdf(&self, path: &Path, registry: &mut SurfaceRegistry, viewport: Rect) -> Result<()> {
        let mut renderer = (self.open_renderer)(path)?;
        // Stack position in u32: a long document must not wrap the u16
        // cell grid and corrupt hit-testing
        let mut next_y = 0u32;
        for index in 0..renderer.page_count() {
            match renderer.render_page(index, self.render_scale) {
                Ok(bitmap) => {
                    let Ok(y) = u16::try_from(next_y) else {
                        warn!("cell grid exhausted; dropping pages from {index} on");
                        break;
                    };
                    let area = layout_area(y, viewport.width, &bitmap);
                    if u32::from(area.y) + u32::from(area.height) > u32::from(u16::MAX) {
                        warn!("cell grid exhausted; dropping pages from {index} on");
                        break;
                    }
                    next_y = u32::from(area.y) + u32::from(area.height) + u32::from(PAGE_GAP);
                    registry.register(Surface::new(bitmap, area));
                }
                // A broken page does not abort the rest of the document
                Err(e) => warn!("skipping page {index}: {e}"),
            }
        }
        Ok(())
    }

    fn load_image(
        &self,
        path: &Path,
        registry: &mut SurfaceRegistry,
        viewport: Rect,
    ) -> Result<()> {
        let decoded = image::open(path)
            .with_context(|| format!("failed to decode {}", path.display()))?
            .to_rgb8();
        let bitmap = RgbBitmap {
            width: decoded.width(),
            height: decoded.height(),
            pixels: decoded.into_raw(),
        };
        let area = layout_area(0, viewport.width, &bitmap);
        registry.register(Surface::new(bitmap, area));
        Ok(())
    }
}

/// Displayed area for a bitmap: full viewport width, height chosen to keep
/// square pixels under half-block rendering (two pixel rows per cell).
fn layout_area(y: u16, viewport_width: u16, bitmap: &RgbBitmap) -> Rect {
    let width = viewport_width.max(1);
    let height_cells = (bitmap.height as u64 * u64::from(width))
        .div_ceil(bitmap.width.max(1) as u64 * 2)
        .max(1);
    let height = u16::try_from(height_cells).unwrap_or(u16::MAX);
    Rect::new(0, y, width, height)
}

#[cfg(feature = "pdf")]
fn default_renderer_factory(path: &Path) -> Result<Box<dyn PageRenderer>> {
    Ok(Box::new(crate::render::MupdfRenderer::open(path)?))
}

#[cfg(not(feature = "pdf"))]
fn default_renderer_factory(_path: &Path) -> Result<Box<dyn PageRenderer>> {
    anyhow::bail!("built without PDF support")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    struct FakePages {
        count: usize,
    }

    impl PageRenderer for FakePages {
        fn page_count(&self) -> usize {
            self.count
        }

        fn render_page(&mut self, _index: usize, _scale: f32) -> Result<RgbBitmap> {
            Ok(RgbBitmap::new(100, 200))
        }
    }

    fn fake_pdf_loader(pages: usize) -> DocumentLoader {
        DocumentLoader::new(2.0)
            .with_renderer_factory(Box::new(move |_| Ok(Box::new(FakePages { count: pages }))))
    }

    #[test]
    fn sniffs_known_extensions() {
        assert_eq!(sniff_media(Path::new("a.pdf")), Some(MediaKind::Pdf));
        assert_eq!(sniff_media(Path::new("a.PNG")), Some(MediaKind::Image));
        assert_eq!(sniff_media(Path::new("a.txt")), Some(MediaKind::Text));
        assert_eq!(sniff_media(Path::new("a.docx")), None);
        assert_eq!(sniff_media(Path::new("noext")), None);
    }

    #[test]
    fn pdf_load_registers_one_surface_per_page() {
        let loader = fake_pdf_loader(3);
        let mut registry = SurfaceRegistry::new();

        let outcome = loader
            .load(Path::new("doc.pdf"), &mut registry, Rect::new(0, 0, 40, 20))
            .unwrap();

        assert_eq!(outcome.kind, Some(MediaKind::Pdf));
        assert_eq!(registry.len(), 3);

        // Pages are stacked with a gap and never overlap
        let areas: Vec<_> = registry.iter().map(|(_, s)| s.area).collect();
        for pair in areas.windows(2) {
            assert!(pair[1].y >= pair[0].y + pair[0].height + PAGE_GAP);
        }
    }

    #[test]
    fn reload_clears_previous_surfaces_first() {
        let loader = fake_pdf_loader(2);
        let mut registry = SurfaceRegistry::new();
        let viewport = Rect::new(0, 0, 40, 20);

        loader
            .load(Path::new("first.pdf"), &mut registry, viewport)
            .unwrap();
        let stale = registry.iter().map(|(id, _)| id).collect::<Vec<_>>();
        let old_epoch = registry.epoch();

        loader
            .load(Path::new("second.pdf"), &mut registry, viewport)
            .unwrap();

        assert_eq!(registry.len(), 2);
        assert_ne!(registry.epoch(), old_epoch);
        for id in stale {
            assert!(registry.get(id).is_none());
        }
    }

    #[test]
    fn unsupported_type_is_silent_noop_but_still_clears() {
        let loader = fake_pdf_loader(1);
        let mut registry = SurfaceRegistry::new();
        let viewport = Rect::new(0, 0, 40, 20);

        loader
            .load(Path::new("doc.pdf"), &mut registry, viewport)
            .unwrap();
        assert_eq!(registry.len(), 1);

        let outcome = loader
            .load(Path::new("mystery.docx"), &mut registry, viewport)
            .unwrap();
        assert_eq!(outcome.kind, None);
        assert!(outcome.preview.is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn text_file_yields_preview_and_no_surfaces() {
        let mut file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        writeln!(file, "hello from a text file").unwrap();

        let loader = fake_pdf_loader(1);
        let mut registry = SurfaceRegistry::new();

        let outcome = loader
            .load(file.path(), &mut registry, Rect::new(0, 0, 40, 20))
            .unwrap();

        assert_eq!(outcome.kind, Some(MediaKind::Text));
        assert!(outcome.preview.unwrap().contains("hello from a text file"));
        assert!(registry.is_empty());
    }

    #[test]
    fn long_document_stops_at_the_cell_grid_limit() {
        // 100x200 px pages at 40 cells wide lay out as 40 rows plus the
        // gap; 1700 of them would pass u16::MAX, so layout stops early
        // instead of wrapping and overlapping earlier pages
        let loader = fake_pdf_loader(1700);
        let mut registry = SurfaceRegistry::new();

        loader
            .load(Path::new("doc.pdf"), &mut registry, Rect::new(0, 0, 40, 20))
            .unwrap();

        assert!(!registry.is_empty());
        assert!(registry.len() < 1700);
        for (_, s) in registry.iter() {
            assert!(u32::from(s.area.y) + u32::from(s.area.height) <= u32::from(u16::MAX));
        }
    }

    #[test]
    fn layout_keeps_aspect_with_half_block_cells() {
        // 100x200 px at 40 cells wide -> 200 * 40 / (100 * 2) = 40 rows
        let area = layout_area(0, 40, &RgbBitmap::new(100, 200));
        assert_eq!(area.width, 40);
        assert_eq!(area.height, 40);
    }
}
