//! Application shell: event loop, layout, and wiring between the gesture
//! core and the OCR/speech collaborators.

use std::borrow::Cow;
use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{Event, KeyCode, KeyEventKind, MouseEventKind};
use log::info;
use ratatui::{
    Frame, Terminal,
    backend::Backend,
    layout::Rect,
    style::{Color, Style},
    text::Line,
    widgets::{Paragraph, Wrap},
};

use crate::event_source::EventSource;
use crate::loader::DocumentLoader;
use crate::select::{GestureTracker, PointerInput, RegionProcessor, normalize, overlay};
use crate::surface::SurfaceRegistry;
use crate::widget::SurfaceView;

const TICK: Duration = Duration::from_millis(50);
const SCROLL_STEP: u16 = 2;

pub struct ReaderApp {
    registry: SurfaceRegistry,
    tracker: GestureTracker,
    loader: DocumentLoader,
    processor: RegionProcessor,
    /// Plain-text preview content (no surfaces, no gestures)
    preview: Option<String>,
    status: String,
    /// Vertical scroll offset in content rows
    scroll: u16,
    /// Cell area available for surfaces
    viewport: Rect,
    should_quit: bool,
}

impl ReaderApp {
    #[must_use]
    pub fn new(loader: DocumentLoader, processor: RegionProcessor) -> Self {
        Self {
            registry: SurfaceRegistry::new(),
            tracker: GestureTracker::new(),
            loader,
            processor,
            preview: None,
            status: "open a file: bookvox <pdf|image|txt>".to_string(),
            scroll: 0,
            viewport: Rect::new(0, 0, 80, 23),
            should_quit: false,
        }
    }

    pub fn set_viewport(&mut self, width: u16, height: u16) {
        self.viewport = Rect::new(0, 0, width, height.saturating_sub(1));
    }

    #[must_use]
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    #[must_use]
    pub fn registry(&self) -> &SurfaceRegistry {
        &self.registry
    }

    #[must_use]
    pub fn preview(&self) -> Option<&str> {
        self.preview.as_deref()
    }

    #[must_use]
    pub fn status(&self) -> &str {
        &self.status
    }

    /// Load a file, discarding the current document. An in-progress
    /// gesture is cancelled; its surface no longer exists.
    pub fn open_file(&mut self, path: &Path) -> Result<()> {
        self.tracker.cancel();
        self.scroll = 0;
        self.preview = None;

        let outcome = self.loader.load(path, &mut self.registry, self.viewport)?;
        self.preview = outcome.preview;
        self.status = match outcome.kind {
            Some(kind) => format!("{} ({kind:?})", path.display()),
            None => format!("unsupported file type: {}", path.display()),
        };
        Ok(())
    }

    /// Feed one pointer input (mouse or touch) through the gesture core
    pub fn pointer(&mut self, input: &PointerInput) {
        let Some(mut event) = normalize(input) else {
            return;
        };
        // Screen rows to content rows
        event.row = event.row.saturating_add(self.scroll);

        if let Some(selection) = self.tracker.handle(event, &self.registry) {
            info!(
                "selection completed at ({:.0}, {:.0})",
                selection.anchor.x, selection.anchor.y
            );
            self.processor.submit(&self.registry, &selection);
        }
    }

    pub fn handle_event(&mut self, event: &Event) {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
                KeyCode::Char('j') | KeyCode::Down => self.scroll_by(SCROLL_STEP as i32),
                KeyCode::Char('k') | KeyCode::Up => self.scroll_by(-(SCROLL_STEP as i32)),
                _ => {}
            },
            Event::Mouse(mouse) => match mouse.kind {
                MouseEventKind::ScrollDown => self.scroll_by(SCROLL_STEP as i32),
                MouseEventKind::ScrollUp => self.scroll_by(-(SCROLL_STEP as i32)),
                _ => self.pointer(&PointerInput::Mouse(*mouse)),
            },
            Event::Resize(width, height) => self.set_viewport(*width, *height),
            _ => {}
        }
    }

    fn scroll_by(&mut self, delta: i32) {
        let max = self.content_height().saturating_sub(self.viewport.height);
        let target = (i32::from(self.scroll) + delta).clamp(0, i32::from(max));
        self.scroll = target as u16;
    }

    fn content_height(&self) -> u16 {
        self.registry
            .iter()
            .map(|(_, s)| s.area.y + s.area.height)
            .max()
            .unwrap_or(0)
    }

    /// Drain finished recognitions; speaks each and surfaces the last one
    /// in the status line.
    pub fn poll_recognitions(&mut self) {
        for text in self.processor.poll(self.registry.epoch()) {
            let line = text.trim().replace('\n', " ");
            self.status = format!("spoken: {line}");
        }
    }

    pub fn draw(&mut self, frame: &mut Frame) {
        let size = frame.area();
        self.viewport = Rect::new(0, 0, size.width, size.height.saturating_sub(1));

        if let Some(preview) = &self.preview {
            let text = Paragraph::new(preview.as_str())
                .wrap(Wrap { trim: false })
                .scroll((self.scroll, 0));
            frame.render_widget(text, self.viewport);
        } else {
            self.draw_surfaces(frame);
        }

        let status_area = Rect::new(0, size.height.saturating_sub(1), size.width, 1);
        let status = Paragraph::new(Line::from(self.status.as_str()))
            .style(Style::default().fg(Color::Black).bg(Color::Yellow));
        frame.render_widget(status, status_area);
    }

    fn draw_surfaces(&self, frame: &mut Frame) {
        let active = self.tracker.active();

        for (id, surface) in self.registry.iter() {
            let area = surface.area;
            let bottom = area.y + area.height;
            if bottom <= self.scroll || area.y >= self.scroll + self.viewport.height {
                continue;
            }

            // Compose the selection preview over a copy; the surface's own
            // pixels stay pristine for region capture. Without a gesture
            // the surface is drawn straight from a borrow.
            let frame_bitmap: Cow<'_, crate::surface::RgbBitmap> = match active {
                Some(g) if g.surface == id => {
                    Cow::Owned(overlay::composite(&surface.bitmap, g.anchor, g.current))
                }
                _ => Cow::Borrowed(&surface.bitmap),
            };

            if area.y >= self.scroll {
                let screen = Rect::new(
                    area.x,
                    area.y - self.scroll,
                    area.width,
                    area.height.min(self.viewport.height - (area.y - self.scroll)),
                );
                frame.render_widget(SurfaceView::new(frame_bitmap.as_ref()), screen);
            } else {
                // Top of the surface is scrolled off: draw the visible
                // remainder from a cropped bitmap
                let hidden_rows = self.scroll - area.y;
                let py0 = u32::from(hidden_rows) * frame_bitmap.height
                    / u32::from(area.height.max(1));
                let visible = frame_bitmap.crop(0, py0, frame_bitmap.width, frame_bitmap.height);
                let screen = Rect::new(
                    area.x,
                    0,
                    area.width,
                    (area.height - hidden_rows).min(self.viewport.height),
                );
                frame.render_widget(SurfaceView::new(&visible), screen);
            }
        }
    }
}

/// Main loop: draw, poll events, pump recognition results.
pub fn run_app<B>(
    terminal: &mut Terminal<B>,
    app: &mut ReaderApp,
    events: &mut dyn EventSource,
) -> Result<()>
where
    B: Backend,
    B::Error: std::error::Error + Send + Sync + 'static,
{
    loop {
        app.poll_recognitions();
        terminal.draw(|frame| app.draw(frame))?;

        if events.poll(TICK)? {
            let event = events.read()?;
            app.handle_event(&event);
        }

        if app.should_quit() {
            return Ok(());
        }
    }
}
