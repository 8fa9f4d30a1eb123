//! Region processing: extraction, sanitization, recognition, speech
//!
//! The rectangle drawn during the gesture is a visual preview only. The
//! extracted region is anchored at the gesture's start point and always
//! extends to the surface's bottom-right edge, matching the reader's
//! selection-to-edge extraction behavior.

use std::sync::LazyLock;

use log::{debug, warn};
use regex::Regex;

use super::gesture::Selection;
use super::mapping::SurfacePoint;
use crate::recognize::{OcrRequest, OcrResponse, OcrService};
use crate::speech::{SpeechSynth, pick_voice};
use crate::surface::{RgbBitmap, Surface, SurfaceRegistry};

/// Everything outside this set becomes a single space: ASCII word
/// characters, CJK ideographs (U+4E00..U+9FFF), whitespace, and hyphens.
/// Keeps hyphenated words and Chinese text while stripping OCR noise.
static OCR_NOISE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[^A-Za-z0-9_\x{4E00}-\x{9FFF}\s\-]").expect("Failed to compile OCR noise regex")
});

/// Replace OCR noise characters with single spaces
#[must_use]
pub fn sanitize(text: &str) -> String {
    OCR_NOISE_RE.replace_all(text, " ").into_owned()
}

/// Extract the pixel region for a completed selection: from the anchor
/// point to the surface's bottom-right corner.
#[must_use]
pub fn extract_region(surface: &Surface, anchor: SurfacePoint) -> RgbBitmap {
    let x0 = anchor.x.max(0.0) as u32;
    let y0 = anchor.y.max(0.0) as u32;
    surface.bitmap.crop(x0, y0, surface.width(), surface.height())
}

/// Forwards completed selections to OCR and recognized text to speech
pub struct RegionProcessor {
    ocr: OcrService,
    speech: Box<dyn SpeechSynth>,
    /// Configured locale preference, tried before the built-in order
    voice_locale: Option<String>,
}

impl RegionProcessor {
    #[must_use]
    pub fn new(ocr: OcrService, speech: Box<dyn SpeechSynth>) -> Self {
        Self {
            ocr,
            speech,
            voice_locale: None,
        }
    }

    /// Prefer this locale when picking a voice
    #[must_use]
    pub fn with_voice_locale(mut self, locale: Option<String>) -> Self {
        self.voice_locale = locale;
        self
    }

    /// Extract the selected region and queue it for recognition.
    ///
    /// A selection whose surface handle no longer resolves (document was
    /// reloaded between release and processing) is dropped.
    pub fn submit(&self, registry: &SurfaceRegistry, selection: &Selection) {
        let Some(surface) = registry.get(selection.surface) else {
            debug!("dropping selection for discarded surface");
            return;
        };

        let region = extract_region(surface, selection.anchor);
        if region.width == 0 || region.height == 0 {
            return;
        }
        self.ocr.submit(OcrRequest {
            epoch: selection.surface.epoch(),
            region,
        });
    }

    /// Handle one recognition result.
    ///
    /// Stale epochs (the document changed while OCR was running) and
    /// failed or empty recognitions produce no speech. Returns the spoken
    /// text, if any.
    pub fn handle_response(&self, current_epoch: u64, response: OcrResponse) -> Option<String> {
        if response.epoch != current_epoch {
            debug!(
                "dropping OCR result from epoch {} (current {})",
                response.epoch, current_epoch
            );
            return None;
        }

        let text = match response.result {
            Ok(text) => text,
            Err(e) => {
                warn!("recognition failed: {e}");
                return None;
            }
        };

        let sanitized = sanitize(&text);
        if sanitized.trim().is_empty() {
            return None;
        }

        let voice = pick_voice(&self.speech.voices(), self.voice_locale.as_deref());
        self.speech.speak(&sanitized, voice.as_ref());
        Some(sanitized)
    }

    /// Drain finished recognitions, speaking each current-epoch result
    pub fn poll(&self, current_epoch: u64) -> Vec<String> {
        let mut spoken = Vec::new();
        while let Some(response) = self.ocr.try_recv() {
            if let Some(text) = self.handle_response(current_epoch, response) {
                spoken.push(text);
            }
        }
        spoken
    }
}
