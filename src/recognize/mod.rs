//! Text recognition collaborator
//!
//! The app only depends on the [`OcrEngine`] trait; the Tesseract CLI
//! implementation and the background worker live behind it.

mod tesseract;
mod worker;

pub use tesseract::TesseractOcr;
pub use worker::{OcrRequest, OcrResponse, OcrService};

use thiserror::Error;

use crate::surface::RgbBitmap;

#[derive(Debug, Error)]
pub enum OcrError {
    #[error("no OCR engine available")]
    Unavailable,
    #[error("empty region")]
    EmptyRegion,
    #[error("failed to prepare region image: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode region image: {0}")]
    Encode(String),
    #[error("recognition failed: {0}")]
    Engine(String),
}

/// Recognizes text in a bitmap region.
///
/// Implementations are handed to a worker thread, hence `Send`.
pub trait OcrEngine: Send {
    fn recognize(&self, region: &RgbBitmap) -> Result<String, OcrError>;
}

/// Engine used when no real backend was found at startup; every request
/// fails, which downstream treats as "no text produced".
pub struct UnavailableOcr;

impl OcrEngine for UnavailableOcr {
    fn recognize(&self, _region: &RgbBitmap) -> Result<String, OcrError> {
        Err(OcrError::Unavailable)
    }
}
