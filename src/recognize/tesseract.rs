//! Tesseract CLI backend

use std::path::PathBuf;
use std::process::Command;

use log::{debug, warn};

use super::{OcrEngine, OcrError};
use crate::surface::RgbBitmap;

/// OCR via the `tesseract` binary.
///
/// The region is written to a scratch PNG and recognized with
/// `tesseract <png> stdout -l <languages>`, optionally pointing
/// `--tessdata-dir` at the offline asset cache.
pub struct TesseractOcr {
    binary: PathBuf,
    languages: String,
    tessdata_dir: Option<PathBuf>,
}

impl TesseractOcr {
    /// Locate the tesseract binary; `None` if it is not installed.
    #[must_use]
    pub fn detect(languages: &str, tessdata_dir: Option<PathBuf>) -> Option<Self> {
        let binary = which::which("tesseract").ok()?;
        debug!("using tesseract at {}", binary.display());
        Some(Self {
            binary,
            languages: languages.to_string(),
            tessdata_dir,
        })
    }

    fn write_region_png(region: &RgbBitmap) -> Result<tempfile::NamedTempFile, OcrError> {
        let file = tempfile::Builder::new()
            .prefix("bookvox-region-")
            .suffix(".png")
            .tempfile()?;

        let encoder = image::codecs::png::PngEncoder::new(file.as_file());
        image::ImageEncoder::write_image(
            encoder,
            &region.pixels,
            region.width,
            region.height,
            image::ExtendedColorType::Rgb8,
        )
        .map_err(|e| OcrError::Encode(e.to_string()))?;

        Ok(file)
    }
}

impl OcrEngine for TesseractOcr {
    fn recognize(&self, region: &RgbBitmap) -> Result<String, OcrError> {
        if region.width == 0 || region.height == 0 {
            return Err(OcrError::EmptyRegion);
        }

        let png = Self::write_region_png(region)?;

        let mut cmd = Command::new(&self.binary);
        cmd.arg(png.path())
            .arg("stdout")
            .args(["-l", &self.languages]);
        if let Some(dir) = &self.tessdata_dir {
            cmd.arg("--tessdata-dir").arg(dir);
        }

        let output = cmd.output()?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!("tesseract exited with {}: {}", output.status, stderr.trim());
            return Err(OcrError::Engine(stderr.trim().to_string()));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
