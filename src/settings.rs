use std::fs;
use std::path::PathBuf;

use log::warn;
use serde::{Deserialize, Serialize};

pub const CURRENT_VERSION: u32 = 1;
const SETTINGS_FILENAME: &str = "config.yaml";
const APP_NAME: &str = "bookvox";

fn default_version() -> u32 {
    CURRENT_VERSION
}

fn default_render_scale() -> f32 {
    2.0
}

fn default_ocr_languages() -> String {
    "eng+chi_sim".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_version")]
    pub version: u32,

    /// Oversampling factor for page rasterization
    #[serde(default = "default_render_scale")]
    pub render_scale: f32,

    /// Languages passed to the OCR engine
    #[serde(default = "default_ocr_languages")]
    pub ocr_languages: String,

    /// Preferred voice locale; `None` uses the zh-CN/English preference order
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice_locale: Option<String>,

    /// Override for the offline asset cache directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_dir: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: CURRENT_VERSION,
            render_scale: default_render_scale(),
            ocr_languages: default_ocr_languages(),
            voice_locale: None,
            cache_dir: None,
        }
    }
}

impl Settings {
    fn settings_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(APP_NAME).join(SETTINGS_FILENAME))
    }

    /// Load settings from the config directory, falling back to defaults
    /// when the file is missing or malformed.
    #[must_use]
    pub fn load() -> Self {
        let Some(path) = Self::settings_path() else {
            return Self::default();
        };
        match fs::read_to_string(&path) {
            Ok(content) => match serde_yaml::from_str(&content) {
                Ok(settings) => settings,
                Err(e) => {
                    warn!("malformed settings at {}: {e}", path.display());
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let path = Self::settings_path()
            .ok_or_else(|| anyhow::anyhow!("no config directory on this platform"))?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, serde_yaml::to_string(self)?)?;
        Ok(())
    }
}
