//! Speech synthesis collaborator
//!
//! Fire-and-forget: text goes out, no completion is consumed. The backend
//! is capability-checked once at startup; when no TTS binary exists the
//! [`NullSpeech`] stand-in silently skips every utterance.

use std::path::PathBuf;
use std::process::{Command, Stdio};

use log::{debug, warn};

/// A voice offered by the speech backend
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Voice {
    /// Backend-specific identifier
    pub id: String,
    /// BCP 47-ish locale tag, e.g. `zh-CN`, `en-US`
    pub locale: String,
}

impl Voice {
    fn new(id: &str, locale: &str) -> Self {
        Self {
            id: id.to_string(),
            locale: locale.to_string(),
        }
    }
}

/// Pick a voice for recognized text: the configured locale first (when it
/// matches an offered voice), then Simplified Chinese, then any English
/// locale, else `None` (the backend's default voice).
#[must_use]
pub fn pick_voice(voices: &[Voice], preferred: Option<&str>) -> Option<Voice> {
    let normalized = |tag: &str| tag.replace('_', "-").to_ascii_lowercase();
    if let Some(want) = preferred.map(normalized) {
        if let Some(v) = voices.iter().find(|v| normalized(&v.locale) == want) {
            return Some(v.clone());
        }
    }
    voices
        .iter()
        .find(|v| normalized(&v.locale) == "zh-cn")
        .or_else(|| voices.iter().find(|v| normalized(&v.locale).starts_with("en")))
        .cloned()
}

pub trait SpeechSynth {
    /// Voices this backend can speak with
    fn voices(&self) -> Vec<Voice>;

    /// Speak the text, optionally with a specific voice. Fire-and-forget.
    fn speak(&self, text: &str, voice: Option<&Voice>);
}

enum Backend {
    /// macOS `say`
    Say,
    /// `espeak-ng` (or plain `espeak`)
    Espeak,
}

/// Speech via a spawned TTS process
pub struct ProcessSpeech {
    binary: PathBuf,
    backend: Backend,
}

impl ProcessSpeech {
    /// Probe for a usable TTS binary; `None` means speech is unavailable.
    #[must_use]
    pub fn detect() -> Option<Self> {
        if let Ok(binary) = which::which("say") {
            debug!("speech backend: say at {}", binary.display());
            return Some(Self {
                binary,
                backend: Backend::Say,
            });
        }
        for name in ["espeak-ng", "espeak"] {
            if let Ok(binary) = which::which(name) {
                debug!("speech backend: {} at {}", name, binary.display());
                return Some(Self {
                    binary,
                    backend: Backend::Espeak,
                });
            }
        }
        None
    }
}

impl SpeechSynth for ProcessSpeech {
    fn voices(&self) -> Vec<Voice> {
        match self.backend {
            Backend::Say => vec![
                Voice::new("Tingting", "zh_CN"),
                Voice::new("Samantha", "en_US"),
            ],
            Backend::Espeak => vec![
                Voice::new("cmn", "zh-CN"),
                Voice::new("en-us", "en-US"),
            ],
        }
    }

    fn speak(&self, text: &str, voice: Option<&Voice>) {
        let mut cmd = Command::new(&self.binary);
        if let Some(voice) = voice {
            cmd.args(["-v", &voice.id]);
        }
        cmd.arg(text).stdout(Stdio::null()).stderr(Stdio::null());

        // Fire and forget; the child is not awaited
        match cmd.spawn() {
            Ok(_) => debug!("speaking {} chars", text.chars().count()),
            Err(e) => warn!("failed to spawn speech process: {e}"),
        }
    }
}

/// Used when no TTS backend exists; every utterance is silently skipped.
pub struct NullSpeech;

impl SpeechSynth for NullSpeech {
    fn voices(&self) -> Vec<Voice> {
        Vec::new()
    }

    fn speak(&self, _text: &str, _voice: Option<&Voice>) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefers_simplified_chinese() {
        let voices = vec![
            Voice::new("Samantha", "en_US"),
            Voice::new("Tingting", "zh_CN"),
        ];
        assert_eq!(pick_voice(&voices, None).unwrap().id, "Tingting");
    }

    #[test]
    fn falls_back_to_any_english_locale() {
        let voices = vec![
            Voice::new("Amelie", "fr_CA"),
            Voice::new("Daniel", "en_GB"),
        ];
        assert_eq!(pick_voice(&voices, None).unwrap().id, "Daniel");
    }

    #[test]
    fn no_match_means_platform_default() {
        let voices = vec![Voice::new("Amelie", "fr_CA")];
        assert!(pick_voice(&voices, None).is_none());
        assert!(pick_voice(&[], None).is_none());
    }

    #[test]
    fn configured_locale_overrides_preference_order() {
        let voices = vec![
            Voice::new("Tingting", "zh_CN"),
            Voice::new("Amelie", "fr_CA"),
        ];
        // Underscore/hyphen and case differences still match
        assert_eq!(pick_voice(&voices, Some("fr-ca")).unwrap().id, "Amelie");
        assert_eq!(pick_voice(&voices, Some("FR_CA")).unwrap().id, "Amelie");
    }

    #[test]
    fn unmatched_configured_locale_falls_back() {
        let voices = vec![Voice::new("Tingting", "zh_CN")];
        assert_eq!(pick_voice(&voices, Some("de-DE")).unwrap().id, "Tingting");
    }
}
