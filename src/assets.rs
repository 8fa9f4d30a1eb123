//! Offline asset cache for OCR language models
//!
//! A static, versioned manifest of traineddata files. Lookups hit the
//! cache directory first and only go to the network on a miss. Bumping
//! [`CACHE_VERSION`] is the only invalidation mechanism; entries from
//! older versions are left in place and simply stop being consulted.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::{info, warn};

pub const CACHE_VERSION: u32 = 1;

const APP_NAME: &str = "bookvox";

/// One entry in the static asset manifest
#[derive(Clone, Copy, Debug)]
pub struct AssetEntry {
    pub name: &'static str,
    pub url: &'static str,
}

/// Language models the OCR backend is initialized with: one Latin-script
/// and one Simplified-Chinese model.
pub const OCR_ASSETS: &[AssetEntry] = &[
    AssetEntry {
        name: "eng.traineddata",
        url: "https://github.com/tesseract-ocr/tessdata_fast/raw/main/eng.traineddata",
    },
    AssetEntry {
        name: "chi_sim.traineddata",
        url: "https://github.com/tesseract-ocr/tessdata_fast/raw/main/chi_sim.traineddata",
    },
];

pub struct AssetCache {
    root: PathBuf,
}

impl AssetCache {
    #[must_use]
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Cache under the platform cache directory, e.g.
    /// `~/.cache/bookvox` on Linux.
    #[must_use]
    pub fn default_root() -> Option<PathBuf> {
        dirs::cache_dir().map(|d| d.join(APP_NAME))
    }

    /// Directory for the current cache version
    #[must_use]
    pub fn version_dir(&self) -> PathBuf {
        self.root.join(format!("v{CACHE_VERSION}"))
    }

    /// Cache-first lookup: the local path if the entry is already cached
    #[must_use]
    pub fn lookup(&self, entry: &AssetEntry) -> Option<PathBuf> {
        let path = self.version_dir().join(entry.name);
        path.is_file().then_some(path)
    }

    /// Return the cached path for an entry, fetching it on a miss.
    pub fn ensure(&self, entry: &AssetEntry) -> Result<PathBuf> {
        if let Some(path) = self.lookup(entry) {
            return Ok(path);
        }
        self.fetch(entry)
    }

    fn fetch(&self, entry: &AssetEntry) -> Result<PathBuf> {
        let dir = self.version_dir();
        fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create cache dir {}", dir.display()))?;

        info!("fetching {} from {}", entry.name, entry.url);
        let response = reqwest::blocking::get(entry.url)
            .and_then(reqwest::blocking::Response::error_for_status)
            .with_context(|| format!("failed to download {}", entry.url))?;
        let bytes = response
            .bytes()
            .with_context(|| format!("failed to read body of {}", entry.url))?;

        // Write to a scratch file and rename so a partial download never
        // shows up as a cached asset
        let mut tmp = tempfile::NamedTempFile::new_in(&dir)
            .context("failed to create scratch file in cache dir")?;
        tmp.write_all(&bytes)?;
        let path = dir.join(entry.name);
        tmp.persist(&path)
            .with_context(|| format!("failed to persist {}", path.display()))?;

        Ok(path)
    }

    /// Ensure every OCR language model is cached; returns the tessdata
    /// directory. Individual failures are logged and skipped, so a missing
    /// network degrades OCR rather than aborting startup.
    pub fn ensure_ocr_models(&self) -> Result<PathBuf> {
        for entry in OCR_ASSETS {
            if let Err(e) = self.ensure(entry) {
                warn!("could not cache {}: {e:#}", entry.name);
            }
        }
        Ok(self.version_dir())
    }
}

/// Populate the cache from a directory of already-downloaded models
/// (used in tests and air-gapped setups).
pub fn seed_from_dir(cache: &AssetCache, source: &Path) -> Result<usize> {
    let dir = cache.version_dir();
    fs::create_dir_all(&dir)?;
    let mut seeded = 0;
    for entry in OCR_ASSETS {
        let from = source.join(entry.name);
        if from.is_file() {
            fs::copy(&from, dir.join(entry.name))?;
            seeded += 1;
        }
    }
    Ok(seeded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_misses_on_empty_cache() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = AssetCache::new(tmp.path().to_path_buf());
        assert!(cache.lookup(&OCR_ASSETS[0]).is_none());
    }

    #[test]
    fn lookup_hits_cached_entry_without_network() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = AssetCache::new(tmp.path().to_path_buf());

        let dir = cache.version_dir();
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("eng.traineddata"), b"model bytes").unwrap();

        let path = cache.lookup(&OCR_ASSETS[0]).expect("cached entry");
        assert_eq!(fs::read(path).unwrap(), b"model bytes");

        // ensure() must be served from cache (a fetch would fail here)
        assert!(cache.ensure(&OCR_ASSETS[0]).is_ok());
    }

    #[test]
    fn version_bump_invalidates_old_entries() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = AssetCache::new(tmp.path().to_path_buf());

        // An entry cached under a different version is not consulted
        let stale_dir = tmp.path().join(format!("v{}", CACHE_VERSION + 1));
        fs::create_dir_all(&stale_dir).unwrap();
        fs::write(stale_dir.join("eng.traineddata"), b"future").unwrap();

        assert!(cache.lookup(&OCR_ASSETS[0]).is_none());
    }

    #[test]
    fn seed_copies_available_models() {
        let source = tempfile::tempdir().unwrap();
        fs::write(source.path().join("eng.traineddata"), b"eng").unwrap();

        let tmp = tempfile::tempdir().unwrap();
        let cache = AssetCache::new(tmp.path().to_path_buf());

        let seeded = seed_from_dir(&cache, source.path()).unwrap();
        assert_eq!(seeded, 1);
        assert!(cache.lookup(&OCR_ASSETS[0]).is_some());
        assert!(cache.lookup(&OCR_ASSETS[1]).is_none());
    }
}
