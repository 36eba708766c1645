//! User chart preferences.
//!
//! Stored as a single JSON document. Reads never fail: a missing or corrupt
//! document yields the hardcoded defaults. Writes merge a partial update
//! into whatever is currently stored.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::warn;

pub const DEFAULT_YEAR: i32 = 2023;
pub const DEFAULT_TOP_N: usize = 1000;

/// Fields missing from a stored document take their default one by one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    pub year: i32,
    pub genre: String,
    pub top_n: usize,
}

impl Default for Preferences {
    fn default() -> Self {
        Preferences {
            year: DEFAULT_YEAR,
            genre: String::new(),
            top_n: DEFAULT_TOP_N,
        }
    }
}

/// Partial update, `None` fields keep their stored value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PreferencesUpdate {
    pub year: Option<i32>,
    pub genre: Option<String>,
    pub top_n: Option<usize>,
}

impl Preferences {
    pub fn merge(mut self, update: PreferencesUpdate) -> Preferences {
        if let Some(year) = update.year {
            self.year = year;
        }
        if let Some(genre) = update.genre {
            self.genre = genre;
        }
        if let Some(top_n) = update.top_n {
            self.top_n = top_n;
        }
        self
    }

    /// Decodes a stored document, falling back to defaults when absent or
    /// unreadable.
    pub fn decode(raw: Option<&str>) -> Preferences {
        match raw {
            None => Preferences::default(),
            Some(raw) => serde_json::from_str(raw).unwrap_or_else(|err| {
                warn!("Ignoring corrupt stored preferences: {}", err);
                Preferences::default()
            }),
        }
    }
}

pub trait PreferencesStore: Send + Sync {
    fn get(&self) -> Preferences;

    /// Merges `update` into the stored preferences and returns the result.
    fn set(&self, update: PreferencesUpdate) -> Result<Preferences>;
}

#[derive(Default)]
pub struct InMemoryPreferencesStore {
    raw: Mutex<Option<String>>,
}

impl InMemoryPreferencesStore {
    pub fn new() -> InMemoryPreferencesStore {
        InMemoryPreferencesStore::default()
    }

    /// Seeds the store with an arbitrary raw document.
    pub fn with_raw<S: Into<String>>(raw: S) -> InMemoryPreferencesStore {
        InMemoryPreferencesStore {
            raw: Mutex::new(Some(raw.into())),
        }
    }

    fn raw(&self) -> std::sync::MutexGuard<'_, Option<String>> {
        self.raw
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl PreferencesStore for InMemoryPreferencesStore {
    fn get(&self) -> Preferences {
        Preferences::decode(self.raw().as_deref())
    }

    fn set(&self, update: PreferencesUpdate) -> Result<Preferences> {
        let mut raw = self.raw();
        let merged = Preferences::decode(raw.as_deref()).merge(update);
        *raw = Some(serde_json::to_string(&merged)?);
        Ok(merged)
    }
}

/// Preferences persisted to a JSON file, replaced atomically on write.
pub struct FilePreferencesStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FilePreferencesStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> FilePreferencesStore {
        FilePreferencesStore {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    fn read_raw(&self) -> Option<String> {
        std::fs::read_to_string(&self.path).ok()
    }
}

impl PreferencesStore for FilePreferencesStore {
    fn get(&self) -> Preferences {
        Preferences::decode(self.read_raw().as_deref())
    }

    fn set(&self, update: PreferencesUpdate) -> Result<Preferences> {
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let merged = Preferences::decode(self.read_raw().as_deref()).merge(update);

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create preferences dir {:?}", dir))?;
        let mut file = tempfile::NamedTempFile::new_in(&dir)
            .with_context(|| format!("Failed to create temp file in {:?}", dir))?;
        file.write_all(serde_json::to_string_pretty(&merged)?.as_bytes())?;
        file.persist(&self.path)
            .with_context(|| format!("Failed to write preferences to {:?}", self.path))?;
        Ok(merged)
    }
}
