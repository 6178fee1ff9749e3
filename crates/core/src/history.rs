//! Persistent reading history.
//!
//! [`HistoryStore`] keeps one [`HistoryEntry`] per URL, most recent first,
//! and re-persists its full contents after every mutation through a
//! [`HistoryPersistence`] backend. The persisted copy is the source of truth
//! at load time; after that the in-memory list is, even when a save fails.
//!
//! # Example
//!
//! ```rust
//! use tidemark_core::{ArticleRecord, HistoryStore, MemoryStore};
//!
//! let mut store = HistoryStore::open(MemoryStore::new()).unwrap();
//! let article = ArticleRecord::new("T".to_string(), "Hello world".to_string());
//!
//! store.upsert("https://example.com/post", &article).unwrap();
//! store.record_progress("https://example.com/post", 40.0).unwrap();
//! store.record_progress("https://example.com/post", 20.0).unwrap();
//!
//! assert_eq!(store.get("https://example.com/post").unwrap().progress, 40.0);
//! ```

use std::collections::HashSet;
use std::fs;
use std::io;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::article::ArticleRecord;
use crate::{Result, TidemarkError};

/// One article in the reading history.
///
/// The article fields are copied at creation and never refreshed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub url: String,
    pub title: String,
    pub content: String,
    pub word_count: usize,
    pub reading_time: usize,
    /// High-water completion percentage in `[0, 100]`.
    pub progress: f64,
    #[serde(with = "time::serde::rfc3339")]
    pub last_read: OffsetDateTime,
}

impl HistoryEntry {
    /// Creates an unread entry for `url`.
    pub fn new(url: &str, article: &ArticleRecord) -> Self {
        Self {
            url: url.to_string(),
            title: article.title.clone(),
            content: article.content.clone(),
            word_count: article.word_count,
            reading_time: article.reading_time,
            progress: 0.0,
            last_read: OffsetDateTime::now_utc(),
        }
    }

    /// The article part of the entry.
    pub fn article(&self) -> ArticleRecord {
        ArticleRecord {
            title: self.title.clone(),
            content: self.content.clone(),
            word_count: self.word_count,
            reading_time: self.reading_time,
        }
    }
}

/// Storage medium for the history.
///
/// Implementations read and write the whole list at once.
pub trait HistoryPersistence {
    /// Loads the persisted history; `None` when nothing was ever saved.
    fn load(&self) -> Result<Option<Vec<HistoryEntry>>>;

    /// Replaces the persisted history with `entries`.
    fn save(&self, entries: &[HistoryEntry]) -> Result<()>;
}

/// Default location of the history file (`<data dir>/tidemark/history.json`)
pub fn default_history_path() -> Option<PathBuf> {
    dirs::data_dir().map(|dir| dir.join("tidemark").join("history.json"))
}

/// History persisted as a JSON array in a single file.
///
/// Writes go to a sibling temporary file which is then renamed over the
/// target, so readers never observe a partially written history.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// A store at [`default_history_path`].
    pub fn at_default_location() -> Result<Self> {
        default_history_path()
            .map(Self::new)
            .ok_or_else(|| TidemarkError::ConfigError("no data directory for the history file".to_string()))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.clone().into_os_string();
        name.push(".tmp");
        PathBuf::from(name)
    }

    fn write_error(&self, source: io::Error) -> TidemarkError {
        TidemarkError::HistoryWrite { path: self.path.clone(), source }
    }
}

impl HistoryPersistence for JsonFileStore {
    fn load(&self) -> Result<Option<Vec<HistoryEntry>>> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(TidemarkError::HistoryRead { path: self.path.clone(), source }),
        };

        if raw.trim().is_empty() {
            return Ok(None);
        }

        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| TidemarkError::HistoryCorrupt { path: self.path.clone(), source })
    }

    fn save(&self, entries: &[HistoryEntry]) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| self.write_error(e))?;
        }

        let json = serde_json::to_vec_pretty(entries)?;
        let temp = self.temp_path();
        fs::write(&temp, json).map_err(|e| self.write_error(e))?;
        if let Err(e) = fs::rename(&temp, &self.path) {
            if let Err(cleanup) = fs::remove_file(&temp) {
                tracing::warn!(path = %temp.display(), error = %cleanup, "temporary history file left behind");
            }
            return Err(self.write_error(e));
        }

        Ok(())
    }
}

/// In-memory persistence, for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    saved: Mutex<Option<Vec<HistoryEntry>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that already holds a saved history.
    pub fn with_entries(entries: Vec<HistoryEntry>) -> Self {
        Self { saved: Mutex::new(Some(entries)) }
    }

    /// The last saved history.
    pub fn snapshot(&self) -> Option<Vec<HistoryEntry>> {
        self.saved.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl HistoryPersistence for MemoryStore {
    fn load(&self) -> Result<Option<Vec<HistoryEntry>>> {
        Ok(self.snapshot())
    }

    fn save(&self, entries: &[HistoryEntry]) -> Result<()> {
        *self.saved.lock().unwrap_or_else(|e| e.into_inner()) = Some(entries.to_vec());
        Ok(())
    }
}

/// History settings
#[derive(Debug, Clone, Default)]
pub struct HistoryConfig {
    /// Maximum number of entries kept; the oldest are evicted first.
    pub max_entries: Option<NonZeroUsize>,
}

impl HistoryConfig {
    /// A history bounded to `max_entries`; a capacity of zero is rejected.
    pub fn with_max_entries(max_entries: usize) -> Result<Self> {
        NonZeroUsize::new(max_entries)
            .map(|max| Self { max_entries: Some(max) })
            .ok_or_else(|| TidemarkError::ConfigError("history capacity must be at least 1".to_string()))
    }
}

/// Ordered, URL-unique reading history.
#[derive(Debug)]
pub struct HistoryStore<P: HistoryPersistence> {
    entries: Vec<HistoryEntry>,
    persistence: P,
    config: HistoryConfig,
}

impl<P: HistoryPersistence> HistoryStore<P> {
    /// Loads the history, failing if the persisted copy cannot be read.
    pub fn open(persistence: P) -> Result<Self> {
        Self::open_with_config(persistence, HistoryConfig::default())
    }

    pub fn open_with_config(persistence: P, config: HistoryConfig) -> Result<Self> {
        let loaded = persistence.load()?.unwrap_or_default();
        let mut store = Self { entries: Vec::new(), persistence, config };
        store.adopt(loaded);
        Ok(store)
    }

    /// Loads the history, starting empty when the persisted copy is unusable.
    ///
    /// The load error is logged and handed back so the caller can tell the
    /// user; the next mutation overwrites the unusable copy.
    pub fn open_or_empty(persistence: P) -> (Self, Option<TidemarkError>) {
        Self::open_or_empty_with_config(persistence, HistoryConfig::default())
    }

    pub fn open_or_empty_with_config(persistence: P, config: HistoryConfig) -> (Self, Option<TidemarkError>) {
        match persistence.load() {
            Ok(loaded) => {
                let mut store = Self { entries: Vec::new(), persistence, config };
                store.adopt(loaded.unwrap_or_default());
                (store, None)
            }
            Err(err) => {
                tracing::error!(error = %err, "reading history could not be loaded, starting empty");
                (Self { entries: Vec::new(), persistence, config }, Some(err))
            }
        }
    }

    /// Takes a loaded list, dropping duplicate URLs and clamping progress.
    ///
    /// When that changes anything the normalized list is written back; a
    /// failed write is logged and the normalized list is kept in memory.
    fn adopt(&mut self, loaded: Vec<HistoryEntry>) {
        let mut seen = HashSet::new();
        let before = loaded.len();
        let mut clamped = 0;

        self.entries = loaded
            .into_iter()
            .filter(|entry| seen.insert(entry.url.clone()))
            .map(|mut entry| {
                let progress = sanitize_progress(entry.progress);
                if progress.to_bits() != entry.progress.to_bits() {
                    clamped += 1;
                }
                entry.progress = progress;
                entry
            })
            .collect();

        let dropped = before - self.entries.len();
        if dropped > 0 {
            tracing::warn!(dropped, "duplicate history entries dropped on load");
        }
        if clamped > 0 {
            tracing::warn!(clamped, "out of range progress values clamped on load");
        }

        let evicted = self.evict();
        if (dropped > 0 || clamped > 0 || evicted > 0) && self.persist().is_err() {
            tracing::warn!("normalized reading history kept in memory only");
        }
    }

    pub fn get(&self, url: &str) -> Option<&HistoryEntry> {
        self.entries.iter().find(|entry| entry.url == url)
    }

    pub fn contains(&self, url: &str) -> bool {
        self.get(url).is_some()
    }

    /// Entries, most recently inserted first.
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn persistence(&self) -> &P {
        &self.persistence
    }

    pub fn into_persistence(self) -> P {
        self.persistence
    }

    /// Opens an article in the history.
    ///
    /// A URL already present is returned untouched: neither its content nor
    /// its progress or `last_read` change, and nothing is persisted. A new
    /// URL gets an unread entry at the front.
    pub fn upsert(&mut self, url: &str, article: &ArticleRecord) -> Result<HistoryEntry> {
        if let Some(existing) = self.get(url) {
            return Ok(existing.clone());
        }

        let entry = HistoryEntry::new(url, article);
        self.entries.insert(0, entry.clone());
        self.evict();
        self.persist()?;

        Ok(entry)
    }

    /// Raises the stored progress of `url` to `value` if higher.
    ///
    /// `last_read` is refreshed either way. Returns the stored progress, or
    /// `None` (without error) when the URL is not in the history.
    pub fn record_progress(&mut self, url: &str, value: f64) -> Result<Option<f64>> {
        let value = sanitize_progress(value);
        let Some(entry) = self.entries.iter_mut().find(|entry| entry.url == url) else {
            return Ok(None);
        };

        entry.progress = entry.progress.max(value);
        entry.last_read = OffsetDateTime::now_utc();
        let stored = entry.progress;

        self.persist()?;
        Ok(Some(stored))
    }

    /// Deletes the entry for `url`; returns whether one existed.
    pub fn remove(&mut self, url: &str) -> Result<bool> {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.url != url);

        if self.entries.len() == before {
            return Ok(false);
        }

        self.persist()?;
        Ok(true)
    }

    /// Empties the history.
    ///
    /// Confirmation is the caller's responsibility.
    pub fn clear(&mut self) -> Result<()> {
        self.entries.clear();
        self.persist()
    }

    /// Writes the full history to the persistence backend.
    pub fn persist(&self) -> Result<()> {
        self.persistence.save(&self.entries).inspect_err(|err| {
            tracing::error!(error = %err, entries = self.entries.len(), "reading history could not be saved");
        })
    }

    /// Drops entries beyond capacity from the tail; returns how many.
    fn evict(&mut self) -> usize {
        let Some(max) = self.config.max_entries.map(NonZeroUsize::get) else {
            return 0;
        };
        if self.entries.len() <= max {
            return 0;
        }

        let evicted = self.entries.len() - max;
        self.entries.truncate(max);
        tracing::debug!(evicted, "oldest history entries evicted");
        evicted
    }
}

fn sanitize_progress(value: f64) -> f64 {
    if value.is_nan() { 0.0 } else { value.clamp(0.0, 100.0) }
}
