//! A reading session: the tracker wired to the history.
//!
//! The session decides whether a requested URL needs fetching, inserts
//! freshly extracted articles into the history, and writes the progress
//! high-water mark back whenever a scroll sample raises it.

use crate::article::ArticleRecord;
use crate::history::{HistoryEntry, HistoryPersistence, HistoryStore};
use crate::progress::{ProgressSample, ProgressTracker, TrackerState, ViewportGeometry};
use crate::Result;

#[cfg(feature = "fetch")]
use crate::extract::Extractor;
#[cfg(feature = "fetch")]
use crate::fetch::FetchConfig;

/// Outcome of asking the session for a URL.
#[derive(Debug, Clone, PartialEq)]
pub enum Requested {
    /// The URL is already in the history; the session is reading it.
    Cached(HistoryEntry),
    /// The URL has to be fetched; the session is loading.
    NeedsFetch,
}

/// Tracker and history for a single reader.
///
/// Mutations are synchronous and assume a single writer.
#[derive(Debug)]
pub struct ReadingSession<P: HistoryPersistence> {
    history: HistoryStore<P>,
    tracker: ProgressTracker,
}

impl<P: HistoryPersistence> ReadingSession<P> {
    pub fn new(history: HistoryStore<P>) -> Self {
        Self { history, tracker: ProgressTracker::new() }
    }

    pub fn history(&self) -> &HistoryStore<P> {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut HistoryStore<P> {
        &mut self.history
    }

    pub fn into_history(self) -> HistoryStore<P> {
        self.history
    }

    pub fn state(&self) -> &TrackerState {
        self.tracker.state()
    }

    /// Asks for `url`.
    ///
    /// A URL already in the history opens straight into `Reading` without
    /// fetching; anything else enters `Loading`.
    pub fn request(&mut self, url: &str) -> Requested {
        match self.history.get(url) {
            Some(entry) => {
                self.tracker.start_reading(url, entry.progress);
                Requested::Cached(entry.clone())
            }
            None => {
                self.tracker.begin_loading(url);
                Requested::NeedsFetch
            }
        }
    }

    /// Hands over the extracted article for `url` and starts reading it.
    ///
    /// The entry is inserted even if the session moved on to another URL in
    /// the meantime; only the session state follows the newest request.
    /// On a save failure the entry stays in memory and the session still
    /// switches to `Reading`, but the error is returned.
    pub fn deliver(&mut self, url: &str, article: &ArticleRecord) -> Result<HistoryEntry> {
        let outcome = self.history.upsert(url, article);

        let still_wanted = match self.tracker.state() {
            TrackerState::Loading { url: loading } => loading == url,
            TrackerState::Idle => true,
            TrackerState::Reading { .. } => false,
        };
        if still_wanted {
            let progress = self.history.get(url).map_or(0.0, |entry| entry.progress);
            self.tracker.start_reading(url, progress);
        }

        outcome
    }

    /// The fetch or extraction for the pending URL failed.
    pub fn fail(&mut self) {
        if matches!(self.tracker.state(), TrackerState::Loading { .. }) {
            self.tracker.close();
        }
    }

    /// Feeds one scroll (or mount) sample.
    ///
    /// The history is written only when the sample raises the high-water
    /// mark; everything else is computed in memory.
    pub fn scroll(&mut self, geometry: &ViewportGeometry) -> Result<Option<ProgressSample>> {
        let Some(sample) = self.tracker.observe(geometry) else {
            return Ok(None);
        };

        if sample.advanced {
            self.history.record_progress(&sample.url, sample.high_water)?;
        }

        Ok(Some(sample))
    }

    /// Closes the open article.
    pub fn close(&mut self) {
        self.tracker.close();
    }

    /// Requests `url`, fetching and extracting it when it is not cached.
    ///
    /// A failed fetch returns the session to `Idle` and leaves the history
    /// untouched.
    #[cfg(feature = "fetch")]
    pub async fn open_url(
        &mut self, url: &str, fetch_config: &FetchConfig, extractor: &Extractor,
    ) -> Result<HistoryEntry> {
        if let Requested::Cached(entry) = self.request(url) {
            return Ok(entry);
        }

        match extractor.fetch_and_extract(url, fetch_config).await {
            Ok(article) => self.deliver(url, &article),
            Err(err) => {
                tracing::warn!(url, error = %err, "could not open article");
                self.fail();
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::MemoryStore;

    fn session() -> ReadingSession<MemoryStore> {
        ReadingSession::new(HistoryStore::open(MemoryStore::new()).unwrap())
    }

    fn article() -> ArticleRecord {
        ArticleRecord::new("Title".to_string(), "Some words here".to_string())
    }

    fn at(scroll: f64) -> ViewportGeometry {
        ViewportGeometry::new(0.0, 2000.0, 1000.0, scroll)
    }

    #[test]
    fn test_new_url_loads_then_reads() {
        let mut session = session();
        assert_eq!(session.request("u"), Requested::NeedsFetch);
        assert_eq!(session.state(), &TrackerState::Loading { url: "u".to_string() });

        let entry = session.deliver("u", &article()).unwrap();
        assert_eq!(entry.progress, 0.0);
        assert!(matches!(session.state(), TrackerState::Reading { .. }));
    }

    #[test]
    fn test_cached_url_skips_loading() {
        let mut session = session();
        session.request("u");
        session.deliver("u", &article()).unwrap();
        session.scroll(&at(300.0)).unwrap();
        session.close();

        match session.request("u") {
            Requested::Cached(entry) => assert_eq!(entry.progress, 30.0),
            other => panic!("expected cached entry, got {:?}", other),
        }
        assert!(matches!(session.state(), TrackerState::Reading { high_water, .. } if *high_water == 30.0));
    }

    #[test]
    fn test_scroll_writes_high_water_only() {
        let mut session = session();
        session.request("u");
        session.deliver("u", &article()).unwrap();

        let forward = session.scroll(&at(400.0)).unwrap().unwrap();
        assert!(forward.advanced);
        let back = session.scroll(&at(200.0)).unwrap().unwrap();
        assert!(!back.advanced);
        assert_eq!(back.percent, 20.0);

        assert_eq!(session.history().get("u").unwrap().progress, 40.0);
    }

    #[test]
    fn test_scroll_while_idle_or_loading_is_ignored() {
        let mut session = session();
        assert!(session.scroll(&at(500.0)).unwrap().is_none());

        session.request("u");
        assert!(session.scroll(&at(500.0)).unwrap().is_none());
    }

    #[test]
    fn test_fail_returns_to_idle_without_history() {
        let mut session = session();
        session.request("u");
        session.fail();

        assert_eq!(session.state(), &TrackerState::Idle);
        assert!(session.history().is_empty());
    }

    #[test]
    fn test_late_delivery_does_not_steal_focus() {
        let mut session = session();
        session.request("first");
        session.request("second");
        session.deliver("second", &article()).unwrap();

        session.deliver("first", &article()).unwrap();

        assert_eq!(session.history().len(), 2);
        assert_eq!(session.history().entries()[0].url, "first");
        match session.state() {
            TrackerState::Reading { url, .. } => assert_eq!(url, "second"),
            other => panic!("unexpected state {:?}", other),
        }
    }

    #[cfg(feature = "fetch")]
    #[test]
    fn test_open_url_invalid_fails_cleanly() {
        let mut session = session();
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let result = runtime.block_on(session.open_url("not-a-url", &FetchConfig::default(), &Extractor::new()));

        assert!(result.is_err());
        assert_eq!(session.state(), &TrackerState::Idle);
        assert!(session.history().is_empty());
    }
}
