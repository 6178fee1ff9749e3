//! Reading progress from viewport geometry.
//!
//! [`completion`] maps one geometry sample to a percentage in `[0, 100]`.
//! [`ProgressTracker`] runs the per-session state machine
//! (`Idle -> Loading -> Reading -> Idle`) and keeps the high-water mark of
//! the open article. Nothing here performs I/O; writing the high-water mark
//! back into the history is the caller's job (see [`crate::session`]).

/// Geometry of the reading view at one instant.
///
/// All values are in the same unit (CSS pixels in a browser).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ViewportGeometry {
    /// Offset of the article's top edge from the top of the document.
    pub element_top: f64,
    /// Full rendered height of the article.
    pub element_height: f64,
    /// Height of the visible viewport.
    pub viewport_height: f64,
    /// Current vertical scroll offset of the document.
    pub scroll_offset: f64,
}

impl ViewportGeometry {
    pub fn new(element_top: f64, element_height: f64, viewport_height: f64, scroll_offset: f64) -> Self {
        Self { element_top, element_height, viewport_height, scroll_offset }
    }

    /// Distance that has to be scrolled to reach the end of the article.
    pub fn scrollable(&self) -> f64 {
        self.element_height - self.viewport_height
    }
}

/// Completion percentage for a geometry sample.
///
/// An article that fits entirely in the viewport is always complete.
/// Otherwise the position is clamped to `[0, 100]`; non-finite input yields 0.
pub fn completion(geometry: &ViewportGeometry) -> f64 {
    let scrollable = geometry.scrollable();
    if scrollable <= 0.0 {
        return 100.0;
    }

    let raw = (geometry.scroll_offset - geometry.element_top) / scrollable * 100.0;
    if raw.is_nan() { 0.0 } else { raw.clamp(0.0, 100.0) }
}

/// State of a reading session.
#[derive(Debug, Clone, PartialEq)]
pub enum TrackerState {
    /// Nothing is open.
    Idle,
    /// Waiting for the article of `url` to be fetched and extracted.
    Loading { url: String },
    /// An article is open and scroll samples are being tracked.
    Reading { url: String, current: f64, high_water: f64 },
}

/// Result of observing one geometry sample while reading.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressSample {
    /// URL of the open article.
    pub url: String,
    /// Completion for this sample.
    pub percent: f64,
    /// Highest completion seen in this session, including this sample.
    pub high_water: f64,
    /// Whether this sample raised the high-water mark.
    pub advanced: bool,
}

/// Per-session progress state machine.
#[derive(Debug, Clone)]
pub struct ProgressTracker {
    state: TrackerState,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self { state: TrackerState::Idle }
    }

    pub fn state(&self) -> &TrackerState {
        &self.state
    }

    /// URL of the article being loaded or read, if any.
    pub fn active_url(&self) -> Option<&str> {
        match &self.state {
            TrackerState::Idle => None,
            TrackerState::Loading { url } | TrackerState::Reading { url, .. } => Some(url),
        }
    }

    pub fn is_reading(&self) -> bool {
        matches!(self.state, TrackerState::Reading { .. })
    }

    /// Enters `Loading` for a URL that has to be fetched.
    ///
    /// Any article that was open is closed first.
    pub fn begin_loading(&mut self, url: &str) {
        self.state = TrackerState::Loading { url: url.to_string() };
    }

    /// Enters `Reading` once an article is available.
    ///
    /// `stored_progress` seeds the high-water mark so that re-opening an
    /// article never reports a lower value than the one already recorded.
    pub fn start_reading(&mut self, url: &str, stored_progress: f64) {
        let high_water = if stored_progress.is_finite() { stored_progress.clamp(0.0, 100.0) } else { 0.0 };
        self.state = TrackerState::Reading { url: url.to_string(), current: 0.0, high_water };
    }

    /// Returns to `Idle` (article closed, switched away, or load failed).
    pub fn close(&mut self) {
        self.state = TrackerState::Idle;
    }

    /// Recomputes completion for a scroll or mount event.
    ///
    /// Returns `None` outside of `Reading`.
    pub fn observe(&mut self, geometry: &ViewportGeometry) -> Option<ProgressSample> {
        let TrackerState::Reading { url, current, high_water } = &mut self.state else {
            return None;
        };

        let percent = completion(geometry);
        *current = percent;
        let advanced = percent > *high_water;
        if advanced {
            *high_water = percent;
        }

        Some(ProgressSample { url: url.clone(), percent, high_water: *high_water, advanced })
    }
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::new()
    }
}
