//! Article record produced by extraction.
//!
//! This module defines [`ArticleRecord`], the immutable result of running the
//! extractor over a page: a title, the cleaned body text, and the metrics
//! derived from it.

use serde::{Deserialize, Serialize};

/// Reading speed used for the time estimate.
pub const DEFAULT_WORDS_PER_MINUTE: usize = 200;

/// The normalized article extracted from a page.
///
/// `content` holds one paragraph per line. Field names serialize in camelCase
/// (`wordCount`, `readingTime`), which is the wire shape of the query API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleRecord {
    /// Resolved title (never empty).
    pub title: String,

    /// Cleaned body text, paragraphs separated by `\n`.
    pub content: String,

    /// Number of whitespace-separated words in `content`.
    pub word_count: usize,

    /// Estimated reading time in whole minutes.
    pub reading_time: usize,
}

impl ArticleRecord {
    /// Creates a record, deriving word count and reading time from `content`.
    pub fn new(title: String, content: String) -> Self {
        Self::with_reading_speed(title, content, DEFAULT_WORDS_PER_MINUTE)
    }

    /// Creates a record using a custom reading speed.
    pub fn with_reading_speed(title: String, content: String, words_per_minute: usize) -> Self {
        let word_count = count_words(&content);
        let reading_time = reading_time_minutes(word_count, words_per_minute);
        Self { title, content, word_count, reading_time }
    }

    /// Iterates over the non-empty paragraphs of the content.
    pub fn paragraphs(&self) -> impl Iterator<Item = &str> {
        self.content.split('\n').map(str::trim).filter(|p| !p.is_empty())
    }
}

/// Counts whitespace-separated words.
pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}

/// `ceil(words / words_per_minute)`; zero words read in zero minutes.
pub fn reading_time_minutes(word_count: usize, words_per_minute: usize) -> usize {
    word_count.div_ceil(words_per_minute.max(1))
}
