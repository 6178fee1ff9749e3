//! Main article extraction API.
//!
//! The entry point is the [`Extractor`] struct, along with the convenience
//! functions [`extract`] and [`fetch_and_extract`].
//!
//! Extraction is a pure function of the raw markup:
//!
//! 1. noise elements (scripts, navigation, ads, ...) are stripped,
//! 2. the title is resolved from `<title>`, then the first `<h1>`, then a
//!    fixed default,
//! 3. the body text comes from the first content rule that matches, or from
//!    the whole `<body>` when none does,
//! 4. word count and reading time are derived from the normalized text.
//!
//! # Example
//!
//! ```rust
//! use tidemark_core::extract;
//!
//! let html = "<title>T</title><article>Hello world. This is a test.</article>";
//! let article = extract(html).unwrap();
//! assert_eq!(article.title, "T");
//! assert_eq!(article.word_count, 6);
//! assert_eq!(article.reading_time, 1);
//! ```

use crate::Result;
use crate::article::{ArticleRecord, DEFAULT_WORDS_PER_MINUTE};
use crate::parse::Document;
use crate::preprocess::NoiseConfig;
use crate::rules::ContentRules;

#[cfg(feature = "fetch")]
use crate::fetch::{FetchConfig, fetch_url};

/// Title used when neither `<title>` nor `<h1>` has text.
pub const DEFAULT_TITLE: &str = "Untitled Blog";

/// Configuration for the extractor.
///
/// # Example
///
/// ```rust
/// use tidemark_core::ExtractConfig;
///
/// let config = ExtractConfig::builder()
///     .words_per_minute(250)
///     .default_title("Untitled")
///     .build();
/// assert_eq!(config.words_per_minute, 250);
/// ```
#[derive(Debug, Clone)]
pub struct ExtractConfig {
    /// Elements stripped before reading any text.
    pub noise: NoiseConfig,

    /// Ordered content rules (first match wins).
    pub rules: ContentRules,

    /// Title used when the document has none (default: "Untitled Blog").
    pub default_title: String,

    /// Reading speed for the time estimate (default: 200).
    pub words_per_minute: usize,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            noise: NoiseConfig::default(),
            rules: ContentRules::default(),
            default_title: DEFAULT_TITLE.to_string(),
            words_per_minute: DEFAULT_WORDS_PER_MINUTE,
        }
    }
}

impl ExtractConfig {
    /// Creates a new builder for ExtractConfig.
    pub fn builder() -> ExtractConfigBuilder {
        ExtractConfigBuilder::new()
    }
}

/// Builder for ExtractConfig.
pub struct ExtractConfigBuilder {
    config: ExtractConfig,
}

impl ExtractConfigBuilder {
    /// Creates a new builder with default values.
    pub fn new() -> Self {
        Self { config: ExtractConfig::default() }
    }

    /// Sets the noise stripping configuration.
    pub fn noise(mut self, value: NoiseConfig) -> Self {
        self.config.noise = value;
        self
    }

    /// Sets the content rules.
    pub fn rules(mut self, value: ContentRules) -> Self {
        self.config.rules = value;
        self
    }

    /// Sets the fallback title.
    pub fn default_title(mut self, value: impl Into<String>) -> Self {
        self.config.default_title = value.into();
        self
    }

    /// Sets the reading speed.
    pub fn words_per_minute(mut self, value: usize) -> Self {
        self.config.words_per_minute = value;
        self
    }

    /// Builds the config.
    pub fn build(self) -> ExtractConfig {
        self.config
    }
}

impl Default for ExtractConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Turns raw HTML into an [`ArticleRecord`].
///
/// The extractor holds no state besides its configuration and can be shared
/// freely between requests.
#[derive(Debug, Clone, Default)]
pub struct Extractor {
    config: ExtractConfig,
}

impl Extractor {
    /// Creates an extractor with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an extractor with a custom configuration.
    pub fn with_config(config: ExtractConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ExtractConfig {
        &self.config
    }

    /// Extracts the article from raw HTML.
    ///
    /// A page without any recognizable container degrades to its body text,
    /// and an empty page yields an empty record with the default title.
    ///
    /// # Errors
    ///
    /// Returns [`crate::TidemarkError::HtmlParseError`] only when the markup
    /// cannot be processed at all, and [`crate::TidemarkError::ConfigError`]
    /// for an invalid noise selector.
    pub fn extract(&self, html: &str) -> Result<ArticleRecord> {
        let doc = Document::parse_with_noise_removal(html, &self.config.noise)?;
        Ok(self.extract_from_document(&doc))
    }

    /// Extracts the article from a document that is already cleaned.
    pub fn extract_from_document(&self, doc: &Document) -> ArticleRecord {
        let title = self.resolve_title(doc);
        let content = self.resolve_content(doc);

        ArticleRecord::with_reading_speed(title, content, self.config.words_per_minute)
    }

    fn resolve_title(&self, doc: &Document) -> String {
        doc.title()
            .or_else(|| doc.first_heading())
            .unwrap_or_else(|| self.config.default_title.clone())
    }

    fn resolve_content(&self, doc: &Document) -> String {
        match self.config.rules.resolve(doc) {
            Some(found) if !found.text.is_empty() => {
                tracing::debug!(selector = %found.selector, rule = found.index, "content rule matched");
                found.text
            }
            Some(found) => {
                tracing::debug!(selector = %found.selector, "content rule matched only whitespace, using body");
                doc.body_text()
            }
            None => {
                tracing::debug!("no content rule matched, using body");
                doc.body_text()
            }
        }
    }

    /// Fetches a page and extracts its article.
    #[cfg(feature = "fetch")]
    pub async fn fetch_and_extract(&self, url: &str, fetch_config: &FetchConfig) -> Result<ArticleRecord> {
        let html = fetch_url(url, fetch_config).await?;
        self.extract(&html)
    }
}

/// Convenience function for one-liner extraction with defaults.
pub fn extract(html: &str) -> Result<ArticleRecord> {
    Extractor::new().extract(html)
}

/// Fetches a URL and extracts its article with default settings.
#[cfg(feature = "fetch")]
pub async fn fetch_and_extract(url: &str, fetch_config: &FetchConfig) -> Result<ArticleRecord> {
    Extractor::new().fetch_and_extract(url, fetch_config).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_end_to_end_article() {
        let article = extract("<title>T</title><article>Hello world. This is a test.</article>").unwrap();
        assert_eq!(article.title, "T");
        assert_eq!(article.content, "Hello world. This is a test.");
        assert_eq!(article.word_count, 6);
        assert_eq!(article.reading_time, 1);
    }

    #[test]
    fn test_title_falls_back_to_h1() {
        let article = extract("<html><head><title></title></head><body><h1>Heading</h1><p>x</p></body></html>").unwrap();
        assert_eq!(article.title, "Heading");
    }

    #[test]
    fn test_title_falls_back_to_default() {
        let article = extract("<html><head><title> </title></head><body><h1></h1><p>x</p></body></html>").unwrap();
        assert_eq!(article.title, DEFAULT_TITLE);
    }

    #[test]
    fn test_noise_never_reaches_title_or_content() {
        let html = r#"
            <html><head><script>document.title = "Injected";</script></head>
            <body>
                <header><h1>Site name</h1></header>
                <nav>Home About</nav>
                <h1>Real heading</h1>
                <p>Body text.</p>
                <footer>Footer links</footer>
            </body></html>
        "#;
        let article = extract(html).unwrap();
        assert_eq!(article.title, "Real heading");
        assert!(!article.content.contains("Injected"));
        assert!(!article.content.contains("Site name"));
        assert!(!article.content.contains("Home About"));
        assert!(!article.content.contains("Footer links"));
        assert_eq!(article.content, "Real heading\nBody text.");
    }

    #[test]
    fn test_falls_back_to_body() {
        let article = extract("<body><div><p>First.</p><p>Second one.</p></div></body>").unwrap();
        assert_eq!(article.title, DEFAULT_TITLE);
        assert_eq!(article.content, "First.\nSecond one.");
        assert_eq!(article.word_count, 3);
    }

    #[test]
    fn test_whitespace_only_match_falls_back_to_body() {
        let article = extract("<body><main>  </main><p>Outside main</p></body>").unwrap();
        assert_eq!(article.content, "Outside main");
    }

    #[test]
    fn test_empty_input_is_degenerate_record() {
        for html in ["", "   ", "<html><body></body></html>"] {
            let article = extract(html).unwrap();
            assert_eq!(article.title, DEFAULT_TITLE);
            assert_eq!(article.content, "");
            assert_eq!(article.word_count, 0);
            assert_eq!(article.reading_time, 0);
        }
    }

    #[test]
    fn test_paragraphs_preserved() {
        let html = "<article><h2>Intro</h2><p>One two\n three.</p><p>Four.</p></article>";
        let article = extract(html).unwrap();
        let paragraphs: Vec<&str> = article.paragraphs().collect();
        assert_eq!(paragraphs, vec!["Intro", "One two three.", "Four."]);
    }

    #[test]
    fn test_builder_config() {
        let config = ExtractConfig::builder()
            .default_title("Nothing here")
            .words_per_minute(2)
            .rules(ContentRules::new().with_rule(".story").unwrap())
            .build();
        let extractor = Extractor::with_config(config);

        let article = extractor
            .extract("<body><article>ignored rule</article><div class=\"story\">a b c d e</div></body>")
            .unwrap();
        assert_eq!(article.title, "Nothing here");
        assert_eq!(article.content, "a b c d e");
        assert_eq!(article.reading_time, 3);
    }

    #[test]
    fn test_reading_time_long_article() {
        let body = "word ".repeat(401);
        let article = extract(&format!("<article><p>{}</p></article>", body)).unwrap();
        assert_eq!(article.word_count, 401);
        assert_eq!(article.reading_time, 3);
    }
}
