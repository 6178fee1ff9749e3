//! HTML parsing and DOM queries.
//!
//! This module provides the [`Document`] and [`Element`] types for parsing
//! HTML and navigating the DOM tree using CSS selectors.
//!
//! # Example
//!
//! ```rust
//! use tidemark_core::parse::Document;
//!
//! let html = r#"
//!     <html>
//!         <body>
//!             <h1>Title</h1>
//!             <p class="content">Paragraph</p>
//!         </body>
//!     </html>
//! "#;
//!
//! let doc = Document::parse(html).unwrap();
//! assert_eq!(doc.first_heading(), Some("Title".to_string()));
//! assert_eq!(doc.select("p.content").unwrap().len(), 1);
//! ```

use scraper::{ElementRef, Html, Selector};

use crate::preprocess::{NoiseConfig, strip_noise};
use crate::text::{block_text, normalize_inline};
use crate::{Result, TidemarkError};

/// Represents a parsed HTML document.
///
/// A Document wraps an HTML page and provides methods for querying elements
/// using CSS selectors and reading the title candidates.
pub struct Document {
    html: Html,
}

impl Document {
    /// Parses HTML from a string without removing anything.
    ///
    /// The HTML5 parser recovers from any malformed markup, so this never
    /// fails on its own; the `Result` keeps the signature aligned with
    /// [`Document::parse_with_noise_removal`].
    pub fn parse(html: &str) -> Result<Self> {
        let html = Html::parse_document(html);
        Ok(Self { html })
    }

    /// Strips noise elements and then parses the remaining markup.
    ///
    /// # Errors
    ///
    /// Returns [`TidemarkError::ConfigError`] for an invalid noise selector
    /// and [`TidemarkError::HtmlParseError`] when the markup cannot be
    /// rewritten.
    pub fn parse_with_noise_removal(html: &str, noise: &NoiseConfig) -> Result<Self> {
        let cleaned = strip_noise(html, noise)?;
        Self::parse(&cleaned)
    }

    /// Selects elements using a CSS selector.
    ///
    /// # Errors
    ///
    /// Returns [`TidemarkError::HtmlParseError`] if the selector is invalid.
    ///
    /// # Example
    ///
    /// ```rust
    /// use tidemark_core::parse::Document;
    ///
    /// let html = r#"<p class="content">First</p><p class="content">Second</p>"#;
    /// let doc = Document::parse(html).unwrap();
    /// let elements = doc.select("p.content").unwrap();
    /// assert_eq!(elements.len(), 2);
    /// ```
    pub fn select(&'_ self, selector: &str) -> Result<Vec<Element<'_>>> {
        let sel =
            Selector::parse(selector).map_err(|e| TidemarkError::HtmlParseError(format!("Invalid selector: {}", e)))?;

        Ok(self.select_compiled(&sel))
    }

    /// Selects elements using an already compiled selector.
    pub fn select_compiled(&'_ self, selector: &Selector) -> Vec<Element<'_>> {
        self.html.select(selector).map(|el| Element { element: el }).collect()
    }

    /// Gets the text of the `<title>` element.
    ///
    /// Whitespace is collapsed; an empty or whitespace-only title is `None`.
    pub fn title(&self) -> Option<String> {
        self.first_text("title")
    }

    /// Gets the text of the first `<h1>` element, if it is not empty.
    pub fn first_heading(&self) -> Option<String> {
        self.first_text("h1")
    }

    /// Gets the `<body>` element.
    pub fn body(&'_ self) -> Option<Element<'_>> {
        let selector = Selector::parse("body").ok()?;
        self.html.select(&selector).next().map(|el| Element { element: el })
    }

    /// Gets the block-aware text of the body (empty if there is none).
    pub fn body_text(&self) -> String {
        self.body().map(|body| body.block_text()).unwrap_or_default()
    }

    fn first_text(&self, selector: &str) -> Option<String> {
        let selector = Selector::parse(selector).ok()?;
        let text = self.html.select(&selector).next().map(|el| el.text().collect::<String>())?;
        let text = normalize_inline(&text);
        if text.is_empty() { None } else { Some(text) }
    }
}

/// A wrapper around scraper's ElementRef.
///
/// # Example
///
/// ```rust
/// use tidemark_core::parse::Document;
///
/// let html = r#"<a href="https://example.com">Link text</a>"#;
/// let doc = Document::parse(html).unwrap();
/// let link = &doc.select("a").unwrap()[0];
///
/// assert_eq!(link.text(), "Link text");
/// assert_eq!(link.attr("href"), Some("https://example.com"));
/// ```
#[derive(Clone, Debug)]
pub struct Element<'a> {
    element: ElementRef<'a>,
}

impl<'a> Element<'a> {
    /// Gets the raw text content of this element.
    ///
    /// All text nodes are concatenated as-is; paragraph boundaries are lost.
    /// Use [`Element::block_text`] for readable output.
    pub fn text(&self) -> String {
        self.element.text().collect()
    }

    /// Gets the text content with one line per block-level element.
    pub fn block_text(&self) -> String {
        block_text(self.element)
    }

    /// Gets the value of an attribute.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.element.value().attr(name)
    }

    pub(crate) fn element_ref(&self) -> ElementRef<'a> {
        self.element
    }

    /// Gets the lowercase tag name of this element.
    pub fn tag_name(&self) -> String {
        self.element.value().name().to_lowercase()
    }
}
