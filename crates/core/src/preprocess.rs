use std::sync::LazyLock;

use lol_html::errors::RewritingError;
use regex::Regex;
use scraper::{Html, Selector};

use crate::{Result, TidemarkError};

/// Elements removed before any text is read from the page
pub const DEFAULT_NOISE_SELECTORS: &[&str] = &[
    "script",
    "style",
    "nav",
    "footer",
    "header",
    "noscript",
    "iframe",
    "ad",
    r#"[class~="ad"]"#,
    r#"[class~="ads"]"#,
    r#"[class~="advert"]"#,
    r#"[class~="advertisement"]"#,
    r#"[id="ad"]"#,
    r#"[id="ads"]"#,
];

static HIDDEN_STYLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(display\s*:\s*none|visibility\s*:\s*hidden)").unwrap());

/// Configuration for noise stripping
#[derive(Debug, Clone)]
pub struct NoiseConfig {
    /// CSS selectors whose matches are removed together with their content
    pub selectors: Vec<String>,
    /// Whether to remove elements hidden with inline styles
    pub remove_hidden: bool,
}

impl Default for NoiseConfig {
    fn default() -> Self {
        Self { selectors: DEFAULT_NOISE_SELECTORS.iter().map(|s| s.to_string()).collect(), remove_hidden: true }
    }
}

impl NoiseConfig {
    /// Adds another selector to strip
    pub fn with_selector(mut self, selector: impl Into<String>) -> Self {
        self.selectors.push(selector.into());
        self
    }

    /// Checks that every selector is understood by the rewriter
    pub fn validate(&self) -> Result<()> {
        for selector in &self.selectors {
            selector
                .parse::<lol_html::Selector>()
                .map_err(|e| TidemarkError::ConfigError(format!("invalid noise selector '{}': {}", selector, e)))?;
        }
        Ok(())
    }
}

/// Remove noise elements (and their text) from raw HTML
///
/// Runs before the document is parsed so that nothing inside a noise element
/// can reach the title or the content.
pub fn strip_noise(html: &str, config: &NoiseConfig) -> Result<String> {
    config.validate()?;

    let mut handlers: Vec<_> = config
        .selectors
        .iter()
        .map(|selector| {
            lol_html::element!(selector.as_str(), |el| {
                el.remove();
                Ok(())
            })
        })
        .collect();

    if config.remove_hidden {
        handlers.push(lol_html::element!("[style]", |el| {
            if let Some(style) = el.get_attribute("style")
                && HIDDEN_STYLE.is_match(&style)
            {
                el.remove();
            }
            Ok(())
        }));
    }

    let mut output = String::with_capacity(html.len());
    let mut rewriter = lol_html::HtmlRewriter::new(
        lol_html::Settings { element_content_handlers: handlers, ..Default::default() },
        |c: &[u8]| {
            output.push_str(&String::from_utf8_lossy(c));
        },
    );

    let rewritten = rewriter.write(html.as_bytes()).and_then(|_| rewriter.end());
    match rewritten {
        Ok(()) => Ok(output),
        Err(RewritingError::ParsingAmbiguity(e)) => {
            tracing::debug!(reason = %e, "streaming rewrite gave up, stripping noise from the parsed tree");
            let mut document = Html::parse_document(html);
            remove_noise_nodes(&mut document, config)?;
            Ok(document.html())
        }
        Err(e) => Err(TidemarkError::HtmlParseError(e.to_string())),
    }
}

/// Detach noise elements from an already parsed tree
///
/// Returns the number of detached nodes. Nodes nested inside an already
/// detached node are counted as well.
pub fn remove_noise_nodes(html: &mut Html, config: &NoiseConfig) -> Result<usize> {
    let mut doomed = Vec::new();

    for source in &config.selectors {
        let selector = Selector::parse(source)
            .map_err(|e| TidemarkError::ConfigError(format!("invalid noise selector '{}': {}", source, e)))?;
        doomed.extend(html.select(&selector).map(|el| el.id()));
    }

    if config.remove_hidden {
        let styled = Selector::parse("[style]")
            .map_err(|e| TidemarkError::ConfigError(format!("invalid style selector: {}", e)))?;
        doomed.extend(
            html.select(&styled)
                .filter(|el| el.value().attr("style").is_some_and(|style| HIDDEN_STYLE.is_match(style)))
                .map(|el| el.id()),
        );
    }

    let count = doomed.len();
    for id in doomed {
        if let Some(mut node) = html.tree.get_mut(id) {
            node.detach();
        }
    }

    Ok(count)
}
