//! Prioritized content rules.
//!
//! A [`ContentRules`] value is an ordered list of CSS selectors. Resolution
//! tries them in order and stops at the first selector that matches at least
//! one node; text is never merged across selectors.

use std::collections::HashSet;

use scraper::Selector;

use crate::parse::Document;
use crate::{Result, TidemarkError};

/// Selectors tried, in order, to locate the article body
pub const DEFAULT_CONTENT_SELECTORS: &[&str] =
    &["article", "main", ".post-content", ".article-content", "#content", ".content"];

/// A single content selector
#[derive(Debug, Clone)]
pub struct ContentRule {
    source: String,
    selector: Selector,
}

impl ContentRule {
    /// Compiles a rule from a CSS selector
    pub fn new(css: &str) -> Result<Self> {
        let selector = Selector::parse(css)
            .map_err(|e| TidemarkError::ConfigError(format!("invalid content selector '{}': {}", css, e)))?;
        Ok(Self { source: css.to_string(), selector })
    }

    /// The selector as written
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Text of every outermost node this rule matches, one block per node.
    ///
    /// A match nested inside another match of the same rule is already part
    /// of its ancestor's text and is skipped. `None` when the rule matches
    /// nothing.
    pub fn apply(&self, doc: &Document) -> Option<String> {
        let matches = doc.select_compiled(&self.selector);
        if matches.is_empty() {
            return None;
        }

        let matched: HashSet<_> = matches.iter().map(|el| el.element_ref().id()).collect();
        let text = matches
            .iter()
            .filter(|el| !el.element_ref().ancestors().any(|node| matched.contains(&node.id())))
            .map(|el| el.block_text())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join("\n");
        Some(text)
    }
}

/// The winning rule of a resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleMatch {
    /// Position of the rule in the list
    pub index: usize,
    /// The selector that matched
    pub selector: String,
    /// Block-aware text of the matched nodes
    pub text: String,
}

/// Ordered list of content rules, first match wins
#[derive(Debug, Clone)]
pub struct ContentRules {
    rules: Vec<ContentRule>,
}

impl ContentRules {
    /// An empty rule list (resolution always falls through)
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Builds a rule list from selectors, keeping their order
    pub fn from_selectors<S: AsRef<str>>(selectors: &[S]) -> Result<Self> {
        let rules = selectors.iter().map(|s| ContentRule::new(s.as_ref())).collect::<Result<Vec<_>>>()?;
        Ok(Self { rules })
    }

    /// Appends a rule with the lowest priority so far
    pub fn with_rule(mut self, css: &str) -> Result<Self> {
        self.rules.push(ContentRule::new(css)?);
        Ok(self)
    }

    /// Inserts a rule ahead of every existing one
    pub fn with_priority_rule(mut self, css: &str) -> Result<Self> {
        self.rules.insert(0, ContentRule::new(css)?);
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ContentRule> {
        self.rules.iter()
    }

    /// Finds the first rule that matches at least one node
    pub fn resolve(&self, doc: &Document) -> Option<RuleMatch> {
        self.rules.iter().enumerate().find_map(|(index, rule)| {
            rule.apply(doc)
                .map(|text| RuleMatch { index, selector: rule.as_str().to_string(), text })
        })
    }
}

impl Default for ContentRules {
    fn default() -> Self {
        let rules = DEFAULT_CONTENT_SELECTORS
            .iter()
            .filter_map(|css| ContentRule::new(css).ok())
            .collect();
        Self { rules }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_default_rules_order() {
        let rules = ContentRules::default();
        let selectors: Vec<&str> = rules.iter().map(|r| r.as_str()).collect();
        assert_eq!(selectors, DEFAULT_CONTENT_SELECTORS);
    }

    #[rstest]
    #[case("<body><article><p>Article body</p></article><main>Main</main></body>", 0, "Article body")]
    #[case("<body><main><p>Main body</p></main><div class=\"content\">C</div></body>", 1, "Main body")]
    #[case("<body><div class=\"post-content\">Post</div><div id=\"content\">Id</div></body>", 2, "Post")]
    #[case("<body><div class=\"article-content\">Story</div></body>", 3, "Story")]
    #[case("<body><section id=\"content\">By id</section><div class=\"content\">C</div></body>", 4, "By id")]
    #[case("<body><div class=\"content\">Classed</div></body>", 5, "Classed")]
    fn test_first_matching_rule_wins(#[case] html: &str, #[case] index: usize, #[case] text: &str) {
        let doc = Document::parse(html).unwrap();
        let matched = ContentRules::default().resolve(&doc).unwrap();
        assert_eq!(matched.index, index);
        assert_eq!(matched.text, text);
    }

    #[test]
    fn test_all_nodes_of_winning_selector_are_joined() {
        let doc = Document::parse("<body><article>First</article><p>x</p><article>Second</article></body>").unwrap();
        let matched = ContentRules::default().resolve(&doc).unwrap();
        assert_eq!(matched.text, "First\nSecond");
    }

    #[test]
    fn test_nested_matches_are_not_repeated() {
        let doc = Document::parse(
            r#"<body><div class="content">Outer <div class="content">inner words</div></div><div class="content">Last</div></body>"#,
        )
        .unwrap();

        let matched = ContentRules::from_selectors(&[".content"]).unwrap().resolve(&doc).unwrap();
        assert_eq!(matched.text, "Outer\ninner words\nLast");
        assert_eq!(matched.text.matches("inner words").count(), 1);
    }

    #[test]
    fn test_no_merge_across_selectors() {
        let doc = Document::parse("<body><article>Only this</article><main>Not this</main></body>").unwrap();
        let matched = ContentRules::default().resolve(&doc).unwrap();
        assert!(!matched.text.contains("Not this"));
    }

    #[test]
    fn test_no_match() {
        let doc = Document::parse("<body><div>Plain</div></body>").unwrap();
        assert!(ContentRules::default().resolve(&doc).is_none());
        assert!(ContentRules::new().resolve(&doc).is_none());
    }

    #[test]
    fn test_matching_empty_node_still_matches() {
        let doc = Document::parse("<body><article>   </article><main>Main</main></body>").unwrap();
        let matched = ContentRules::default().resolve(&doc).unwrap();
        assert_eq!(matched.index, 0);
        assert!(matched.text.is_empty());
    }

    #[test]
    fn test_custom_priority_rule() {
        let rules = ContentRules::default().with_priority_rule(".entry").unwrap();
        let doc = Document::parse("<body><article>Article</article><div class=\"entry\">Entry</div></body>").unwrap();
        assert_eq!(rules.resolve(&doc).unwrap().text, "Entry");
        assert_eq!(rules.len(), DEFAULT_CONTENT_SELECTORS.len() + 1);
    }

    #[test]
    fn test_invalid_rule() {
        assert!(matches!(
            ContentRules::new().with_rule("[[nope"),
            Err(TidemarkError::ConfigError(_))
        ));
        assert!(ContentRules::from_selectors(&["article", "##"]).is_err());
    }
}
