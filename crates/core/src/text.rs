//! Block-aware text serialization.
//!
//! Flattening a subtree with `text()` glues paragraphs together. The
//! functions here walk the tree instead and emit one line per block-level
//! element, so that the resulting string can be split on `\n` into
//! paragraph-sized chunks.

use std::sync::LazyLock;

use regex::Regex;
use scraper::ElementRef;

const BLOCK_ELEMENTS: &[&str] = &[
    "address",
    "article",
    "aside",
    "blockquote",
    "dd",
    "details",
    "div",
    "dl",
    "dt",
    "figcaption",
    "figure",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "hr",
    "li",
    "main",
    "ol",
    "p",
    "pre",
    "section",
    "summary",
    "table",
    "tbody",
    "td",
    "tfoot",
    "th",
    "thead",
    "tr",
    "ul",
    "body",
];

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Whether a tag starts a new line in serialized text
fn is_block_element(tag_name: &str) -> bool {
    BLOCK_ELEMENTS.contains(&tag_name)
}

/// Serialize an element's text, one line per block
pub fn block_text(element: ElementRef<'_>) -> String {
    let mut raw = String::new();
    write_element(element, &mut raw, element.value().name() == "pre");
    normalize_lines(&raw)
}

fn write_element(element: ElementRef<'_>, out: &mut String, in_pre: bool) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            if in_pre {
                out.push_str(text);
            } else {
                // source formatting is not a paragraph break
                out.extend(text.chars().map(|c| if c.is_whitespace() { ' ' } else { c }));
            }
        } else if let Some(child_element) = ElementRef::wrap(child) {
            let name = child_element.value().name();

            if name == "br" {
                out.push('\n');
                continue;
            }

            let is_block = is_block_element(name);
            if is_block {
                out.push('\n');
            }
            write_element(child_element, out, in_pre || name == "pre");
            if is_block {
                out.push('\n');
            }
        }
    }
}

/// Collapse whitespace inside each line, drop empty lines, join with `\n`
pub fn normalize_lines(text: &str) -> String {
    text.split('\n')
        .map(normalize_inline)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Trim and collapse every whitespace run (newlines included) to one space
pub fn normalize_inline(text: &str) -> String {
    WHITESPACE.replace_all(text.trim(), " ").into_owned()
}

/// Wrap a paragraph to the given width (0 = no wrapping)
pub fn wrap_paragraph(paragraph: &str, width: usize) -> String {
    if width == 0 {
        return paragraph.to_string();
    }

    let mut lines = Vec::new();
    let mut current_line: Vec<&str> = Vec::new();
    let mut current_length = 0;

    for word in paragraph.split_whitespace() {
        let word_len = word.chars().count();

        if current_length == 0 {
            current_line.push(word);
            current_length = word_len;
        } else if current_length + 1 + word_len <= width {
            current_length += 1 + word_len;
            current_line.push(word);
        } else {
            lines.push(current_line.join(" "));
            current_line = vec![word];
            current_length = word_len;
        }
    }

    if !current_line.is_empty() {
        lines.push(current_line.join(" "));
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::{Html, Selector};

    fn body_text(html: &str) -> String {
        let document = Html::parse_document(html);
        let selector = Selector::parse("body").unwrap();
        let body = document.select(&selector).next().unwrap();
        block_text(body)
    }

    #[test]
    fn test_paragraphs_become_lines() {
        let text = body_text("<p>First paragraph.</p><p>Second paragraph.</p>");
        assert_eq!(text, "First paragraph.\nSecond paragraph.");
    }

    #[test]
    fn test_source_newlines_are_not_breaks() {
        let text = body_text("<p>Hello\n      world,\n   again</p>");
        assert_eq!(text, "Hello world, again");
    }

    #[test]
    fn test_inline_elements_stay_on_line() {
        let text = body_text("<div>Intro <strong>bold</strong> and <em>italic</em> text<p>Para</p>tail</div>");
        assert_eq!(text, "Intro bold and italic text\nPara\ntail");
    }

    #[test]
    fn test_br_breaks_line() {
        let text = body_text("<p>Line one<br>Line two</p>");
        assert_eq!(text, "Line one\nLine two");
    }

    #[test]
    fn test_pre_keeps_newlines() {
        let text = body_text("<pre>fn main() {\n    run();\n}</pre>");
        assert_eq!(text, "fn main() {\nrun();\n}");
    }

    #[test]
    fn test_lists_and_headings() {
        let text = body_text("<h2>Steps</h2><ul><li>One</li><li>Two</li></ul>");
        assert_eq!(text, "Steps\nOne\nTwo");
    }

    #[test]
    fn test_empty_body() {
        assert_eq!(body_text("<html><body>   \n  </body></html>"), "");
    }

    #[test]
    fn test_normalize_inline() {
        assert_eq!(normalize_inline("  Multiple   spaces\t\t\n\nhere "), "Multiple spaces here");
        assert_eq!(normalize_inline(""), "");
    }

    #[test]
    fn test_wrap_paragraph() {
        let wrapped = wrap_paragraph("one two three four five", 9);
        assert_eq!(wrapped, "one two\nthree\nfour five");
        assert_eq!(wrap_paragraph("unchanged text", 0), "unchanged text");
    }
}
