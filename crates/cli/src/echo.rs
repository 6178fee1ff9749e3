use owo_colors::OwoColorize;
use tidemark_core::text::wrap_paragraph;
use tidemark_core::{ArticleRecord, HistoryEntry};

use crate::VERSION;

/// Print a styled banner for verbose mode
pub fn print_banner() {
    eprintln!(
        "\n{} {} {}",
        "Tidemark".bold().bright_blue(),
        "v".dimmed(),
        VERSION.dimmed()
    );
    eprintln!("{}", "Read articles and keep your place\n".dimmed());
}

/// Print a styled step message
pub fn print_step(step: usize, total: usize, message: &str) {
    eprintln!("{} {}", format!("[{}/{}]", step, total).dimmed(), message.bright_cyan());
}

/// Print a success message
pub fn print_success(message: &str) {
    eprintln!("{} {}", "✓".green(), message.bright_green());
}

/// Print an info message
pub fn print_info(message: &str) {
    eprintln!("{} {}", "ℹ".blue(), message.bright_blue());
}

/// Print a warning message
pub fn print_warning(message: &str) {
    eprintln!("{} {}", "⚠".yellow(), message.bright_yellow());
}

/// Print an error message
pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red(), message.bright_red());
}

/// Format file size for display
pub fn format_size(bytes: usize) -> String {
    const KB: usize = 1024;
    const MB: usize = 1024 * KB;

    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// `"<words> words · <minutes> min read · <progress>% read"`
pub fn stats_line(article: &ArticleRecord, progress: f64) -> String {
    format!(
        "{} words · {} min read · {:.0}% read",
        article.word_count, article.reading_time, progress
    )
}

/// Renders an article as plain text: title, stats line, then one wrapped
/// paragraph per block separated by blank lines.
pub fn render_article(article: &ArticleRecord, progress: f64, width: usize) -> String {
    let mut out = String::new();
    out.push_str(&article.title);
    out.push('\n');
    out.push_str(&stats_line(article, progress));
    out.push('\n');

    for paragraph in article.paragraphs() {
        out.push('\n');
        out.push_str(&wrap_paragraph(paragraph, width));
        out.push('\n');
    }

    out
}

/// One history row: progress, title and URL.
pub fn history_row(entry: &HistoryEntry) -> String {
    format!("{:>4.0}%  {}  {}", entry.progress, entry.title, entry.url)
}
