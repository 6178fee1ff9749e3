use std::fs;
use std::io::{self, BufRead, Write};
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::Context;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use owo_colors::OwoColorize;
use tidemark_core::{
    ArticleRecord, ErrorKind, Extractor, FetchConfig, HistoryConfig, HistoryStore, JsonFileStore, ReadingSession,
    Requested, TidemarkError, ViewportGeometry, fetch_file, fetch_stdin,
};
use tracing_subscriber::EnvFilter;
use url::Url;

mod echo;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Output format for articles and history
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(format!("Invalid format: {}. Valid options: text, json", s)),
        }
    }
}

/// Read web articles in the terminal and remember how far you got
#[derive(Parser, Debug)]
#[command(name = "tidemark")]
#[command(version)]
#[command(about = "Read articles and keep track of reading progress", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Reading history file (default: <data dir>/tidemark/history.json)
    #[arg(long, global = true, env = "TIDEMARK_HISTORY", value_name = "FILE")]
    history: Option<PathBuf>,

    /// HTTP timeout in seconds
    #[arg(long, global = true, default_value = "30", value_name = "SECS")]
    timeout: u64,

    /// Custom User-Agent for HTTP requests
    #[arg(long, global = true, value_name = "UA")]
    user_agent: Option<String>,

    /// Keep at most this many history entries, at least 1 (oldest are dropped)
    #[arg(long, global = true, value_name = "NUM")]
    max_entries: Option<NonZeroUsize>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract and display an article, resuming from the reading history
    Read {
        /// URL to fetch, local HTML file, or "-" for stdin
        #[arg(value_name = "INPUT")]
        input: String,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text", value_name = "FORMAT")]
        format: OutputFormat,

        /// Wrap paragraphs at this many columns (0 disables wrapping)
        #[arg(short, long, default_value = "80", value_name = "COLS")]
        width: usize,

        /// Output file (default: stdout)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Record reading progress for an article from viewport geometry
    Progress {
        /// URL of an article in the reading history
        #[arg(value_name = "URL")]
        url: String,

        /// Offset of the article's top edge in the document
        #[arg(long, allow_negative_numbers = true, value_name = "PX")]
        element_top: f64,

        /// Rendered height of the article
        #[arg(long, value_name = "PX")]
        element_height: f64,

        /// Height of the viewport
        #[arg(long, value_name = "PX")]
        viewport_height: f64,

        /// Current scroll offset
        #[arg(long, allow_negative_numbers = true, value_name = "PX")]
        scroll: f64,
    },

    /// Inspect and edit the reading history
    History {
        #[command(subcommand)]
        action: HistoryCommand,
    },

    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand, Debug)]
enum HistoryCommand {
    /// List entries, most recent first
    List {
        /// Output format (text, json)
        #[arg(short, long, default_value = "text", value_name = "FORMAT")]
        format: OutputFormat,
    },

    /// Show a stored article
    Show {
        #[arg(value_name = "URL")]
        url: String,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text", value_name = "FORMAT")]
        format: OutputFormat,

        /// Wrap paragraphs at this many columns (0 disables wrapping)
        #[arg(short, long, default_value = "80", value_name = "COLS")]
        width: usize,
    },

    /// Remove one entry
    Remove {
        #[arg(value_name = "URL")]
        url: String,
    },

    /// Remove every entry
    Clear {
        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },
}

/// Where the HTML of a `read` comes from.
enum Source {
    Url(String),
    File(String),
    Stdin,
}

impl Source {
    fn classify(input: &str) -> Self {
        if input == "-" {
            Self::Stdin
        } else if input.starts_with("http://") || input.starts_with("https://") {
            Self::Url(input.to_string())
        } else {
            Self::File(input.to_string())
        }
    }

    /// Key under which the article is kept in the history.
    ///
    /// Files are keyed by their canonical `file://` URL; stdin is never stored.
    fn history_key(&self) -> Option<String> {
        match self {
            Self::Url(url) => Some(url.clone()),
            Self::File(path) => Some(
                fs::canonicalize(path)
                    .ok()
                    .and_then(|abs| Url::from_file_path(abs).ok())
                    .map_or_else(|| path.clone(), |url| url.to_string()),
            ),
            Self::Stdin => None,
        }
    }
}

/// Wraps a core error so the user-facing message comes first.
fn user_error(err: TidemarkError) -> anyhow::Error {
    let message = err.user_message();
    anyhow::Error::new(err).context(message)
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn open_history(cli: &Cli) -> anyhow::Result<HistoryStore<JsonFileStore>> {
    let store = match &cli.history {
        Some(path) => JsonFileStore::new(path),
        None => JsonFileStore::at_default_location().map_err(user_error)?,
    };

    if cli.verbose {
        eprintln!("  {} {}", "History:".dimmed(), store.path().display().bright_white());
    }

    let config = HistoryConfig { max_entries: cli.max_entries };
    let (history, load_error) = HistoryStore::open_or_empty_with_config(store, config);
    if let Some(err) = load_error {
        echo::print_warning(&err.user_message());
    }

    Ok(history)
}

fn fetch_config(cli: &Cli) -> FetchConfig {
    let defaults = FetchConfig::default();
    FetchConfig { timeout: cli.timeout, user_agent: cli.user_agent.clone().unwrap_or(defaults.user_agent) }
}

fn write_output(output: Option<&PathBuf>, content: &str) -> anyhow::Result<()> {
    match output {
        Some(path) => {
            fs::write(path, content).with_context(|| format!("Failed to write to file: {}", path.display()))?;
            echo::print_success(&format!("Output written to {}", path.display().bright_white()));
        }
        None => print!("{}", content),
    }
    Ok(())
}

fn render(article: &ArticleRecord, progress: f64, format: OutputFormat, width: usize) -> anyhow::Result<String> {
    match format {
        OutputFormat::Text => Ok(echo::render_article(article, progress, width)),
        OutputFormat::Json => {
            let mut json = serde_json::to_string_pretty(article).context("Failed to serialize article")?;
            json.push('\n');
            Ok(json)
        }
    }
}

async fn run_read(
    cli: &Cli, input: &str, format: OutputFormat, width: usize, output: Option<&PathBuf>,
) -> anyhow::Result<()> {
    if cli.verbose {
        echo::print_step(1, 3, "Loading reading history");
    }
    let mut session = ReadingSession::new(open_history(cli)?);
    let extractor = Extractor::new();
    let source = Source::classify(input);

    let (article, progress) = match &source {
        Source::Url(url) => {
            if cli.verbose {
                echo::print_step(2, 3, &format!("Opening {}", url.bright_white().underline()));
            }
            match session.open_url(url, &fetch_config(cli), &extractor).await {
                Ok(entry) => (entry.article(), entry.progress),
                Err(err) if err.kind() == ErrorKind::Persistence => {
                    echo::print_warning(&err.user_message());
                    let entry = session.history().get(url).context("Article missing from history")?;
                    (entry.article(), entry.progress)
                }
                Err(err) => return Err(user_error(err)),
            }
        }
        Source::File(_) | Source::Stdin => {
            let key = source.history_key();
            let cached = match key.as_deref().map(|key| session.request(key)) {
                Some(Requested::Cached(entry)) => Some(entry),
                _ => None,
            };

            match cached {
                Some(entry) => {
                    if cli.verbose {
                        echo::print_info("Opened from reading history");
                    }
                    (entry.article(), entry.progress)
                }
                None => {
                    if cli.verbose {
                        echo::print_step(2, 3, &format!("Reading {}", input.bright_white()));
                    }
                    let html = match &source {
                        Source::File(path) => fetch_file(path),
                        _ => fetch_stdin(),
                    };
                    let article = match html.and_then(|html| {
                        if cli.verbose {
                            eprintln!("  {} {}", "Size:".dimmed(), echo::format_size(html.len()).bright_white());
                        }
                        extractor.extract(&html)
                    }) {
                        Ok(article) => article,
                        Err(err) => {
                            session.fail();
                            return Err(user_error(err));
                        }
                    };

                    if let Some(key) = key
                        && let Err(err) = session.deliver(&key, &article)
                    {
                        echo::print_warning(&err.user_message());
                    }
                    (article, 0.0)
                }
            }
        }
    };

    if cli.verbose {
        echo::print_step(3, 3, "Rendering article");
        eprintln!("  {} {}", "Title:".dimmed(), article.title.bright_white());
        eprintln!("  {} {}\n", "Stats:".dimmed(), echo::stats_line(&article, progress).bright_white());
    }

    write_output(output, &render(&article, progress, format, width)?)
}

fn run_progress(cli: &Cli, url: &str, geometry: ViewportGeometry) -> anyhow::Result<()> {
    let mut session = ReadingSession::new(open_history(cli)?);

    if session.request(url) == Requested::NeedsFetch {
        anyhow::bail!("{} is not in the reading history; read it first", url);
    }

    let sample = session
        .scroll(&geometry)
        .map_err(user_error)?
        .context("Article is not open for reading")?;

    println!("{:.0}% read (furthest {:.0}%)", sample.percent, sample.high_water);
    if sample.advanced && cli.verbose {
        echo::print_success("Progress saved");
    }

    session.close();
    Ok(())
}

fn confirm(prompt: &str) -> anyhow::Result<bool> {
    eprint!("{} ", prompt.bright_yellow());
    io::stderr().flush().ok();

    let mut answer = String::new();
    io::stdin()
        .lock()
        .read_line(&mut answer)
        .context("Failed to read confirmation")?;

    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

fn run_history(cli: &Cli, action: &HistoryCommand) -> anyhow::Result<()> {
    let mut history = open_history(cli)?;

    match action {
        HistoryCommand::List { format } => match format {
            OutputFormat::Json => {
                let json = serde_json::to_string_pretty(history.entries()).context("Failed to serialize history")?;
                println!("{}", json);
            }
            OutputFormat::Text if history.is_empty() => echo::print_info("Reading history is empty"),
            OutputFormat::Text => {
                for entry in history.entries() {
                    println!("{}", echo::history_row(entry));
                }
            }
        },
        HistoryCommand::Show { url, format, width } => {
            let entry = history
                .get(url)
                .with_context(|| format!("{} is not in the reading history", url))?;
            print!("{}", render(&entry.article(), entry.progress, *format, *width)?);
        }
        HistoryCommand::Remove { url } => {
            if !history.remove(url).map_err(user_error)? {
                anyhow::bail!("{} is not in the reading history", url);
            }
            echo::print_success(&format!("Removed {}", url));
        }
        HistoryCommand::Clear { yes } => {
            if history.is_empty() {
                echo::print_info("Reading history is already empty");
                return Ok(());
            }

            let prompt = format!("Clear {} entries from the reading history? [y/N]", history.len());
            if !*yes && !confirm(&prompt)? {
                echo::print_warning("Cancelled");
                return Ok(());
            }

            history.clear().map_err(user_error)?;
            echo::print_success("Reading history cleared");
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if cli.verbose {
        echo::print_banner();
        echo::print_info("Debug logging enabled");
        eprintln!();
    }

    let result = match &cli.command {
        Command::Read { input, format, width, output } => {
            run_read(&cli, input, *format, *width, output.as_ref()).await
        }
        Command::Progress { url, element_top, element_height, viewport_height, scroll } => {
            let geometry = ViewportGeometry::new(*element_top, *element_height, *viewport_height, *scroll);
            run_progress(&cli, url, geometry)
        }
        Command::History { action } => run_history(&cli, action),
        Command::Completions { shell } => {
            clap_complete::generate(*shell, &mut Cli::command(), "tidemark", &mut io::stdout());
            Ok(())
        }
    };

    if let Err(err) = result {
        echo::print_error(&format!("{:#}", err));
        std::process::exit(1);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_output_format_from_str() {
        assert_eq!("JSON".parse::<OutputFormat>(), Ok(OutputFormat::Json));
        assert_eq!("txt".parse::<OutputFormat>(), Ok(OutputFormat::Text));
        assert!("markdown".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_source_classification() {
        assert!(matches!(Source::classify("-"), Source::Stdin));
        assert!(matches!(Source::classify("https://example.com"), Source::Url(_)));
        assert!(matches!(Source::classify("page.html"), Source::File(_)));
        assert_eq!(Source::classify("-").history_key(), None);
    }

    #[test]
    fn test_missing_file_keeps_raw_key() {
        let key = Source::classify("does/not/exist.html").history_key();
        assert_eq!(key.as_deref(), Some("does/not/exist.html"));
    }
}
