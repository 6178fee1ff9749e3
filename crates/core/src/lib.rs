pub mod article;
pub mod error;
pub mod extract;
#[cfg(feature = "fetch")]
pub mod fetch;
pub mod history;
pub mod parse;
pub mod preprocess;
pub mod progress;
pub mod rules;
pub mod session;
pub mod text;

pub use article::{ArticleRecord, DEFAULT_WORDS_PER_MINUTE, count_words, reading_time_minutes};
pub use error::{ErrorKind, Result, TidemarkError};
pub use extract::{DEFAULT_TITLE, ExtractConfig, ExtractConfigBuilder, Extractor, extract};
#[cfg(feature = "fetch")]
pub use extract::fetch_and_extract;
#[cfg(feature = "fetch")]
pub use fetch::{FetchConfig, fetch_file, fetch_stdin, fetch_url, validate_url};
pub use history::{
    HistoryConfig, HistoryEntry, HistoryPersistence, HistoryStore, JsonFileStore, MemoryStore, default_history_path,
};
pub use parse::Document;
pub use preprocess::{NoiseConfig, strip_noise};
pub use progress::{ProgressSample, ProgressTracker, TrackerState, ViewportGeometry, completion};
pub use rules::{ContentRule, ContentRules, RuleMatch};
pub use session::{ReadingSession, Requested};
