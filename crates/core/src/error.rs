//! Error types for Tidemark operations.
//!
//! This module defines the main error type [`TidemarkError`] which represents
//! every failure that can occur while fetching a page, extracting an article,
//! or persisting the reading history. Each variant belongs to one
//! [`ErrorKind`], which is what callers at the boundary (CLI, HTTP) use to
//! pick a status code and a user-visible message.
//!
//! # Example
//!
//! ```rust
//! use tidemark_core::{ErrorKind, TidemarkError};
//!
//! let err = TidemarkError::MissingParameter("url");
//! assert_eq!(err.kind(), ErrorKind::MissingParameter);
//! assert_eq!(err.user_message(), "URL is required");
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for extraction, fetching and history operations.
#[derive(Error, Debug)]
pub enum TidemarkError {
    /// A required request parameter was not supplied.
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    /// HTTP request errors from reqwest.
    ///
    /// This variant wraps network errors, DNS failures, connection issues,
    /// and other HTTP-related problems.
    #[cfg(feature = "fetch")]
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// The server answered with a non-success status code.
    #[error("HTTP request returned status {status}")]
    HttpStatus { status: u16 },

    /// Request timeout.
    #[error("Request timed out after {timeout} seconds")]
    Timeout { timeout: u64 },

    /// Invalid URL provided.
    ///
    /// Returned when a URL cannot be parsed, is missing its scheme, or uses a
    /// scheme other than http/https.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// File not found.
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// I/O errors while reading local input.
    #[error("Failed to read input: {0}")]
    Io(#[from] std::io::Error),

    /// The markup could not be processed at all.
    #[error("Failed to parse HTML: {0}")]
    HtmlParseError(String),

    /// The persisted history could not be read.
    #[error("Failed to read history from {}: {source}", path.display())]
    HistoryRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The persisted history could not be written.
    #[error("Failed to write history to {}: {source}", path.display())]
    HistoryWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The persisted history exists but is not a valid history document.
    #[error("History file {} is corrupt: {source}", path.display())]
    HistoryCorrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Serialization of history or article records failed.
    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid configuration (e.g. a selector that does not parse).
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Coarse error categories surfaced to users.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Caller error; never retried.
    MissingParameter,
    /// Network, transport or local input failure while retrieving raw HTML.
    Fetch,
    /// Markup that cannot be processed.
    Extraction,
    /// History load/save failure.
    Persistence,
    /// Invalid configuration.
    Config,
}

impl TidemarkError {
    /// Returns the category this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingParameter(_) => ErrorKind::MissingParameter,
            #[cfg(feature = "fetch")]
            Self::HttpError(_) => ErrorKind::Fetch,
            Self::HttpStatus { .. }
            | Self::Timeout { .. }
            | Self::InvalidUrl(_)
            | Self::FileNotFound(_)
            | Self::Io(_) => ErrorKind::Fetch,
            Self::HtmlParseError(_) => ErrorKind::Extraction,
            Self::HistoryRead { .. } | Self::HistoryWrite { .. } | Self::HistoryCorrupt { .. } | Self::Serialization(_) => {
                ErrorKind::Persistence
            }
            Self::ConfigError(_) => ErrorKind::Config,
        }
    }

    /// Returns the uniform message shown to users for this error.
    ///
    /// Transport details are not part of the message: fetch and extraction
    /// failures both read "Failed to fetch content".
    pub fn user_message(&self) -> String {
        match self {
            Self::MissingParameter(_) => "URL is required".to_string(),
            Self::HistoryRead { .. } | Self::HistoryCorrupt { .. } => "Failed to load reading history".to_string(),
            Self::HistoryWrite { .. } | Self::Serialization(_) => "Failed to save reading history".to_string(),
            Self::ConfigError(msg) => format!("Invalid configuration: {}", msg),
            _ => "Failed to fetch content".to_string(),
        }
    }
}

/// Result type alias for TidemarkError.
pub type Result<T> = std::result::Result<T, TidemarkError>;
