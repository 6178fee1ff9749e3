//! Raw HTML retrieval from URLs, files, and stdin.
//!
//! This module is the fetch collaborator of the extraction pipeline. It only
//! moves bytes: every failure is reported as a fetch-kind [`TidemarkError`]
//! and never interpreted further by the core.

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use reqwest::Client;
use url::Url;

use crate::{Result, TidemarkError};

/// HTTP client configuration for fetching web pages.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Request timeout in seconds.
    pub timeout: u64,
    /// Custom User-Agent string.
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: 30,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36".to_string(),
        }
    }
}

/// Validates a user-supplied URL for fetching.
///
/// Only absolute http and https URLs are accepted.
pub fn validate_url(url: &str) -> Result<Url> {
    let parsed = Url::parse(url).map_err(|e| TidemarkError::InvalidUrl(e.to_string()))?;

    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(TidemarkError::InvalidUrl(format!(
            "unsupported scheme '{}' (expected http:// or https://)",
            other
        ))),
    }
}

/// Fetches HTML content from a URL.
///
/// Follows redirects, respects the configured timeout and rejects non-success
/// status codes.
pub async fn fetch_url(url: &str, config: &FetchConfig) -> Result<String> {
    let parsed_url = validate_url(url)?;

    let client = Client::builder()
        .timeout(Duration::from_secs(config.timeout))
        .build()
        .map_err(TidemarkError::HttpError)?;

    let response = client
        .get(parsed_url)
        .header("User-Agent", &config.user_agent)
        .header(
            "Accept",
            "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
        )
        .header("Accept-Language", "en-US,en;q=0.9")
        .send()
        .await
        .map_err(|e| {
            if e.is_timeout() {
                TidemarkError::Timeout { timeout: config.timeout }
            } else {
                TidemarkError::HttpError(e)
            }
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(TidemarkError::HttpStatus { status: status.as_u16() });
    }

    let content = response.text().await?;
    tracing::debug!(url, bytes = content.len(), "fetched page");

    Ok(content)
}

/// Reads HTML content from a local file.
pub fn fetch_file(path: &str) -> Result<String> {
    let path_buf = PathBuf::from(path);

    if !path_buf.exists() {
        Err(TidemarkError::FileNotFound(path_buf))
    } else {
        fs::read_to_string(&path_buf).map_err(TidemarkError::from)
    }
}

/// Reads HTML content from standard input until EOF.
pub fn fetch_stdin() -> Result<String> {
    use std::io::{self, Read};

    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer).map_err(TidemarkError::from)?;

    Ok(buffer)
}
