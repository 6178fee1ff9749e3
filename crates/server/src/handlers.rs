//! Request handlers

use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tidemark_core::{ErrorKind, Extractor, FetchConfig, TidemarkError};
use tracing::{info, warn};

use crate::config::ServerConfig;

/// Shared state for all handlers
#[derive(Debug, Clone)]
pub struct AppState {
    pub extractor: Arc<Extractor>,
    pub fetch: Arc<FetchConfig>,
}

impl AppState {
    pub fn new(config: &ServerConfig) -> Self {
        Self { extractor: Arc::new(Extractor::new()), fetch: Arc::new(config.fetch.clone()) }
    }
}

#[derive(Debug, Deserialize)]
pub struct ArticleQuery {
    pub url: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub healthy: bool,
    pub version: String,
}

/// Maps a core error to its status code and uniform message.
fn error_response(err: &TidemarkError) -> Response {
    let status = match err.kind() {
        ErrorKind::MissingParameter => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };

    (status, Json(ErrorResponse { error: err.user_message() })).into_response()
}

/// Health check endpoint
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse { healthy: true, version: env!("CARGO_PKG_VERSION").to_string() })
}

/// `GET /api/article?url=...`
///
/// Responds with the extracted article, `400` when `url` is missing or
/// blank, and `500` for any fetch or extraction failure.
pub async fn get_article(State(state): State<AppState>, Query(query): Query<ArticleQuery>) -> Response {
    let url = match query.url.as_deref().map(str::trim) {
        Some(url) if !url.is_empty() => url.to_string(),
        _ => return error_response(&TidemarkError::MissingParameter("url")),
    };

    match state.extractor.fetch_and_extract(&url, &state.fetch).await {
        Ok(article) => {
            info!(url, words = article.word_count, "article extracted");
            (StatusCode::OK, Json(article)).into_response()
        }
        Err(err) => {
            warn!(url, error = %err, "article request failed");
            error_response(&err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_mapping() {
        let missing = error_response(&TidemarkError::MissingParameter("url"));
        assert_eq!(missing.status(), StatusCode::BAD_REQUEST);

        let fetch = error_response(&TidemarkError::HttpStatus { status: 404 });
        assert_eq!(fetch.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let extraction = error_response(&TidemarkError::HtmlParseError("broken".to_string()));
        assert_eq!(extraction.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
