//! HTTP surface for tidemark.
//!
//! Exposes article extraction over `GET /api/article?url=...`. Reading
//! history stays with the client; the server keeps no state between requests.

pub mod config;
pub mod handlers;
pub mod routes;

pub use config::ServerConfig;
pub use handlers::AppState;
pub use routes::create_router;
