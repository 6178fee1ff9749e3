//! Server configuration from the environment.

use std::net::SocketAddr;
use std::time::Duration;

use tidemark_core::{FetchConfig, Result, TidemarkError};

pub const DEFAULT_ADDR: &str = "127.0.0.1:3000";

/// Extra time granted to a request on top of the upstream fetch timeout.
const REQUEST_GRACE: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Listen address (`TIDEMARK_ADDR`).
    pub addr: SocketAddr,
    /// Upstream fetch settings (`TIDEMARK_FETCH_TIMEOUT`, `TIDEMARK_USER_AGENT`).
    pub fetch: FetchConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { addr: SocketAddr::from(([127, 0, 0, 1], 3000)), fetch: FetchConfig::default() }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(addr) = lookup("TIDEMARK_ADDR") {
            config.addr = addr
                .parse()
                .map_err(|_| TidemarkError::ConfigError(format!("TIDEMARK_ADDR is not a socket address: {}", addr)))?;
        }

        if let Some(timeout) = lookup("TIDEMARK_FETCH_TIMEOUT") {
            config.fetch.timeout = match timeout.parse::<u64>() {
                Ok(secs) if secs > 0 => secs,
                _ => {
                    return Err(TidemarkError::ConfigError(format!(
                        "TIDEMARK_FETCH_TIMEOUT must be a positive number of seconds: {}",
                        timeout
                    )));
                }
            };
        }

        if let Some(user_agent) = lookup("TIDEMARK_USER_AGENT").filter(|ua| !ua.trim().is_empty()) {
            config.fetch.user_agent = user_agent;
        }

        Ok(config)
    }

    /// Upper bound for a whole request, fetch and extraction included.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch.timeout) + REQUEST_GRACE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ServerConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.addr.to_string(), DEFAULT_ADDR);
        assert_eq!(config.fetch.timeout, 30);
        assert_eq!(config.request_timeout(), Duration::from_secs(35));
    }

    #[test]
    fn test_overrides() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("TIDEMARK_ADDR", "0.0.0.0:8080"),
            ("TIDEMARK_FETCH_TIMEOUT", "10"),
            ("TIDEMARK_USER_AGENT", "tidemark-test"),
        ]))
        .unwrap();

        assert_eq!(config.addr.port(), 8080);
        assert_eq!(config.fetch.timeout, 10);
        assert_eq!(config.fetch.user_agent, "tidemark-test");
    }

    #[test]
    fn test_invalid_values() {
        let err = ServerConfig::from_lookup(lookup(&[("TIDEMARK_ADDR", "localhost")])).unwrap_err();
        assert!(err.user_message().starts_with("Invalid configuration"));

        assert!(ServerConfig::from_lookup(lookup(&[("TIDEMARK_FETCH_TIMEOUT", "0")])).is_err());
        assert!(ServerConfig::from_lookup(lookup(&[("TIDEMARK_FETCH_TIMEOUT", "soon")])).is_err());
    }
}
