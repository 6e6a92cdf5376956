//! Service configuration sourced from the environment.
//!
//! | Variable              | Meaning                               | Default                 |
//! |-----------------------|---------------------------------------|-------------------------|
//! | `MASA_API_KEY`        | Upstream credential; absent → mock    | unset                   |
//! | `MASA_BASE_URL`       | Upstream API root                     | library default         |
//! | `ENHANCEMENT_ENABLED` | Enable the top-K enhancement stage    | `true`                  |
//! | `DEBUG`               | Debug-level logging                   | `false`                 |
//! | `POLL_INTERVAL_MS`    | Base poll interval                    | `2000`                  |
//! | `POLL_TIMEOUT_MS`     | Overall job deadline                  | `120000`                |
//! | `HOST`                | Bind address                          | `127.0.0.1`             |
//! | `PORT`                | Bind port (`0` for auto-assign)       | `3002`                  |

use std::time::Duration;

use engage_search::SearchServiceConfig;

use crate::error::{Result, ServiceError};

/// Default bind host.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default bind port.
pub const DEFAULT_PORT: u16 = 3002;

/// HTTP server and search pipeline settings.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind host.
    pub host: String,
    /// Bind port.
    pub port: u16,
    /// Debug logging requested.
    pub debug: bool,
    /// Pipeline settings passed to the search service.
    pub search: SearchServiceConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_owned(),
            port: DEFAULT_PORT,
            debug: false,
            search: SearchServiceConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from the process environment.
    ///
    /// A `.env` file in the working directory is read first when present;
    /// variables already set in the environment take precedence.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Config`] for unparsable or out-of-range values.
    pub fn from_env() -> Result<Self> {
        if let Ok(path) = dotenv::dotenv() {
            tracing::debug!(path = %path.display(), "loaded .env file");
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// Blank values are treated as unset.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Config`] for unparsable or out-of-range values.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(host) = get("HOST") {
            config.host = host.trim().to_owned();
        }
        if let Some(port) = get("PORT") {
            config.port = parse_number("PORT", &port)?;
        }
        if let Some(debug) = get("DEBUG") {
            config.debug = parse_flag("DEBUG", &debug)?;
        }

        let search = &mut config.search;
        search.upstream.api_key = get("MASA_API_KEY").map(|k| k.trim().to_owned());
        if let Some(base_url) = get("MASA_BASE_URL") {
            search.upstream.base_url = base_url.trim().trim_end_matches('/').to_owned();
        }
        if let Some(enabled) = get("ENHANCEMENT_ENABLED") {
            search.enhancement.enabled = parse_flag("ENHANCEMENT_ENABLED", &enabled)?;
        }
        if let Some(interval) = get("POLL_INTERVAL_MS") {
            search.poll.base_interval = Duration::from_millis(parse_number("POLL_INTERVAL_MS", &interval)?);
            // Keep the ceiling at or above a raised base interval.
            search.poll.max_interval = search.poll.max_interval.max(search.poll.base_interval);
        }
        if let Some(timeout) = get("POLL_TIMEOUT_MS") {
            search.poll.timeout = Duration::from_millis(parse_number("POLL_TIMEOUT_MS", &timeout)?);
        }

        config.search.validate()?;
        Ok(config)
    }

    /// `host:port` string for binding.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Default log filter directive when `RUST_LOG` is unset.
    pub fn default_log_filter(&self) -> &'static str {
        if self.debug { "debug" } else { "info" }
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T> {
    raw.trim()
        .parse()
        .map_err(|_| ServiceError::Config(format!("{key} must be a non-negative integer, got {raw:?}")))
}

fn parse_flag(key: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ServiceError::Config(format!("{key} must be true or false, got {raw:?}"))),
    }
}
