use anyhow::{Context, Result};

const DEFAULT_API_BASE_URL: &str = "https://cvextractor.soljum.com/api";

/// Application configuration loaded from environment variables.
/// Every setting has a default, so a bare environment boots against the hosted API.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_base_url: String,
    pub port: u16,
    pub rust_log: String,
    pub match_cache_capacity: usize,
    /// Transport timeout for remote calls. `None` leaves requests unbounded.
    pub request_timeout_secs: Option<u64>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            api_base_url: std::env::var("API_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_string()),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            match_cache_capacity: std::env::var("MATCH_CACHE_CAPACITY")
                .unwrap_or_else(|_| "512".to_string())
                .parse::<usize>()
                .context("MATCH_CACHE_CAPACITY must be a positive integer")?,
            request_timeout_secs: optional_env("REQUEST_TIMEOUT_SECS")
                .map(|v| {
                    v.parse::<u64>()
                        .context("REQUEST_TIMEOUT_SECS must be a number of seconds")
                })
                .transpose()?,
        })
    }
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
