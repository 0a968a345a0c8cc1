use std::env;
use std::time::Duration;

use anyhow::{Context, Result};
use dashboard_core::{DEFAULT_FETCH_TIMEOUT, DEFAULT_SEARCH_DEBOUNCE};
use dotenvy::dotenv;
use optimizer_client::{DEFAULT_API_URL, DEFAULT_HEALTH_URL, DEFAULT_REQUEST_TIMEOUT};

/// CLI configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub health_url: String,
    pub fetch_timeout: Duration,
    /// Transport limit for a single request, which outlives `fetch_timeout`
    pub request_timeout: Duration,
    pub search_debounce: Duration,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Ok(Self {
            api_url: env::var("OPTIMIZER_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
            health_url: env::var("OPTIMIZER_HEALTH_URL")
                .unwrap_or_else(|_| DEFAULT_HEALTH_URL.to_string()),
            fetch_timeout: millis_var("FETCH_TIMEOUT_MS", DEFAULT_FETCH_TIMEOUT)
                .context("FETCH_TIMEOUT_MS must be a number of milliseconds")?,
            request_timeout: millis_var("REQUEST_TIMEOUT_MS", DEFAULT_REQUEST_TIMEOUT)
                .context("REQUEST_TIMEOUT_MS must be a number of milliseconds")?,
            search_debounce: millis_var("SEARCH_DEBOUNCE_MS", DEFAULT_SEARCH_DEBOUNCE)
                .context("SEARCH_DEBOUNCE_MS must be a number of milliseconds")?,
        })
    }
}

fn millis_var(name: &str, default: Duration) -> Result<Duration> {
    match env::var(name) {
        Ok(raw) => Ok(Duration::from_millis(raw.trim().parse()?)),
        Err(_) => Ok(default),
    }
}
