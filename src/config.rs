use crate::scrapers::FetchConfig;
use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;
use std::time::Duration;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub user_agent: String,
    pub fetch_timeout_secs: u64,
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        let defaults = FetchConfig::default();

        Ok(Self {
            user_agent: env::var("HOUSE_HUNT_USER_AGENT").unwrap_or(defaults.user_agent),
            fetch_timeout_secs: match env::var("HOUSE_HUNT_FETCH_TIMEOUT_SECS") {
                Ok(value) => value
                    .parse()
                    .context("HOUSE_HUNT_FETCH_TIMEOUT_SECS must be a whole number of seconds")?,
                Err(_) => defaults.timeout.as_secs(),
            },
            log_level: env::var("HOUSE_HUNT_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        })
    }

    pub fn fetch_config(&self) -> FetchConfig {
        FetchConfig {
            user_agent: self.user_agent.clone(),
            timeout: Duration::from_secs(self.fetch_timeout_secs),
        }
    }
}
