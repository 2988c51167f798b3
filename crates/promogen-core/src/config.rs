//! Configuration module
//!
//! Client-side settings: where the generation API lives, how it is authenticated,
//! and the timings of the polling loop and batch saves.

use std::env;
use std::time::Duration;

use crate::constants::{
    DEFAULT_API_URL, HTTP_TIMEOUT_SECS, POLL_INTERVAL_MS, POLL_TIMEOUT_MS, SAVE_STAGGER_MS,
};

/// Timings of a generation run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct JobTimings {
    pub poll_interval: Duration,
    /// Measured from entry into polling.
    pub poll_timeout: Duration,
}

impl Default for JobTimings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(POLL_INTERVAL_MS),
            poll_timeout: Duration::from_millis(POLL_TIMEOUT_MS),
        }
    }
}

#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub api_url: String,
    /// Sent as `X-API-Key` when set.
    pub api_key: Option<String>,
    pub http_timeout_secs: u64,
    pub poll_interval_ms: u64,
    pub poll_timeout_ms: u64,
    pub save_stagger_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_key: None,
            http_timeout_secs: HTTP_TIMEOUT_SECS,
            poll_interval_ms: POLL_INTERVAL_MS,
            poll_timeout_ms: POLL_TIMEOUT_MS,
            save_stagger_ms: SAVE_STAGGER_MS,
        }
    }
}

impl ClientConfig {
    /// Load from the environment (and `.env` if present).
    ///
    /// PROMOGEN_API_URL (or API_URL), PROMOGEN_API_KEY, PROMOGEN_POLL_INTERVAL_MS,
    /// PROMOGEN_POLL_TIMEOUT_MS, PROMOGEN_SAVE_STAGGER_MS, PROMOGEN_HTTP_TIMEOUT_SECS.
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let config = Self {
            api_url: env::var("PROMOGEN_API_URL")
                .or_else(|_| env::var("API_URL"))
                .unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
            api_key: env::var("PROMOGEN_API_KEY")
                .ok()
                .filter(|k| !k.trim().is_empty()),
            http_timeout_secs: parse_var("PROMOGEN_HTTP_TIMEOUT_SECS", HTTP_TIMEOUT_SECS)?,
            poll_interval_ms: parse_var("PROMOGEN_POLL_INTERVAL_MS", POLL_INTERVAL_MS)?,
            poll_timeout_ms: parse_var("PROMOGEN_POLL_TIMEOUT_MS", POLL_TIMEOUT_MS)?,
            save_stagger_ms: parse_var("PROMOGEN_SAVE_STAGGER_MS", SAVE_STAGGER_MS)?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if !(self.api_url.starts_with("http://") || self.api_url.starts_with("https://")) {
            return Err(anyhow::anyhow!(
                "PROMOGEN_API_URL must be an http(s) URL, got {}",
                self.api_url
            ));
        }
        if self.http_timeout_secs == 0 {
            return Err(anyhow::anyhow!("PROMOGEN_HTTP_TIMEOUT_SECS must be positive"));
        }
        if self.poll_interval_ms == 0 {
            return Err(anyhow::anyhow!("PROMOGEN_POLL_INTERVAL_MS must be positive"));
        }
        if self.poll_timeout_ms <= self.poll_interval_ms {
            return Err(anyhow::anyhow!(
                "PROMOGEN_POLL_TIMEOUT_MS ({}) must exceed PROMOGEN_POLL_INTERVAL_MS ({})",
                self.poll_timeout_ms,
                self.poll_interval_ms
            ));
        }
        Ok(())
    }

    pub fn timings(&self) -> JobTimings {
        JobTimings {
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            poll_timeout: Duration::from_millis(self.poll_timeout_ms),
        }
    }

    pub fn save_stagger(&self) -> Duration {
        Duration::from_millis(self.save_stagger_ms)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

fn parse_var(name: &str, default: u64) -> Result<u64, anyhow::Error> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("{} must be a valid number, got {:?}", name, raw)),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = ClientConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.timings(), JobTimings::default());
        assert_eq!(config.timings().poll_interval, Duration::from_millis(3000));
        assert_eq!(config.timings().poll_timeout, Duration::from_millis(300_000));
        assert_eq!(config.save_stagger(), Duration::from_millis(100));
    }

    #[test]
    fn timeout_must_exceed_interval() {
        let config = ClientConfig {
            poll_timeout_ms: 3000,
            ..ClientConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_interval_is_rejected() {
        let config = ClientConfig {
            poll_interval_ms: 0,
            ..ClientConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn non_http_url_is_rejected() {
        let config = ClientConfig {
            api_url: "ftp://example.com".into(),
            ..ClientConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
