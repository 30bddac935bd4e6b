//! Client settings: where the API lives and how long a call may take.

use std::time::Duration;

use thiserror::Error;

/// Production deployment of the customer API.
pub const DEFAULT_BASE_URL: &str =
    "https://pankki-api-dcb8eubhg5c5eya6.swedencentral-01.azurewebsites.net";

/// Transfer timeout applied to every request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(120_000);

pub const BASE_URL_ENV: &str = "CUSTOMER_API_BASE_URL";
pub const TIMEOUT_ENV: &str = "CUSTOMER_API_TIMEOUT_MS";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must be a positive number of milliseconds, got {value:?}")]
    InvalidTimeout { var: &'static str, value: String },

    #[error("timeout must be at least 1 ms")]
    ZeroTimeout,

    #[error("{var} must not be empty")]
    EmptyBaseUrl { var: &'static str },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ClientConfig {
    /// Defaults, overridden by `CUSTOMER_API_BASE_URL` and
    /// `CUSTOMER_API_TIMEOUT_MS` when they are set.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(base_url) = lookup(BASE_URL_ENV) {
            config = config.with_base_url(&base_url)?;
        }
        if let Some(raw) = lookup(TIMEOUT_ENV) {
            config = config.with_timeout(parse_timeout(TIMEOUT_ENV, &raw)?)?;
        }
        Ok(config)
    }

    pub fn with_base_url(mut self, base_url: &str) -> Result<Self, ConfigError> {
        let trimmed = base_url.trim();
        if trimmed.is_empty() {
            return Err(ConfigError::EmptyBaseUrl { var: BASE_URL_ENV });
        }
        self.base_url = trimmed.to_string();
        Ok(self)
    }

    /// A zero timeout would abort every request before it is sent.
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self, ConfigError> {
        if timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }
        self.timeout = timeout;
        Ok(self)
    }

    pub fn timeout_ms(&self) -> u64 {
        u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX)
    }
}

fn parse_timeout(var: &'static str, raw: &str) -> Result<Duration, ConfigError> {
    match raw.trim().parse::<u64>() {
        Ok(ms) if ms > 0 => Ok(Duration::from_millis(ms)),
        _ => Err(ConfigError::InvalidTimeout {
            var,
            value: raw.to_string(),
        }),
    }
}
