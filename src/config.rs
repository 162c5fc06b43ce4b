use crate::machine::DEFAULT_RESET_DELAY;
use std::env;
use std::error::Error;
use std::time::Duration;

pub const BASE_URL_VAR: &str = "VENDING_API_BASE_URL";
pub const RESET_DELAY_VAR: &str = "VENDING_RESET_DELAY_MS";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Missing is allowed here; every gateway call reports it instead.
    pub base_url: Option<String>,
    pub reset_delay: Duration,
}

#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    InvalidResetDelay(String),
}

impl Error for ConfigError {}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            ConfigError::InvalidResetDelay(value) => write!(
                f,
                "{RESET_DELAY_VAR} must be a whole number of milliseconds, got '{value}'"
            ),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup(BASE_URL_VAR)
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty());

        let reset_delay = match lookup(RESET_DELAY_VAR) {
            Some(value) => value
                .trim()
                .parse::<u64>()
                .map(Duration::from_millis)
                .map_err(|_| ConfigError::InvalidResetDelay(value))?,
            None => DEFAULT_RESET_DELAY,
        };

        Ok(Config {
            base_url,
            reset_delay,
        })
    }
}
