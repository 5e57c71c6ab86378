use dotenv::dotenv;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_API_URL: &str = "http://localhost:5000/api";

const API_URL_VAR: &str = "SENTIMENT_API_URL";
const TIMEOUT_VAR: &str = "SENTIMENT_REQUEST_TIMEOUT_SECS";
const POLL_INTERVAL_VAR: &str = "SENTIMENT_POLL_INTERVAL_MS";
const POLL_ATTEMPTS_VAR: &str = "SENTIMENT_POLL_ATTEMPTS";
const EXPORT_DIR_VAR: &str = "SENTIMENT_EXPORT_DIR";
const LOG_FILE_VAR: &str = "SENTIMENT_LOG_FILE";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must be an http(s) URL, got {value:?}")]
    InvalidUrl { var: &'static str, value: String },

    #[error("{var} must be a non-negative integer, got {value:?}")]
    InvalidNumber { var: &'static str, value: String },
}

/// Runtime settings, resolved from `.env`, the environment, and CLI overrides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub api_base_url: String,
    pub request_timeout: Duration,
    pub poll_interval: Duration,
    pub poll_attempts: u32,
    pub export_dir: PathBuf,
    pub log_file: PathBuf,
    pub debug: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            request_timeout: Duration::from_secs(30),
            poll_interval: Duration::from_millis(2000),
            poll_attempts: 10,
            export_dir: PathBuf::from("./visualizations"),
            log_file: PathBuf::from("race-sentiment.log"),
            debug: false,
        }
    }
}

impl AppConfig {
    /// Loads `.env` (if present) and reads the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let api_base_url = match lookup(API_URL_VAR) {
            Some(value) => normalize_url(&value)?,
            None => defaults.api_base_url,
        };

        let request_timeout = parse_number::<u64>(&lookup, TIMEOUT_VAR)?
            .map_or(defaults.request_timeout, Duration::from_secs);
        let poll_interval = parse_number::<u64>(&lookup, POLL_INTERVAL_VAR)?
            .map_or(defaults.poll_interval, Duration::from_millis);
        let poll_attempts =
            parse_number::<u32>(&lookup, POLL_ATTEMPTS_VAR)?.unwrap_or(defaults.poll_attempts);

        let export_dir = lookup(EXPORT_DIR_VAR).map_or(defaults.export_dir, PathBuf::from);
        let log_file = lookup(LOG_FILE_VAR).map_or(defaults.log_file, PathBuf::from);
        let debug = lookup("DEBUG").is_some_and(|value| !value.is_empty() && value != "0");

        Ok(Self {
            api_base_url,
            request_timeout,
            poll_interval,
            poll_attempts,
            export_dir,
            log_file,
            debug,
        })
    }
}

fn normalize_url(value: &str) -> Result<String, ConfigError> {
    let trimmed = value.trim().trim_end_matches('/');
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        Ok(trimmed.to_string())
    } else {
        Err(ConfigError::InvalidUrl {
            var: API_URL_VAR,
            value: value.to_string(),
        })
    }
}

fn parse_number<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
) -> Result<Option<T>, ConfigError> {
    lookup(var)
        .map(|value| {
            value
                .trim()
                .parse::<T>()
                .map_err(|_| ConfigError::InvalidNumber { var, value })
        })
        .transpose()
}
