//! Recognition service configuration parsed from environment variables.

use std::time::Duration;

use super::types::RecognitionError;

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_RETRIES: u32 = 3;
pub const DEFAULT_RETRY_DELAY_MS: u64 = 500;

/// Typed configuration for the HTTP recognizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognizerConfig {
    /// Service base URL, without a trailing slash.
    pub base_url: String,
    /// Optional bearer token sent as `Authorization`.
    pub api_key: Option<String>,
    /// Per-request timeout; a request past this fails as a transport error.
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
    /// Automatic retry attempts for transient failures.
    pub retries: u32,
    /// Fixed delay between retry attempts.
    pub retry_delay: Duration,
}

impl RecognizerConfig {
    /// Build typed config from environment variables.
    ///
    /// Required:
    /// - `RECOGNIZER_BASE_URL`
    ///
    /// Optional:
    /// - `RECOGNIZER_API_KEY`
    /// - `RECOGNIZER_REQUEST_TIMEOUT_SECS`: default 30
    /// - `RECOGNIZER_CONNECT_TIMEOUT_SECS`: default 10
    /// - `RECOGNIZER_RETRIES`: default 3
    /// - `RECOGNIZER_RETRY_DELAY_MS`: default 500
    ///
    /// # Errors
    ///
    /// Returns [`RecognitionError::MissingBaseUrl`] when the base URL is
    /// not set.
    pub fn from_env() -> Result<Self, RecognitionError> {
        let base_url = std::env::var("RECOGNIZER_BASE_URL")
            .map_err(|_| RecognitionError::MissingBaseUrl { var: "RECOGNIZER_BASE_URL".into() })?
            .trim_end_matches('/')
            .to_string();
        let api_key = std::env::var("RECOGNIZER_API_KEY").ok().filter(|k| !k.is_empty());
        Ok(Self {
            base_url,
            api_key,
            request_timeout: Duration::from_secs(env_parse(
                "RECOGNIZER_REQUEST_TIMEOUT_SECS",
                DEFAULT_REQUEST_TIMEOUT_SECS,
            )),
            connect_timeout: Duration::from_secs(env_parse(
                "RECOGNIZER_CONNECT_TIMEOUT_SECS",
                DEFAULT_CONNECT_TIMEOUT_SECS,
            )),
            retries: env_parse("RECOGNIZER_RETRIES", DEFAULT_RETRIES),
            retry_delay: Duration::from_millis(env_parse("RECOGNIZER_RETRY_DELAY_MS", DEFAULT_RETRY_DELAY_MS)),
        })
    }

    /// Config with defaults for everything but the base URL. Used by tests
    /// and embedding hosts that configure programmatically.
    #[must_use]
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: None,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            retries: DEFAULT_RETRIES,
            retry_delay: Duration::from_millis(DEFAULT_RETRY_DELAY_MS),
        }
    }
}

pub(crate) fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}
