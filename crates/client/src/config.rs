use sencare_core::{PatientError, PatientResult};
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://localhost:3000";

pub const API_URL_ENV: &str = "SENCARE_API_URL";
pub const API_KEY_ENV: &str = "SENCARE_API_KEY";
pub const TIMEOUT_ENV: &str = "SENCARE_TIMEOUT_SECS";

/// Where the store lives and how to talk to it.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub timeout: Option<Duration>,
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: None,
            timeout: None,
        }
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Builds a configuration from raw environment values.
    ///
    /// Blank values count as unset. The URL falls back to [`DEFAULT_API_URL`].
    ///
    /// # Errors
    ///
    /// Returns [`PatientError::InvalidConfig`] if the URL is not http(s) or the timeout is
    /// not a positive whole number of seconds.
    pub fn from_env_values(
        base_url: Option<String>,
        api_key: Option<String>,
        timeout_secs: Option<String>,
    ) -> PatientResult<Self> {
        let base_url = non_blank(base_url).unwrap_or_else(|| DEFAULT_API_URL.into());
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(PatientError::InvalidConfig(format!(
                "{API_URL_ENV} must be an http(s) URL, got {base_url:?}"
            )));
        }

        let timeout = match non_blank(timeout_secs) {
            None => None,
            Some(raw) => match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => Some(Duration::from_secs(secs)),
                _ => {
                    return Err(PatientError::InvalidConfig(format!(
                        "{TIMEOUT_ENV} must be a positive number of seconds, got {raw:?}"
                    )))
                }
            },
        };

        Ok(Self {
            base_url,
            api_key: non_blank(api_key),
            timeout,
        })
    }

    /// Reads [`API_URL_ENV`], [`API_KEY_ENV`] and [`TIMEOUT_ENV`].
    pub fn from_env() -> PatientResult<Self> {
        Self::from_env_values(
            std::env::var(API_URL_ENV).ok(),
            std::env::var(API_KEY_ENV).ok(),
            std::env::var(TIMEOUT_ENV).ok(),
        )
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}
