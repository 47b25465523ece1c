use std::time::Duration;

use crate::error::{LiblibError, Result};
use crate::signer::Credential;

/// Production API host.
pub const DEFAULT_BASE_URL: &str = "https://openapi.liblibai.cloud";
/// Delay between two status polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(3000);
/// Per-request HTTP timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub const ENV_API_KEY: &str = "LIBLIBAI_API_KEY";
pub const ENV_API_SECRET: &str = "LIBLIBAI_API_SECRET";
pub const ENV_BASE_URL: &str = "LIBLIBAI_BASE_URL";
pub const ENV_POLL_INTERVAL_MS: &str = "LIBLIBAI_POLL_INTERVAL_MS";

fn normalize(endpoint: String) -> String {
    endpoint.trim_end_matches('/').to_string()
}

/// Immutable settings for a [`LiblibClient`](crate::LiblibClient).
///
/// # Example
/// ```
/// use liblibai_rs::ClientConfig;
/// use std::time::Duration;
///
/// let config = ClientConfig::new("access-key", "secret-key")
///     .unwrap()
///     .with_base_url("https://openapi-test.liblib.cloud/")
///     .with_poll_interval(Duration::from_secs(5));
///
/// assert_eq!(config.base_url(), "https://openapi-test.liblib.cloud");
/// assert_eq!(config.poll_interval(), Duration::from_secs(5));
/// ```
#[derive(Debug, Clone)]
pub struct ClientConfig {
    credential: Credential,
    base_url: String,
    poll_interval: Duration,
    request_timeout: Duration,
    user_agent: String,
}

impl ClientConfig {
    /// Create a config with the given credential and defaults for the rest.
    /// Fails if either key is empty.
    pub fn new(access_key: impl Into<String>, secret_key: impl Into<String>) -> Result<Self> {
        Ok(Self::with_credential(Credential::new(access_key, secret_key)?))
    }

    pub fn with_credential(credential: Credential) -> Self {
        Self {
            credential,
            base_url: DEFAULT_BASE_URL.to_string(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            user_agent: concat!("liblibai-rs/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }

    /// Build a config from `LIBLIBAI_API_KEY` and `LIBLIBAI_API_SECRET`,
    /// honoring `LIBLIBAI_BASE_URL` and `LIBLIBAI_POLL_INTERVAL_MS` if set.
    pub fn from_env() -> Result<Self> {
        let key = std::env::var(ENV_API_KEY).unwrap_or_default();
        let secret = std::env::var(ENV_API_SECRET).unwrap_or_default();
        let mut config = Self::new(key, secret).map_err(|_| {
            LiblibError::Configuration(format!(
                "{} and {} must be set",
                ENV_API_KEY, ENV_API_SECRET
            ))
        })?;

        if let Ok(url) = std::env::var(ENV_BASE_URL) {
            if !url.trim().is_empty() {
                config = config.with_base_url(url);
            }
        }
        if let Ok(ms) = std::env::var(ENV_POLL_INTERVAL_MS) {
            let ms: u64 = ms.trim().parse().map_err(|_| {
                LiblibError::Configuration(format!(
                    "{} must be an integer, got {:?}",
                    ENV_POLL_INTERVAL_MS, ms
                ))
            })?;
            config = config.with_poll_interval(Duration::from_millis(ms));
        }
        Ok(config)
    }

    /// Point the client at another host (e.g. the test environment).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = normalize(base_url.into());
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }
}
