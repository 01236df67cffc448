/**
 * publisher.rs
 * Connection and timing settings for the Ontology Publisher
 *
 * Environment variables (all optional):
 * ```text
 * FUSEKI_URL                    base URL            (http://localhost:3030)
 * FUSEKI_DATASET                dataset name        (ontologies)
 * FUSEKI_USER                   basic auth user     (admin when a password is set)
 * FUSEKI_PASSWORD               basic auth password (falls back to FUSEKI_ADMIN_PASSWORD)
 * FUSEKI_REQUEST_TIMEOUT_SECS   per-request timeout (30)
 * FUSEKI_READY_TIMEOUT_SECS     readiness wait      (60)
 * FUSEKI_POLL_INTERVAL_SECS     readiness poll      (2)
 * ```
 */

use std::fmt;
use std::time::Duration;

use crate::dataset::validate_dataset_name;
use crate::errors::{PublishError, Result};

pub const DEFAULT_BASE_URL: &str = "http://localhost:3030";
pub const DEFAULT_DATASET: &str = "ontologies";
pub const DEFAULT_USERNAME: &str = "admin";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_READINESS_TIMEOUT: Duration = Duration::from_secs(60);
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

pub const ENV_URL: &str = "FUSEKI_URL";
pub const ENV_DATASET: &str = "FUSEKI_DATASET";
pub const ENV_USER: &str = "FUSEKI_USER";
pub const ENV_PASSWORD: &str = "FUSEKI_PASSWORD";
pub const ENV_ADMIN_PASSWORD: &str = "FUSEKI_ADMIN_PASSWORD";
pub const ENV_REQUEST_TIMEOUT: &str = "FUSEKI_REQUEST_TIMEOUT_SECS";
pub const ENV_READY_TIMEOUT: &str = "FUSEKI_READY_TIMEOUT_SECS";
pub const ENV_POLL_INTERVAL: &str = "FUSEKI_POLL_INTERVAL_SECS";

/// Basic authentication credentials
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Explicit configuration value passed to the publisher at construction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublisherConfig {
    pub base_url: String,
    pub dataset: String,
    pub credentials: Option<Credentials>,
    pub request_timeout: Duration,
    pub readiness_timeout: Duration,
    pub poll_interval: Duration,
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            dataset: DEFAULT_DATASET.to_string(),
            credentials: None,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            readiness_timeout: DEFAULT_READINESS_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

impl PublisherConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::default().with_base_url(base_url)
    }

    /// Trailing slashes are stripped so paths can be appended verbatim
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_dataset(mut self, dataset: impl Into<String>) -> Self {
        self.dataset = dataset.into();
        self
    }

    pub fn with_credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.credentials = Some(Credentials::new(username, password));
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_readiness_timeout(mut self, timeout: Duration) -> Self {
        self.readiness_timeout = timeout;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    ///
    /// Empty values are treated as unset.
    ///
    /// # Example
    /// ```
    /// use ontopub_core::config::PublisherConfig;
    ///
    /// let config = PublisherConfig::from_lookup(|key| match key {
    ///     "FUSEKI_URL" => Some("http://fuseki:3030/".to_string()),
    ///     _ => None,
    /// }).unwrap();
    /// assert_eq!(config.base_url, "http://fuseki:3030");
    /// assert_eq!(config.dataset, "ontologies");
    /// ```
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = PublisherConfig::default();

        if let Some(url) = get(ENV_URL) {
            config = config.with_base_url(url.trim());
        }
        if let Some(dataset) = get(ENV_DATASET) {
            config.dataset = dataset.trim().to_string();
        }

        let password = get(ENV_PASSWORD).or_else(|| get(ENV_ADMIN_PASSWORD));
        if let Some(password) = password {
            let username = get(ENV_USER).unwrap_or_else(|| DEFAULT_USERNAME.to_string());
            config.credentials = Some(Credentials::new(username, password));
        }

        if let Some(value) = get(ENV_REQUEST_TIMEOUT) {
            config.request_timeout = parse_seconds(ENV_REQUEST_TIMEOUT, &value)?;
        }
        if let Some(value) = get(ENV_READY_TIMEOUT) {
            config.readiness_timeout = parse_seconds(ENV_READY_TIMEOUT, &value)?;
        }
        if let Some(value) = get(ENV_POLL_INTERVAL) {
            config.poll_interval = parse_seconds(ENV_POLL_INTERVAL, &value)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// Ensures:
    /// - base URL is an http(s) URL
    /// - dataset name is usable in a URL path
    /// - request timeout and poll interval are non-zero
    pub fn validate(&self) -> Result<()> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(PublishError::Config(format!(
                "Base URL must start with http:// or https://, got '{}'",
                self.base_url
            )));
        }

        validate_dataset_name(&self.dataset).map_err(|e| PublishError::Config(e.to_string()))?;

        if self.request_timeout.is_zero() {
            return Err(PublishError::Config("Request timeout must be greater than zero".to_string()));
        }
        if self.poll_interval.is_zero() {
            return Err(PublishError::Config("Poll interval must be greater than zero".to_string()));
        }

        Ok(())
    }
}

fn parse_seconds(key: &str, value: &str) -> Result<Duration> {
    let trimmed = value.trim();
    trimmed
        .parse::<f64>()
        .ok()
        .filter(|secs| secs.is_finite() && *secs >= 0.0)
        .map(Duration::from_secs_f64)
        .ok_or_else(|| {
            PublishError::Config(format!(
                "{} must be a non-negative number of seconds, got '{}'",
                key, trimmed
            ))
        })
}
