//! Configuration structures for CloudControl clients.
//!
//! [`CloudControlConfig`] holds everything a client reads but never mutates after construction:
//! the endpoint, API version, transport retry settings and the poll interval used while waiting
//! for asynchronous operations. [`Credentials`] are kept separately so they are never serialized.

use crate::error::Error;
use crate::types::region_base_url;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;
use validator::Validate;

/// Environment variable holding the CloudControl user name.
pub const USER_ENV_VAR: &str = "MCP_USER";

/// Environment variable holding the CloudControl password.
pub const PASSWORD_ENV_VAR: &str = "MCP_PASSWORD";

/// Default CaaS API version.
pub const DEFAULT_API_VERSION: &str = "2.4";

/// Configuration for a CloudControl client instance.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CloudControlConfig {
    /// Base URL of the regional API endpoint
    #[validate(url)]
    pub base_url: String,

    /// CaaS API version used in request paths
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Organization id; looked up from the account when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<String>,

    /// Request timeout in seconds
    #[validate(range(min = 1, max = 300))]
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Retries after the first failed send
    #[validate(range(min = 0, max = 10))]
    #[serde(default = "default_max_retry_count")]
    pub max_retry_count: u32,

    /// Constant delay between send attempts, in milliseconds
    #[validate(range(min = 0, max = 60_000))]
    #[serde(default)]
    pub retry_delay_ms: u64,

    /// Interval between status polls while waiting, in seconds
    #[validate(range(min = 1, max = 300))]
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// Whether to verify TLS certificates
    #[serde(default = "default_tls_verify")]
    pub tls_verify: bool,

    /// Optional path to custom CA certificate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tls_ca_cert: Option<std::path::PathBuf>,
}

fn default_api_version() -> String {
    DEFAULT_API_VERSION.to_string()
}

const fn default_request_timeout_secs() -> u64 {
    60
}

const fn default_max_retry_count() -> u32 {
    3
}

const fn default_poll_interval_secs() -> u64 {
    5
}

const fn default_tls_verify() -> bool {
    true
}

impl CloudControlConfig {
    /// Create a configuration for an explicit base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid or validation fails.
    pub fn new(base_url: impl Into<String>) -> Result<Self, Error> {
        let config = Self {
            base_url: base_url.into(),
            api_version: default_api_version(),
            organization_id: None,
            request_timeout_secs: default_request_timeout_secs(),
            max_retry_count: default_max_retry_count(),
            retry_delay_ms: 0,
            poll_interval_secs: default_poll_interval_secs(),
            tls_verify: default_tls_verify(),
            tls_ca_cert: None,
        };

        config.validate_config()?;
        Ok(config)
    }

    /// Create a configuration for a region code such as `AU` or `NA`.
    ///
    /// # Errors
    ///
    /// Returns an error if the region is unknown.
    pub fn for_region(region: &str) -> Result<Self, Error> {
        Self::new(region_base_url(region)?)
    }

    /// Set the CaaS API version.
    #[must_use]
    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = version.into();
        self
    }

    /// Use a known organization id instead of looking it up.
    #[must_use]
    pub fn with_organization_id(mut self, organization_id: impl Into<String>) -> Self {
        self.organization_id = Some(organization_id.into());
        self
    }

    /// Set request timeout in seconds.
    #[must_use]
    pub const fn with_timeout(mut self, seconds: u64) -> Self {
        self.request_timeout_secs = seconds;
        self
    }

    /// Set the number of retries after a failed send.
    #[must_use]
    pub const fn with_max_retry_count(mut self, retries: u32) -> Self {
        self.max_retry_count = retries;
        self
    }

    /// Set the delay between send attempts.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay_ms = delay.as_millis() as u64;
        self
    }

    /// Set the poll interval in seconds.
    #[must_use]
    pub const fn with_poll_interval(mut self, seconds: u64) -> Self {
        self.poll_interval_secs = seconds;
        self
    }

    /// Set whether to verify TLS certificates.
    #[must_use]
    pub const fn with_tls_verify(mut self, verify: bool) -> Self {
        self.tls_verify = verify;
        self
    }

    /// Set custom CA certificate path.
    #[must_use]
    pub fn with_ca_cert(mut self, path: std::path::PathBuf) -> Self {
        self.tls_ca_cert = Some(path);
        self
    }

    /// Get the request timeout as a Duration.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Get the retry delay as a Duration.
    #[must_use]
    pub const fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    /// Get the poll interval as a Duration.
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    /// Run field validation and return a configuration error on failure.
    ///
    /// # Errors
    ///
    /// Returns an error describing the first invalid field.
    pub fn validate_config(&self) -> Result<(), Error> {
        self.validate()
            .map_err(|e| Error::ConfigError(format!("Invalid configuration: {e}")))?;
        if self.api_version.trim().is_empty() {
            return Err(Error::ConfigError("API version must not be empty".to_string()));
        }
        Ok(())
    }

    /// Parse and validate the base URL.
    ///
    /// The returned URL always ends with `/` so relative paths join underneath it.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL cannot be parsed.
    pub fn parse_base_url(&self) -> Result<Url, Error> {
        let mut raw = self.base_url.clone();
        if !raw.ends_with('/') {
            raw.push('/');
        }
        Url::parse(&raw).map_err(|e| Error::ConfigError(format!("Invalid base URL: {e}")))
    }
}

/// Credentials used for HTTP basic authentication.
pub struct Credentials {
    username: String,
    password: SecretString,
}

impl Credentials {
    /// Create credentials from a user name and password.
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: SecretString::from(password.into()),
        }
    }

    /// Read credentials from `MCP_USER` and `MCP_PASSWORD`.
    ///
    /// # Errors
    ///
    /// Returns an error if either variable is missing or empty.
    pub fn from_env() -> Result<Self, Error> {
        let username = read_env(USER_ENV_VAR)?;
        let password = read_env(PASSWORD_ENV_VAR)?;
        Ok(Self::new(username, password))
    }

    /// User name.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Password; exposed only when building a request.
    #[must_use]
    pub fn password(&self) -> &str {
        self.password.expose_secret()
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

fn read_env(name: &str) -> Result<String, Error> {
    match std::env::var(name) {
        Ok(value) if !value.is_empty() => Ok(value),
        _ => Err(Error::ConfigError(format!(
            "The {name} environment variable is not set"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = CloudControlConfig::new("https://api-au.dimensiondata.com").unwrap();
        assert_eq!(config.api_version, DEFAULT_API_VERSION);
        assert_eq!(config.max_retry_count, 3);
        assert_eq!(config.retry_delay(), Duration::ZERO);
        assert_eq!(config.poll_interval(), Duration::from_secs(5));
        assert_eq!(config.timeout(), Duration::from_secs(60));
        assert!(config.tls_verify);
        assert!(config.organization_id.is_none());
    }

    #[test]
    fn test_config_invalid_url() {
        let result = CloudControlConfig::new("not a url");
        assert!(matches!(result, Err(Error::ConfigError(_))));
    }

    #[test]
    fn test_config_for_region() {
        let config = CloudControlConfig::for_region("NA").unwrap();
        assert_eq!(config.base_url, "https://api-na.dimensiondata.com");
        assert!(CloudControlConfig::for_region("XX").is_err());
    }

    #[test]
    fn test_config_builder() {
        let config = CloudControlConfig::new("https://api-eu.dimensiondata.com")
            .unwrap()
            .with_api_version("2.10")
            .with_organization_id("org-1")
            .with_timeout(10)
            .with_max_retry_count(5)
            .with_retry_delay(Duration::from_millis(250))
            .with_poll_interval(2)
            .with_tls_verify(false);

        assert_eq!(config.api_version, "2.10");
        assert_eq!(config.organization_id.as_deref(), Some("org-1"));
        assert_eq!(config.timeout(), Duration::from_secs(10));
        assert_eq!(config.max_retry_count, 5);
        assert_eq!(config.retry_delay(), Duration::from_millis(250));
        assert_eq!(config.poll_interval(), Duration::from_secs(2));
        assert!(!config.tls_verify);
        assert!(config.validate_config().is_ok());
    }

    #[test]
    fn test_config_range_validation() {
        let config = CloudControlConfig::new("https://api-eu.dimensiondata.com")
            .unwrap()
            .with_max_retry_count(50);
        assert!(matches!(
            config.validate_config(),
            Err(Error::ConfigError(_))
        ));

        let config = CloudControlConfig::new("https://api-eu.dimensiondata.com")
            .unwrap()
            .with_poll_interval(0);
        assert!(config.validate_config().is_err());
    }

    #[test]
    fn test_config_deserialize_defaults() {
        let config: CloudControlConfig =
            serde_json::from_str(r#"{"base_url": "https://api-ap.dimensiondata.com"}"#).unwrap();
        assert_eq!(config.api_version, DEFAULT_API_VERSION);
        assert_eq!(config.max_retry_count, 3);
        assert_eq!(config.poll_interval_secs, 5);
        assert!(config.validate_config().is_ok());
    }

    #[test]
    fn test_parse_base_url_appends_slash() {
        let config = CloudControlConfig::new("http://localhost:8080/proxy").unwrap();
        let url = config.parse_base_url().unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/proxy/");
    }

    #[test]
    fn test_credentials_debug_is_redacted() {
        let credentials = Credentials::new("user", "hunter2");
        let debug = format!("{credentials:?}");
        assert!(debug.contains("user"));
        assert!(!debug.contains("hunter2"));
        assert_eq!(credentials.password(), "hunter2");
    }
}
