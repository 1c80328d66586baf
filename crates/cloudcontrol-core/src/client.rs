//! HTTP client utilities and the transport retry loop.
//!
//! [`ServiceClient`] sends CloudControl requests rooted at `<base>/caas/<version>/<orgId>/`.
//! Each logical request runs through [`ServiceClient::execute_with_retry`], which rebuilds and
//! resends the request when the send itself fails (connection refused, DNS, TLS, timeout).
//! Application-level failures (any HTTP status) are returned to the caller untouched.

use reqwest::{Client, ClientBuilder, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};
use url::Url;

use crate::config::{CloudControlConfig, Credentials, DEFAULT_API_VERSION};
use crate::error::{Error, Result};

/// Default request timeout in seconds
pub const DEFAULT_REQUEST_TIMEOUT: u64 = 60;

/// Default connect timeout in seconds
pub const DEFAULT_CONNECT_TIMEOUT: u64 = 10;

// Connection pool settings

/// Default idle timeout for connection pools
pub const DEFAULT_POOL_IDLE_TIMEOUT: u64 = 90;

/// Default maximum idle connections per host
pub const DEFAULT_POOL_MAX_IDLE_PER_HOST: usize = 10;

// Retry settings

/// Default number of retries after the first failed send
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default delay between send attempts in milliseconds
pub const DEFAULT_RETRY_DELAY_MS: u64 = 0;

const USER_AGENT: &str = concat!("cloudcontrol-rust/", env!("CARGO_PKG_VERSION"));

/// Transport retry policy.
///
/// `max_retries` counts retries after the first attempt, so a request is sent at most
/// `max_retries + 1` times. The delay between attempts is constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of retries after the first attempt
    pub max_retries: u32,

    /// Delay before each retry
    pub retry_delay: Duration,
}

impl RetryPolicy {
    /// Create a new retry policy with default values.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            retry_delay: Duration::from_millis(DEFAULT_RETRY_DELAY_MS),
        }
    }

    /// Create a retry policy with no retries.
    #[must_use]
    pub const fn no_retry() -> Self {
        Self {
            max_retries: 0,
            retry_delay: Duration::from_millis(0),
        }
    }

    /// Set the maximum number of retries.
    #[must_use]
    pub const fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    /// Set the delay between attempts.
    #[must_use]
    pub const fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Total number of sends allowed for one request.
    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Check if retries are enabled.
    #[must_use]
    pub const fn has_retries(&self) -> bool {
        self.max_retries > 0
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new()
    }
}

/// HTTP client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Request timeout
    pub timeout: Duration,

    /// Connect timeout
    pub connect_timeout: Duration,

    /// Retry policy
    pub retry_policy: RetryPolicy,

    /// Connection pool idle timeout
    pub pool_idle_timeout: Duration,

    /// Maximum idle connections per host
    pub pool_max_idle_per_host: usize,

    /// Enable response compression
    pub enable_compression: bool,
}

impl ClientConfig {
    /// Create a new client configuration with default values.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT),
            retry_policy: RetryPolicy::new(),
            pool_idle_timeout: Duration::from_secs(DEFAULT_POOL_IDLE_TIMEOUT),
            pool_max_idle_per_host: DEFAULT_POOL_MAX_IDLE_PER_HOST,
            enable_compression: true,
        }
    }

    /// Set request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set connect timeout.
    #[must_use]
    pub const fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set retry policy.
    #[must_use]
    pub const fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

    /// Disable retries.
    #[must_use]
    pub const fn without_retries(mut self) -> Self {
        self.retry_policy = RetryPolicy::no_retry();
        self
    }

    /// Set connection pool idle timeout.
    #[must_use]
    pub const fn with_pool_idle_timeout(mut self, timeout: Duration) -> Self {
        self.pool_idle_timeout = timeout;
        self
    }

    /// Set maximum idle connections per host.
    #[must_use]
    pub const fn with_pool_max_idle(mut self, max: usize) -> Self {
        self.pool_max_idle_per_host = max;
        self
    }

    /// Enable or disable compression.
    #[must_use]
    pub const fn with_compression(mut self, enabled: bool) -> Self {
        self.enable_compression = enabled;
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-request state threaded through the retry loop.
///
/// A fresh context is created for every logical request and dropped once the request succeeds
/// or the retry budget is spent. Request builders receive it mutably so they can vary the
/// request between attempts.
#[derive(Debug, Clone)]
pub struct RetryContext {
    description: String,
    organization_id: String,
    retry_count: u32,
    last_error: Option<Error>,
    max_retries: u32,
}

impl RetryContext {
    /// Create a context for a new logical request.
    #[must_use]
    pub fn new(
        description: impl Into<String>,
        organization_id: impl Into<String>,
        max_retries: u32,
    ) -> Self {
        Self {
            description: description.into(),
            organization_id: organization_id.into(),
            retry_count: 0,
            last_error: None,
            max_retries,
        }
    }

    /// Description of the request.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Organization the request is scoped to.
    #[must_use]
    pub fn organization_id(&self) -> &str {
        &self.organization_id
    }

    /// Number of retries performed so far.
    #[must_use]
    pub const fn retry_count(&self) -> u32 {
        self.retry_count
    }

    /// 1-based number of the attempt in progress.
    #[must_use]
    pub const fn attempt(&self) -> u32 {
        self.retry_count + 1
    }

    /// Retries still available after the attempt in progress.
    #[must_use]
    pub const fn remaining_retries(&self) -> u32 {
        self.max_retries.saturating_sub(self.retry_count)
    }

    /// Error from the previous failed attempt, if any.
    #[must_use]
    pub fn last_error(&self) -> Option<&Error> {
        self.last_error.as_ref()
    }

    fn record_failure(&mut self, error: Error) {
        self.retry_count += 1;
        self.last_error = Some(error);
    }
}

/// Where a request path is rooted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestScope {
    /// `caas/<version>/<orgId>/<path>`
    Organization,
    /// `caas/<version>/<path>`
    Account,
}

/// A CloudControl request produced by a request builder.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    path: String,
    scope: RequestScope,
    query: Vec<(&'static str, String)>,
    body: Option<serde_json::Value>,
}

impl ApiRequest {
    /// Create a request for an organization-scoped path.
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            scope: RequestScope::Organization,
            query: Vec::new(),
            body: None,
        }
    }

    /// Shorthand for a `GET` request.
    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    /// Shorthand for a `POST` request.
    #[must_use]
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    /// Root the path at the API version instead of the organization.
    #[must_use]
    pub fn account_scoped(mut self) -> Self {
        self.scope = RequestScope::Account;
        self
    }

    /// Attach query parameters.
    #[must_use]
    pub fn with_query(mut self, query: Vec<(&'static str, String)>) -> Self {
        self.query = query;
        self
    }

    /// Attach a JSON body.
    ///
    /// # Errors
    ///
    /// Returns an error if the body cannot be serialized.
    pub fn with_json<B>(mut self, body: &B) -> Result<Self>
    where
        B: Serialize + ?Sized,
    {
        self.body = Some(serde_json::to_value(body).map_err(|err| {
            Error::InvalidRequest(format!("Failed to serialize request body: {err}"))
        })?);
        Ok(self)
    }

    /// HTTP method.
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Path relative to the request scope.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }
}

/// Response returned by the retry loop regardless of HTTP status.
#[derive(Debug, Clone)]
pub struct RawResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Response body
    pub body: Vec<u8>,
}

impl RawResponse {
    /// Returns true for 2xx responses.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Deserialize the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] if the body is not valid JSON for `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.body).map_err(|err| Error::Parse(err.to_string()))
    }

    /// Body as (lossy) UTF-8 text.
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MyUser {
    organization: MyOrganization,
}

#[derive(Debug, Deserialize)]
struct MyOrganization {
    id: String,
}

/// Builder for [`ServiceClient`].
#[derive(Debug, Clone)]
pub struct ServiceClientBuilder {
    base_url: Url,
    api_version: String,
    http_config: ClientConfig,
    credentials: Option<Arc<Credentials>>,
    organization_id: Option<String>,
    user_agent: String,
    tls_verify: bool,
    tls_ca_cert: Option<std::path::PathBuf>,
}

impl ServiceClientBuilder {
    /// Create a builder for the given base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL cannot be parsed.
    pub fn new(base_url: impl AsRef<str>, timeout: Duration) -> Result<Self> {
        let mut raw = base_url.as_ref().to_string();
        if !raw.ends_with('/') {
            raw.push('/');
        }
        let url = Url::parse(&raw).map_err(|err| {
            Error::ConfigError(format!("Invalid base URL `{}`: {err}", base_url.as_ref()))
        })?;

        Ok(Self {
            base_url: url,
            api_version: DEFAULT_API_VERSION.to_string(),
            http_config: ClientConfig::new().with_timeout(timeout),
            credentials: None,
            organization_id: None,
            user_agent: USER_AGENT.to_string(),
            tls_verify: true,
            tls_ca_cert: None,
        })
    }

    /// Create a builder from a validated [`CloudControlConfig`].
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn from_config(config: &CloudControlConfig) -> Result<Self> {
        config.validate_config()?;

        let http_config = ClientConfig::new()
            .with_timeout(config.timeout())
            .with_retry_policy(
                RetryPolicy::new()
                    .with_max_retries(config.max_retry_count)
                    .with_retry_delay(config.retry_delay()),
            );

        Ok(Self {
            base_url: config.parse_base_url()?,
            api_version: config.api_version.clone(),
            http_config,
            credentials: None,
            organization_id: config.organization_id.clone(),
            user_agent: USER_AGENT.to_string(),
            tls_verify: config.tls_verify,
            tls_ca_cert: config.tls_ca_cert.clone(),
        })
    }

    /// Override the `User-Agent` header.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Override the CaaS API version.
    #[must_use]
    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = version.into();
        self
    }

    /// Override the retry policy.
    #[must_use]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.http_config.retry_policy = retry;
        self
    }

    /// Override the HTTP client configuration.
    #[must_use]
    pub fn with_http_config(mut self, config: ClientConfig) -> Self {
        self.http_config = config;
        self
    }

    /// Configure HTTP basic authentication credentials.
    #[must_use]
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(Arc::new(credentials));
        self
    }

    /// Use a known organization id instead of looking it up.
    #[must_use]
    pub fn with_organization_id(mut self, organization_id: impl Into<String>) -> Self {
        self.organization_id = Some(organization_id.into());
        self
    }

    /// Build the client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn build(self) -> Result<ServiceClient> {
        let mut builder = ClientBuilder::new()
            .user_agent(&self.user_agent)
            .timeout(self.http_config.timeout)
            .connect_timeout(self.http_config.connect_timeout)
            .pool_idle_timeout(self.http_config.pool_idle_timeout)
            .pool_max_idle_per_host(self.http_config.pool_max_idle_per_host)
            .gzip(self.http_config.enable_compression);

        if !self.tls_verify {
            warn!("TLS verification disabled for CloudControl client");
            builder = builder.danger_accept_invalid_certs(true);
        }

        if let Some(ca_cert) = &self.tls_ca_cert {
            debug!("loading CA certificate from {}", ca_cert.display());
            let bytes = std::fs::read(ca_cert).map_err(|err| {
                Error::ConfigError(format!(
                    "Failed to read CA certificate {}: {err}",
                    ca_cert.display()
                ))
            })?;
            let cert = reqwest::Certificate::from_pem(&bytes)
                .map_err(|err| Error::ConfigError(format!("Invalid CA certificate: {err}")))?;
            builder = builder.add_root_certificate(cert);
        }

        let http = builder
            .build()
            .map_err(|err| Error::ConfigError(format!("Failed to build HTTP client: {err}")))?;

        Ok(ServiceClient {
            inner: Arc::new(ServiceClientInner {
                http,
                base_url: self.base_url,
                api_version: self.api_version,
                credentials: self.credentials,
                retry_policy: self.http_config.retry_policy,
                organization_id: OnceCell::new_with(self.organization_id),
            }),
        })
    }
}

/// Shared HTTP client for CloudControl. Clones share the connection pool and the resolved
/// organization id.
#[derive(Debug, Clone)]
pub struct ServiceClient {
    inner: Arc<ServiceClientInner>,
}

#[derive(Debug)]
struct ServiceClientInner {
    http: Client,
    base_url: Url,
    api_version: String,
    credentials: Option<Arc<Credentials>>,
    retry_policy: RetryPolicy,
    organization_id: OnceCell<String>,
}

impl ServiceClient {
    /// Return the base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Return the retry policy.
    #[must_use]
    pub fn retry_policy(&self) -> RetryPolicy {
        self.inner.retry_policy
    }

    /// Resolve the caller's organization id, looking it up once if it was not configured.
    ///
    /// # Errors
    ///
    /// Returns an error if the account lookup fails.
    pub async fn organization_id(&self) -> Result<String> {
        self.inner
            .organization_id
            .get_or_try_init(|| self.lookup_organization_id())
            .await
            .cloned()
    }

    /// Send a request, rebuilding and resending it after transport failures.
    ///
    /// The organization id is resolved once, then `build` is called before every attempt with
    /// the current [`RetryContext`]. A builder error aborts immediately. A response with any
    /// HTTP status ends the loop. Send failures for which [`Error::is_transport`] holds are
    /// retried, at most `max_retries` times after the first attempt, with a constant delay in
    /// between; any other send failure is returned as is.
    ///
    /// # Errors
    ///
    /// Returns the builder's error, [`Error::InvalidRequest`] if reqwest rejects the request,
    /// [`Error::RetriesExhausted`] wrapping the last transport error, or [`Error::Transport`]
    /// if the response body cannot be read.
    pub async fn execute_with_retry<F>(&self, description: &str, mut build: F) -> Result<RawResponse>
    where
        F: FnMut(&mut RetryContext) -> Result<ApiRequest>,
    {
        let organization_id = self.organization_id().await?;
        let policy = self.inner.retry_policy;
        let mut context = RetryContext::new(description, organization_id, policy.max_retries);

        loop {
            let request = build(&mut context)?;
            let http_request = self.prepare(&request, context.organization_id())?;

            info!(
                description,
                method = %request.method,
                path = %request.path,
                attempt = context.attempt(),
                "CloudControl request"
            );

            match http_request.send().await {
                Ok(response) => {
                    let status = response.status();
                    let body = response.bytes().await.map_err(|err| {
                        Error::Transport(format!(
                            "Failed to read response body for {description}: {err}"
                        ))
                    })?;
                    debug!(description, %status, "CloudControl response");
                    return Ok(RawResponse {
                        status,
                        body: body.to_vec(),
                    });
                }
                Err(err) => {
                    let error = Error::from(err);
                    if !error.is_transport() {
                        error!(
                            description,
                            code = error.error_code(),
                            error = %error,
                            "CloudControl request rejected before sending"
                        );
                        return Err(error);
                    }
                    if context.remaining_retries() == 0 {
                        error!(
                            description,
                            attempts = context.attempt(),
                            code = error.error_code(),
                            error = %error,
                            "CloudControl request failed; retries exhausted"
                        );
                        return Err(Error::RetriesExhausted {
                            description: description.to_string(),
                            attempts: context.attempt(),
                            last: Box::new(error),
                        });
                    }

                    warn!(
                        description,
                        attempt = context.attempt(),
                        remaining = context.remaining_retries(),
                        error = %error,
                        "CloudControl request failed; retrying"
                    );
                    context.record_failure(error);
                }
            }

            if !policy.retry_delay.is_zero() {
                debug!("Retrying {description} after {:?}", policy.retry_delay);
                sleep(policy.retry_delay).await;
            }
        }
    }

    fn prepare(&self, request: &ApiRequest, organization_id: &str) -> Result<reqwest::RequestBuilder> {
        let url = self.build_url(request, organization_id)?;
        let mut builder = self
            .inner
            .http
            .request(request.method.clone(), url)
            .header("Accept", "application/json");

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(credentials) = &self.inner.credentials {
            builder = builder.basic_auth(credentials.username(), Some(credentials.password()));
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        Ok(builder)
    }

    fn build_url(&self, request: &ApiRequest, organization_id: &str) -> Result<Url> {
        let path = request.path.trim_start_matches('/');
        let relative = match request.scope {
            RequestScope::Organization => {
                format!("caas/{}/{organization_id}/{path}", self.inner.api_version)
            }
            RequestScope::Account => format!("caas/{}/{path}", self.inner.api_version),
        };

        self.inner
            .base_url
            .join(&relative)
            .map_err(|err| Error::InvalidEndpoint(format!("Invalid path `{relative}`: {err}")))
    }

    async fn lookup_organization_id(&self) -> Result<String> {
        let request = ApiRequest::get("user/myUser").account_scoped();
        let response = self.prepare(&request, "")?.send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            return Err(Error::Api {
                status: status.as_u16(),
                response_code: "ACCOUNT_LOOKUP_FAILED".to_string(),
                message: String::from_utf8_lossy(&body).into_owned(),
            });
        }

        let user: MyUser = serde_json::from_slice(&body)?;
        debug!(organization_id = %user.organization.id, "resolved CloudControl organization");
        Ok(user.organization.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::net::TcpListener;
    use tokio_test::assert_ok;
    use wiremock::matchers::{body_json, header_exists, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const ORG: &str = "f3dbc1ac-55b1-4d6b-a2e5-63c8d86f3e53";
    const DOMAIN_PATH: &str = "/caas/2.4/f3dbc1ac-55b1-4d6b-a2e5-63c8d86f3e53/network/networkDomain";

    fn test_client(uri: &str, retries: u32) -> ServiceClient {
        ServiceClientBuilder::new(uri, Duration::from_millis(200))
            .unwrap()
            .with_http_config(
                ClientConfig::new()
                    .with_timeout(Duration::from_millis(200))
                    .with_retry_policy(RetryPolicy::new().with_max_retries(retries)),
            )
            .with_credentials(Credentials::new("user", "secret"))
            .with_organization_id(ORG)
            .build()
            .unwrap()
    }

    fn stalled() -> ResponseTemplate {
        ResponseTemplate::new(200).set_delay(Duration::from_secs(2))
    }

    #[test]
    fn test_retry_policy_builder() {
        let policy = RetryPolicy::new()
            .with_max_retries(5)
            .with_retry_delay(Duration::from_millis(100));

        assert_eq!(policy.max_retries, 5);
        assert_eq!(policy.retry_delay, Duration::from_millis(100));
        assert_eq!(policy.max_attempts(), 6);
        assert!(policy.has_retries());
        assert!(!RetryPolicy::no_retry().has_retries());
        assert_eq!(RetryPolicy::no_retry().max_attempts(), 1);
    }

    #[test]
    fn test_client_config_builder() {
        let config = ClientConfig::new()
            .with_timeout(Duration::from_secs(5))
            .with_pool_max_idle(2)
            .with_compression(false)
            .without_retries();

        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.pool_max_idle_per_host, 2);
        assert!(!config.enable_compression);
        assert_eq!(config.retry_policy, RetryPolicy::no_retry());
    }

    #[test]
    fn test_retry_context_counts() {
        let mut context = RetryContext::new("Get VLAN", ORG, 2);
        assert_eq!(context.attempt(), 1);
        assert_eq!(context.remaining_retries(), 2);
        assert!(context.last_error().is_none());

        context.record_failure(Error::Transport("reset".to_string()));
        assert_eq!(context.retry_count(), 1);
        assert_eq!(context.attempt(), 2);
        assert_eq!(context.remaining_retries(), 1);
        assert!(context.last_error().is_some());

        context.record_failure(Error::Transport("reset".to_string()));
        assert_eq!(context.remaining_retries(), 0);
    }

    #[tokio::test]
    async fn first_attempt_success_returns_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("{DOMAIN_PATH}/nd-1").as_str()))
            .and(header_exists("authorization"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "nd-1"})))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server.uri(), 3);
        let response = client
            .execute_with_retry("Get network domain", |_| {
                Ok(ApiRequest::get("network/networkDomain/nd-1"))
            })
            .await
            .unwrap();

        assert!(response.is_success());
        let body: serde_json::Value = response.json().unwrap();
        assert_eq!(body["id"], "nd-1");
    }

    #[tokio::test]
    async fn error_status_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(
                "/caas/2.4/f3dbc1ac-55b1-4d6b-a2e5-63c8d86f3e53/network/deployNetworkDomain",
            ))
            .and(body_json(json!({"name": "dev"})))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "responseCode": "INVALID_INPUT_DATA",
                "message": "bad"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server.uri(), 3);
        let response = client
            .execute_with_retry("Deploy network domain", |_| {
                ApiRequest::post("network/deployNetworkDomain").with_json(&json!({"name": "dev"}))
            })
            .await
            .unwrap();

        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert!(response.text().contains("INVALID_INPUT_DATA"));
    }

    #[tokio::test]
    async fn transient_failures_are_retried_until_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("{DOMAIN_PATH}/nd-2").as_str()))
            .respond_with(stalled())
            .up_to_n_times(2)
            .expect(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(format!("{DOMAIN_PATH}/nd-2").as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "nd-2"})))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server.uri(), 3);
        let mut seen = Vec::new();
        let response = client
            .execute_with_retry("Get network domain", |context| {
                seen.push((context.attempt(), context.last_error().is_some()));
                Ok(ApiRequest::get("network/networkDomain/nd-2"))
            })
            .await
            .unwrap();

        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(seen, vec![(1, false), (2, true), (3, true)]);
    }

    #[tokio::test]
    async fn exhausted_retries_return_last_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("{DOMAIN_PATH}/nd-3").as_str()))
            .respond_with(stalled())
            .expect(3)
            .mount(&server)
            .await;

        let client = test_client(&server.uri(), 2);
        let err = client
            .execute_with_retry("Get network domain", |_| {
                Ok(ApiRequest::get("network/networkDomain/nd-3"))
            })
            .await
            .unwrap_err();

        match err {
            Error::RetriesExhausted {
                description,
                attempts,
                last,
            } => {
                assert_eq!(description, "Get network domain");
                assert_eq!(attempts, 3);
                assert!(last.is_transport());
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn connection_refused_makes_max_retries_plus_one_attempts() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = test_client(&format!("http://{addr}"), 3);
        let mut attempts = 0;
        let err = client
            .execute_with_retry("Get VLAN", |_| {
                attempts += 1;
                Ok(ApiRequest::get("network/vlan/v-1"))
            })
            .await
            .unwrap_err();

        assert_eq!(attempts, 4);
        assert!(matches!(err, Error::RetriesExhausted { attempts: 4, .. }));
    }

    #[tokio::test]
    async fn builder_failure_aborts_without_sending() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = test_client(&server.uri(), 3);
        let mut calls = 0;
        let err = client
            .execute_with_retry("Get server", |_| {
                calls += 1;
                Err(Error::InvalidRequest("missing server id".to_string()))
            })
            .await
            .unwrap_err();

        assert_eq!(calls, 1);
        assert!(matches!(err, Error::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn organization_id_is_looked_up_once() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/caas/2.4/user/myUser"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "userName": "user",
                "organization": {"id": ORG, "name": "Example"}
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(DOMAIN_PATH))
            .and(query_param("pageSize", "10"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"networkDomain": []})))
            .expect(2)
            .mount(&server)
            .await;

        let client = ServiceClientBuilder::new(server.uri(), Duration::from_secs(5))
            .unwrap()
            .with_credentials(Credentials::new("user", "secret"))
            .build()
            .unwrap();

        for _ in 0..2 {
            let response = client
                .execute_with_retry("List network domains", |_| {
                    Ok(ApiRequest::get("network/networkDomain")
                        .with_query(vec![("pageSize", "10".to_string())]))
                })
                .await;
            assert_ok!(response);
        }

        assert_eq!(client.organization_id().await.unwrap(), ORG);
    }

    #[tokio::test]
    async fn organization_lookup_failure_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/caas/2.4/user/myUser"))
            .respond_with(ResponseTemplate::new(401).set_body_string("unauthorized"))
            .mount(&server)
            .await;

        let client = ServiceClientBuilder::new(server.uri(), Duration::from_secs(5))
            .unwrap()
            .build()
            .unwrap();

        let err = client
            .execute_with_retry("Get VLAN", |_| Ok(ApiRequest::get("network/vlan/v-1")))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Api { status: 401, .. }));
    }

    #[test]
    fn build_url_respects_scope() {
        let client = test_client("http://localhost:8080/api", 0);
        let url = client
            .build_url(&ApiRequest::get("/server/server/s-1"), ORG)
            .unwrap();
        assert_eq!(
            url.as_str(),
            format!("http://localhost:8080/api/caas/2.4/{ORG}/server/server/s-1")
        );

        let url = client
            .build_url(&ApiRequest::get("user/myUser").account_scoped(), ORG)
            .unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/api/caas/2.4/user/myUser");
    }
}
