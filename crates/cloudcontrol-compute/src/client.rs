//! Asynchronous CloudControl compute client.

use crate::models::{
    AddPublicIpBlock, ApiResponse, CloneServer, CreateFirewallRule, DeployNetworkDomain,
    DeployServer, DeployVlan, DisableServerBackup, EditNetworkDomain, EditVlan,
    EnableServerBackup, FirewallRule, IdRequest, ListParams, NetworkDomain, NetworkDomains,
    PublicIpBlock, Server, Servers, Vlan, Vlans, RESOURCE_NOT_FOUND,
};
use crate::resources;
use crate::Result;
use cloudcontrol_core::client::{
    ApiRequest, ClientConfig, RawResponse, RetryPolicy, ServiceClient, ServiceClientBuilder,
    DEFAULT_REQUEST_TIMEOUT,
};
use cloudcontrol_core::config::{CloudControlConfig, Credentials};
use cloudcontrol_core::uuid::{
    FirewallRuleId, ImageId, NetworkDomainId, PublicIpBlockId, ServerId, VlanId,
};
use cloudcontrol_core::wait::DEFAULT_POLL_INTERVAL;
use cloudcontrol_core::{
    CancellationFlag, Error, Resource, ResourceType, ResourceWaiter, WaitRequest,
};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use url::Url;

const USER_AGENT: &str = concat!("cloudcontrol-compute/", env!("CARGO_PKG_VERSION"));

/// Builder for [`ComputeClient`].
#[derive(Debug, Clone)]
pub struct ComputeClientBuilder {
    inner: ServiceClientBuilder,
    poll_interval: Duration,
    cancellation: CancellationFlag,
}

impl ComputeClientBuilder {
    /// Create a builder for the specified base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid.
    pub fn new(base_url: impl AsRef<str>) -> Result<Self> {
        let builder =
            ServiceClientBuilder::new(base_url, Duration::from_secs(DEFAULT_REQUEST_TIMEOUT))?
                .with_user_agent(USER_AGENT);

        Ok(Self {
            inner: builder,
            poll_interval: DEFAULT_POLL_INTERVAL,
            cancellation: CancellationFlag::new(),
        })
    }

    /// Create a builder for a region code such as `AU` or `NA`.
    ///
    /// # Errors
    ///
    /// Returns an error if the region is unknown.
    pub fn for_region(region: &str) -> Result<Self> {
        Self::from_config(&CloudControlConfig::for_region(region)?)
    }

    /// Create a builder from a [`CloudControlConfig`].
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn from_config(config: &CloudControlConfig) -> Result<Self> {
        let builder = ServiceClientBuilder::from_config(config)?.with_user_agent(USER_AGENT);
        Ok(Self {
            inner: builder,
            poll_interval: config.poll_interval(),
            cancellation: CancellationFlag::new(),
        })
    }

    /// Configure HTTP basic authentication credentials.
    #[must_use]
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.inner = self.inner.with_credentials(credentials);
        self
    }

    /// Use a known organization id instead of looking it up.
    #[must_use]
    pub fn with_organization_id(mut self, organization_id: impl Into<String>) -> Self {
        self.inner = self.inner.with_organization_id(organization_id);
        self
    }

    /// Override the CaaS API version.
    #[must_use]
    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.inner = self.inner.with_api_version(version);
        self
    }

    /// Override the retry policy.
    #[must_use]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.inner = self.inner.with_retry_policy(retry);
        self
    }

    /// Override the HTTP client configuration.
    #[must_use]
    pub fn with_http_config(mut self, config: ClientConfig) -> Self {
        self.inner = self.inner.with_http_config(config);
        self
    }

    /// Override the interval between status polls.
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Share an existing cancellation flag (e.g. one wired to a signal handler).
    #[must_use]
    pub fn with_cancellation_flag(mut self, flag: CancellationFlag) -> Self {
        self.cancellation = flag;
        self
    }

    /// Build the client.
    ///
    /// # Errors
    ///
    /// Returns an error if the poll interval is zero or the HTTP client cannot be constructed.
    pub fn build(self) -> Result<ComputeClient> {
        if self.poll_interval.is_zero() {
            return Err(Error::ConfigError(
                "poll interval must be greater than zero".to_string(),
            ));
        }

        let inner = self.inner.build()?;
        let registry = resources::registry(&inner);
        let waiter = ResourceWaiter::new(Arc::new(registry), self.cancellation)
            .with_poll_interval(self.poll_interval);

        Ok(ComputeClient { inner, waiter })
    }
}

/// Asynchronous CloudControl compute client.
///
/// Clones share the connection pool, the organization id and the cancellation flag.
#[derive(Debug, Clone)]
pub struct ComputeClient {
    inner: ServiceClient,
    waiter: ResourceWaiter,
}

impl ComputeClient {
    /// Construct a client directly from the base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid.
    pub fn new(base_url: impl AsRef<str>) -> Result<Self> {
        ComputeClientBuilder::new(base_url)?.build()
    }

    /// Return the base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        self.inner.base_url()
    }

    /// Resolve the caller's organization id.
    ///
    /// # Errors
    ///
    /// Returns an error if the account lookup fails.
    pub async fn organization_id(&self) -> Result<String> {
        self.inner.organization_id().await
    }

    /// Request cancellation of in-progress waits.
    pub fn cancel(&self) {
        self.waiter.cancellation().cancel();
    }

    /// Returns true once cancellation has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.waiter.cancellation().is_cancelled()
    }

    /// The cancellation flag consulted by every wait.
    #[must_use]
    pub fn cancellation_flag(&self) -> &CancellationFlag {
        self.waiter.cancellation()
    }

    /// The resource waiter used by the `wait_for_*` methods.
    #[must_use]
    pub fn waiter(&self) -> &ResourceWaiter {
        &self.waiter
    }

    /// Fetch any resource by type and id; `None` if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns transport or API errors.
    pub async fn get_resource(
        &self,
        resource_type: ResourceType,
        id: &str,
    ) -> Result<Option<Box<dyn Resource>>> {
        self.waiter.registry().fetch(resource_type, id).await
    }

    /// List network domains.
    ///
    /// # Errors
    ///
    /// Returns transport or API errors.
    pub async fn list_network_domains(&self, params: &ListParams) -> Result<NetworkDomains> {
        self.get_json("List network domains", "network/networkDomain", params.to_pairs())
            .await
    }

    /// Fetch a single network domain.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if it does not exist.
    pub async fn get_network_domain(&self, id: NetworkDomainId) -> Result<NetworkDomain> {
        let path = format!("network/networkDomain/{id}");
        self.get_json(&format!("Get network domain '{id}'"), &path, Vec::new())
            .await
    }

    /// Deploy a network domain and return its id.
    ///
    /// # Errors
    ///
    /// Returns transport or API errors.
    pub async fn deploy_network_domain(
        &self,
        request: &DeployNetworkDomain,
    ) -> Result<NetworkDomainId> {
        let response = self
            .post_json("Deploy network domain", "network/deployNetworkDomain", request)
            .await?;
        created_id(&response, "networkDomainId")
    }

    /// Edit a network domain.
    ///
    /// # Errors
    ///
    /// Returns transport or API errors.
    pub async fn edit_network_domain(&self, request: &EditNetworkDomain) -> Result<ApiResponse> {
        self.post_json(
            &format!("Edit network domain '{}'", request.id),
            "network/editNetworkDomain",
            request,
        )
        .await
    }

    /// Delete a network domain.
    ///
    /// # Errors
    ///
    /// Returns transport or API errors.
    pub async fn delete_network_domain(&self, id: NetworkDomainId) -> Result<ApiResponse> {
        self.post_json(
            &format!("Delete network domain '{id}'"),
            "network/deleteNetworkDomain",
            &IdRequest::new(id),
        )
        .await
    }

    /// List VLANs.
    ///
    /// # Errors
    ///
    /// Returns transport or API errors.
    pub async fn list_vlans(&self, params: &ListParams) -> Result<Vlans> {
        self.get_json("List VLANs", "network/vlan", params.to_pairs())
            .await
    }

    /// Fetch a single VLAN.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if it does not exist.
    pub async fn get_vlan(&self, id: VlanId) -> Result<Vlan> {
        let path = format!("network/vlan/{id}");
        self.get_json(&format!("Get VLAN '{id}'"), &path, Vec::new())
            .await
    }

    /// Deploy a VLAN and return its id.
    ///
    /// # Errors
    ///
    /// Returns transport or API errors.
    pub async fn deploy_vlan(&self, request: &DeployVlan) -> Result<VlanId> {
        let response = self
            .post_json("Deploy VLAN", "network/deployVlan", request)
            .await?;
        created_id(&response, "vlanId")
    }

    /// Edit a VLAN.
    ///
    /// # Errors
    ///
    /// Returns transport or API errors.
    pub async fn edit_vlan(&self, request: &EditVlan) -> Result<ApiResponse> {
        self.post_json(
            &format!("Edit VLAN '{}'", request.id),
            "network/editVlan",
            request,
        )
        .await
    }

    /// Delete a VLAN.
    ///
    /// # Errors
    ///
    /// Returns transport or API errors.
    pub async fn delete_vlan(&self, id: VlanId) -> Result<ApiResponse> {
        self.post_json(
            &format!("Delete VLAN '{id}'"),
            "network/deleteVlan",
            &IdRequest::new(id),
        )
        .await
    }

    /// List servers.
    ///
    /// # Errors
    ///
    /// Returns transport or API errors.
    pub async fn list_servers(&self, params: &ListParams) -> Result<Servers> {
        self.get_json("List servers", "server/server", params.to_pairs())
            .await
    }

    /// Fetch a single server.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if it does not exist.
    pub async fn get_server(&self, id: ServerId) -> Result<Server> {
        let path = format!("server/server/{id}");
        self.get_json(&format!("Get server '{id}'"), &path, Vec::new())
            .await
    }

    /// Deploy a server and return its id.
    ///
    /// # Errors
    ///
    /// Returns transport or API errors.
    pub async fn deploy_server(&self, request: &DeployServer) -> Result<ServerId> {
        let response = self
            .post_json(
                &format!("Deploy server '{}'", request.name),
                "server/deployServer",
                request,
            )
            .await?;
        created_id(&response, "serverId")
    }

    /// Delete a server.
    ///
    /// # Errors
    ///
    /// Returns transport or API errors.
    pub async fn delete_server(&self, id: ServerId) -> Result<ApiResponse> {
        self.post_json(
            &format!("Delete server '{id}'"),
            "server/deleteServer",
            &IdRequest::new(id),
        )
        .await
    }

    /// Clone a server to a customer image and return the image id.
    ///
    /// # Errors
    ///
    /// Returns transport or API errors.
    pub async fn clone_server(&self, request: &CloneServer) -> Result<ImageId> {
        let response = self
            .post_json(
                &format!("Clone server '{}'", request.id),
                "server/cloneServer",
                request,
            )
            .await?;
        created_id(&response, "imageId")
    }

    /// Enable cloud backup on a server.
    ///
    /// # Errors
    ///
    /// Returns transport or API errors.
    pub async fn enable_server_backup(
        &self,
        server_id: ServerId,
        service_plan: impl Into<String>,
    ) -> Result<ApiResponse> {
        let request = EnableServerBackup {
            server_id,
            service_plan: service_plan.into(),
        };
        self.post_json(
            &format!("Enable backup for server '{server_id}'"),
            "backup/enableBackup",
            &request,
        )
        .await
    }

    /// Disable cloud backup on a server.
    ///
    /// # Errors
    ///
    /// Returns transport or API errors.
    pub async fn disable_server_backup(&self, server_id: ServerId) -> Result<ApiResponse> {
        self.post_json(
            &format!("Disable backup for server '{server_id}'"),
            "backup/disableBackup",
            &DisableServerBackup { server_id },
        )
        .await
    }

    /// Fetch a single firewall rule.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if it does not exist.
    pub async fn get_firewall_rule(&self, id: FirewallRuleId) -> Result<FirewallRule> {
        let path = format!("network/firewallRule/{id}");
        self.get_json(&format!("Get firewall rule '{id}'"), &path, Vec::new())
            .await
    }

    /// Create a firewall rule and return its id.
    ///
    /// # Errors
    ///
    /// Returns transport or API errors.
    pub async fn create_firewall_rule(&self, request: &CreateFirewallRule) -> Result<FirewallRuleId> {
        let response = self
            .post_json(
                &format!("Create firewall rule '{}'", request.name),
                "network/createFirewallRule",
                request,
            )
            .await?;
        created_id(&response, "firewallRuleId")
    }

    /// Delete a firewall rule.
    ///
    /// # Errors
    ///
    /// Returns transport or API errors.
    pub async fn delete_firewall_rule(&self, id: FirewallRuleId) -> Result<ApiResponse> {
        self.post_json(
            &format!("Delete firewall rule '{id}'"),
            "network/deleteFirewallRule",
            &IdRequest::new(id),
        )
        .await
    }

    /// Fetch a single public IPv4 address block.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if it does not exist.
    pub async fn get_public_ip_block(&self, id: PublicIpBlockId) -> Result<PublicIpBlock> {
        let path = format!("network/publicIpBlock/{id}");
        self.get_json(&format!("Get public IP block '{id}'"), &path, Vec::new())
            .await
    }

    /// Reserve a public IPv4 address block for a network domain and return its id.
    ///
    /// # Errors
    ///
    /// Returns transport or API errors.
    pub async fn add_public_ip_block(
        &self,
        network_domain_id: NetworkDomainId,
    ) -> Result<PublicIpBlockId> {
        let response = self
            .post_json(
                &format!("Add public IP block to network domain '{network_domain_id}'"),
                "network/addPublicIpBlock",
                &AddPublicIpBlock { network_domain_id },
            )
            .await?;
        created_id(&response, "ipBlockId")
    }

    /// Release a public IPv4 address block.
    ///
    /// # Errors
    ///
    /// Returns transport or API errors.
    pub async fn remove_public_ip_block(&self, id: PublicIpBlockId) -> Result<ApiResponse> {
        self.post_json(
            &format!("Remove public IP block '{id}'"),
            "network/removePublicIpBlock",
            &IdRequest::new(id),
        )
        .await
    }

    /// Wait for a deployment to complete.
    ///
    /// # Errors
    ///
    /// See [`ResourceWaiter::wait`].
    pub async fn wait_for_deploy(
        &self,
        resource_type: ResourceType,
        id: &str,
        timeout: Duration,
    ) -> Result<Box<dyn Resource>> {
        self.waiter.wait_for_deploy(resource_type, id, timeout).await
    }

    /// Wait for an edit to complete.
    ///
    /// # Errors
    ///
    /// See [`ResourceWaiter::wait`].
    pub async fn wait_for_change(
        &self,
        resource_type: ResourceType,
        id: &str,
        action: &str,
        timeout: Duration,
    ) -> Result<Box<dyn Resource>> {
        self.waiter
            .wait_for_change(resource_type, id, action, timeout)
            .await
    }

    /// Wait for removal of a nested item to complete on its parent.
    ///
    /// # Errors
    ///
    /// See [`ResourceWaiter::wait`].
    pub async fn wait_for_nested_delete(
        &self,
        resource_type: ResourceType,
        id: &str,
        action: &str,
        timeout: Duration,
    ) -> Result<Option<Box<dyn Resource>>> {
        self.waiter
            .wait_for_nested_delete(resource_type, id, action, timeout)
            .await
    }

    /// Wait for a resource to be deleted.
    ///
    /// # Errors
    ///
    /// See [`ResourceWaiter::wait`].
    pub async fn wait_for_delete(
        &self,
        resource_type: ResourceType,
        id: &str,
        timeout: Duration,
    ) -> Result<()> {
        self.waiter.wait_for_delete(resource_type, id, timeout).await
    }

    /// Wait for the customer image produced by [`clone_server`](Self::clone_server).
    ///
    /// # Errors
    ///
    /// See [`ResourceWaiter::wait`].
    pub async fn wait_for_clone(&self, image_id: ImageId, timeout: Duration) -> Result<Box<dyn Resource>> {
        self.waiter
            .wait_for_clone(&image_id.to_string(), timeout)
            .await
    }

    /// Wait for backup to finish provisioning on a server.
    ///
    /// # Errors
    ///
    /// See [`ResourceWaiter::wait`].
    pub async fn wait_for_backup_deploy(
        &self,
        server_id: ServerId,
        timeout: Duration,
    ) -> Result<Box<dyn Resource>> {
        self.waiter
            .wait_for_backup_deploy(&server_id.to_string(), timeout)
            .await
    }

    /// Wait for a change to a server's backup configuration.
    ///
    /// # Errors
    ///
    /// See [`ResourceWaiter::wait`].
    pub async fn wait_for_backup_change(
        &self,
        server_id: ServerId,
        action: &str,
        timeout: Duration,
    ) -> Result<Box<dyn Resource>> {
        self.waiter
            .wait_for_backup_change(&server_id.to_string(), action, timeout)
            .await
    }

    /// Wait for backup to be removed from a server.
    ///
    /// # Errors
    ///
    /// See [`ResourceWaiter::wait`].
    pub async fn wait_for_backup_removal(&self, server_id: ServerId, timeout: Duration) -> Result<()> {
        self.waiter
            .wait_for_backup_removal(&server_id.to_string(), timeout)
            .await
    }

    /// Run an arbitrary wait request.
    ///
    /// # Errors
    ///
    /// See [`ResourceWaiter::wait`].
    pub async fn wait(&self, request: &WaitRequest) -> Result<Option<Box<dyn Resource>>> {
        self.waiter.wait(request).await
    }

    async fn get_json<T>(
        &self,
        description: &str,
        path: &str,
        query: Vec<(&'static str, String)>,
    ) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let response = self
            .inner
            .execute_with_retry(description, |_| {
                Ok(ApiRequest::get(path).with_query(query.clone()))
            })
            .await?;
        decode_response(&response)
    }

    async fn post_json<B>(&self, description: &str, path: &str, body: &B) -> Result<ApiResponse>
    where
        B: Serialize + ?Sized,
    {
        let response = self
            .inner
            .execute_with_retry(description, |_| ApiRequest::post(path).with_json(body))
            .await?;
        let api: ApiResponse = decode_response(&response)?;
        info!(
            operation = %api.operation,
            response_code = %api.response_code,
            request_id = api.request_id.as_deref().unwrap_or_default(),
            "{description}: {}",
            api.message
        );
        Ok(api)
    }
}

/// Decode a successful response, or map a CloudControl error document to [`Error`].
pub(crate) fn decode_response<T>(response: &RawResponse) -> Result<T>
where
    T: DeserializeOwned,
{
    if response.is_success() {
        return response.json();
    }
    Err(map_status_to_error(response))
}

fn map_status_to_error(response: &RawResponse) -> Error {
    let status = response.status;
    match response.json::<ApiResponse>() {
        Ok(api) if status == StatusCode::NOT_FOUND || api.response_code == RESOURCE_NOT_FOUND => {
            Error::NotFound(api.message)
        }
        Ok(api) => Error::Api {
            status: status.as_u16(),
            response_code: api.response_code,
            message: api.message,
        },
        Err(_) if status == StatusCode::NOT_FOUND => Error::NotFound(response.text()),
        Err(_) => Error::Api {
            status: status.as_u16(),
            response_code: status
                .canonical_reason()
                .unwrap_or("UNKNOWN")
                .to_uppercase()
                .replace(' ', "_"),
            message: response.text(),
        },
    }
}

fn created_id<T>(response: &ApiResponse, field: &str) -> Result<T>
where
    T: FromStr<Err = Error>,
{
    let value = response.info_value(field).ok_or_else(|| {
        Error::Parse(format!(
            "{} response did not include '{field}'",
            response.operation
        ))
    })?;
    value.parse()
}
