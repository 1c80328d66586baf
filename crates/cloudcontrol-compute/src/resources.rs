//! Resource trait implementations and fetch-by-id dispatch for the compute models.

use async_trait::async_trait;
use cloudcontrol_core::client::{ApiRequest, ServiceClient};
use cloudcontrol_core::{Error, Resource, ResourceFetcher, ResourceRegistry, ResourceType};
use serde::de::DeserializeOwned;
use std::any::Any;
use std::marker::PhantomData;
use tracing::debug;

use crate::client::decode_response;
use crate::models::{
    CustomerImage, FirewallRule, NetworkAdapter, NetworkDomain, OsImage, PublicIpBlock, Server,
    ServerAntiAffinityRule, SslCertificateChain, SslDomainCertificate, SslOffloadProfile,
    StaticRoute, VipNode, VipPool, VirtualListener, Vlan,
};
use crate::Result;

macro_rules! impl_resource {
    ($model:ty, $kind:expr) => {
        impl_resource!($model, $kind, |this| this.name.as_str());
    };
    ($model:ty, $kind:expr, |$this:ident| $name:expr) => {
        impl Resource for $model {
            fn id(&self) -> String {
                self.id.to_string()
            }

            fn name(&self) -> &str {
                let $this = self;
                $name
            }

            fn state(&self) -> &str {
                &self.state
            }

            fn resource_type(&self) -> ResourceType {
                $kind
            }

            fn as_any(&self) -> &dyn Any {
                self
            }
        }
    };
}

impl_resource!(NetworkDomain, ResourceType::NetworkDomain);
impl_resource!(Vlan, ResourceType::Vlan);
impl_resource!(
    ServerAntiAffinityRule,
    ResourceType::ServerAntiAffinityRule,
    |this| this.id.as_str()
);
impl_resource!(
    NetworkAdapter,
    ResourceType::NetworkAdapter,
    |this| this.vlan_name.as_str()
);
impl_resource!(
    PublicIpBlock,
    ResourceType::PublicIpBlock,
    |this| this.base_ip.as_str()
);
impl_resource!(FirewallRule, ResourceType::FirewallRule);
impl_resource!(VipNode, ResourceType::VipNode);
impl_resource!(VipPool, ResourceType::VipPool);
impl_resource!(VirtualListener, ResourceType::VirtualListener);
impl_resource!(OsImage, ResourceType::OsImage);
impl_resource!(CustomerImage, ResourceType::CustomerImage);
impl_resource!(SslDomainCertificate, ResourceType::SslDomainCertificate);
impl_resource!(SslCertificateChain, ResourceType::SslCertificateChain);
impl_resource!(SslOffloadProfile, ResourceType::SslOffloadProfile);
impl_resource!(StaticRoute, ResourceType::StaticRoute);

impl Resource for Server {
    fn id(&self) -> String {
        self.id.to_string()
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn state(&self) -> &str {
        &self.state
    }

    fn resource_type(&self) -> ResourceType {
        ResourceType::Server
    }

    fn backup_state(&self) -> Option<&str> {
        self.backup.as_ref().map(|backup| backup.state.as_str())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Fetches one resource type with `GET <api_path>/<id>`.
///
/// A 404 or a `RESOURCE_NOT_FOUND` response yields `Ok(None)`.
pub struct EndpointFetcher<T> {
    client: ServiceClient,
    resource_type: ResourceType,
    _model: PhantomData<fn() -> T>,
}

impl<T> EndpointFetcher<T> {
    /// Create a fetcher for the given resource type.
    #[must_use]
    pub fn new(client: ServiceClient, resource_type: ResourceType) -> Self {
        Self {
            client,
            resource_type,
            _model: PhantomData,
        }
    }
}

#[async_trait]
impl<T> ResourceFetcher for EndpointFetcher<T>
where
    T: Resource + DeserializeOwned + 'static,
{
    async fn fetch(&self, id: &str) -> Result<Option<Box<dyn Resource>>> {
        let path = format!("{}/{id}", self.resource_type.api_path());
        let description = format!("Get {} '{id}'", self.resource_type.name());

        let response = self
            .client
            .execute_with_retry(&description, |_| Ok(ApiRequest::get(path.as_str())))
            .await?;

        match decode_response::<T>(&response) {
            Ok(resource) => Ok(Some(Box::new(resource))),
            Err(Error::NotFound(message)) => {
                debug!(resource_type = %self.resource_type, id, %message, "resource not found");
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }
}

/// Build the registry covering every compute resource type.
#[must_use]
pub fn registry(client: &ServiceClient) -> ResourceRegistry {
    let mut registry = ResourceRegistry::new();
    registry
        .register(
            ResourceType::NetworkDomain,
            EndpointFetcher::<NetworkDomain>::new(client.clone(), ResourceType::NetworkDomain),
        )
        .register(
            ResourceType::Vlan,
            EndpointFetcher::<Vlan>::new(client.clone(), ResourceType::Vlan),
        )
        .register(
            ResourceType::Server,
            EndpointFetcher::<Server>::new(client.clone(), ResourceType::Server),
        )
        .register(
            ResourceType::ServerAntiAffinityRule,
            EndpointFetcher::<ServerAntiAffinityRule>::new(
                client.clone(),
                ResourceType::ServerAntiAffinityRule,
            ),
        )
        .register(
            ResourceType::NetworkAdapter,
            EndpointFetcher::<NetworkAdapter>::new(client.clone(), ResourceType::NetworkAdapter),
        )
        .register(
            ResourceType::PublicIpBlock,
            EndpointFetcher::<PublicIpBlock>::new(client.clone(), ResourceType::PublicIpBlock),
        )
        .register(
            ResourceType::FirewallRule,
            EndpointFetcher::<FirewallRule>::new(client.clone(), ResourceType::FirewallRule),
        )
        .register(
            ResourceType::VipNode,
            EndpointFetcher::<VipNode>::new(client.clone(), ResourceType::VipNode),
        )
        .register(
            ResourceType::VipPool,
            EndpointFetcher::<VipPool>::new(client.clone(), ResourceType::VipPool),
        )
        .register(
            ResourceType::VirtualListener,
            EndpointFetcher::<VirtualListener>::new(client.clone(), ResourceType::VirtualListener),
        )
        .register(
            ResourceType::OsImage,
            EndpointFetcher::<OsImage>::new(client.clone(), ResourceType::OsImage),
        )
        .register(
            ResourceType::CustomerImage,
            EndpointFetcher::<CustomerImage>::new(client.clone(), ResourceType::CustomerImage),
        )
        .register(
            ResourceType::SslDomainCertificate,
            EndpointFetcher::<SslDomainCertificate>::new(
                client.clone(),
                ResourceType::SslDomainCertificate,
            ),
        )
        .register(
            ResourceType::SslCertificateChain,
            EndpointFetcher::<SslCertificateChain>::new(
                client.clone(),
                ResourceType::SslCertificateChain,
            ),
        )
        .register(
            ResourceType::SslOffloadProfile,
            EndpointFetcher::<SslOffloadProfile>::new(
                client.clone(),
                ResourceType::SslOffloadProfile,
            ),
        )
        .register(
            ResourceType::StaticRoute,
            EndpointFetcher::<StaticRoute>::new(client.clone(), ResourceType::StaticRoute),
        );
    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use cloudcontrol_core::client::ServiceClientBuilder;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const ORG: &str = "8cdfd607-f429-4df6-9352-162cfc0891be";
    const RULE_ID: &str = "6e2a6c38-1a83-4e2a-b3b5-8a2d3a3f1c1e";

    fn service(server: &MockServer) -> ServiceClient {
        ServiceClientBuilder::new(server.uri(), Duration::from_secs(5))
            .unwrap()
            .with_organization_id(ORG)
            .build()
            .unwrap()
    }

    #[test]
    fn registry_covers_every_resource_type() {
        let client = ServiceClientBuilder::new("http://localhost:1", Duration::from_secs(1))
            .unwrap()
            .build()
            .unwrap();
        let registry = registry(&client);
        assert_eq!(registry.registered_types(), ResourceType::all().to_vec());
    }

    #[tokio::test]
    async fn fetcher_returns_typed_resource() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("/caas/2.4/{ORG}/network/firewallRule/{RULE_ID}").as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": RULE_ID,
                "name": "allow_https",
                "action": "ACCEPT_DECISIVELY",
                "ipVersion": "IPV4",
                "protocol": "TCP",
                "enabled": true,
                "state": "PENDING_ADD"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let fetcher =
            EndpointFetcher::<FirewallRule>::new(service(&server), ResourceType::FirewallRule);
        let resource = fetcher.fetch(RULE_ID).await.unwrap().unwrap();

        assert_eq!(resource.id(), RULE_ID);
        assert_eq!(resource.name(), "allow_https");
        assert_eq!(resource.state(), "PENDING_ADD");
        let rule = resource.downcast_ref::<FirewallRule>().unwrap();
        assert_eq!(rule.protocol, "TCP");
    }

    #[tokio::test]
    async fn fetcher_maps_missing_resource_to_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "operation": "GET_FIREWALL_RULE",
                "responseCode": "RESOURCE_NOT_FOUND",
                "message": "Firewall Rule not found."
            })))
            .mount(&server)
            .await;

        let fetcher =
            EndpointFetcher::<FirewallRule>::new(service(&server), ResourceType::FirewallRule);
        assert!(fetcher.fetch(RULE_ID).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn fetcher_propagates_api_errors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "operation": "GET_SERVER",
                "responseCode": "UNAUTHORIZED",
                "message": "Authentication failed."
            })))
            .mount(&server)
            .await;

        let fetcher = EndpointFetcher::<Server>::new(service(&server), ResourceType::Server);
        let err = fetcher.fetch("srv").await.unwrap_err();
        assert!(matches!(err, Error::Api { status: 401, .. }));
    }

    #[test]
    fn server_exposes_backup_state() {
        let server: Server = serde_json::from_value(json!({
            "id": "5b00a2ab-c665-4cd6-8291-0b931374fb3d",
            "name": "web01",
            "backup": {"assetId": "a", "servicePlan": "Essentials", "state": "PENDING_ADD"},
            "state": "NORMAL"
        }))
        .unwrap();

        assert_eq!(server.backup_state(), Some("PENDING_ADD"));
        assert_eq!(server.resource_type(), ResourceType::Server);
    }
}
