//! CloudControl compute models shared by the client and the resource fetchers.
//!
//! Field names follow the CaaS 2.x JSON documents (camelCase). Optional fields use
//! `#[serde(default)]` so partial documents from older API versions still parse.

use chrono::{DateTime, Utc};
use cloudcontrol_core::query::{Paging, QueryParams};
use cloudcontrol_core::uuid::{
    FirewallRuleId, ImageId, NetworkDomainId, PublicIpBlockId, ServerId, VlanId,
};
use cloudcontrol_core::ResourceState;
use serde::{Deserialize, Serialize};

/// Response code CloudControl uses when a lookup matches nothing.
pub const RESOURCE_NOT_FOUND: &str = "RESOURCE_NOT_FOUND";

/// Response code for an accepted asynchronous operation.
pub const IN_PROGRESS: &str = "IN_PROGRESS";

/// Name/value pair carried in the `info`, `warning` and `error` lists of an [`ApiResponse`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NameValuePair {
    /// Name
    pub name: String,
    /// Value
    pub value: String,
}

/// Standard response document returned by mutating CloudControl operations and by errors.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse {
    /// Operation name (e.g. `DEPLOY_NETWORK_DOMAIN`).
    #[serde(default)]
    pub operation: String,
    /// Response code (e.g. `IN_PROGRESS`, `OK`, `RESOURCE_NOT_FOUND`).
    pub response_code: String,
    /// Human-readable message.
    #[serde(default)]
    pub message: String,
    /// Additional information, such as the id of a newly created resource.
    #[serde(default)]
    pub info: Vec<NameValuePair>,
    /// Warnings.
    #[serde(default)]
    pub warning: Vec<NameValuePair>,
    /// Errors.
    #[serde(default)]
    pub error: Vec<NameValuePair>,
    /// Request id, useful when contacting support.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

impl ApiResponse {
    /// Look up a value in the `info` list.
    #[must_use]
    pub fn info_value(&self, name: &str) -> Option<&str> {
        self.info
            .iter()
            .find(|pair| pair.name == name)
            .map(|pair| pair.value.as_str())
    }

    /// Returns true if the operation was accepted and is running asynchronously.
    #[must_use]
    pub fn is_in_progress(&self) -> bool {
        self.response_code == IN_PROGRESS
    }
}

/// Paging and filter parameters shared by the list endpoints.
#[derive(Debug, Default, Clone)]
pub struct ListParams {
    /// Page selection.
    pub paging: Option<Paging>,
    /// Filter by data center (e.g. `AU9`).
    pub datacenter_id: Option<String>,
    /// Filter by network domain.
    pub network_domain_id: Option<NetworkDomainId>,
    /// Filter by exact name.
    pub name: Option<String>,
    /// Filter by state.
    pub state: Option<ResourceState>,
}

impl ListParams {
    /// Restrict the listing to one network domain.
    #[must_use]
    pub fn in_network_domain(network_domain_id: NetworkDomainId) -> Self {
        Self {
            network_domain_id: Some(network_domain_id),
            ..Self::default()
        }
    }

    /// Convert the parameters into URL query pairs.
    #[must_use]
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut params = QueryParams::new();
        params.push_opt("datacenterId", self.datacenter_id.as_deref());
        params.push_opt("networkDomainId", self.network_domain_id.as_ref());
        params.push_opt("name", self.name.as_deref());
        params.push_opt("state", self.state);
        params.push_paging(self.paging.as_ref());

        params.into_pairs()
    }
}

/// Paging metadata attached to list responses.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    /// Current page (1-based).
    #[serde(default)]
    pub page_number: u32,
    /// Number of items on this page.
    #[serde(default)]
    pub page_count: u32,
    /// Total number of matching items.
    #[serde(default)]
    pub total_count: u32,
    /// Requested page size.
    #[serde(default)]
    pub page_size: u32,
}

impl PageInfo {
    /// Returns true if further pages exist after this one.
    #[must_use]
    pub fn has_more(&self) -> bool {
        u64::from(self.page_number) * u64::from(self.page_size) < u64::from(self.total_count)
    }
}

macro_rules! paged_list {
    ($name:ident, $item:ty, $field:literal, $doc:literal) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
        pub struct $name {
            /// Items on this page.
            #[serde(rename = $field, default)]
            pub items: Vec<$item>,
            /// Paging metadata.
            #[serde(flatten)]
            pub page: PageInfo,
        }
    };
}

/// Reference to a related entity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EntityReference {
    /// Entity id.
    pub id: String,
    /// Entity name, when the API includes it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// IPv4 or IPv6 address range.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct IpRange {
    /// Base address.
    pub address: String,
    /// Prefix length.
    pub prefix_size: u8,
}

/// A network domain (the container for VLANs, firewall rules and public IPs).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NetworkDomain {
    /// Network domain id.
    pub id: NetworkDomainId,
    /// Name.
    pub name: String,
    /// Description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Service level (`ESSENTIALS` or `ADVANCED`).
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub domain_type: Option<String>,
    /// Source NAT address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snat_ipv4_address: Option<String>,
    /// Outside transit VLAN subnet.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outside_transit_vlan_ipv4_subnet: Option<IpRange>,
    /// Creation time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_time: Option<DateTime<Utc>>,
    /// Data center id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datacenter_id: Option<String>,
    /// Server-reported state.
    pub state: String,
}

paged_list!(
    NetworkDomains,
    NetworkDomain,
    "networkDomain",
    "A page of network domains."
);

/// A VLAN within a network domain.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Vlan {
    /// VLAN id.
    pub id: VlanId,
    /// Name.
    pub name: String,
    /// Description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Owning network domain.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network_domain: Option<EntityReference>,
    /// Private IPv4 range.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_ipv4_range: Option<IpRange>,
    /// IPv6 range.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ipv6_range: Option<IpRange>,
    /// IPv4 gateway.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ipv4_gateway_address: Option<String>,
    /// IPv6 gateway.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ipv6_gateway_address: Option<String>,
    /// Creation time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_time: Option<DateTime<Utc>>,
    /// Data center id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datacenter_id: Option<String>,
    /// Server-reported state.
    pub state: String,
}

paged_list!(Vlans, Vlan, "vlan", "A page of VLANs.");

/// Operating system descriptor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OperatingSystem {
    /// Operating system id (e.g. `UBUNTU1664`).
    pub id: String,
    /// Display name.
    #[serde(default)]
    pub display_name: String,
    /// Family (`UNIX` or `WINDOWS`).
    #[serde(default)]
    pub family: String,
}

/// CPU configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Cpu {
    /// Number of vCPUs.
    pub count: u32,
    /// CPU speed class (`STANDARD`, `HIGHPERFORMANCE`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<String>,
    /// Cores per socket.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cores_per_socket: Option<u32>,
}

/// A virtual disk.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Disk {
    /// Disk id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// SCSI unit id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scsi_id: Option<u8>,
    /// Size in GB.
    pub size_gb: u32,
    /// Storage tier (`STANDARD`, `HIGHPERFORMANCE`, `ECONOMY`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<String>,
    /// Disk state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

/// A network adapter attached to a server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NetworkAdapter {
    /// Adapter id.
    pub id: String,
    /// Private IPv4 address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_ipv4: Option<String>,
    /// IPv6 address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ipv6: Option<String>,
    /// Attached VLAN id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vlan_id: Option<String>,
    /// Attached VLAN name.
    #[serde(default)]
    pub vlan_name: String,
    /// Adapter model (e.g. `VMXNET3`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network_adapter: Option<String>,
    /// Server-reported state.
    pub state: String,
}

/// Server network configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ServerNetworkInfo {
    /// Network domain id.
    pub network_domain_id: String,
    /// Primary adapter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_nic: Option<NetworkAdapter>,
    /// Additional adapters.
    #[serde(default)]
    pub additional_nic: Vec<NetworkAdapter>,
}

/// Cloud backup configuration attached to a server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ServerBackup {
    /// Backup asset id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_id: Option<String>,
    /// Service plan (`Essentials`, `Advanced`, `Enterprise`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_plan: Option<String>,
    /// Backup state.
    pub state: String,
}

/// A server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Server {
    /// Server id.
    pub id: ServerId,
    /// Name.
    pub name: String,
    /// Description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Data center id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datacenter_id: Option<String>,
    /// Operating system.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operating_system: Option<OperatingSystem>,
    /// CPU configuration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu: Option<Cpu>,
    /// Memory in GB.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory_gb: Option<u32>,
    /// Disks.
    #[serde(default)]
    pub disk: Vec<Disk>,
    /// Network configuration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network_info: Option<ServerNetworkInfo>,
    /// Cloud backup configuration, when backup is enabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backup: Option<ServerBackup>,
    /// Image the server was deployed from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_image_id: Option<String>,
    /// Creation time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_time: Option<DateTime<Utc>>,
    /// Whether deployment has finished.
    #[serde(default)]
    pub deployed: bool,
    /// Whether the server is running.
    #[serde(default)]
    pub started: bool,
    /// Server-reported state.
    pub state: String,
}

paged_list!(Servers, Server, "server", "A page of servers.");

/// Summary of a server referenced by an anti-affinity rule.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServerSummary {
    /// Server id.
    pub id: String,
    /// Server name.
    #[serde(default)]
    pub name: String,
}

/// A rule that keeps two servers on different hosts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ServerAntiAffinityRule {
    /// Rule id.
    pub id: String,
    /// Servers covered by the rule.
    #[serde(default)]
    pub server_summary: Vec<ServerSummary>,
    /// Network domain id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network_domain_id: Option<String>,
    /// Creation time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_time: Option<DateTime<Utc>>,
    /// Server-reported state.
    pub state: String,
}

/// A block of public IPv4 addresses reserved for a network domain.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PublicIpBlock {
    /// Block id.
    pub id: PublicIpBlockId,
    /// Network domain id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network_domain_id: Option<String>,
    /// First address in the block.
    pub base_ip: String,
    /// Number of addresses.
    #[serde(default)]
    pub size: u32,
    /// Creation time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_time: Option<DateTime<Utc>>,
    /// Data center id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datacenter_id: Option<String>,
    /// Server-reported state.
    pub state: String,
}

/// Address part of a firewall rule endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FirewallAddress {
    /// Address, or `ANY`.
    pub address: String,
    /// Prefix length for network addresses.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix_size: Option<u8>,
}

/// Port part of a firewall rule endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FirewallPort {
    /// First port.
    pub begin: u16,
    /// Last port of a range.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<u16>,
}

/// Source or destination of a firewall rule.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FirewallEndpoint {
    /// Address match.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip: Option<FirewallAddress>,
    /// Port match.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<FirewallPort>,
}

impl FirewallEndpoint {
    /// Match any address and port.
    #[must_use]
    pub fn any() -> Self {
        Self {
            ip: Some(FirewallAddress {
                address: "ANY".to_string(),
                prefix_size: None,
            }),
            port: None,
        }
    }
}

/// A firewall rule.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FirewallRule {
    /// Rule id.
    pub id: FirewallRuleId,
    /// Network domain id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network_domain_id: Option<String>,
    /// Name.
    pub name: String,
    /// `ACCEPT_DECISIVELY` or `DROP`.
    pub action: String,
    /// `IPV4` or `IPV6`.
    pub ip_version: String,
    /// `IP`, `ICMP`, `TCP` or `UDP`.
    pub protocol: String,
    /// Source match.
    #[serde(default)]
    pub source: FirewallEndpoint,
    /// Destination match.
    #[serde(default)]
    pub destination: FirewallEndpoint,
    /// Whether the rule is enabled.
    #[serde(default)]
    pub enabled: bool,
    /// `CLIENT_RULE` or `DEFAULT_RULE`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule_type: Option<String>,
    /// Data center id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datacenter_id: Option<String>,
    /// Server-reported state.
    pub state: String,
}

/// A load-balancer node.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VipNode {
    /// Node id.
    pub id: String,
    /// Network domain id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network_domain_id: Option<String>,
    /// Name.
    pub name: String,
    /// Description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// IPv4 address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ipv4_address: Option<String>,
    /// IPv6 address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ipv6_address: Option<String>,
    /// Node status (`ENABLED`, `DISABLED`, `FORCED_OFFLINE`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Connection limit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection_limit: Option<u32>,
    /// Connection rate limit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection_rate_limit: Option<u32>,
    /// Creation time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_time: Option<DateTime<Utc>>,
    /// Data center id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datacenter_id: Option<String>,
    /// Server-reported state.
    pub state: String,
}

/// A load-balancer pool.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VipPool {
    /// Pool id.
    pub id: String,
    /// Network domain id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network_domain_id: Option<String>,
    /// Name.
    pub name: String,
    /// Description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Load-balancing method.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub load_balance_method: Option<String>,
    /// Action when a member goes down.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_down_action: Option<String>,
    /// Slow ramp time in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slow_ramp_time: Option<u32>,
    /// Health monitors.
    #[serde(default)]
    pub health_monitor: Vec<EntityReference>,
    /// Creation time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_time: Option<DateTime<Utc>>,
    /// Data center id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datacenter_id: Option<String>,
    /// Server-reported state.
    pub state: String,
}

/// A load-balancer virtual listener.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VirtualListener {
    /// Listener id.
    pub id: String,
    /// Network domain id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network_domain_id: Option<String>,
    /// Name.
    pub name: String,
    /// Description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Whether the listener is enabled.
    #[serde(default)]
    pub enabled: bool,
    /// Listener address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub listener_ip_address: Option<String>,
    /// Listener port.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    /// Protocol.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
    /// `STANDARD` or `PERFORMANCE_LAYER_4`.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub listener_type: Option<String>,
    /// Default pool.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pool: Option<EntityReference>,
    /// Creation time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_time: Option<DateTime<Utc>>,
    /// Data center id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datacenter_id: Option<String>,
    /// Server-reported state.
    pub state: String,
}

/// A provider-supplied operating system image.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OsImage {
    /// Image id.
    pub id: ImageId,
    /// Name.
    pub name: String,
    /// Description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Data center id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datacenter_id: Option<String>,
    /// Operating system.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operating_system: Option<OperatingSystem>,
    /// Default CPU configuration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu: Option<Cpu>,
    /// Default memory in GB.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory_gb: Option<u32>,
    /// Disks.
    #[serde(default)]
    pub disk: Vec<Disk>,
    /// Creation time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_time: Option<DateTime<Utc>>,
    /// Server-reported state.
    pub state: String,
}

/// A customer image, such as the result of cloning a server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CustomerImage {
    /// Image id.
    pub id: ImageId,
    /// Name.
    pub name: String,
    /// Description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Data center id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datacenter_id: Option<String>,
    /// Operating system.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operating_system: Option<OperatingSystem>,
    /// Default CPU configuration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu: Option<Cpu>,
    /// Default memory in GB.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory_gb: Option<u32>,
    /// Disks.
    #[serde(default)]
    pub disk: Vec<Disk>,
    /// Creation time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_time: Option<DateTime<Utc>>,
    /// Server-reported state.
    pub state: String,
}

/// An SSL certificate installed for a load-balancer domain.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SslDomainCertificate {
    /// Certificate id.
    pub id: String,
    /// Network domain id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network_domain_id: Option<String>,
    /// Name.
    pub name: String,
    /// Description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Expiry time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry_time: Option<DateTime<Utc>>,
    /// Creation time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_time: Option<DateTime<Utc>>,
    /// Data center id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datacenter_id: Option<String>,
    /// Server-reported state.
    pub state: String,
}

/// An intermediate certificate chain for SSL offload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SslCertificateChain {
    /// Chain id.
    pub id: String,
    /// Network domain id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network_domain_id: Option<String>,
    /// Name.
    pub name: String,
    /// Description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Expiry time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry_time: Option<DateTime<Utc>>,
    /// Creation time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_time: Option<DateTime<Utc>>,
    /// Data center id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datacenter_id: Option<String>,
    /// Server-reported state.
    pub state: String,
}

/// An SSL offload profile combining a certificate, a chain and a cipher list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SslOffloadProfile {
    /// Profile id.
    pub id: String,
    /// Network domain id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network_domain_id: Option<String>,
    /// Name.
    pub name: String,
    /// Description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Domain certificate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssl_domain_certificate: Option<EntityReference>,
    /// Certificate chain.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssl_certificate_chain: Option<EntityReference>,
    /// Cipher string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ciphers: Option<String>,
    /// Creation time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_time: Option<DateTime<Utc>>,
    /// Data center id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datacenter_id: Option<String>,
    /// Server-reported state.
    pub state: String,
}

/// A static route within a network domain.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StaticRoute {
    /// Route id.
    pub id: String,
    /// Network domain id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network_domain_id: Option<String>,
    /// Name.
    pub name: String,
    /// Description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// `IPV4` or `IPV6`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_version: Option<String>,
    /// Destination network.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination_network_address: Option<String>,
    /// Destination prefix length.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination_prefix_size: Option<u8>,
    /// Next hop.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_hop_address: Option<String>,
    /// `CLIENT` or `SYSTEM`.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub route_type: Option<String>,
    /// Creation time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_time: Option<DateTime<Utc>>,
    /// Data center id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datacenter_id: Option<String>,
    /// Server-reported state.
    pub state: String,
}

/// Request body for operations that take only an id (deletes, removals).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IdRequest {
    /// Target id.
    pub id: String,
}

impl IdRequest {
    /// Wrap an id.
    #[must_use]
    pub fn new(id: impl ToString) -> Self {
        Self { id: id.to_string() }
    }
}

/// Request body for `deployNetworkDomain`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DeployNetworkDomain {
    /// Target data center (e.g. `AU9`).
    pub datacenter_id: String,
    /// Name.
    pub name: String,
    /// Description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Service level (`ESSENTIALS` or `ADVANCED`).
    #[serde(rename = "type")]
    pub domain_type: String,
}

/// Request body for `editNetworkDomain`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EditNetworkDomain {
    /// Network domain id.
    pub id: NetworkDomainId,
    /// New name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// New service level.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub domain_type: Option<String>,
}

/// Request body for `deployVlan`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DeployVlan {
    /// Owning network domain.
    pub network_domain_id: NetworkDomainId,
    /// Name.
    pub name: String,
    /// Description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Base address of the private IPv4 range.
    pub private_ipv4_base_address: String,
    /// Prefix length of the private IPv4 range (defaults to 24 server-side).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_ipv4_prefix_size: Option<u8>,
}

/// Request body for `editVlan`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EditVlan {
    /// VLAN id.
    pub id: VlanId,
    /// New name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Adapter specification used when deploying a server.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DeployNic {
    /// VLAN to attach to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vlan_id: Option<VlanId>,
    /// Fixed private IPv4 address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_ipv4: Option<String>,
}

/// Network configuration used when deploying a server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DeployNetworkInfo {
    /// Network domain id.
    pub network_domain_id: NetworkDomainId,
    /// Primary adapter.
    pub primary_nic: DeployNic,
    /// Additional adapters.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub additional_nic: Vec<DeployNic>,
}

/// Request body for `deployServer`.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DeployServer {
    /// Name.
    pub name: String,
    /// Description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Source image.
    pub image_id: ImageId,
    /// Start the server once deployed.
    pub start: bool,
    /// Initial administrator password.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub administrator_password: Option<String>,
    /// Network configuration.
    pub network_info: DeployNetworkInfo,
    /// CPU override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu: Option<Cpu>,
    /// Memory override in GB.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory_gb: Option<u32>,
    /// Primary DNS server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_dns: Option<String>,
    /// Secondary DNS server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary_dns: Option<String>,
}

impl std::fmt::Debug for DeployServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeployServer")
            .field("name", &self.name)
            .field("image_id", &self.image_id)
            .field("start", &self.start)
            .field(
                "administrator_password",
                &self.administrator_password.as_ref().map(|_| "[REDACTED]"),
            )
            .field("network_info", &self.network_info)
            .finish_non_exhaustive()
    }
}

/// Request body for `cloneServer`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CloneServer {
    /// Server to clone.
    pub id: ServerId,
    /// Name of the resulting customer image.
    pub image_name: String,
    /// Image description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Apply guest OS customization when deploying from the image.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guest_os_customization: Option<bool>,
}

/// Request body for `enableBackup`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EnableServerBackup {
    /// Server id.
    pub server_id: ServerId,
    /// Service plan (`Essentials`, `Advanced`, `Enterprise`).
    pub service_plan: String,
}

/// Request body for `disableBackup`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DisableServerBackup {
    /// Server id.
    pub server_id: ServerId,
}

/// Position of a new firewall rule.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Placement {
    /// `FIRST`, `LAST`, `BEFORE` or `AFTER`.
    pub position: String,
    /// Name of the rule to position relative to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relative_to_rule: Option<String>,
}

impl Default for Placement {
    fn default() -> Self {
        Self {
            position: "LAST".to_string(),
            relative_to_rule: None,
        }
    }
}

/// Request body for `createFirewallRule`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CreateFirewallRule {
    /// Network domain id.
    pub network_domain_id: NetworkDomainId,
    /// Name.
    pub name: String,
    /// `ACCEPT_DECISIVELY` or `DROP`.
    pub action: String,
    /// `IPV4` or `IPV6`.
    pub ip_version: String,
    /// `IP`, `ICMP`, `TCP` or `UDP`.
    pub protocol: String,
    /// Source match.
    pub source: FirewallEndpoint,
    /// Destination match.
    pub destination: FirewallEndpoint,
    /// Whether the rule starts enabled.
    pub enabled: bool,
    /// Rule position.
    pub placement: Placement,
}

/// Request body for `addPublicIpBlock`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AddPublicIpBlock {
    /// Network domain id.
    pub network_domain_id: NetworkDomainId,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn api_response_info_lookup() {
        let response: ApiResponse = serde_json::from_value(json!({
            "operation": "DEPLOY_VLAN",
            "responseCode": "IN_PROGRESS",
            "message": "Request to deploy VLAN has been accepted.",
            "info": [{"name": "vlanId", "value": "0e56433f-d808-4669-821d-812769517ff8"}],
            "requestId": "au_20160926T012738185+0000_e7e3c0bd"
        }))
        .unwrap();

        assert!(response.is_in_progress());
        assert_eq!(
            response.info_value("vlanId"),
            Some("0e56433f-d808-4669-821d-812769517ff8")
        );
        assert_eq!(response.info_value("serverId"), None);
        assert!(response.error.is_empty());
    }

    #[test]
    fn list_params_to_pairs() {
        let domain = NetworkDomainId::new_v4();
        let params = ListParams {
            paging: Some(Paging::page(1, 50)),
            state: Some(ResourceState::Normal),
            ..ListParams::in_network_domain(domain)
        };

        assert_eq!(
            params.to_pairs(),
            vec![
                ("networkDomainId", domain.to_string()),
                ("state", "NORMAL".to_string()),
                ("pageNumber", "1".to_string()),
                ("pageSize", "50".to_string()),
            ]
        );
        assert!(ListParams::default().to_pairs().is_empty());
    }

    #[test]
    fn paged_list_uses_type_specific_field() {
        let page: Vlans = serde_json::from_value(json!({
            "vlan": [{
                "id": "0e56433f-d808-4669-821d-812769517ff8",
                "name": "web",
                "privateIpv4Range": {"address": "10.0.3.0", "prefixSize": 24},
                "state": "NORMAL"
            }],
            "pageNumber": 1,
            "pageCount": 1,
            "totalCount": 3,
            "pageSize": 1
        }))
        .unwrap();

        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].private_ipv4_range.as_ref().unwrap().prefix_size, 24);
        assert!(page.page.has_more());
    }

    #[test]
    fn deploy_server_serializes_camel_case() {
        let request = DeployServer {
            name: "web01".to_string(),
            description: None,
            image_id: ImageId::new_v4(),
            start: true,
            administrator_password: Some("P@ssw0rd".to_string()),
            network_info: DeployNetworkInfo {
                network_domain_id: NetworkDomainId::new_v4(),
                primary_nic: DeployNic {
                    vlan_id: Some(VlanId::new_v4()),
                    private_ipv4: None,
                },
                additional_nic: Vec::new(),
            },
            cpu: None,
            memory_gb: Some(4),
            primary_dns: None,
            secondary_dns: None,
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["memoryGb"], 4);
        assert!(value["networkInfo"]["primaryNic"]["vlanId"].is_string());
        assert!(value.get("additionalNic").is_none());
        assert!(!format!("{request:?}").contains("P@ssw0rd"));
    }

    #[test]
    fn firewall_endpoint_any() {
        let value = serde_json::to_value(FirewallEndpoint::any()).unwrap();
        assert_eq!(value, json!({"ip": {"address": "ANY"}}));
    }
}
