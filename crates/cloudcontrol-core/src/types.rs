//! Core CloudControl domain types.
//!
//! This module provides the closed set of resource types the wait machinery understands, the
//! server-defined resource states it classifies, and the regional API endpoints.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::{Error, Result};

/// Resource types that can be fetched by id and waited on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceType {
    /// Network domain
    NetworkDomain,
    /// VLAN
    Vlan,
    /// Server
    Server,
    /// Server anti-affinity rule
    ServerAntiAffinityRule,
    /// Network adapter (NIC)
    NetworkAdapter,
    /// Public IPv4 address block
    PublicIpBlock,
    /// Firewall rule
    FirewallRule,
    /// Load-balancer node
    VipNode,
    /// Load-balancer pool
    VipPool,
    /// Load-balancer virtual listener
    VirtualListener,
    /// Provider-supplied OS image
    OsImage,
    /// Customer-owned image
    CustomerImage,
    /// SSL domain certificate
    SslDomainCertificate,
    /// SSL certificate chain
    SslCertificateChain,
    /// SSL offload profile
    SslOffloadProfile,
    /// Static route
    StaticRoute,
}

impl ResourceType {
    /// Returns the human-readable kind used in log and error messages.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::NetworkDomain => "network domain",
            Self::Vlan => "VLAN",
            Self::Server => "server",
            Self::ServerAntiAffinityRule => "server anti-affinity rule",
            Self::NetworkAdapter => "network adapter",
            Self::PublicIpBlock => "public IPv4 address block",
            Self::FirewallRule => "firewall rule",
            Self::VipNode => "VIP node",
            Self::VipPool => "VIP pool",
            Self::VirtualListener => "virtual listener",
            Self::OsImage => "OS image",
            Self::CustomerImage => "customer image",
            Self::SslDomainCertificate => "SSL domain certificate",
            Self::SslCertificateChain => "SSL certificate chain",
            Self::SslOffloadProfile => "SSL offload profile",
            Self::StaticRoute => "static route",
        }
    }

    /// Returns the CaaS path (relative to the organization root) used to fetch one resource.
    #[must_use]
    pub const fn api_path(&self) -> &'static str {
        match self {
            Self::NetworkDomain => "network/networkDomain",
            Self::Vlan => "network/vlan",
            Self::Server => "server/server",
            Self::ServerAntiAffinityRule => "server/antiAffinityRule",
            Self::NetworkAdapter => "server/nic",
            Self::PublicIpBlock => "network/publicIpBlock",
            Self::FirewallRule => "network/firewallRule",
            Self::VipNode => "networkDomainVip/node",
            Self::VipPool => "networkDomainVip/pool",
            Self::VirtualListener => "networkDomainVip/virtualListener",
            Self::OsImage => "image/osImage",
            Self::CustomerImage => "image/customerImage",
            Self::SslDomainCertificate => "networkDomainVip/sslDomainCertificate",
            Self::SslCertificateChain => "networkDomainVip/sslCertificateChain",
            Self::SslOffloadProfile => "networkDomainVip/sslOffloadProfile",
            Self::StaticRoute => "network/staticRoute",
        }
    }

    /// Returns all resource types.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::NetworkDomain,
            Self::Vlan,
            Self::Server,
            Self::ServerAntiAffinityRule,
            Self::NetworkAdapter,
            Self::PublicIpBlock,
            Self::FirewallRule,
            Self::VipNode,
            Self::VipPool,
            Self::VirtualListener,
            Self::OsImage,
            Self::CustomerImage,
            Self::SslDomainCertificate,
            Self::SslCertificateChain,
            Self::SslOffloadProfile,
            Self::StaticRoute,
        ]
    }
}

impl FromStr for ResourceType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let normalized: String = s
            .chars()
            .filter(|c| !matches!(c, ' ' | '_' | '-'))
            .collect::<String>()
            .to_lowercase();

        Self::all()
            .iter()
            .copied()
            .find(|kind| {
                let candidate: String = kind
                    .name()
                    .chars()
                    .filter(|c| *c != ' ')
                    .collect::<String>()
                    .to_lowercase();
                candidate == normalized || format!("{kind:?}").to_lowercase() == normalized
            })
            .ok_or_else(|| Error::InvalidRequest(format!("Unknown resource type: {s}")))
    }
}

impl std::fmt::Display for ResourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Resource states the poller distinguishes.
///
/// The server may report other values; those are treated as failures by the poller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResourceState {
    /// Settled; no operation in progress
    Normal,
    /// Deployment in progress
    PendingAdd,
    /// Modification in progress
    PendingChange,
    /// Deletion in progress
    PendingDelete,
}

impl ResourceState {
    /// Returns the wire representation of the state.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "NORMAL",
            Self::PendingAdd => "PENDING_ADD",
            Self::PendingChange => "PENDING_CHANGE",
            Self::PendingDelete => "PENDING_DELETE",
        }
    }

    /// Parses a server-reported state. Unknown values yield `None`.
    #[must_use]
    pub fn parse(state: &str) -> Option<Self> {
        match state {
            "NORMAL" => Some(Self::Normal),
            "PENDING_ADD" => Some(Self::PendingAdd),
            "PENDING_CHANGE" => Some(Self::PendingChange),
            "PENDING_DELETE" => Some(Self::PendingDelete),
            _ => None,
        }
    }

    /// Returns true for the in-progress states.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        !matches!(self, Self::Normal)
    }
}

impl std::fmt::Display for ResourceState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Regions with a public CloudControl endpoint.
pub const REGIONS: &[&str] = &["AU", "NA", "EU", "AF", "AP", "SA", "CA", "IL"];

/// Returns the base URL for a region code (case-insensitive).
///
/// # Errors
///
/// Returns an error if the region code is not recognised.
pub fn region_base_url(region: &str) -> Result<String> {
    let code = region.trim().to_uppercase();
    if REGIONS.contains(&code.as_str()) {
        Ok(format!(
            "https://api-{}.dimensiondata.com",
            code.to_lowercase()
        ))
    } else {
        Err(Error::ConfigError(format!("Unknown region: {region}")))
    }
}
