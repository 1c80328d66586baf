//! CloudControl compute client and data models.
//!
//! Provides typed structures and an asynchronous client for the network domain, VLAN, server,
//! firewall and public IP operations of the CloudControl CaaS API, plus the fetchers that let
//! the core poller wait on any compute resource.

#![deny(missing_docs)]

pub mod client;
pub mod models;
pub mod resources;

pub use client::{ComputeClient, ComputeClientBuilder};
pub use models::{
    ApiResponse, CloneServer, CreateFirewallRule, CustomerImage, DeployNetworkDomain,
    DeployServer, DeployVlan, EditNetworkDomain, EditVlan, FirewallRule, ListParams,
    NetworkDomain, NetworkDomains, PublicIpBlock, Server, Servers, Vlan, Vlans,
};
pub use resources::EndpointFetcher;

/// Convenient result alias that reuses the shared CloudControl error type.
pub type Result<T> = cloudcontrol_core::Result<T>;
