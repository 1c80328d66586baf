//! Integration tests for parsing CloudControl compute documents.

use cloudcontrol_compute::models::{ApiResponse, NetworkDomains, Server};
use cloudcontrol_core::{Resource, ResourceType};
use std::fs;
use std::path::PathBuf;

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

fn load_fixture(name: &str) -> String {
    let fixture_path = fixtures_dir().join(name);
    fs::read_to_string(&fixture_path).unwrap_or_else(|e| {
        panic!(
            "Failed to read fixture at {}: {}",
            fixture_path.display(),
            e
        )
    })
}

#[test]
fn test_deserialize_network_domain_list() {
    let json_data = load_fixture("network_domain_list.json");
    let page: NetworkDomains = serde_json::from_str(&json_data)
        .unwrap_or_else(|e| panic!("Failed to deserialize network domains: {e}"));

    assert_eq!(page.items.len(), 2);
    assert_eq!(page.page.total_count, 2);
    assert!(!page.page.has_more());

    let production = &page.items[0];
    assert_eq!(production.name, "Production Network Domain");
    assert_eq!(production.domain_type.as_deref(), Some("ADVANCED"));
    assert_eq!(
        production
            .outside_transit_vlan_ipv4_subnet
            .as_ref()
            .map(|subnet| subnet.prefix_size),
        Some(29)
    );
    assert!(production.create_time.is_some());

    let staging = &page.items[1];
    assert_eq!(staging.state(), "PENDING_CHANGE");
    assert!(staging.description.is_none());
    assert_eq!(staging.resource_type(), ResourceType::NetworkDomain);
}

#[test]
fn test_deserialize_server() {
    let json_data = load_fixture("server.json");
    let server: Server = serde_json::from_str(&json_data)
        .unwrap_or_else(|e| panic!("Failed to deserialize server: {e}"));

    assert_eq!(server.name, "web01");
    assert_eq!(server.memory_gb, Some(4));
    assert_eq!(server.cpu.as_ref().map(|cpu| cpu.count), Some(2));
    assert_eq!(server.disk.len(), 2);
    assert_eq!(server.disk[1].size_gb, 50);
    assert!(server.deployed);
    assert!(server.started);

    let network = server.network_info.as_ref().expect("network info");
    let nic = network.primary_nic.as_ref().expect("primary NIC");
    assert_eq!(nic.private_ipv4.as_deref(), Some("10.0.3.10"));
    assert_eq!(nic.vlan_name, "web");
    assert!(network.additional_nic.is_empty());

    assert_eq!(server.backup_state(), Some("NORMAL"));
    assert_eq!(server.id(), "5b00a2ab-c665-4cd6-8291-0b931374fb3d");
}

#[test]
fn test_deserialize_api_response() {
    let json_data = load_fixture("deploy_vlan_response.json");
    let response: ApiResponse = serde_json::from_str(&json_data).unwrap();

    assert!(response.is_in_progress());
    assert_eq!(response.operation, "DEPLOY_VLAN");
    assert_eq!(
        response.info_value("vlanId"),
        Some("0e56433f-d808-4669-821d-812769517ff8")
    );
    assert!(response.request_id.is_some());
}

#[test]
fn test_server_roundtrip_preserves_backup() {
    let json_data = load_fixture("server.json");
    let server: Server = serde_json::from_str(&json_data).unwrap();
    let value = serde_json::to_value(&server).unwrap();

    assert_eq!(value["backup"]["servicePlan"], "Advanced");
    assert_eq!(value["networkInfo"]["primaryNic"]["vlanName"], "web");
}
