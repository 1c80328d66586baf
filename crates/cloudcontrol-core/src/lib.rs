//! # cloudcontrol-core
//!
//! Core types and utilities for working with the CloudControl compute API.
//!
//! Most mutating CloudControl calls are accepted immediately and processed asynchronously on the
//! server. This crate provides the pieces needed to drive such calls to completion: a transport
//! retry loop, a cooperative cancellation flag, and a resource-status poller that waits for a
//! resource to leave its pending state.
//!
//! ## Modules
//!
//! - [`error`] - Error taxonomy shared by all CloudControl crates
//! - [`uuid`] - Strongly-typed UUID wrappers for CloudControl resources
//! - [`types`] - Resource types, resource states and region endpoints
//! - [`config`] - Configuration structures and credentials
//! - [`client`] - HTTP client configuration and the transport retry loop
//! - [`resource`] - The resource capability trait and the fetcher registry
//! - [`cancel`] - Process-wide cooperative cancellation flag
//! - [`wait`] - Resource-status poller and wait wrappers
//! - [`query`] - Query parameter helpers for list operations

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod cancel;
pub mod client;
pub mod config;
pub mod error;
pub mod query;
pub mod resource;
pub mod types;
pub mod uuid;
pub mod wait;

// Re-export commonly used types
pub use cancel::CancellationFlag;
pub use error::{Error, OperationCancelledError, Result};
pub use resource::{Resource, ResourceFetcher, ResourceRegistry};
pub use types::{ResourceState, ResourceType};
pub use wait::{ResourceWaiter, StateSource, WaitRequest};
