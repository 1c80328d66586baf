//! Resource abstraction and fetch-by-id dispatch.
//!
//! The poller never depends on a concrete resource type. It sees resources only through the
//! [`Resource`] trait and fetches them through a [`ResourceRegistry`], which maps each
//! [`ResourceType`] to the [`ResourceFetcher`] registered for it when the client was built.

use async_trait::async_trait;
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::types::ResourceType;

/// Capability interface implemented by every pollable CloudControl entity.
pub trait Resource: fmt::Debug + Send + Sync {
    /// Resource id.
    fn id(&self) -> String;

    /// Resource name.
    fn name(&self) -> &str;

    /// Server-reported state (e.g. `NORMAL`, `PENDING_ADD`).
    fn state(&self) -> &str;

    /// Resource type; fixed for a given id.
    fn resource_type(&self) -> ResourceType;

    /// Returns true when the lookup yielded no live entity.
    fn is_deleted(&self) -> bool {
        false
    }

    /// State of the resource's backup configuration, if it has one.
    fn backup_state(&self) -> Option<&str> {
        None
    }

    /// Upcast used by `downcast_ref` on `dyn Resource`.
    fn as_any(&self) -> &dyn Any;
}

impl dyn Resource {
    /// Borrow the concrete resource, if it is a `T`.
    #[must_use]
    pub fn downcast_ref<T: Resource + 'static>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }
}

/// Looks up a single resource by id.
///
/// `Ok(None)` means the resource does not exist. Any transport retry happens inside the fetch;
/// the poller treats an `Err` as fatal.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ResourceFetcher: Send + Sync {
    /// Fetch the resource with the given id.
    async fn fetch(&self, id: &str) -> Result<Option<Box<dyn Resource>>>;
}

/// Maps resource types to the fetchers that can look them up.
#[derive(Clone, Default)]
pub struct ResourceRegistry {
    fetchers: HashMap<ResourceType, Arc<dyn ResourceFetcher>>,
}

impl ResourceRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the fetcher for a resource type.
    pub fn register<F>(&mut self, resource_type: ResourceType, fetcher: F) -> &mut Self
    where
        F: ResourceFetcher + 'static,
    {
        self.fetchers.insert(resource_type, Arc::new(fetcher));
        self
    }

    /// Builder-style variant of [`register`](Self::register).
    #[must_use]
    pub fn with_fetcher<F>(mut self, resource_type: ResourceType, fetcher: F) -> Self
    where
        F: ResourceFetcher + 'static,
    {
        self.register(resource_type, fetcher);
        self
    }

    /// Returns true if a fetcher is registered for the type.
    #[must_use]
    pub fn contains(&self, resource_type: ResourceType) -> bool {
        self.fetchers.contains_key(&resource_type)
    }

    /// Returns the registered types in declaration order.
    #[must_use]
    pub fn registered_types(&self) -> Vec<ResourceType> {
        ResourceType::all()
            .iter()
            .copied()
            .filter(|kind| self.contains(*kind))
            .collect()
    }

    /// Fetch a resource by type and id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] when no fetcher is registered for the type,
    /// [`Error::InternalError`] when the fetcher returns a resource of another type, and
    /// otherwise whatever the fetcher returns.
    pub async fn fetch(
        &self,
        resource_type: ResourceType,
        id: &str,
    ) -> Result<Option<Box<dyn Resource>>> {
        let fetcher = self.fetchers.get(&resource_type).ok_or_else(|| {
            Error::ConfigError(format!("no fetcher registered for {resource_type} resources"))
        })?;

        let resource = fetcher.fetch(id).await?;
        if let Some(found) = &resource {
            if found.resource_type() != resource_type {
                return Err(Error::InternalError(format!(
                    "fetcher for {resource_type} '{id}' returned a {}",
                    found.resource_type()
                )));
            }
        }

        Ok(resource)
    }
}

impl fmt::Debug for ResourceRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceRegistry")
            .field("types", &self.registered_types())
            .finish()
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// Minimal resource used by the poller and registry tests.
    #[derive(Debug, Clone)]
    pub struct TestResource {
        pub id: String,
        pub name: String,
        pub state: String,
        pub kind: ResourceType,
        pub backup: Option<String>,
        pub deleted: bool,
    }

    impl TestResource {
        pub fn new(kind: ResourceType, id: &str, state: &str) -> Self {
            Self {
                id: id.to_string(),
                name: format!("{id}-name"),
                state: state.to_string(),
                kind,
                backup: None,
                deleted: false,
            }
        }

        pub fn with_backup(mut self, state: &str) -> Self {
            self.backup = Some(state.to_string());
            self
        }

        pub fn boxed(self) -> Option<Box<dyn Resource>> {
            Some(Box::new(self))
        }
    }

    impl Resource for TestResource {
        fn id(&self) -> String {
            self.id.clone()
        }

        fn name(&self) -> &str {
            &self.name
        }

        fn state(&self) -> &str {
            &self.state
        }

        fn resource_type(&self) -> ResourceType {
            self.kind
        }

        fn is_deleted(&self) -> bool {
            self.deleted
        }

        fn backup_state(&self) -> Option<&str> {
            self.backup.as_deref()
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }
}
