//! Waiting for asynchronous CloudControl operations to complete.
//!
//! Mutating CloudControl calls return as soon as the request is accepted; the resource then sits
//! in a `PENDING_*` state until the server finishes. [`ResourceWaiter`] polls the resource on a
//! fixed interval until it settles, disappears (for deletes), reports an unexpected state, the
//! deadline passes, or the client's [`CancellationFlag`] is set.
//!
//! Each wait is an independent poll sequence. The only state shared between waits is the
//! cancellation flag, which the poller only reads.

use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval_at, sleep, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::cancel::CancellationFlag;
use crate::error::{Error, OperationCancelledError, Result};
use crate::resource::{Resource, ResourceRegistry};
use crate::types::{ResourceState, ResourceType};

/// Default interval between status polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Which state of a fetched resource the poller inspects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StateSource {
    /// The resource's own state.
    #[default]
    Resource,
    /// The state of the resource's backup configuration. A resource without backup
    /// information counts as missing.
    Backup,
}

impl StateSource {
    fn observe<'a>(self, resource: Option<&'a dyn Resource>) -> Option<&'a str> {
        let resource = resource.filter(|found| !found.is_deleted())?;
        match self {
            Self::Resource => Some(resource.state()),
            Self::Backup => resource.backup_state(),
        }
    }
}

/// Parameters for a single wait.
#[derive(Debug, Clone)]
pub struct WaitRequest {
    /// Type of the resource being waited on
    pub resource_type: ResourceType,
    /// Resource id
    pub id: String,
    /// Human-readable action (e.g. "Deploy"), used in messages
    pub action: String,
    /// State the resource is expected to be in while the operation runs
    pub expected_state: ResourceState,
    /// Terminal state that ends the wait successfully
    pub target_state: ResourceState,
    /// Whether the resource disappearing counts as success
    pub is_delete: bool,
    /// Deadline for the whole wait
    pub timeout: Duration,
    /// State extractor
    pub source: StateSource,
}

impl WaitRequest {
    /// Create a non-delete wait on the resource's own state, targeting `NORMAL`.
    #[must_use]
    pub fn new(
        resource_type: ResourceType,
        id: impl Into<String>,
        action: impl Into<String>,
        expected_state: ResourceState,
        timeout: Duration,
    ) -> Self {
        Self {
            resource_type,
            id: id.into(),
            action: action.into(),
            expected_state,
            target_state: ResourceState::Normal,
            is_delete: false,
            timeout,
            source: StateSource::Resource,
        }
    }

    /// Treat the resource disappearing as success.
    #[must_use]
    pub const fn deleting(mut self) -> Self {
        self.is_delete = true;
        self
    }

    /// Inspect a different state of the fetched resource.
    #[must_use]
    pub const fn with_source(mut self, source: StateSource) -> Self {
        self.source = source;
        self
    }

    /// Override the terminal state.
    #[must_use]
    pub const fn with_target_state(mut self, state: ResourceState) -> Self {
        self.target_state = state;
        self
    }

    /// Kind used in messages, e.g. "server" or "server backup".
    #[must_use]
    pub fn kind(&self) -> String {
        match self.source {
            StateSource::Resource => self.resource_type.name().to_string(),
            StateSource::Backup => format!("{} backup", self.resource_type.name()),
        }
    }

    /// Description used for cancellation errors and logs.
    #[must_use]
    pub fn description(&self) -> String {
        format!("Wait for {} of {} '{}'", self.action, self.kind(), self.id)
    }
}

enum Observation {
    Missing,
    Settled,
    InProgress(String),
    Unexpected(String),
}

/// Polls resources until asynchronous operations complete.
#[derive(Debug, Clone)]
pub struct ResourceWaiter {
    registry: Arc<ResourceRegistry>,
    cancellation: CancellationFlag,
    poll_interval: Duration,
}

impl ResourceWaiter {
    /// Create a waiter over a registry, observing the given cancellation flag.
    #[must_use]
    pub fn new(registry: Arc<ResourceRegistry>, cancellation: CancellationFlag) -> Self {
        Self {
            registry,
            cancellation,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Override the poll interval.
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Interval between polls.
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// The cancellation flag consulted on every tick.
    #[must_use]
    pub fn cancellation(&self) -> &CancellationFlag {
        &self.cancellation
    }

    /// The registry used to fetch resources.
    #[must_use]
    pub fn registry(&self) -> &ResourceRegistry {
        &self.registry
    }

    /// Poll until the request reaches a terminal outcome.
    ///
    /// The first poll happens one interval after the call. On each tick the cancellation flag is
    /// checked, then the resource is fetched and classified. The deadline is only observed
    /// between ticks, so an in-flight fetch always completes.
    ///
    /// Returns `Ok(Some(resource))` when the resource reaches the target state and `Ok(None)`
    /// when a delete-style wait finds the resource gone.
    ///
    /// # Errors
    ///
    /// [`Error::Timeout`], [`Error::Cancelled`], [`Error::NotFound`] (resource gone during a
    /// non-delete wait), [`Error::UnexpectedState`], or any error from the fetch.
    /// [`Error::ConfigError`] if the poll interval is zero.
    pub async fn wait(&self, request: &WaitRequest) -> Result<Option<Box<dyn Resource>>> {
        if self.poll_interval.is_zero() {
            return Err(Error::ConfigError(format!(
                "poll interval must be greater than zero ({})",
                request.description()
            )));
        }

        let started = Instant::now();
        let deadline = sleep(request.timeout);
        tokio::pin!(deadline);

        let mut ticker = interval_at(started + self.poll_interval, self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        debug!(
            resource_type = %request.resource_type,
            id = %request.id,
            expected = %request.expected_state,
            timeout_secs = request.timeout.as_secs(),
            "{}",
            request.description()
        );

        loop {
            tokio::select! {
                biased;
                () = &mut deadline => {
                    return Err(Error::Timeout(format!(
                        "timed out after {} seconds waiting for {} of {} '{}'",
                        started.elapsed().as_secs(),
                        request.action,
                        request.kind(),
                        request.id
                    )));
                }
                _ = ticker.tick() => {}
            }

            if self.cancellation.is_cancelled() {
                warn!(id = %request.id, "{} cancelled", request.description());
                return Err(OperationCancelledError::new(request.description()).into());
            }

            let fetched = self
                .registry
                .fetch(request.resource_type, &request.id)
                .await?;

            match Self::observe(request, fetched.as_deref()) {
                Observation::Missing if request.is_delete => {
                    info!(
                        "{} of {} '{}' complete",
                        request.action,
                        request.kind(),
                        request.id
                    );
                    return Ok(None);
                }
                Observation::Missing => {
                    return Err(Error::NotFound(format!(
                        "no {} found with id '{}'",
                        request.kind(),
                        request.id
                    )));
                }
                Observation::Settled => {
                    info!(
                        "{} of {} '{}' complete",
                        request.action,
                        request.kind(),
                        request.id
                    );
                    return Ok(fetched);
                }
                Observation::InProgress(state) => {
                    info!(
                        state = %state,
                        elapsed_secs = started.elapsed().as_secs(),
                        "{} of {} '{}' is still in progress",
                        request.action,
                        request.kind(),
                        request.id
                    );
                }
                Observation::Unexpected(state) => {
                    let name = fetched
                        .as_deref()
                        .map(|resource| resource.name().to_string())
                        .unwrap_or_default();
                    return Err(Error::UnexpectedState {
                        action: request.action.clone(),
                        kind: request.kind(),
                        name,
                        id: request.id.clone(),
                        state,
                    });
                }
            }
        }
    }

    fn observe(request: &WaitRequest, resource: Option<&dyn Resource>) -> Observation {
        let Some(state) = request.source.observe(resource) else {
            return Observation::Missing;
        };

        if state == request.target_state.as_str() {
            return Observation::Settled;
        }

        match ResourceState::parse(state) {
            Some(known) if known.is_pending() => Observation::InProgress(state.to_string()),
            _ => Observation::Unexpected(state.to_string()),
        }
    }

    async fn wait_for_resource(&self, request: WaitRequest) -> Result<Box<dyn Resource>> {
        self.wait(&request).await?.ok_or_else(|| {
            Error::NotFound(format!(
                "no {} found with id '{}'",
                request.kind(),
                request.id
            ))
        })
    }

    /// Wait for a newly deployed resource to leave `PENDING_ADD`.
    ///
    /// # Errors
    ///
    /// See [`wait`](Self::wait).
    pub async fn wait_for_deploy(
        &self,
        resource_type: ResourceType,
        id: &str,
        timeout: Duration,
    ) -> Result<Box<dyn Resource>> {
        let request = WaitRequest::new(
            resource_type,
            id,
            "Deploy",
            ResourceState::PendingAdd,
            timeout,
        );
        self.wait_for_resource(request).await
    }

    /// Wait for an edit to leave `PENDING_CHANGE`.
    ///
    /// # Errors
    ///
    /// See [`wait`](Self::wait).
    pub async fn wait_for_change(
        &self,
        resource_type: ResourceType,
        id: &str,
        action: &str,
        timeout: Duration,
    ) -> Result<Box<dyn Resource>> {
        let request = WaitRequest::new(
            resource_type,
            id,
            action,
            ResourceState::PendingChange,
            timeout,
        );
        self.wait_for_resource(request).await
    }

    /// Wait for the removal of a nested item, which shows up as `PENDING_CHANGE` on the parent.
    ///
    /// Returns the settled parent, or `None` if the parent itself is gone.
    ///
    /// # Errors
    ///
    /// See [`wait`](Self::wait).
    pub async fn wait_for_nested_delete(
        &self,
        resource_type: ResourceType,
        id: &str,
        action: &str,
        timeout: Duration,
    ) -> Result<Option<Box<dyn Resource>>> {
        let request = WaitRequest::new(
            resource_type,
            id,
            action,
            ResourceState::PendingChange,
            timeout,
        )
        .deleting();
        self.wait(&request).await
    }

    /// Wait for a resource to leave `PENDING_DELETE`.
    ///
    /// # Errors
    ///
    /// See [`wait`](Self::wait).
    pub async fn wait_for_delete(
        &self,
        resource_type: ResourceType,
        id: &str,
        timeout: Duration,
    ) -> Result<()> {
        let request = WaitRequest::new(
            resource_type,
            id,
            "Delete",
            ResourceState::PendingDelete,
            timeout,
        )
        .deleting();
        self.wait(&request).await.map(|_| ())
    }

    /// Wait for the customer image produced by a server clone.
    ///
    /// # Errors
    ///
    /// See [`wait`](Self::wait).
    pub async fn wait_for_clone(&self, image_id: &str, timeout: Duration) -> Result<Box<dyn Resource>> {
        let request = WaitRequest::new(
            ResourceType::CustomerImage,
            image_id,
            "Clone",
            ResourceState::PendingAdd,
            timeout,
        );
        self.wait_for_resource(request).await
    }

    /// Wait for backup to finish provisioning on a server.
    ///
    /// # Errors
    ///
    /// See [`wait`](Self::wait).
    pub async fn wait_for_backup_deploy(
        &self,
        server_id: &str,
        timeout: Duration,
    ) -> Result<Box<dyn Resource>> {
        let request = WaitRequest::new(
            ResourceType::Server,
            server_id,
            "Enable backup",
            ResourceState::PendingAdd,
            timeout,
        )
        .with_source(StateSource::Backup);
        self.wait_for_resource(request).await
    }

    /// Wait for a change to a server's backup configuration.
    ///
    /// # Errors
    ///
    /// See [`wait`](Self::wait).
    pub async fn wait_for_backup_change(
        &self,
        server_id: &str,
        action: &str,
        timeout: Duration,
    ) -> Result<Box<dyn Resource>> {
        let request = WaitRequest::new(
            ResourceType::Server,
            server_id,
            action,
            ResourceState::PendingChange,
            timeout,
        )
        .with_source(StateSource::Backup);
        self.wait_for_resource(request).await
    }

    /// Wait for backup to be removed from a server.
    ///
    /// # Errors
    ///
    /// See [`wait`](Self::wait).
    pub async fn wait_for_backup_removal(&self, server_id: &str, timeout: Duration) -> Result<()> {
        let request = WaitRequest::new(
            ResourceType::Server,
            server_id,
            "Disable backup",
            ResourceState::PendingDelete,
            timeout,
        )
        .with_source(StateSource::Backup)
        .deleting();
        self.wait(&request).await.map(|_| ())
    }
}
