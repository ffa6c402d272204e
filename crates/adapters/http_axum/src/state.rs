//! Shared application state for axum handlers.

use std::sync::Arc;

use powerscout_app::ports::{EventPublisher, ProvisionedRepository, RegistrySource};
use powerscout_app::services::discovery_service::DiscoveryService;
use powerscout_app::services::provisioning_service::ProvisioningService;

/// Discovery service submitting its plans to the shared provisioning service.
pub type SharedDiscovery<R, S> = DiscoveryService<S, Arc<ProvisioningService<R, S>>>;

/// Application state shared across all axum handlers.
///
/// Generic over the record repository, registry source, and event publisher
/// to avoid dynamic dispatch. `Clone` is implemented manually so the
/// underlying types themselves do not need to be `Clone`; only the `Arc`
/// wrappers are cloned.
pub struct AppState<R, S, EP> {
    /// Manual create/remove and record queries.
    pub provisioning: Arc<ProvisioningService<R, S>>,
    /// Discovery passes and previews.
    pub discovery: Arc<SharedDiscovery<R, S>>,
    /// Registry event publisher feeding the scheduler.
    pub events: Arc<EP>,
}

impl<R, S, EP> Clone for AppState<R, S, EP> {
    fn clone(&self) -> Self {
        Self {
            provisioning: Arc::clone(&self.provisioning),
            discovery: Arc::clone(&self.discovery),
            events: Arc::clone(&self.events),
        }
    }
}

impl<R, S, EP> AppState<R, S, EP>
where
    R: ProvisionedRepository + Send + Sync + 'static,
    S: RegistrySource + Send + Sync + 'static,
    EP: EventPublisher + Send + Sync + 'static,
{
    /// Create a new application state from pre-wrapped `Arc` services.
    ///
    /// Services are shared with the scheduler, so they are built before the
    /// HTTP state.
    pub fn new(
        provisioning: Arc<ProvisioningService<R, S>>,
        discovery: Arc<SharedDiscovery<R, S>>,
        events: Arc<EP>,
    ) -> Self {
        Self {
            provisioning,
            discovery,
            events,
        }
    }
}
