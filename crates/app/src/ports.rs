//! Port definitions: traits that adapters implement.
//!
//! Ports are the boundaries between the application core and the outside world.
//! They are defined here (in `app`) so that both the use-case layer and the
//! adapter layer can depend on them without creating circular dependencies.

pub mod event_bus;
pub mod provisioned_repo;
pub mod provisioning;
pub mod registry_source;

pub use event_bus::EventPublisher;
pub use provisioned_repo::ProvisionedRepository;
pub use provisioning::ProvisioningSink;
pub use registry_source::{RegistryDump, RegistrySource};
