//! Registry source port: read access to the host's registries.

use std::future::Future;

use powerscout_domain::device::{DeviceDirectory, DeviceInfo};
use powerscout_domain::error::PowerScoutError;
use powerscout_domain::registry::{RegistryEntry, StateSnapshot};
use powerscout_domain::snapshot::Snapshot;

/// Everything one discovery pass reads from the host.
#[derive(Debug, Clone, Default)]
pub struct RegistryDump {
    pub entities: Vec<RegistryEntry>,
    pub states: Vec<StateSnapshot>,
    pub devices: Vec<DeviceInfo>,
    /// Elements the source could not parse and left out.
    pub skipped: usize,
}

impl RegistryDump {
    /// Split the dump into the snapshot and device directory the engine reads.
    #[must_use]
    pub fn into_parts(self) -> (Snapshot, DeviceDirectory) {
        let snapshot = Snapshot::read(self.entities, self.states);
        let devices = self.devices.into_iter().collect();
        (snapshot, devices)
    }
}

/// Reads the host's entity registry, live states, and device registry.
pub trait RegistrySource {
    /// Load a consistent copy of the registries.
    fn load(&self) -> impl Future<Output = Result<RegistryDump, PowerScoutError>> + Send;
}

impl<T: RegistrySource + Send + Sync> RegistrySource for std::sync::Arc<T> {
    fn load(&self) -> impl Future<Output = Result<RegistryDump, PowerScoutError>> + Send {
        (**self).load()
    }
}
