//! In-memory port implementations shared by the service tests.

use std::future::Future;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use powerscout_domain::device::DeviceInfo;
use powerscout_domain::discovery::DedupKey;
use powerscout_domain::error::{PowerScoutError, RejectedError};
use powerscout_domain::id::{DeviceId, RecordId};
use powerscout_domain::provisioned::ProvisionedRecord;
use powerscout_domain::registry::{RegistryEntry, StateSnapshot};

use crate::ports::{ProvisionedRepository, RegistryDump, RegistrySource};

#[derive(Default)]
pub struct InMemoryProvisionedRepo {
    store: Mutex<Vec<ProvisionedRecord>>,
}

impl ProvisionedRepository for InMemoryProvisionedRepo {
    fn create(
        &self,
        record: ProvisionedRecord,
    ) -> impl Future<Output = Result<ProvisionedRecord, PowerScoutError>> + Send {
        let mut store = self.store.lock().unwrap();
        let result = if store.iter().any(|r| r.dedup_key == record.dedup_key) {
            Err(RejectedError {
                dedup_key: record.dedup_key.to_string(),
            }
            .into())
        } else {
            store.push(record.clone());
            Ok(record)
        };
        async { result }
    }

    fn get_by_id(
        &self,
        id: RecordId,
    ) -> impl Future<Output = Result<Option<ProvisionedRecord>, PowerScoutError>> + Send {
        let store = self.store.lock().unwrap();
        let result = store.iter().find(|r| r.id == id).cloned();
        async { Ok(result) }
    }

    fn get_all(
        &self,
    ) -> impl Future<Output = Result<Vec<ProvisionedRecord>, PowerScoutError>> + Send {
        let store = self.store.lock().unwrap();
        let result = store.clone();
        async { Ok(result) }
    }

    fn find_by_dedup_key(
        &self,
        key: &DedupKey,
    ) -> impl Future<Output = Result<Option<ProvisionedRecord>, PowerScoutError>> + Send {
        let store = self.store.lock().unwrap();
        let result = store.iter().find(|r| &r.dedup_key == key).cloned();
        async { Ok(result) }
    }

    fn delete(&self, id: RecordId) -> impl Future<Output = Result<(), PowerScoutError>> + Send {
        let mut store = self.store.lock().unwrap();
        store.retain(|r| r.id != id);
        async { Ok(()) }
    }
}

/// Registry source returning whatever dump was last set.
#[derive(Default)]
pub struct StaticRegistrySource {
    dump: Mutex<RegistryDump>,
    loads: AtomicUsize,
}

impl StaticRegistrySource {
    pub fn new(dump: RegistryDump) -> Self {
        Self {
            dump: Mutex::new(dump),
            loads: AtomicUsize::new(0),
        }
    }

    pub fn set(&self, dump: RegistryDump) {
        *self.dump.lock().unwrap() = dump;
    }

    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

impl RegistrySource for StaticRegistrySource {
    fn load(&self) -> impl Future<Output = Result<RegistryDump, PowerScoutError>> + Send {
        self.loads.fetch_add(1, Ordering::SeqCst);
        let dump = self.dump.lock().unwrap().clone();
        async { Ok(dump) }
    }
}

/// Builds registry dumps one sensor at a time.
#[derive(Default)]
pub struct DumpBuilder {
    dump: RegistryDump,
}

impl DumpBuilder {
    pub fn sensor(mut self, id: &str, unit: &str, device: Option<&str>) -> Self {
        let entity_id = id.parse().unwrap();
        let mut entry = RegistryEntry::new(entity_id);
        entry.device_id = device.map(DeviceId::new);
        self.dump.states.push(StateSnapshot {
            entity_id: entry.entity_id.clone(),
            state: "1.0".to_string(),
            unit: Some(unit.to_string()),
            device_class: None,
        });
        self.dump.entities.push(entry);
        self
    }

    pub fn device(mut self, id: &str, name: &str) -> Self {
        let mut device = DeviceInfo::new(DeviceId::new(id));
        device.name = Some(name.to_string());
        self.dump.devices.push(device);
        self
    }

    pub fn build(self) -> RegistryDump {
        self.dump
    }
}
