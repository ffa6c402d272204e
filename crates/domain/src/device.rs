//! Device: a physical or virtual thing that exposes one or more entities.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::id::DeviceId;
use crate::registry::non_empty;

/// One row of the host's device registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    pub id: DeviceId,
    #[serde(default)]
    pub name: Option<String>,
    /// Name set by the user, which takes precedence over `name`.
    #[serde(default)]
    pub name_by_user: Option<String>,
    #[serde(default)]
    pub manufacturer: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
}

impl DeviceInfo {
    /// Create a device with only an identifier.
    #[must_use]
    pub fn new(id: DeviceId) -> Self {
        Self {
            id,
            name: None,
            name_by_user: None,
            manufacturer: None,
            model: None,
        }
    }

    /// The name shown to users: the user-assigned name, else the integration's.
    #[must_use]
    pub fn display_name(&self) -> Option<&str> {
        non_empty(self.name_by_user.as_deref()).or_else(|| non_empty(self.name.as_deref()))
    }
}

/// Read-only lookup from device id to device record.
#[derive(Debug, Clone, Default)]
pub struct DeviceDirectory {
    devices: HashMap<DeviceId, DeviceInfo>,
}

impl DeviceDirectory {
    /// Look up a device.
    #[must_use]
    pub fn get(&self, id: &DeviceId) -> Option<&DeviceInfo> {
        self.devices.get(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.devices.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}

impl FromIterator<DeviceInfo> for DeviceDirectory {
    fn from_iter<T: IntoIterator<Item = DeviceInfo>>(iter: T) -> Self {
        Self {
            devices: iter.into_iter().map(|d| (d.id.clone(), d)).collect(),
        }
    }
}
