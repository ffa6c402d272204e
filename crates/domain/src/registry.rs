//! Host-side inputs to a discovery pass: entity registry rows and live states.

use serde::{Deserialize, Serialize};

use crate::id::{AreaId, DeviceId, EntityId};

/// One row of the host's entity registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryEntry {
    pub entity_id: EntityId,
    #[serde(default)]
    pub unique_id: Option<String>,
    /// Integration that owns the entity.
    #[serde(default)]
    pub platform: Option<String>,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default)]
    pub device_id: Option<DeviceId>,
    #[serde(default)]
    pub area_id: Option<AreaId>,
    /// User-assigned name.
    #[serde(default)]
    pub name: Option<String>,
    /// Name suggested by the owning integration.
    #[serde(default)]
    pub original_name: Option<String>,
}

impl RegistryEntry {
    /// Minimal enabled entry with no device, area, or names.
    #[must_use]
    pub fn new(entity_id: EntityId) -> Self {
        Self {
            entity_id,
            unique_id: None,
            platform: None,
            disabled: false,
            device_id: None,
            area_id: None,
            name: None,
            original_name: None,
        }
    }

    /// User-assigned name, falling back to the integration's name.
    #[must_use]
    pub fn display_name(&self) -> Option<&str> {
        non_empty(self.name.as_deref()).or_else(|| non_empty(self.original_name.as_deref()))
    }
}

/// Live state of one entity, reduced to what classification needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub entity_id: EntityId,
    pub state: String,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub device_class: Option<String>,
}

pub(crate) fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
