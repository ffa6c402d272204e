//! Serde shapes of the host's registry rows.

use serde::Deserialize;

use powerscout_domain::device::DeviceInfo;
use powerscout_domain::error::MalformedInputError;
use powerscout_domain::id::{AreaId, DeviceId, EntityId};
use powerscout_domain::registry::{RegistryEntry, StateSnapshot};

#[derive(Debug, Deserialize)]
pub(crate) struct EntityRow {
    entity_id: String,
    #[serde(default)]
    unique_id: Option<String>,
    #[serde(default)]
    platform: Option<String>,
    #[serde(default)]
    disabled_by: Option<String>,
    #[serde(default)]
    device_id: Option<String>,
    #[serde(default)]
    area_id: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    original_name: Option<String>,
}

impl TryFrom<EntityRow> for RegistryEntry {
    type Error = MalformedInputError;

    fn try_from(row: EntityRow) -> Result<Self, Self::Error> {
        let mut entry = RegistryEntry::new(row.entity_id.parse::<EntityId>()?);
        entry.unique_id = row.unique_id;
        entry.platform = row.platform;
        entry.disabled = row.disabled_by.is_some();
        entry.device_id = row.device_id.filter(|id| !id.is_empty()).map(DeviceId::new);
        entry.area_id = row.area_id.filter(|id| !id.is_empty()).map(AreaId::new);
        entry.name = row.name;
        entry.original_name = row.original_name;
        Ok(entry)
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct StateAttributes {
    #[serde(default)]
    unit_of_measurement: Option<String>,
    #[serde(default)]
    device_class: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StateRow {
    entity_id: String,
    state: String,
    #[serde(default)]
    attributes: StateAttributes,
}

impl TryFrom<StateRow> for StateSnapshot {
    type Error = MalformedInputError;

    fn try_from(row: StateRow) -> Result<Self, Self::Error> {
        Ok(Self {
            entity_id: row.entity_id.parse()?,
            state: row.state,
            unit: row.attributes.unit_of_measurement,
            device_class: row.attributes.device_class,
        })
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct DeviceRow {
    id: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    name_by_user: Option<String>,
    #[serde(default)]
    manufacturer: Option<String>,
    #[serde(default)]
    model: Option<String>,
}

impl TryFrom<DeviceRow> for DeviceInfo {
    type Error = MalformedInputError;

    fn try_from(row: DeviceRow) -> Result<Self, Self::Error> {
        if row.id.is_empty() {
            return Err(MalformedInputError::MissingField("id"));
        }
        let mut device = DeviceInfo::new(DeviceId::new(row.id));
        device.name = row.name;
        device.name_by_user = row.name_by_user;
        device.manufacturer = row.manufacturer;
        device.model = row.model;
        Ok(device)
    }
}
