//! Provisioning plans for device groups lacking an energy entity.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::device::{DeviceDirectory, DeviceInfo};
use crate::id::{AreaId, DeviceId, EntityId};
use crate::snapshot::Snapshot;

use super::group::DeviceGroup;
use super::matcher::find_energy_match;

const DEVICE_KEY_PREFIX: &str = "powerscout_device_";
const ENTITY_KEY_PREFIX: &str = "powerscout_no_device_";
const MANUAL_KEY_PREFIX: &str = "powerscout_manual_";

/// Deterministic identifier that prevents provisioning the same group twice.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DedupKey(String);

impl DedupKey {
    #[must_use]
    pub fn for_device(device_id: &DeviceId) -> Self {
        Self(format!("{DEVICE_KEY_PREFIX}{device_id}"))
    }

    #[must_use]
    pub fn for_entity(entity_id: &EntityId) -> Self {
        Self(format!("{ENTITY_KEY_PREFIX}{entity_id}"))
    }

    /// Key of a manual record. Lives apart from the discovery keys so a
    /// manual record never hides the rest of its device from discovery.
    #[must_use]
    pub fn for_manual(entity_id: &EntityId) -> Self {
        Self(format!("{MANUAL_KEY_PREFIX}{entity_id}"))
    }

    /// Wrap a key loaded from storage.
    #[must_use]
    pub fn from_stored(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DedupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A proposed provisioning action for one device group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    pub target_device_id: Option<DeviceId>,
    pub area_id: Option<AreaId>,
    /// All power entities of the group, in scan order. Never empty.
    pub power_entity_ids: Vec<EntityId>,
    pub display_name: String,
    pub manufacturer: Option<String>,
    pub model: Option<String>,
    pub dedup_key: DedupKey,
}

impl Plan {
    /// Title of the record created when the plan is accepted.
    #[must_use]
    pub fn title(&self) -> String {
        record_title(&self.display_name, self.power_entity_ids.len())
    }

    /// Short label for a confirmation prompt.
    #[must_use]
    pub fn confirmation_label(&self) -> String {
        match self.power_entity_ids.len() {
            1 => self.display_name.clone(),
            n => format!("{} ({n} power sensors)", self.display_name),
        }
    }
}

pub(crate) fn record_title(display_name: &str, power_entities: usize) -> String {
    match power_entities {
        1 => format!("{display_name} - Energy Sensor"),
        n => format!("{display_name} - Energy Sensors ({n} power sensors)"),
    }
}

/// Outcome of evaluating one group during a pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupDecision {
    /// An energy entity already covers the group.
    Matched {
        dedup_key: DedupKey,
        energy_entity_id: EntityId,
    },
    /// A record with the group's key already exists.
    AlreadyProvisioned { dedup_key: DedupKey },
    /// The group needs an energy sensor.
    Planned(Plan),
}

/// Decide what to do with one group.
#[must_use]
pub fn evaluate_group(
    group: &DeviceGroup,
    snapshot: &Snapshot,
    devices: &DeviceDirectory,
    already_provisioned: &HashSet<DedupKey>,
) -> GroupDecision {
    let dedup_key = group.dedup_key();
    if let Some(found) = find_energy_match(group, snapshot) {
        return GroupDecision::Matched {
            dedup_key,
            energy_entity_id: found.energy_entity_id().clone(),
        };
    }
    if already_provisioned.contains(&dedup_key) {
        return GroupDecision::AlreadyProvisioned { dedup_key };
    }

    let device = group.device_id().and_then(|id| devices.get(id));
    let primary = group.primary();
    GroupDecision::Planned(Plan {
        target_device_id: group.device_id().cloned(),
        area_id: primary.area_id.clone(),
        power_entity_ids: group.entity_ids().cloned().collect(),
        display_name: resolve_display_name(group, device),
        manufacturer: device.and_then(|d| d.manufacturer.clone()),
        model: device.and_then(|d| d.model.clone()),
        dedup_key,
    })
}

/// Plans for every group with no energy match and no existing record.
#[must_use]
pub fn build_plans(
    groups: &[DeviceGroup],
    snapshot: &Snapshot,
    devices: &DeviceDirectory,
    already_provisioned: &HashSet<DedupKey>,
) -> Vec<Plan> {
    groups
        .iter()
        .filter_map(
            |group| match evaluate_group(group, snapshot, devices, already_provisioned) {
                GroupDecision::Planned(plan) => Some(plan),
                _ => None,
            },
        )
        .collect()
}

/// Device name, else the primary entity's name, else a name derived from its id.
#[must_use]
pub fn resolve_display_name(group: &DeviceGroup, device: Option<&DeviceInfo>) -> String {
    if let Some(name) = device.and_then(DeviceInfo::display_name) {
        return name.to_string();
    }
    let primary = group.primary();
    match primary.display_name.as_deref().filter(|n| !n.trim().is_empty()) {
        Some(name) => name.to_string(),
        None => name_from_entity_id(&primary.entity_id),
    }
}

/// `sensor.desk_plug_power` → `Desk Plug Power`.
#[must_use]
pub fn name_from_entity_id(entity_id: &EntityId) -> String {
    title_case(&entity_id.object_id().replace('_', " "))
}

/// Upper-case the first letter of every word and lower-case the rest, where a
/// word starts after any non-alphabetic character.
#[must_use]
pub fn title_case(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut previous_is_letter = false;
    for c in value.chars() {
        if previous_is_letter {
            out.extend(c.to_lowercase());
        } else {
            out.extend(c.to_uppercase());
        }
        previous_is_letter = c.is_alphabetic();
    }
    out
}
