//! Grouping of power entities by the device that exposes them.

use std::collections::{HashMap, HashSet};

use crate::classify::Classification;
use crate::id::{DeviceId, EntityId};
use crate::snapshot::EntitySnapshot;

use super::plan::DedupKey;

/// What a [`DeviceGroup`] is keyed by.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GroupKey {
    /// Power entities sharing a host device.
    Device(DeviceId),
    /// A single power entity with no device.
    Orphan(EntityId),
}

/// Power entities attributed to one physical device.
///
/// Never empty. Every entry is an enabled sensor classified as power.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceGroup {
    key: GroupKey,
    entries: Vec<EntitySnapshot>,
}

impl DeviceGroup {
    #[must_use]
    pub fn key(&self) -> &GroupKey {
        &self.key
    }

    /// Entries in snapshot scan order.
    #[must_use]
    pub fn entries(&self) -> &[EntitySnapshot] {
        &self.entries
    }

    #[must_use]
    pub fn device_id(&self) -> Option<&DeviceId> {
        match &self.key {
            GroupKey::Device(id) => Some(id),
            GroupKey::Orphan(_) => None,
        }
    }

    /// First entry of the group; drives naming and area.
    #[must_use]
    pub fn primary(&self) -> &EntitySnapshot {
        &self.entries[0]
    }

    pub fn entity_ids(&self) -> impl Iterator<Item = &EntityId> {
        self.entries.iter().map(|e| &e.entity_id)
    }

    /// Idempotence anchor for plans built from this group.
    #[must_use]
    pub fn dedup_key(&self) -> DedupKey {
        match &self.key {
            GroupKey::Device(id) => DedupKey::for_device(id),
            GroupKey::Orphan(id) => DedupKey::for_entity(id),
        }
    }
}

/// Whether an entry may be grouped as a power entity.
#[must_use]
pub fn is_power_candidate(entry: &EntitySnapshot) -> bool {
    entry.is_sensor()
        && !entry.disabled
        && entry.has_state
        && entry.classification() == Classification::Power
}

/// Entity ids that discovery must never propose.
#[derive(Debug, Clone, Default)]
pub struct Exclusions(HashSet<EntityId>);

impl Exclusions {
    #[must_use]
    pub fn contains(&self, entity_id: &EntityId) -> bool {
        self.0.contains(entity_id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<EntityId> for Exclusions {
    fn from_iter<T: IntoIterator<Item = EntityId>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Group power entries by device id.
///
/// Entries that are not power candidates are skipped. Groups come back in the
/// order their first entry was seen, and entries keep their input order within
/// a group. Entries without a device id each get their own group.
pub fn group_by_device<'a>(
    entries: impl IntoIterator<Item = &'a EntitySnapshot>,
) -> Vec<DeviceGroup> {
    let mut groups: Vec<DeviceGroup> = Vec::new();
    let mut by_device: HashMap<DeviceId, usize> = HashMap::new();

    for entry in entries.into_iter().filter(|e| is_power_candidate(e)) {
        match &entry.device_id {
            Some(device_id) => {
                if let Some(&index) = by_device.get(device_id) {
                    groups[index].entries.push(entry.clone());
                } else {
                    by_device.insert(device_id.clone(), groups.len());
                    groups.push(DeviceGroup {
                        key: GroupKey::Device(device_id.clone()),
                        entries: vec![entry.clone()],
                    });
                }
            }
            None => groups.push(DeviceGroup {
                key: GroupKey::Orphan(entry.entity_id.clone()),
                entries: vec![entry.clone()],
            }),
        }
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn power(id: &str, device: Option<&str>) -> EntitySnapshot {
        let mut builder = EntitySnapshot::builder().entity_id(id).unit("W");
        if let Some(device) = device {
            builder = builder.device_id(device);
        }
        builder.build().unwrap()
    }

    fn ids(group: &DeviceGroup) -> Vec<&str> {
        group.entity_ids().map(EntityId::as_str).collect()
    }

    #[test]
    fn should_group_entries_sharing_a_device() {
        let entries = vec![
            power("sensor.pdu_outlet_1_power", Some("dev1")),
            power("sensor.desk_power", Some("dev2")),
            power("sensor.pdu_outlet_2_power", Some("dev1")),
        ];

        let groups = group_by_device(&entries);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].key(), &GroupKey::Device(DeviceId::new("dev1")));
        assert_eq!(
            ids(&groups[0]),
            vec!["sensor.pdu_outlet_1_power", "sensor.pdu_outlet_2_power"]
        );
        assert_eq!(ids(&groups[1]), vec!["sensor.desk_power"]);
    }

    #[test]
    fn should_never_merge_entries_without_device() {
        let entries = vec![
            power("sensor.a_power", None),
            power("sensor.b_power", None),
        ];

        let groups = group_by_device(&entries);

        assert_eq!(groups.len(), 2);
        assert!(groups.iter().all(|g| g.entries().len() == 1));
        assert_eq!(
            groups[0].key(),
            &GroupKey::Orphan("sensor.a_power".parse().unwrap())
        );
    }

    #[test]
    fn should_skip_disabled_and_non_power_entries() {
        let entries = vec![
            EntitySnapshot::builder()
                .entity_id("sensor.off_power")
                .unit("W")
                .disabled(true)
                .build()
                .unwrap(),
            EntitySnapshot::builder()
                .entity_id("sensor.humid")
                .unit("W")
                .device_class("humidity")
                .build()
                .unwrap(),
            EntitySnapshot::builder()
                .entity_id("sensor.stale_power")
                .unit("W")
                .without_state()
                .build()
                .unwrap(),
            EntitySnapshot::builder()
                .entity_id("number.limit_power")
                .unit("W")
                .build()
                .unwrap(),
            power("sensor.live_power", None),
        ];

        let groups = group_by_device(&entries);

        assert_eq!(groups.len(), 1);
        assert_eq!(ids(&groups[0]), vec!["sensor.live_power"]);
    }

    #[test]
    fn should_partition_every_power_entry_exactly_once() {
        let entries = vec![
            power("sensor.a_power", Some("dev1")),
            power("sensor.b_power", None),
            power("sensor.c_power", Some("dev2")),
            power("sensor.d_power", Some("dev1")),
            power("sensor.e_power", None),
        ];

        let groups = group_by_device(&entries);

        let mut seen: Vec<&str> = groups.iter().flat_map(ids).collect();
        seen.sort_unstable();
        assert_eq!(
            seen,
            vec![
                "sensor.a_power",
                "sensor.b_power",
                "sensor.c_power",
                "sensor.d_power",
                "sensor.e_power"
            ]
        );
        for group in &groups {
            if let Some(device_id) = group.device_id() {
                assert!(
                    group
                        .entries()
                        .iter()
                        .all(|e| e.device_id.as_ref() == Some(device_id))
                );
            } else {
                assert_eq!(group.entries().len(), 1);
            }
        }
    }

    #[test]
    fn should_derive_dedup_key_from_device_or_entity() {
        let entries = vec![
            power("sensor.a_power", Some("dev1")),
            power("sensor.b_power", None),
        ];

        let groups = group_by_device(&entries);

        assert_eq!(groups[0].dedup_key().as_str(), "powerscout_device_dev1");
        assert_eq!(
            groups[1].dedup_key().as_str(),
            "powerscout_no_device_sensor.b_power"
        );
    }

    #[test]
    fn should_look_up_exclusions() {
        let excluded: Exclusions = vec!["sensor.ups_power".parse().unwrap()]
            .into_iter()
            .collect();
        assert!(excluded.contains(&"sensor.ups_power".parse().unwrap()));
        assert!(!excluded.contains(&"sensor.desk_power".parse().unwrap()));
    }
}
