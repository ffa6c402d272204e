//! Detection of an existing energy counterpart for a device group.
//!
//! Device co-membership is checked first; when it finds nothing, sibling
//! entity names derived from each power entity are looked up instead. Either
//! way the first hit wins.

use crate::classify::Classification;
use crate::id::EntityId;
use crate::snapshot::{EntitySnapshot, SENSOR_DOMAIN, Snapshot};

use super::group::DeviceGroup;

/// How an energy entity was found for a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnergyMatch<'a> {
    /// An energy sensor on the same device.
    Device { energy: &'a EntitySnapshot },
    /// An energy sensor whose id derives from a power entity's id.
    Name {
        power: &'a EntityId,
        energy: &'a EntitySnapshot,
    },
}

impl EnergyMatch<'_> {
    /// The energy entity that satisfied the match.
    #[must_use]
    pub fn energy_entity_id(&self) -> &EntityId {
        match self {
            Self::Device { energy } | Self::Name { energy, .. } => &energy.entity_id,
        }
    }
}

/// Whether the group already has an energy entity.
#[must_use]
pub fn has_energy_match(group: &DeviceGroup, snapshot: &Snapshot) -> bool {
    find_energy_match(group, snapshot).is_some()
}

/// Find the energy entity that makes a group not need provisioning.
#[must_use]
pub fn find_energy_match<'a>(
    group: &'a DeviceGroup,
    snapshot: &'a Snapshot,
) -> Option<EnergyMatch<'a>> {
    if let Some(device_id) = group.device_id() {
        let found = snapshot.device_members(device_id).find(|entry| {
            entry.is_sensor() && !entry.disabled && entry.classification() == Classification::Energy
        });
        if let Some(energy) = found {
            return Some(EnergyMatch::Device { energy });
        }
    }

    for power in group.entity_ids() {
        for candidate in name_candidates(power.object_id()) {
            let Ok(candidate_id) = EntityId::from_parts(SENSOR_DOMAIN, &candidate) else {
                continue;
            };
            if let Some(energy) = snapshot.get(&candidate_id)
                && energy.has_state
                && energy.classification() == Classification::Energy
            {
                return Some(EnergyMatch::Name { power, energy });
            }
        }
    }

    None
}

/// Sibling object ids an energy sensor for `local_name` is commonly given.
///
/// Always six forms, in lookup order; forms may repeat when a substitution
/// has nothing to replace or two substitutions coincide.
#[must_use]
pub fn name_candidates(local_name: &str) -> [String; 6] {
    [
        local_name.replace("_power", "_energy"),
        local_name.replace("_power", "_total_energy"),
        local_name.replace("power", "energy"),
        local_name.replace("power", "total_energy"),
        format!("{local_name}_energy"),
        format!("{local_name}_total_energy"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::group_by_device;

    fn power(id: &str, device: Option<&str>) -> EntitySnapshot {
        let mut builder = EntitySnapshot::builder().entity_id(id).unit("W");
        if let Some(device) = device {
            builder = builder.device_id(device);
        }
        builder.build().unwrap()
    }

    fn energy(id: &str, device: Option<&str>) -> EntitySnapshot {
        let mut builder = EntitySnapshot::builder().entity_id(id).unit("kWh");
        if let Some(device) = device {
            builder = builder.device_id(device);
        }
        builder.build().unwrap()
    }

    fn only_group(snapshot: &Snapshot) -> DeviceGroup {
        let mut groups = group_by_device(snapshot.entries());
        assert_eq!(groups.len(), 1);
        groups.remove(0)
    }

    #[test]
    fn should_generate_all_six_candidate_forms_in_order() {
        assert_eq!(
            name_candidates("plug_power"),
            [
                "plug_energy".to_string(),
                "plug_total_energy".to_string(),
                "plug_energy".to_string(),
                "plug_total_energy".to_string(),
                "plug_power_energy".to_string(),
                "plug_power_total_energy".to_string(),
            ]
        );
    }

    #[test]
    fn should_replace_every_occurrence_when_generating_candidates() {
        let candidates = name_candidates("powerwall_power");
        assert_eq!(candidates[0], "powerwall_energy");
        assert_eq!(candidates[2], "energywall_energy");
        assert_eq!(candidates[3], "total_energywall_total_energy");
    }

    #[test]
    fn should_keep_name_unchanged_when_no_power_substring() {
        let candidates = name_candidates("desk_watts");
        assert_eq!(candidates[0], "desk_watts");
        assert_eq!(candidates[2], "desk_watts");
        assert_eq!(candidates[4], "desk_watts_energy");
    }

    #[test]
    fn should_match_energy_sensor_on_same_device() {
        let snapshot = Snapshot::from_entries(vec![
            power("sensor.plug_power", Some("dev1")),
            energy("sensor.plug_consumption", Some("dev1")),
        ]);
        let group = only_group(&snapshot);

        let found = find_energy_match(&group, &snapshot).unwrap();
        assert!(matches!(found, EnergyMatch::Device { .. }));
        assert_eq!(found.energy_entity_id().as_str(), "sensor.plug_consumption");
    }

    #[test]
    fn should_ignore_disabled_energy_sensor_on_same_device() {
        let mut disabled = energy("sensor.plug_consumption", Some("dev1"));
        disabled.disabled = true;
        let snapshot =
            Snapshot::from_entries(vec![power("sensor.plug_power", Some("dev1")), disabled]);
        let group = only_group(&snapshot);

        assert!(!has_energy_match(&group, &snapshot));
    }

    #[test]
    fn should_ignore_energy_unit_on_non_sensor_domain() {
        let snapshot = Snapshot::from_entries(vec![
            power("sensor.plug_power", Some("dev1")),
            energy("number.plug_energy_limit", Some("dev1")),
        ]);
        let group = only_group(&snapshot);

        assert!(!has_energy_match(&group, &snapshot));
    }

    #[test]
    fn should_ignore_energy_sensor_with_foreign_device_class() {
        let mut gas = energy("sensor.boiler_gas", Some("dev1"));
        gas.device_class = Some("gas".to_string());
        let snapshot =
            Snapshot::from_entries(vec![power("sensor.boiler_power", Some("dev1")), gas]);
        let group = only_group(&snapshot);

        assert!(!has_energy_match(&group, &snapshot));
    }

    #[test]
    fn should_match_by_name_when_entity_has_no_device() {
        let snapshot = Snapshot::from_entries(vec![
            power("sensor.plug_power", None),
            energy("sensor.plug_energy", None),
        ]);
        let group = only_group(&snapshot);

        let found = find_energy_match(&group, &snapshot).unwrap();
        assert!(matches!(found, EnergyMatch::Name { .. }));
        assert_eq!(found.energy_entity_id().as_str(), "sensor.plug_energy");
    }

    #[test]
    fn should_match_by_name_when_device_has_no_energy_sibling() {
        let snapshot = Snapshot::from_entries(vec![
            power("sensor.plug_power", Some("dev1")),
            energy("sensor.plug_power_total_energy", None),
        ]);
        let group = only_group(&snapshot);

        assert!(has_energy_match(&group, &snapshot));
    }

    #[test]
    fn should_not_match_by_name_when_candidate_has_no_state() {
        let stale = EntitySnapshot::builder()
            .entity_id("sensor.plug_energy")
            .without_state()
            .build()
            .unwrap();
        let snapshot = Snapshot::from_entries(vec![power("sensor.plug_power", None), stale]);
        let group = only_group(&snapshot);

        assert!(!has_energy_match(&group, &snapshot));
    }

    #[test]
    fn should_not_match_by_name_when_candidate_is_not_energy() {
        let mut wrong = energy("sensor.plug_energy", None);
        wrong.unit = Some("W".to_string());
        let snapshot = Snapshot::from_entries(vec![power("sensor.plug_power", None), wrong]);
        let groups = group_by_device(snapshot.entries());

        assert!(groups.iter().all(|g| !has_energy_match(g, &snapshot)));
    }

    #[test]
    fn should_report_no_match_when_nothing_relates() {
        let snapshot = Snapshot::from_entries(vec![
            power("sensor.plug_power", Some("dev1")),
            energy("sensor.other_energy", Some("dev2")),
        ]);
        let group = only_group(&snapshot);

        assert!(!has_energy_match(&group, &snapshot));
    }
}
