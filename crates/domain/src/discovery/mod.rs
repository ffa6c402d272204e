//! Discovery engine: finds power sensors that lack an energy counterpart.
//!
//! A pass runs in four steps over an immutable [`Snapshot`]:
//!
//! 1. select power candidates (enabled sensors classified as power, minus
//!    configured [`Exclusions`] and entities a manual record already covers);
//! 2. [`group_by_device`];
//! 3. look for an existing energy entity per group ([`find_energy_match`]);
//! 4. emit a [`Plan`] for each remaining group whose [`DedupKey`] is not
//!    already provisioned.
//!
//! Everything here is synchronous and free of IO.

mod group;
mod matcher;
mod plan;

use std::collections::HashSet;

pub use group::{DeviceGroup, Exclusions, GroupKey, group_by_device, is_power_candidate};
pub use matcher::{EnergyMatch, find_energy_match, has_energy_match, name_candidates};
pub use plan::{
    DedupKey, GroupDecision, Plan, build_plans, evaluate_group, name_from_entity_id,
    resolve_display_name, title_case,
};

pub(crate) use plan::record_title;

use crate::device::DeviceDirectory;
use crate::id::EntityId;
use crate::provisioned::{ProvisionedRecord, RecordOrigin};
use crate::snapshot::Snapshot;

/// What existing records already cover when a pass starts.
#[derive(Debug, Clone, Default)]
pub struct Provisioned {
    /// Dedup keys of every record.
    pub keys: HashSet<DedupKey>,
    /// Power entities provisioned one at a time through manual records.
    pub manual_entities: HashSet<EntityId>,
}

impl<'a> FromIterator<&'a ProvisionedRecord> for Provisioned {
    fn from_iter<T: IntoIterator<Item = &'a ProvisionedRecord>>(iter: T) -> Self {
        let mut provisioned = Self::default();
        for record in iter {
            provisioned.keys.insert(record.dedup_key.clone());
            if record.origin == RecordOrigin::Manual {
                provisioned
                    .manual_entities
                    .extend(record.power_entity_ids.iter().cloned());
            }
        }
        provisioned
    }
}

/// Result of running the engine over one snapshot.
#[derive(Debug, Clone, Default)]
pub struct Discovery {
    /// Power candidates dropped because they are excluded.
    pub excluded: usize,
    /// Power candidates dropped because a manual record covers them.
    pub manually_provisioned: usize,
    /// Power candidates that were grouped.
    pub power_entities: usize,
    /// One decision per device group, in group order.
    pub decisions: Vec<GroupDecision>,
}

impl Discovery {
    /// Plans emitted by the pass.
    pub fn plans(&self) -> impl Iterator<Item = &Plan> {
        self.decisions.iter().filter_map(|d| match d {
            GroupDecision::Planned(plan) => Some(plan),
            _ => None,
        })
    }

    /// Consume the result, keeping only the plans.
    #[must_use]
    pub fn into_plans(self) -> Vec<Plan> {
        self.decisions
            .into_iter()
            .filter_map(|d| match d {
                GroupDecision::Planned(plan) => Some(plan),
                _ => None,
            })
            .collect()
    }

    #[must_use]
    pub fn matched(&self) -> usize {
        self.count(|d| matches!(d, GroupDecision::Matched { .. }))
    }

    #[must_use]
    pub fn already_provisioned(&self) -> usize {
        self.count(|d| matches!(d, GroupDecision::AlreadyProvisioned { .. }))
    }

    fn count(&self, predicate: impl Fn(&GroupDecision) -> bool) -> usize {
        self.decisions.iter().filter(|d| predicate(d)).count()
    }
}

/// Run all engine steps over `snapshot`.
#[must_use]
pub fn discover(
    snapshot: &Snapshot,
    devices: &DeviceDirectory,
    exclusions: &Exclusions,
    provisioned: &Provisioned,
) -> Discovery {
    let (excluded, candidates): (Vec<_>, Vec<_>) = snapshot
        .entries()
        .iter()
        .filter(|e| is_power_candidate(e))
        .partition(|e| exclusions.contains(&e.entity_id));
    let (manual, candidates): (Vec<_>, Vec<_>) = candidates
        .into_iter()
        .partition(|e| provisioned.manual_entities.contains(&e.entity_id));

    let groups = group_by_device(candidates.iter().copied());
    let decisions = groups
        .iter()
        .map(|group| evaluate_group(group, snapshot, devices, &provisioned.keys))
        .collect();

    Discovery {
        excluded: excluded.len(),
        manually_provisioned: manual.len(),
        power_entities: candidates.len(),
        decisions,
    }
}
