//! Entity snapshot: the immutable, per-pass view of the host's entities.
//!
//! A [`Snapshot`] joins registry rows with live states. It is rebuilt from
//! scratch for every discovery pass; nothing is cached between passes.

use std::collections::HashMap;

use serde::Serialize;

use crate::classify::{Classification, classify};
use crate::error::{MalformedInputError, PowerScoutError};
use crate::id::{AreaId, DeviceId, EntityId};
use crate::registry::{RegistryEntry, StateSnapshot};

/// Domain of entities that can be power or energy sensors.
pub const SENSOR_DOMAIN: &str = "sensor";

/// One entity as seen by a discovery pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntitySnapshot {
    pub entity_id: EntityId,
    pub unit: Option<String>,
    pub device_class: Option<String>,
    pub disabled: bool,
    pub device_id: Option<DeviceId>,
    pub area_id: Option<AreaId>,
    pub display_name: Option<String>,
    /// Whether the host currently holds a state object for the entity.
    pub has_state: bool,
}

impl EntitySnapshot {
    /// Create a builder for constructing an [`EntitySnapshot`].
    #[must_use]
    pub fn builder() -> EntitySnapshotBuilder {
        EntitySnapshotBuilder::default()
    }

    fn from_parts(entry: RegistryEntry, state: Option<&StateSnapshot>) -> Self {
        let display_name = entry.display_name().map(str::to_string);
        Self {
            entity_id: entry.entity_id,
            unit: state.and_then(|s| s.unit.clone()),
            device_class: state.and_then(|s| s.device_class.clone()),
            disabled: entry.disabled,
            device_id: entry.device_id,
            area_id: entry.area_id,
            display_name,
            has_state: state.is_some(),
        }
    }

    /// Domain part of the entity id.
    #[must_use]
    pub fn domain(&self) -> &str {
        self.entity_id.domain()
    }

    #[must_use]
    pub fn is_sensor(&self) -> bool {
        self.domain() == SENSOR_DOMAIN
    }

    /// Classification from the entity's unit and device class.
    #[must_use]
    pub fn classification(&self) -> Classification {
        classify(self.unit.as_deref(), self.device_class.as_deref())
    }
}

/// Step-by-step builder for [`EntitySnapshot`].
#[derive(Debug, Default)]
pub struct EntitySnapshotBuilder {
    entity_id: Option<String>,
    unit: Option<String>,
    device_class: Option<String>,
    disabled: bool,
    device_id: Option<DeviceId>,
    area_id: Option<AreaId>,
    display_name: Option<String>,
    without_state: bool,
}

impl EntitySnapshotBuilder {
    #[must_use]
    pub fn entity_id(mut self, entity_id: impl Into<String>) -> Self {
        self.entity_id = Some(entity_id.into());
        self
    }

    #[must_use]
    pub fn unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    #[must_use]
    pub fn device_class(mut self, device_class: impl Into<String>) -> Self {
        self.device_class = Some(device_class.into());
        self
    }

    #[must_use]
    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    #[must_use]
    pub fn device_id(mut self, device_id: impl Into<DeviceId>) -> Self {
        self.device_id = Some(device_id.into());
        self
    }

    #[must_use]
    pub fn area_id(mut self, area_id: impl Into<AreaId>) -> Self {
        self.area_id = Some(area_id.into());
        self
    }

    #[must_use]
    pub fn display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    /// Mark the entity as registered but without a live state.
    #[must_use]
    pub fn without_state(mut self) -> Self {
        self.without_state = true;
        self
    }

    /// Consume the builder and return an [`EntitySnapshot`].
    ///
    /// # Errors
    ///
    /// Returns [`PowerScoutError::Malformed`] if the entity id is missing or
    /// not of the form `<domain>.<object_id>`.
    pub fn build(self) -> Result<EntitySnapshot, PowerScoutError> {
        let raw = self
            .entity_id
            .ok_or(MalformedInputError::MissingField("entity_id"))?;
        let entity_id: EntityId = raw.parse().map_err(MalformedInputError::from)?;
        Ok(EntitySnapshot {
            entity_id,
            unit: self.unit,
            device_class: self.device_class,
            disabled: self.disabled,
            device_id: self.device_id,
            area_id: self.area_id,
            display_name: self.display_name,
            has_state: !self.without_state,
        })
    }
}

/// A registry entry that could not be included in a snapshot.
#[derive(Debug, PartialEq, Eq)]
pub struct RejectedEntry {
    pub entity_id: String,
    pub error: MalformedInputError,
}

/// Immutable set of [`EntitySnapshot`]s for one discovery pass.
#[derive(Debug, Default)]
pub struct Snapshot {
    entries: Vec<EntitySnapshot>,
    by_id: HashMap<EntityId, usize>,
    by_device: HashMap<DeviceId, Vec<usize>>,
    rejected: Vec<RejectedEntry>,
}

impl Snapshot {
    /// Join registry rows with live states.
    ///
    /// Registry order is preserved. States for entities missing from the
    /// registry are ignored. A repeated entity id is malformed input: the first
    /// row wins and the repeat is recorded in [`rejected`](Self::rejected).
    pub fn read(
        registry: impl IntoIterator<Item = RegistryEntry>,
        states: impl IntoIterator<Item = StateSnapshot>,
    ) -> Self {
        let states: HashMap<EntityId, StateSnapshot> = states
            .into_iter()
            .map(|s| (s.entity_id.clone(), s))
            .collect();

        let mut snapshot = Self::default();
        for entry in registry {
            let state = states.get(&entry.entity_id);
            snapshot.push(EntitySnapshot::from_parts(entry, state));
        }
        snapshot
    }

    /// Build a snapshot from already-joined entries.
    pub fn from_entries(entries: impl IntoIterator<Item = EntitySnapshot>) -> Self {
        let mut snapshot = Self::default();
        for entry in entries {
            snapshot.push(entry);
        }
        snapshot
    }

    fn push(&mut self, entry: EntitySnapshot) {
        if self.by_id.contains_key(&entry.entity_id) {
            self.rejected.push(RejectedEntry {
                entity_id: entry.entity_id.to_string(),
                error: MalformedInputError::DuplicateEntry(entry.entity_id.to_string()),
            });
            return;
        }
        let index = self.entries.len();
        self.by_id.insert(entry.entity_id.clone(), index);
        if let Some(device_id) = &entry.device_id {
            self.by_device
                .entry(device_id.clone())
                .or_default()
                .push(index);
        }
        self.entries.push(entry);
    }

    /// All entries in scan order.
    #[must_use]
    pub fn entries(&self) -> &[EntitySnapshot] {
        &self.entries
    }

    /// Look up an entry by entity id.
    #[must_use]
    pub fn get(&self, entity_id: &EntityId) -> Option<&EntitySnapshot> {
        self.by_id.get(entity_id).map(|&i| &self.entries[i])
    }

    /// Entries attached to `device_id`, in scan order.
    pub fn device_members<'a>(
        &'a self,
        device_id: &DeviceId,
    ) -> impl Iterator<Item = &'a EntitySnapshot> + use<'a> {
        self.by_device
            .get(device_id)
            .into_iter()
            .flatten()
            .map(|&i| &self.entries[i])
    }

    /// Entries dropped while reading.
    #[must_use]
    pub fn rejected(&self) -> &[RejectedEntry] {
        &self.rejected
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
