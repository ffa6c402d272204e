//! Registry events: notifications that an entity was added, changed or
//! removed on the host.
//!
//! Events only hint that a discovery pass may be worthwhile; the pass itself
//! always works from a fresh snapshot.

use serde::{Deserialize, Serialize};

use crate::id::EntityId;
use crate::snapshot::SENSOR_DOMAIN;
use crate::time::{Timestamp, now};

/// What happened to the entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegistryAction {
    Create,
    Update,
    Remove,
}

/// An entity-registry change notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryEvent {
    pub action: RegistryAction,
    pub entity_id: EntityId,
    #[serde(default = "now")]
    pub received_at: Timestamp,
}

impl RegistryEvent {
    #[must_use]
    pub fn new(action: RegistryAction, entity_id: EntityId) -> Self {
        Self {
            action,
            entity_id,
            received_at: now(),
        }
    }

    /// Whether the event may reveal a new power sensor: a sensor that was
    /// created or updated. Removals never do.
    #[must_use]
    pub fn may_trigger_discovery(&self) -> bool {
        matches!(self.action, RegistryAction::Create | RegistryAction::Update)
            && self.entity_id.domain() == SENSOR_DOMAIN
    }
}
