//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into
//! [`PowerScoutError`] via `#[from]` (or an explicit `From` impl for adapter
//! errors, which land in [`PowerScoutError::Storage`]).

/// Top-level error shared by the domain, application, and adapter layers.
#[derive(Debug, thiserror::Error)]
pub enum PowerScoutError {
    /// A domain invariant was violated by caller-supplied data.
    #[error("validation error")]
    Validation(#[from] ValidationError),

    /// The requested item does not exist.
    #[error("not found")]
    NotFound(#[from] NotFoundError),

    /// A host registry or state entry could not be used.
    #[error("malformed input")]
    Malformed(#[from] MalformedInputError),

    /// The provisioning workflow declined a plan.
    #[error("provisioning rejected")]
    Rejected(#[from] RejectedError),

    /// A persistence or IO backend failed.
    #[error("storage error")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Domain validation failures.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("name must not be empty")]
    EmptyName,

    #[error("at least one power entity is required")]
    NoPowerEntities,

    #[error(transparent)]
    InvalidEntityId(#[from] EntityIdError),

    #[error("{entity_id} is not a power sensor (unit: {})", unit.as_deref().unwrap_or("none"))]
    NotPowerSensor {
        entity_id: String,
        unit: Option<String>,
    },

    #[error("energy sensor {0} already exists")]
    EnergySensorExists(String),

    #[error("round digits must be between 0 and 10, got {0}")]
    RoundDigitsOutOfRange(u32),

    #[error("max sub-interval must be between 1 and 60 minutes, got {0}")]
    MaxSubIntervalOutOfRange(u32),

    #[error("unit prefix must be \"\" or \"k\", got {0:?}")]
    UnsupportedUnitPrefix(String),
}

/// An entity id that does not follow the `<domain>.<object_id>` shape.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
#[error("invalid entity id {value:?}, expected <domain>.<object_id>")]
pub struct EntityIdError {
    pub value: String,
}

/// Lookup failure for a named resource.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("{entity} {id} not found")]
pub struct NotFoundError {
    pub entity: &'static str,
    pub id: String,
}

/// A host-provided entry that is missing data or contradicts another entry.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum MalformedInputError {
    #[error(transparent)]
    EntityId(#[from] EntityIdError),

    #[error("missing required field `{0}`")]
    MissingField(&'static str),

    #[error("duplicate registry entry for {0}")]
    DuplicateEntry(String),
}

/// The dedup key of a plan is already held by a provisioned record.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("{dedup_key} is already provisioned")]
pub struct RejectedError {
    pub dedup_key: String,
}
