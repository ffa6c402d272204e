//! Typed identifier newtypes.
//!
//! Host-assigned identifiers (devices, areas) are opaque strings. Entity ids
//! carry structure (`<domain>.<object_id>`) and are validated on construction.
//! Records created by powerscout itself are keyed by UUIDs.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::EntityIdError;

macro_rules! define_host_id {
    ($(#[doc = $doc:expr])* $name:ident) => {
        $(#[doc = $doc])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wrap a host-assigned identifier.
            #[must_use]
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Borrow the raw identifier.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self::new(value)
            }
        }
    };
}

macro_rules! define_uuid_id {
    ($(#[doc = $doc:expr])* $name:ident) => {
        $(#[doc = $doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(uuid::Uuid);

        impl Default for $name {
            fn default() -> Self {
                Self(uuid::Uuid::new_v4())
            }
        }

        impl $name {
            /// Generate a new random identifier.
            #[must_use]
            pub fn new() -> Self {
                Self::default()
            }

            /// Wrap an existing UUID.
            #[must_use]
            pub fn from_uuid(uuid: uuid::Uuid) -> Self {
                Self(uuid)
            }

            /// Access the inner UUID.
            #[must_use]
            pub fn as_uuid(self) -> uuid::Uuid {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                uuid::Uuid::parse_str(s).map(Self)
            }
        }
    };
}

define_host_id!(
    /// Host identifier of a device (physical or virtual thing exposing entities).
    DeviceId
);

define_host_id!(
    /// Host identifier of an area (room, zone).
    AreaId
);

define_uuid_id!(
    /// Unique identifier for a [`ProvisionedRecord`](crate::provisioned::ProvisionedRecord).
    RecordId
);

/// Host entity identifier of the form `<domain>.<object_id>`, e.g. `sensor.plug_power`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EntityId(String);

impl EntityId {
    /// Build an entity id from its two parts.
    ///
    /// # Errors
    ///
    /// Returns [`EntityIdError`] when either part is empty or the domain
    /// contains a dot.
    pub fn from_parts(domain: &str, object_id: &str) -> Result<Self, EntityIdError> {
        let value = format!("{domain}.{object_id}");
        if domain.contains('.') {
            return Err(EntityIdError { value });
        }
        value.parse()
    }

    /// Borrow the full id.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The domain part (`sensor` in `sensor.plug_power`).
    #[must_use]
    pub fn domain(&self) -> &str {
        self.split().0
    }

    /// The object id part (`plug_power` in `sensor.plug_power`).
    #[must_use]
    pub fn object_id(&self) -> &str {
        self.split().1
    }

    fn split(&self) -> (&str, &str) {
        // Validated at construction, so the dot is always present.
        self.0.split_once('.').unwrap_or((self.0.as_str(), ""))
    }
}

impl FromStr for EntityId {
    type Err = EntityIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('.') {
            Some((domain, object_id))
                if !domain.is_empty()
                    && !object_id.is_empty()
                    && !s.chars().any(char::is_whitespace) =>
            {
                Ok(Self(s.to_string()))
            }
            _ => Err(EntityIdError {
                value: s.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for EntityId {
    type Error = EntityIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<EntityId> for String {
    fn from(value: EntityId) -> Self {
        value.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
