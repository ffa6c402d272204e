//! # powerscout-adapter-registry-json
//!
//! Registry source backed by a JSON export of the host's registries.
//!
//! ## Responsibilities
//! - Implement `RegistrySource` from `powerscout-app::ports`
//! - Parse host-shaped entity registry rows, state objects, and device rows
//! - Skip (and log) malformed elements instead of failing the whole file
//!
//! ## File layout
//! ```json
//! {
//!   "entities": [{ "entity_id": "sensor.plug_power", "device_id": "abc", "disabled_by": null }],
//!   "states": [{ "entity_id": "sensor.plug_power", "state": "12.5",
//!                "attributes": { "unit_of_measurement": "W", "device_class": "power" } }],
//!   "devices": [{ "id": "abc", "name": "Plug", "name_by_user": null }]
//! }
//! ```
//!
//! ## Dependency rule
//! Depends on `powerscout-app` (for port traits) and `powerscout-domain` (for domain types).
//! The `app` and `domain` crates must never reference this adapter.

mod dto;
mod error;
mod source;

pub use error::RegistryFileError;
pub use source::{JsonRegistrySource, parse_dump};
