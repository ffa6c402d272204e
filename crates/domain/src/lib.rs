//! # powerscout-domain
//!
//! Pure domain model for powerscout: find power sensors that have no energy
//! counterpart and describe the energy sensors that should be created.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Read host registry rows and live states into an immutable [`snapshot::Snapshot`]
//! - Classify entities as power, energy, or neither ([`classify`])
//! - Group, match, and plan ([`discovery`])
//! - Describe what has already been provisioned ([`provisioned`])
//! - Registry change notifications ([`event`])
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod classify;
pub mod device;
pub mod discovery;
pub mod event;
pub mod provisioned;
pub mod registry;
pub mod snapshot;
