//! Application services: use-case implementations.
//!
//! Each service struct accepts port trait implementations via generic parameters
//! (constructor injection), keeping this layer decoupled from concrete adapters.

pub mod discovery_service;
pub mod provisioning_service;

#[cfg(test)]
pub(crate) mod fakes;
