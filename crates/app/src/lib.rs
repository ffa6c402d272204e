//! # powerscout-app
//!
//! Application layer: use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `RegistrySource`: read the host's entity registry, states, and devices
//!   - `ProvisionedRepository`: persist accepted provisioning records
//!   - `EventPublisher`: publish registry change notifications
//! - Define **driving/inbound ports** as use-case structs:
//!   - `DiscoveryService`: run a single-flight discovery pass, preview plans
//!   - `ProvisioningService`: accept plans, manual create/remove, list, get
//!   - `DiscoveryScheduler`: initial, periodic, and event-triggered passes
//! - Provide **in-process infrastructure** (event bus) that doesn't need IO
//!
//! ## Dependency rule
//! Depends on `powerscout-domain` only (plus `tokio::sync`/`tokio::time`).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod event_bus;
pub mod ports;
pub mod scheduler;
pub mod services;
