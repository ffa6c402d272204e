//! # powerscout-adapter-storage-sqlite-sqlx
//!
//! `SQLite` persistence adapter using [sqlx](https://docs.rs/sqlx).
//!
//! ## Responsibilities
//! - Implement `ProvisionedRepository` from `powerscout-app::ports`
//! - Manage `SQLite` connection pool lifecycle
//! - Run database migrations (using sqlx embedded migrations)
//! - Map between domain types and database rows
//!
//! ## Dependency rule
//! Depends on `powerscout-app` (for port traits) and `powerscout-domain` (for domain types).
//! The `app` and `domain` crates must never reference this adapter.

mod error;
mod pool;
mod provisioned_repo;

pub use error::StorageError;
pub use pool::{Config, Database};
pub use provisioned_repo::SqliteProvisionedRepository;
