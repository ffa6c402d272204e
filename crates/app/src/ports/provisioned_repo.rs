//! Provisioned record repository port: persistence for accepted plans.

use std::future::Future;

use powerscout_domain::discovery::DedupKey;
use powerscout_domain::error::PowerScoutError;
use powerscout_domain::id::RecordId;
use powerscout_domain::provisioned::ProvisionedRecord;

/// Repository for persisting and querying [`ProvisionedRecord`]s.
///
/// Implementations must refuse a second record with the same dedup key with
/// [`PowerScoutError::Rejected`].
pub trait ProvisionedRepository {
    /// Store a new record.
    fn create(
        &self,
        record: ProvisionedRecord,
    ) -> impl Future<Output = Result<ProvisionedRecord, PowerScoutError>> + Send;

    /// Get a record by its unique identifier.
    fn get_by_id(
        &self,
        id: RecordId,
    ) -> impl Future<Output = Result<Option<ProvisionedRecord>, PowerScoutError>> + Send;

    /// Get all records, oldest first.
    fn get_all(
        &self,
    ) -> impl Future<Output = Result<Vec<ProvisionedRecord>, PowerScoutError>> + Send;

    /// Find the record holding a dedup key.
    fn find_by_dedup_key(
        &self,
        key: &DedupKey,
    ) -> impl Future<Output = Result<Option<ProvisionedRecord>, PowerScoutError>> + Send;

    /// Delete a record by its unique identifier.
    fn delete(&self, id: RecordId) -> impl Future<Output = Result<(), PowerScoutError>> + Send;
}
