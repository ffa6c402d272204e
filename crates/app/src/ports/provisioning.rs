//! Provisioning sink port: where discovery hands its plans.

use std::future::Future;

use powerscout_domain::discovery::{Plan, Provisioned};
use powerscout_domain::error::PowerScoutError;
use powerscout_domain::provisioned::ProvisionedRecord;

/// Accepts provisioning plans and reports what is already provisioned.
pub trait ProvisioningSink {
    /// Dedup keys of every existing record, and the power entities manual
    /// records cover.
    fn provisioned(&self) -> impl Future<Output = Result<Provisioned, PowerScoutError>> + Send;

    /// Accept a plan.
    ///
    /// Returns [`PowerScoutError::Rejected`] when the plan's dedup key is
    /// already provisioned.
    fn submit(
        &self,
        plan: Plan,
    ) -> impl Future<Output = Result<ProvisionedRecord, PowerScoutError>> + Send;
}

impl<T: ProvisioningSink + Send + Sync> ProvisioningSink for std::sync::Arc<T> {
    fn provisioned(&self) -> impl Future<Output = Result<Provisioned, PowerScoutError>> + Send {
        (**self).provisioned()
    }

    fn submit(
        &self,
        plan: Plan,
    ) -> impl Future<Output = Result<ProvisionedRecord, PowerScoutError>> + Send {
        (**self).submit(plan)
    }
}
