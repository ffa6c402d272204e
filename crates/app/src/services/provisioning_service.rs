//! Provisioning service: accepts plans and manages provisioned records.

use std::future::Future;

use powerscout_domain::classify::is_power_unit;
use powerscout_domain::discovery::{DedupKey, Plan, Provisioned};
use powerscout_domain::error::{NotFoundError, PowerScoutError, RejectedError, ValidationError};
use powerscout_domain::id::{EntityId, RecordId};
use powerscout_domain::provisioned::{
    EnergySensorSettings, ProvisionedRecord, manual_companion_id,
};

use crate::ports::{ProvisionedRepository, ProvisioningSink, RegistrySource};

/// Request to provision energy sensors for one explicitly chosen power entity.
#[derive(Debug, Clone)]
pub struct ManualRequest {
    pub power_entity_id: EntityId,
    pub settings: EnergySensorSettings,
}

impl ManualRequest {
    /// Request with the manual default settings.
    #[must_use]
    pub fn new(power_entity_id: EntityId) -> Self {
        Self {
            power_entity_id,
            settings: EnergySensorSettings::manual(),
        }
    }
}

/// Application service owning the provisioned record set.
pub struct ProvisioningService<R, S> {
    repo: R,
    source: S,
}

impl<R, S> ProvisioningService<R, S>
where
    R: ProvisionedRepository + Send + Sync,
    S: RegistrySource + Send + Sync,
{
    /// Create a new service backed by the given repository and registry source.
    pub fn new(repo: R, source: S) -> Self {
        Self { repo, source }
    }

    /// Persist a discovery plan as a record.
    ///
    /// # Errors
    ///
    /// Returns [`PowerScoutError::Rejected`] when the plan's dedup key is
    /// already provisioned, or a storage error from the repository.
    #[tracing::instrument(skip(self, plan), fields(dedup_key = %plan.dedup_key))]
    pub async fn accept_plan(&self, plan: Plan) -> Result<ProvisionedRecord, PowerScoutError> {
        self.ensure_unprovisioned(&plan.dedup_key).await?;
        let record = ProvisionedRecord::from_plan(plan);
        record.validate()?;
        let record = self.repo.create(record).await?;
        tracing::info!(record_id = %record.id, title = %record.title, "plan accepted");
        Ok(record)
    }

    /// Provision energy sensors for a single power entity.
    ///
    /// # Errors
    ///
    /// - [`PowerScoutError::NotFound`] when the entity has no live state.
    /// - [`PowerScoutError::Validation`] when the entity does not report a
    ///   power unit, its `_total_energy` companion already exists, or the
    ///   settings are out of range.
    /// - [`PowerScoutError::Rejected`] when an existing record, manual or
    ///   discovered, already covers the entity.
    #[tracing::instrument(skip(self, request), fields(entity_id = %request.power_entity_id))]
    pub async fn create_manual(
        &self,
        request: ManualRequest,
    ) -> Result<ProvisionedRecord, PowerScoutError> {
        let (snapshot, _) = self.source.load().await?.into_parts();
        let entity_id = request.power_entity_id;

        let entry = snapshot
            .get(&entity_id)
            .filter(|entry| entry.has_state)
            .ok_or_else(|| NotFoundError {
                entity: "Entity",
                id: entity_id.to_string(),
            })?;
        if !is_power_unit(entry.unit.as_deref()) {
            return Err(ValidationError::NotPowerSensor {
                entity_id: entity_id.to_string(),
                unit: entry.unit.clone(),
            }
            .into());
        }
        if let Some(companion) = manual_companion_id(&entity_id)
            && snapshot.get(&companion).is_some()
        {
            return Err(ValidationError::EnergySensorExists(companion.to_string()).into());
        }

        let record = ProvisionedRecord::manual(
            entity_id,
            entry.device_id.clone(),
            entry.area_id.clone(),
            request.settings,
        )?;
        if let Some(existing) = self
            .repo
            .get_all()
            .await?
            .into_iter()
            .find(|existing| {
                existing
                    .power_entity_ids
                    .iter()
                    .any(|id| record.power_entity_ids.contains(id))
            })
        {
            return Err(RejectedError {
                dedup_key: existing.dedup_key.to_string(),
            }
            .into());
        }
        let record = self.repo.create(record).await?;
        tracing::info!(record_id = %record.id, title = %record.title, "manual record created");
        Ok(record)
    }

    /// Look up a record by id.
    ///
    /// # Errors
    ///
    /// Returns [`PowerScoutError::NotFound`] when no record with `id` exists,
    /// or a storage error from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn get_record(&self, id: RecordId) -> Result<ProvisionedRecord, PowerScoutError> {
        self.repo.get_by_id(id).await?.ok_or_else(|| {
            NotFoundError {
                entity: "ProvisionedRecord",
                id: id.to_string(),
            }
            .into()
        })
    }

    /// List all records.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn list_records(&self) -> Result<Vec<ProvisionedRecord>, PowerScoutError> {
        self.repo.get_all().await
    }

    /// Remove a record, freeing its dedup key for later passes.
    ///
    /// # Errors
    ///
    /// Returns [`PowerScoutError::NotFound`] when no record with `id` exists,
    /// or a storage error from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn remove_record(&self, id: RecordId) -> Result<ProvisionedRecord, PowerScoutError> {
        let record = self.get_record(id).await?;
        self.repo.delete(id).await?;
        tracing::info!(dedup_key = %record.dedup_key, "record removed");
        Ok(record)
    }

    async fn ensure_unprovisioned(&self, key: &DedupKey) -> Result<(), PowerScoutError> {
        match self.repo.find_by_dedup_key(key).await? {
            Some(_) => Err(RejectedError {
                dedup_key: key.to_string(),
            }
            .into()),
            None => Ok(()),
        }
    }
}

impl<R, S> ProvisioningSink for ProvisioningService<R, S>
where
    R: ProvisionedRepository + Send + Sync,
    S: RegistrySource + Send + Sync,
{
    fn provisioned(&self) -> impl Future<Output = Result<Provisioned, PowerScoutError>> + Send {
        async move {
            let records = self.repo.get_all().await?;
            Ok(records.iter().collect())
        }
    }

    fn submit(
        &self,
        plan: Plan,
    ) -> impl Future<Output = Result<ProvisionedRecord, PowerScoutError>> + Send {
        self.accept_plan(plan)
    }
}
