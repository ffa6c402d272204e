//! Discovery service: runs discovery passes against the host registry.

use serde::Serialize;
use tokio::sync::Mutex;

use powerscout_domain::classify::Classification;
use powerscout_domain::discovery::{Exclusions, GroupDecision, Plan, discover};
use powerscout_domain::error::PowerScoutError;
use powerscout_domain::event::RegistryEvent;
use powerscout_domain::provisioned::ProvisionedRecord;
use powerscout_domain::time::{Timestamp, now};

use crate::ports::{ProvisioningSink, RegistrySource};

/// What started a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PassTrigger {
    Startup,
    Scheduled,
    RegistryEvent,
    Manual,
}

/// Outcome of one discovery pass.
#[derive(Debug, Clone, Serialize)]
pub struct DiscoveryReport {
    pub trigger: PassTrigger,
    pub started_at: Timestamp,
    pub finished_at: Timestamp,
    /// Entities in the snapshot.
    pub entities: usize,
    /// Registry elements or rows left out as malformed.
    pub skipped_entries: usize,
    pub power_entities: usize,
    pub excluded: usize,
    /// Power entities left out because a manual record covers them.
    pub manually_provisioned: usize,
    pub groups: usize,
    pub matched: usize,
    pub already_provisioned: usize,
    /// Records created from this pass's plans.
    pub created: Vec<ProvisionedRecord>,
    /// Plans refused because their key was provisioned in the meantime.
    pub rejected: usize,
    /// Plans whose submission failed for any other reason.
    pub failed: usize,
}

/// Application service running the discovery engine.
///
/// At most one pass runs at a time; callers queue behind the pass in flight.
pub struct DiscoveryService<S, P> {
    source: S,
    sink: P,
    exclusions: Exclusions,
    pass_lock: Mutex<()>,
}

impl<S, P> DiscoveryService<S, P>
where
    S: RegistrySource + Send + Sync,
    P: ProvisioningSink + Send + Sync,
{
    /// Create a new service reading from `source` and submitting to `sink`.
    pub fn new(source: S, sink: P, exclusions: Exclusions) -> Self {
        Self {
            source,
            sink,
            exclusions,
            pass_lock: Mutex::new(()),
        }
    }

    /// Run one full pass: snapshot, discover, and submit every plan.
    ///
    /// Failures while submitting one plan are counted and logged; they never
    /// abort the pass.
    ///
    /// # Errors
    ///
    /// Returns an error when the registry or the provisioned set cannot be
    /// read.
    #[tracing::instrument(skip(self))]
    pub async fn run_pass(
        &self,
        trigger: PassTrigger,
    ) -> Result<DiscoveryReport, PowerScoutError> {
        let _guard = self.pass_lock.lock().await;
        let started_at = now();

        let dump = self.source.load().await?;
        let skipped = dump.skipped;
        let (snapshot, devices) = dump.into_parts();
        for rejected in snapshot.rejected() {
            tracing::warn!(
                entity_id = %rejected.entity_id,
                error = %rejected.error,
                "skipping registry entry"
            );
        }
        let provisioned = self.sink.provisioned().await?;

        let discovery = discover(&snapshot, &devices, &self.exclusions, &provisioned);
        for decision in &discovery.decisions {
            log_decision(decision);
        }

        let mut report = DiscoveryReport {
            trigger,
            started_at,
            finished_at: started_at,
            entities: snapshot.len(),
            skipped_entries: skipped + snapshot.rejected().len(),
            power_entities: discovery.power_entities,
            excluded: discovery.excluded,
            manually_provisioned: discovery.manually_provisioned,
            groups: discovery.decisions.len(),
            matched: discovery.matched(),
            already_provisioned: discovery.already_provisioned(),
            created: Vec::new(),
            rejected: 0,
            failed: 0,
        };

        for plan in discovery.into_plans() {
            let dedup_key = plan.dedup_key.clone();
            match self.sink.submit(plan).await {
                Ok(record) => report.created.push(record),
                Err(PowerScoutError::Rejected(err)) => {
                    tracing::warn!(%dedup_key, error = %err, "plan rejected");
                    report.rejected += 1;
                }
                Err(err) => {
                    tracing::warn!(%dedup_key, error = %err, "plan submission failed");
                    report.failed += 1;
                }
            }
        }

        report.finished_at = now();
        tracing::info!(
            entities = report.entities,
            power_entities = report.power_entities,
            manually_provisioned = report.manually_provisioned,
            groups = report.groups,
            matched = report.matched,
            already_provisioned = report.already_provisioned,
            created = report.created.len(),
            rejected = report.rejected,
            failed = report.failed,
            "discovery pass finished"
        );
        Ok(report)
    }

    /// Plans a pass would emit right now, without submitting them.
    ///
    /// # Errors
    ///
    /// Returns an error when the registry or the provisioned set cannot be
    /// read.
    #[tracing::instrument(skip(self))]
    pub async fn preview_plans(&self) -> Result<Vec<Plan>, PowerScoutError> {
        let (snapshot, devices) = self.source.load().await?.into_parts();
        let provisioned = self.sink.provisioned().await?;
        Ok(discover(&snapshot, &devices, &self.exclusions, &provisioned).into_plans())
    }

    /// Whether a registry event concerns a power sensor and should start a
    /// pass.
    ///
    /// # Errors
    ///
    /// Returns an error when the registry cannot be read.
    #[tracing::instrument(skip(self, event), fields(entity_id = %event.entity_id))]
    pub async fn is_relevant(&self, event: &RegistryEvent) -> Result<bool, PowerScoutError> {
        if !event.may_trigger_discovery() {
            return Ok(false);
        }
        let (snapshot, _) = self.source.load().await?.into_parts();
        Ok(snapshot
            .get(&event.entity_id)
            .is_some_and(|entry| entry.classification() == Classification::Power))
    }
}

fn log_decision(decision: &GroupDecision) {
    match decision {
        GroupDecision::Matched {
            dedup_key,
            energy_entity_id,
        } => {
            tracing::debug!(%dedup_key, %energy_entity_id, "energy entity already present");
        }
        GroupDecision::AlreadyProvisioned { dedup_key } => {
            tracing::debug!(%dedup_key, "already provisioned");
        }
        GroupDecision::Planned(plan) => {
            tracing::debug!(
                dedup_key = %plan.dedup_key,
                power_entities = plan.power_entity_ids.len(),
                "planned"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::ports::RegistryDump;
    use crate::services::fakes::{DumpBuilder, InMemoryProvisionedRepo, StaticRegistrySource};
    use crate::services::provisioning_service::{ManualRequest, ProvisioningService};
    use powerscout_domain::event::RegistryAction;
    use powerscout_domain::id::EntityId;

    type Provisioning = ProvisioningService<InMemoryProvisionedRepo, Arc<StaticRegistrySource>>;

    struct Harness {
        source: Arc<StaticRegistrySource>,
        provisioning: Arc<Provisioning>,
        discovery: DiscoveryService<Arc<StaticRegistrySource>, Arc<Provisioning>>,
    }

    fn harness(dump: RegistryDump, exclusions: Exclusions) -> Harness {
        let source = Arc::new(StaticRegistrySource::new(dump));
        let provisioning = Arc::new(ProvisioningService::new(
            InMemoryProvisionedRepo::default(),
            Arc::clone(&source),
        ));
        let discovery =
            DiscoveryService::new(Arc::clone(&source), Arc::clone(&provisioning), exclusions);
        Harness {
            source,
            provisioning,
            discovery,
        }
    }

    fn multi_outlet_pdu() -> RegistryDump {
        DumpBuilder::default()
            .device("pdu", "PDU Pro")
            .sensor("sensor.outlet_1_power", "W", Some("pdu"))
            .sensor("sensor.outlet_2_power", "W", Some("pdu"))
            .sensor("sensor.outlet_3_power", "W", Some("pdu"))
            .build()
    }

    #[tokio::test]
    async fn should_provision_one_record_per_device() {
        let h = harness(multi_outlet_pdu(), Exclusions::default());

        let report = h.discovery.run_pass(PassTrigger::Manual).await.unwrap();

        assert_eq!(report.power_entities, 3);
        assert_eq!(report.created.len(), 1);
        let record = &report.created[0];
        assert_eq!(record.power_entity_ids.len(), 3);
        assert_eq!(record.title, "PDU Pro - Energy Sensors (3 power sensors)");
    }

    #[tokio::test]
    async fn should_not_provision_twice_across_passes() {
        let h = harness(multi_outlet_pdu(), Exclusions::default());

        h.discovery.run_pass(PassTrigger::Startup).await.unwrap();
        let second = h.discovery.run_pass(PassTrigger::Scheduled).await.unwrap();

        assert!(second.created.is_empty());
        assert_eq!(second.already_provisioned, 1);
        assert_eq!(h.provisioning.list_records().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn should_skip_group_with_energy_sibling() {
        let dump = DumpBuilder::default()
            .sensor("sensor.plug_power", "W", Some("plug"))
            .sensor("sensor.plug_energy", "kWh", Some("plug"))
            .build();
        let h = harness(dump, Exclusions::default());

        let report = h.discovery.run_pass(PassTrigger::Manual).await.unwrap();

        assert_eq!(report.matched, 1);
        assert!(report.created.is_empty());
    }

    #[tokio::test]
    async fn should_ignore_excluded_entities() {
        let exclusions: Exclusions =
            std::iter::once("sensor.ups_power".parse::<EntityId>().unwrap()).collect();
        let dump = DumpBuilder::default()
            .sensor("sensor.ups_power", "W", None)
            .build();
        let h = harness(dump, exclusions);

        let report = h.discovery.run_pass(PassTrigger::Manual).await.unwrap();

        assert_eq!(report.excluded, 1);
        assert!(report.created.is_empty());
    }

    #[tokio::test]
    async fn should_provision_rest_of_device_after_manual_record() {
        let h = harness(multi_outlet_pdu(), Exclusions::default());
        h.provisioning
            .create_manual(ManualRequest::new("sensor.outlet_1_power".parse().unwrap()))
            .await
            .unwrap();

        let report = h.discovery.run_pass(PassTrigger::Manual).await.unwrap();

        assert_eq!(report.manually_provisioned, 1);
        assert_eq!(report.already_provisioned, 0);
        assert_eq!(report.created.len(), 1);
        let ids: Vec<&str> = report.created[0]
            .power_entity_ids
            .iter()
            .map(EntityId::as_str)
            .collect();
        assert_eq!(ids, vec!["sensor.outlet_2_power", "sensor.outlet_3_power"]);
        assert_eq!(report.created[0].dedup_key.as_str(), "powerscout_device_pdu");
    }

    #[tokio::test]
    async fn should_preview_without_provisioning() {
        let h = harness(multi_outlet_pdu(), Exclusions::default());

        let plans = h.discovery.preview_plans().await.unwrap();

        assert_eq!(plans.len(), 1);
        assert_eq!(plans[0].confirmation_label(), "PDU Pro (3 power sensors)");
        assert!(h.provisioning.list_records().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn should_serialize_concurrent_passes() {
        let h = harness(multi_outlet_pdu(), Exclusions::default());

        let (a, b) = tokio::join!(
            h.discovery.run_pass(PassTrigger::Manual),
            h.discovery.run_pass(PassTrigger::RegistryEvent)
        );

        let created = a.unwrap().created.len() + b.unwrap().created.len();
        assert_eq!(created, 1);
        assert_eq!(h.source.loads(), 2);
    }

    #[tokio::test]
    async fn should_count_rejected_entries() {
        let mut dump = DumpBuilder::default()
            .sensor("sensor.plug_power", "W", None)
            .build();
        dump.entities.push(dump.entities[0].clone());
        dump.skipped = 2;
        let h = harness(dump, Exclusions::default());

        let report = h.discovery.run_pass(PassTrigger::Manual).await.unwrap();

        assert_eq!(report.skipped_entries, 3);
        assert_eq!(report.entities, 1);
    }

    #[tokio::test]
    async fn should_find_events_for_power_sensors_relevant() {
        let dump = DumpBuilder::default()
            .sensor("sensor.plug_power", "W", None)
            .sensor("sensor.outdoor_temperature", "°C", None)
            .build();
        let h = harness(dump, Exclusions::default());
        let event =
            |action, id: &str| RegistryEvent::new(action, id.parse::<EntityId>().unwrap());

        assert!(
            h.discovery
                .is_relevant(&event(RegistryAction::Create, "sensor.plug_power"))
                .await
                .unwrap()
        );
        assert!(
            !h.discovery
                .is_relevant(&event(RegistryAction::Remove, "sensor.plug_power"))
                .await
                .unwrap()
        );
        assert!(
            !h.discovery
                .is_relevant(&event(RegistryAction::Update, "sensor.outdoor_temperature"))
                .await
                .unwrap()
        );
        assert!(
            !h.discovery
                .is_relevant(&event(RegistryAction::Create, "sensor.unknown_power"))
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn should_pick_up_new_power_sensor_on_next_pass() {
        let h = harness(RegistryDump::default(), Exclusions::default());
        assert!(
            h.discovery
                .run_pass(PassTrigger::Startup)
                .await
                .unwrap()
                .created
                .is_empty()
        );

        h.source.set(
            DumpBuilder::default()
                .sensor("sensor.heater_power", "W", None)
                .build(),
        );
        let report = h.discovery.run_pass(PassTrigger::RegistryEvent).await.unwrap();

        assert_eq!(report.created.len(), 1);
        assert_eq!(
            report.created[0].dedup_key.as_str(),
            "powerscout_no_device_sensor.heater_power"
        );
        assert_eq!(report.created[0].display_name, "Heater Power");
    }
}
