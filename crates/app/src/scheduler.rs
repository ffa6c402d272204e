//! Discovery scheduler: decides *when* passes run.
//!
//! Three sources start a pass:
//! - a single delayed pass shortly after startup;
//! - a recurring pass on a fixed interval;
//! - registry events about power sensors, after a short settle delay so the
//!   host has finished writing the entity.
//!
//! The scheduler exits as soon as the shutdown signal flips; a pass that is
//! still running at that point is abandoned.

use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, watch};
use tokio::time::{Instant, MissedTickBehavior};

use powerscout_domain::event::RegistryEvent;

use crate::ports::{ProvisioningSink, RegistrySource};
use crate::services::discovery_service::{DiscoveryService, PassTrigger};

/// Longest delay the timers accept; larger values are clamped so deadlines
/// stay representable.
pub const MAX_DELAY: Duration = Duration::from_secs(30 * 365 * 24 * 60 * 60);

/// Timing of scheduled passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerConfig {
    pub initial_delay: Duration,
    pub interval: Duration,
    pub event_settle: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(30),
            interval: Duration::from_secs(24 * 60 * 60),
            event_settle: Duration::from_secs(1),
        }
    }
}

/// Drives a [`DiscoveryService`] from timers and registry events.
pub struct DiscoveryScheduler<S, P> {
    service: Arc<DiscoveryService<S, P>>,
    config: SchedulerConfig,
}

impl<S, P> DiscoveryScheduler<S, P>
where
    S: RegistrySource + Send + Sync,
    P: ProvisioningSink + Send + Sync,
{
    pub fn new(service: Arc<DiscoveryService<S, P>>, config: SchedulerConfig) -> Self {
        Self { service, config }
    }

    /// Run until `shutdown` flips to `true` or its sender is dropped.
    pub async fn run(
        self,
        mut events: broadcast::Receiver<RegistryEvent>,
        mut shutdown: watch::Receiver<bool>,
    ) {
        let mut ticker = tokio::time::interval_at(
            Instant::now() + self.config.initial_delay.min(MAX_DELAY),
            self.config.interval.min(MAX_DELAY),
        );
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut trigger = PassTrigger::Startup;
        let mut events_open = true;

        tracing::info!(
            initial_delay_secs = self.config.initial_delay.as_secs(),
            interval_secs = self.config.interval.as_secs(),
            "discovery scheduler started"
        );

        loop {
            let flow = tokio::select! {
                _ = shutdown.changed() => ControlFlow::Break(()),
                _ = ticker.tick() => {
                    let flow = self.pass_unless_shutdown(trigger, &mut shutdown).await;
                    trigger = PassTrigger::Scheduled;
                    flow
                }
                received = events.recv(), if events_open => match received {
                    Ok(event) => self.handle_event(event, &mut shutdown).await,
                    Err(broadcast::error::RecvError::Lagged(missed)) => {
                        tracing::warn!(missed, "registry events lagged, running a pass");
                        self.pass_unless_shutdown(PassTrigger::RegistryEvent, &mut shutdown)
                            .await
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        tracing::info!("registry event bus closed");
                        events_open = false;
                        ControlFlow::Continue(())
                    }
                },
            };
            if flow.is_break() {
                break;
            }
        }

        tracing::info!("discovery scheduler stopped");
    }

    async fn handle_event(
        &self,
        event: RegistryEvent,
        shutdown: &mut watch::Receiver<bool>,
    ) -> ControlFlow<()> {
        if !event.may_trigger_discovery() {
            return ControlFlow::Continue(());
        }
        tokio::select! {
            _ = shutdown.changed() => return ControlFlow::Break(()),
            () = tokio::time::sleep(self.config.event_settle) => {}
        }
        match self.service.is_relevant(&event).await {
            Ok(true) => {
                tracing::debug!(
                    entity_id = %event.entity_id,
                    received_at = %event.received_at,
                    "power sensor changed"
                );
                self.pass_unless_shutdown(PassTrigger::RegistryEvent, shutdown)
                    .await
            }
            Ok(false) => ControlFlow::Continue(()),
            Err(err) => {
                tracing::warn!(entity_id = %event.entity_id, error = %err, "event lookup failed");
                ControlFlow::Continue(())
            }
        }
    }

    async fn pass_unless_shutdown(
        &self,
        trigger: PassTrigger,
        shutdown: &mut watch::Receiver<bool>,
    ) -> ControlFlow<()> {
        tokio::select! {
            _ = shutdown.changed() => {
                tracing::info!(?trigger, "abandoning discovery pass");
                ControlFlow::Break(())
            }
            result = self.service.run_pass(trigger) => {
                if let Err(err) = result {
                    tracing::error!(?trigger, error = %err, "discovery pass failed");
                }
                ControlFlow::Continue(())
            }
        }
    }
}
