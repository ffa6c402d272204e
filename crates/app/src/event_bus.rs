//! In-process bus carrying registry change notifications to the scheduler.

use std::future::Future;

use tokio::sync::broadcast;

use powerscout_domain::error::PowerScoutError;
use powerscout_domain::event::RegistryEvent;

use crate::ports::EventPublisher;

/// Registry event bus over a tokio [`broadcast`] channel.
///
/// Only events that may reveal a new power sensor are forwarded. Removals and
/// non-sensor entities are dropped before they reach the channel.
pub struct RegistryEventBus {
    sender: broadcast::Sender<RegistryEvent>,
}

impl RegistryEventBus {
    /// Create a bus holding up to `capacity` undelivered events per subscriber.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to events published from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<RegistryEvent> {
        self.sender.subscribe()
    }
}

impl EventPublisher for RegistryEventBus {
    fn publish(
        &self,
        event: RegistryEvent,
    ) -> impl Future<Output = Result<(), PowerScoutError>> + Send {
        if event.may_trigger_discovery() {
            match self.sender.send(event) {
                Ok(subscribers) => tracing::trace!(subscribers, "registry event forwarded"),
                Err(broadcast::error::SendError(event)) => tracing::debug!(
                    entity_id = %event.entity_id,
                    "no scheduler listening, registry event dropped"
                ),
            }
        } else {
            tracing::trace!(
                entity_id = %event.entity_id,
                action = ?event.action,
                "registry event cannot start a pass"
            );
        }
        async { Ok(()) }
    }
}
