//! Event bus port: publish/subscribe for registry events.

use std::future::Future;

use powerscout_domain::error::PowerScoutError;
use powerscout_domain::event::RegistryEvent;

/// Publishes registry events to interested subscribers.
pub trait EventPublisher {
    /// Publish an event to all current subscribers.
    fn publish(
        &self,
        event: RegistryEvent,
    ) -> impl Future<Output = Result<(), PowerScoutError>> + Send;
}

impl<T: EventPublisher + Send + Sync> EventPublisher for std::sync::Arc<T> {
    fn publish(
        &self,
        event: RegistryEvent,
    ) -> impl Future<Output = Result<(), PowerScoutError>> + Send {
        (**self).publish(event)
    }
}
