//! JSON handler for registry change notifications.

use std::str::FromStr;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use powerscout_app::ports::{EventPublisher, ProvisionedRepository, RegistrySource};
use powerscout_domain::error::{MalformedInputError, PowerScoutError};
use powerscout_domain::event::{RegistryAction, RegistryEvent};
use powerscout_domain::id::EntityId;

use crate::error::ApiError;
use crate::state::AppState;

/// Request body mirroring the host's entity-registry-updated event.
#[derive(Deserialize)]
pub struct NotifyRequest {
    pub action: RegistryAction,
    pub entity_id: String,
}

/// Possible responses from the notify endpoint.
pub enum NotifyResponse {
    Accepted,
}

impl IntoResponse for NotifyResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Accepted => StatusCode::ACCEPTED.into_response(),
        }
    }
}

/// `POST /api/registry/events`
///
/// The event is queued for the scheduler; any pass it causes runs later.
pub async fn notify<R, S, EP>(
    State(state): State<AppState<R, S, EP>>,
    Json(req): Json<NotifyRequest>,
) -> Result<NotifyResponse, ApiError>
where
    R: ProvisionedRepository + Send + Sync + 'static,
    S: RegistrySource + Send + Sync + 'static,
    EP: EventPublisher + Send + Sync + 'static,
{
    let entity_id = EntityId::from_str(&req.entity_id)
        .map_err(|err| PowerScoutError::from(MalformedInputError::from(err)))?;
    state
        .events
        .publish(RegistryEvent::new(req.action, entity_id))
        .await?;
    Ok(NotifyResponse::Accepted)
}
