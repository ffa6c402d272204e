//! JSON handlers for provisioned records.

use std::str::FromStr;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use powerscout_app::ports::{EventPublisher, ProvisionedRepository, RegistrySource};
use powerscout_app::services::provisioning_service::ManualRequest;
use powerscout_domain::error::{
    MalformedInputError, NotFoundError, PowerScoutError, ValidationError,
};
use powerscout_domain::id::{EntityId, RecordId};
use powerscout_domain::provisioned::{EnergySensorSpec, IntegrationMethod, ProvisionedRecord};

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for provisioning a single power entity.
///
/// Omitted settings fall back to the manual defaults.
#[derive(Deserialize)]
pub struct CreateRecordRequest {
    pub entity_id: String,
    pub integration_method: Option<IntegrationMethod>,
    pub round_digits: Option<u32>,
    pub unit_prefix: Option<String>,
    pub max_sub_interval_minutes: Option<u32>,
}

impl CreateRecordRequest {
    fn into_manual(self) -> Result<ManualRequest, PowerScoutError> {
        let entity_id =
            EntityId::from_str(&self.entity_id).map_err(MalformedInputError::from)?;
        let mut request = ManualRequest::new(entity_id);
        if let Some(method) = self.integration_method {
            request.settings.integration_method = method;
        }
        if let Some(digits) = self.round_digits {
            request.settings.round_digits = u8::try_from(digits)
                .map_err(|_| ValidationError::RoundDigitsOutOfRange(digits))?;
        }
        if let Some(prefix) = self.unit_prefix {
            request.settings.unit_prefix = prefix;
        }
        if let Some(minutes) = self.max_sub_interval_minutes {
            request.settings.max_sub_interval_minutes = minutes;
        }
        Ok(request)
    }
}

/// A record together with the energy sensors it describes.
#[derive(Serialize)]
pub struct RecordView {
    #[serde(flatten)]
    pub record: ProvisionedRecord,
    pub energy_sensors: Vec<EnergySensorSpec>,
}

impl From<ProvisionedRecord> for RecordView {
    fn from(record: ProvisionedRecord) -> Self {
        Self {
            energy_sensors: record.energy_sensors(),
            record,
        }
    }
}

/// Possible responses from the list endpoint.
pub enum ListResponse {
    Ok(Json<Vec<RecordView>>),
}

impl IntoResponse for ListResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the get endpoint.
pub enum GetResponse {
    Ok(Json<RecordView>),
}

impl IntoResponse for GetResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the create endpoint.
pub enum CreateResponse {
    Created(Json<RecordView>),
}

impl IntoResponse for CreateResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Created(json) => (StatusCode::CREATED, json).into_response(),
        }
    }
}

/// Possible responses from the delete endpoint.
pub enum DeleteResponse {
    NoContent,
}

impl IntoResponse for DeleteResponse {
    fn into_response(self) -> Response {
        match self {
            Self::NoContent => StatusCode::NO_CONTENT.into_response(),
        }
    }
}

fn parse_record_id(id: &str) -> Result<RecordId, ApiError> {
    RecordId::from_str(id).map_err(|_| {
        ApiError::from(PowerScoutError::from(NotFoundError {
            entity: "ProvisionedRecord",
            id: id.to_string(),
        }))
    })
}

/// `GET /api/provisioned`
pub async fn list<R, S, EP>(
    State(state): State<AppState<R, S, EP>>,
) -> Result<ListResponse, ApiError>
where
    R: ProvisionedRepository + Send + Sync + 'static,
    S: RegistrySource + Send + Sync + 'static,
    EP: EventPublisher + Send + Sync + 'static,
{
    let records = state.provisioning.list_records().await?;
    Ok(ListResponse::Ok(Json(
        records.into_iter().map(RecordView::from).collect(),
    )))
}

/// `GET /api/provisioned/{id}`
pub async fn get<R, S, EP>(
    State(state): State<AppState<R, S, EP>>,
    Path(id): Path<String>,
) -> Result<GetResponse, ApiError>
where
    R: ProvisionedRepository + Send + Sync + 'static,
    S: RegistrySource + Send + Sync + 'static,
    EP: EventPublisher + Send + Sync + 'static,
{
    let record = state.provisioning.get_record(parse_record_id(&id)?).await?;
    Ok(GetResponse::Ok(Json(record.into())))
}

/// `POST /api/provisioned`
pub async fn create<R, S, EP>(
    State(state): State<AppState<R, S, EP>>,
    Json(req): Json<CreateRecordRequest>,
) -> Result<CreateResponse, ApiError>
where
    R: ProvisionedRepository + Send + Sync + 'static,
    S: RegistrySource + Send + Sync + 'static,
    EP: EventPublisher + Send + Sync + 'static,
{
    let record = state.provisioning.create_manual(req.into_manual()?).await?;
    Ok(CreateResponse::Created(Json(record.into())))
}

/// `DELETE /api/provisioned/{id}`
pub async fn delete<R, S, EP>(
    State(state): State<AppState<R, S, EP>>,
    Path(id): Path<String>,
) -> Result<DeleteResponse, ApiError>
where
    R: ProvisionedRepository + Send + Sync + 'static,
    S: RegistrySource + Send + Sync + 'static,
    EP: EventPublisher + Send + Sync + 'static,
{
    state
        .provisioning
        .remove_record(parse_record_id(&id)?)
        .await?;
    Ok(DeleteResponse::NoContent)
}
