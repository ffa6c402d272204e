//! JSON handlers for discovery passes.

use axum::Json;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use powerscout_app::ports::{EventPublisher, ProvisionedRepository, RegistrySource};
use powerscout_app::services::discovery_service::{DiscoveryReport, PassTrigger};
use powerscout_domain::discovery::Plan;

use crate::error::ApiError;
use crate::state::AppState;

/// A plan as shown to an operator before confirming it.
#[derive(Serialize)]
pub struct PlanView {
    #[serde(flatten)]
    pub plan: Plan,
    pub title: String,
    pub label: String,
}

impl From<Plan> for PlanView {
    fn from(plan: Plan) -> Self {
        Self {
            title: plan.title(),
            label: plan.confirmation_label(),
            plan,
        }
    }
}

/// Possible responses from the run endpoint.
pub enum RunResponse {
    Ok(Json<DiscoveryReport>),
}

impl IntoResponse for RunResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the plans endpoint.
pub enum PlansResponse {
    Ok(Json<Vec<PlanView>>),
}

impl IntoResponse for PlansResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// `POST /api/discovery/run`
pub async fn run<R, S, EP>(
    State(state): State<AppState<R, S, EP>>,
) -> Result<RunResponse, ApiError>
where
    R: ProvisionedRepository + Send + Sync + 'static,
    S: RegistrySource + Send + Sync + 'static,
    EP: EventPublisher + Send + Sync + 'static,
{
    let report = state.discovery.run_pass(PassTrigger::Manual).await?;
    Ok(RunResponse::Ok(Json(report)))
}

/// `GET /api/discovery/plans`
pub async fn plans<R, S, EP>(
    State(state): State<AppState<R, S, EP>>,
) -> Result<PlansResponse, ApiError>
where
    R: ProvisionedRepository + Send + Sync + 'static,
    S: RegistrySource + Send + Sync + 'static,
    EP: EventPublisher + Send + Sync + 'static,
{
    let plans = state.discovery.preview_plans().await?;
    Ok(PlansResponse::Ok(Json(
        plans.into_iter().map(PlanView::from).collect(),
    )))
}
