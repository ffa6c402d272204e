//! JSON API handler modules.

#[allow(clippy::missing_errors_doc)]
pub mod discovery;
#[allow(clippy::missing_errors_doc)]
pub mod provisioned;
#[allow(clippy::missing_errors_doc)]
pub mod registry;

use axum::Router;
use axum::routing::{get, post};

use powerscout_app::ports::{EventPublisher, ProvisionedRepository, RegistrySource};

use crate::state::AppState;

/// Build the `/api` sub-router.
pub fn routes<R, S, EP>() -> Router<AppState<R, S, EP>>
where
    R: ProvisionedRepository + Send + Sync + 'static,
    S: RegistrySource + Send + Sync + 'static,
    EP: EventPublisher + Send + Sync + 'static,
{
    Router::new()
        // Discovery
        .route("/discovery/run", post(discovery::run::<R, S, EP>))
        .route("/discovery/plans", get(discovery::plans::<R, S, EP>))
        // Provisioned records
        .route(
            "/provisioned",
            get(provisioned::list::<R, S, EP>).post(provisioned::create::<R, S, EP>),
        )
        .route(
            "/provisioned/{id}",
            get(provisioned::get::<R, S, EP>).delete(provisioned::delete::<R, S, EP>),
        )
        // Registry notifications
        .route("/registry/events", post(registry::notify::<R, S, EP>))
}
