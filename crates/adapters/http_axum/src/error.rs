//! HTTP error response mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use powerscout_domain::error::PowerScoutError;

/// JSON error body returned by API endpoints.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Maps [`PowerScoutError`] to an HTTP response with appropriate status code.
#[derive(Debug)]
pub struct ApiError(PowerScoutError);

impl From<PowerScoutError> for ApiError {
    fn from(err: PowerScoutError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            PowerScoutError::Validation(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            PowerScoutError::Malformed(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            PowerScoutError::NotFound(err) => (StatusCode::NOT_FOUND, err.to_string()),
            PowerScoutError::Rejected(err) => (StatusCode::CONFLICT, err.to_string()),
            PowerScoutError::Storage(err) => {
                tracing::error!(error = %err, "storage error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use powerscout_domain::error::{NotFoundError, RejectedError, ValidationError};

    fn status_of(err: impl Into<PowerScoutError>) -> StatusCode {
        ApiError::from(err.into()).into_response().status()
    }

    #[test]
    fn should_map_errors_to_status_codes() {
        assert_eq!(status_of(ValidationError::EmptyName), StatusCode::BAD_REQUEST);
        assert_eq!(
            status_of(NotFoundError {
                entity: "ProvisionedRecord",
                id: "x".to_string(),
            }),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(RejectedError {
                dedup_key: "powerscout_device_dev1".to_string(),
            }),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(PowerScoutError::Storage("disk full".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
