//! Error types for the simulation control API.
//!
//! [`ApiError`] unifies all failure modes into a single enum that
//! can be converted into an Axum HTTP response via its
//! [`IntoResponse`](axum::response::IntoResponse) implementation.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use ticketing_core::SimulationError;
use ticketing_types::FieldError;

/// Errors that can occur in the control API layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request body was not valid JSON for the endpoint.
    #[error("malformed request body: {0}")]
    MalformedBody(String),

    /// The request parsed but carried an unusable value.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(#[from] FieldError),

    /// The simulation controller refused the operation.
    #[error(transparent)]
    Simulation(#[from] SimulationError),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::MalformedBody(rejection.body_text())
    }
}

impl ApiError {
    /// HTTP status for this error.
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::MalformedBody(_)
            | Self::InvalidConfiguration(_)
            | Self::Simulation(
                SimulationError::InvalidConfiguration(_) | SimulationError::InvalidRate { .. },
            ) => StatusCode::BAD_REQUEST,
            Self::Simulation(
                SimulationError::AlreadyRunning { .. } | SimulationError::NotRunning,
            ) => StatusCode::CONFLICT,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = serde_json::json!({
            "error": self.to_string(),
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use ticketing_types::RunId;

    use super::*;

    #[test]
    fn maps_simulation_errors_to_status_codes() {
        let conflict = ApiError::from(SimulationError::AlreadyRunning {
            run_id: RunId::new(),
        });
        assert_eq!(conflict.status_code(), StatusCode::CONFLICT);
        assert_eq!(
            ApiError::from(SimulationError::NotRunning).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::from(SimulationError::InvalidRate {
                field: "releaseRate"
            })
            .status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn field_errors_are_bad_requests() {
        let err = ApiError::from(FieldError::new("maxCapacity", "must be at least 1"));
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            err.to_string(),
            "invalid configuration: maxCapacity must be at least 1"
        );
    }
}
