use crate::directory::DirectoryError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

/// Result type alias for gateway operations
pub type Result<T, E = GatewayError> = std::result::Result<T, E>;

/// Error taxonomy for the gateway. Each variant maps to one HTTP status at
/// the handler boundary; upstream detail never reaches the client.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Missing or malformed required input; the message is client-visible.
    #[error("{0}")]
    Validation(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("{0}")]
    NotFound(String),

    /// A billing, directory, or notification collaborator call failed.
    #[error("upstream call failed: {0}")]
    Upstream(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<DirectoryError> for GatewayError {
    fn from(err: DirectoryError) -> Self {
        GatewayError::Upstream(err.to_string())
    }
}

impl From<billing::BillingError> for GatewayError {
    fn from(err: billing::BillingError) -> Self {
        GatewayError::Upstream(err.to_string())
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        match self {
            GatewayError::Validation(message) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
            }
            GatewayError::Unauthorized => {
                (StatusCode::UNAUTHORIZED, "Unauthorized").into_response()
            }
            GatewayError::NotFound(message) => {
                (StatusCode::NOT_FOUND, Json(json!({ "error": message }))).into_response()
            }
            GatewayError::Upstream(detail) => {
                tracing::error!("upstream failure: {detail}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "Internal server error" })),
                )
                    .into_response()
            }
            GatewayError::Internal(detail) => {
                tracing::error!("internal error: {detail}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "Internal server error" })),
                )
                    .into_response()
            }
        }
    }
}
