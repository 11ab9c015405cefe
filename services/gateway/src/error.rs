use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use types::errors::EngineError;

/// Transport wrapper for engine errors.
///
/// The mapping is the only HTTP knowledge in the system; everything
/// below the gateway speaks [`EngineError`].
pub struct AppError(EngineError);

impl From<EngineError> for AppError {
    fn from(err: EngineError) -> Self {
        Self(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = match &self.0 {
            EngineError::InvalidInput(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            EngineError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            EngineError::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            EngineError::Timeout => (StatusCode::GATEWAY_TIMEOUT, "TIMEOUT"),
            EngineError::Storage(_) | EngineError::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
        };

        // Storage details stay in the logs, not on the wire.
        let message = match &self.0 {
            EngineError::Storage(_) | EngineError::Internal(_) => {
                "internal server error".to_string()
            }
            other => other.to_string(),
        };

        let body = Json(json!({
            "error": code,
            "message": message
        }));

        (status, body).into_response()
    }
}
