//! # Error Handling Middleware
//!
//! Maps the booking core's error taxonomy to stable HTTP status codes and a
//! JSON body of the form `{"error": "..."}`. `Conflict` keeps its own status
//! so callers can tell a lost race apart from a bad request.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use timeline_core::errors::TimelineError;

/// Application error wrapper that provides HTTP status code mapping
///
/// # Example
///
/// ```
/// use axum::Json;
/// use timeline_api::middleware::error_handling::AppError;
/// use timeline_core::errors::TimelineError;
///
/// async fn handler() -> Result<Json<()>, AppError> {
///     Err(TimelineError::NotFound("slot".to_string()).into())
/// }
/// # fn main() {}
/// ```
#[derive(Debug)]
pub struct AppError(pub TimelineError);

impl AppError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            TimelineError::NotFound(_) => StatusCode::NOT_FOUND,
            TimelineError::Validation(_) => StatusCode::BAD_REQUEST,
            TimelineError::Conflict(_) => StatusCode::CONFLICT,
            TimelineError::Authorization(_) => StatusCode::FORBIDDEN,
            TimelineError::InvariantViolation(_) => StatusCode::INTERNAL_SERVER_ERROR,
            TimelineError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            TimelineError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Request failed: {:?}", self.0);
        }

        let message = self.0.to_string();
        let body = Json(json!({ "error": message }));

        (status, body).into_response()
    }
}

impl From<TimelineError> for AppError {
    fn from(err: TimelineError) -> Self {
        AppError(err)
    }
}

impl From<eyre::Report> for AppError {
    fn from(err: eyre::Report) -> Self {
        AppError(TimelineError::Database(err))
    }
}

/// Maps a TimelineError to an HTTP response
pub fn map_error(err: TimelineError) -> Response {
    AppError(err).into_response()
}
