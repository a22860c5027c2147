//! HTTP error mapping.

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tracing::error;

use mechcare_core::Error;

/// Error returned by every handler. Serializes as `{"error": "..."}`.
#[derive(Debug)]
pub enum ApiError {
    Core(Error),
    BadRequest(String),
}

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        Self::Core(e)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl ApiError {
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) | Self::Core(Error::Validation(_)) => StatusCode::BAD_REQUEST,
            Self::Core(Error::NotFound { .. }) => StatusCode::NOT_FOUND,
            Self::Core(Error::Io(_) | Error::Json(_) | Error::Config(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            Self::BadRequest(msg) => msg,
            Self::Core(e) if e.is_client_error() => e.to_string(),
            Self::Core(e) => {
                // Storage details stay in the log, not the response.
                error!(error = %e, "Dataset access failed");
                "Failed to access dataset".to_string()
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}
