use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::error::CoreError;
use crate::save::SaveError;

/// Standardised API error response body.
///
/// Every error returned by the HTTP layer serialises as:
/// ```json
/// { "ok": false, "error": { "code": "<code>", "message": "<message>" } }
/// ```
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ApiErrorResponse,
}

#[derive(Debug, Clone, Serialize)]
pub struct ApiErrorResponse {
    pub ok: bool,
    pub error: ApiErrorBody,
}

#[derive(Debug, Clone, Serialize)]
pub struct ApiErrorBody {
    pub code: String,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ApiErrorResponse {
                ok: false,
                error: ApiErrorBody {
                    code: code.into(),
                    message: message.into(),
                },
            },
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "not_found", message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "bad_request", message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal", message)
    }

    pub fn unavailable(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, code, message)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn code(&self) -> &str {
        &self.body.error.code
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let message = err.to_string();
        match err {
            CoreError::EmptyPath => Self::new(StatusCode::BAD_REQUEST, "empty_path", message),
            CoreError::InvalidInput(_) => Self::bad_request(message),
            CoreError::UnsupportedStore => Self::unavailable("unsupported_store", message),
            CoreError::TabUnavailable(_) => Self::unavailable("tab_unavailable", message),
            CoreError::Store(_) => Self::new(StatusCode::BAD_GATEWAY, "store", message),
            CoreError::Internal(_) => Self::internal(message),
        }
    }
}

impl From<SaveError> for ApiError {
    fn from(err: SaveError) -> Self {
        let message = err.to_string();
        match err {
            SaveError::MissingTitle => Self::new(StatusCode::BAD_REQUEST, "missing_title", message),
            SaveError::Failed(_) => Self::new(StatusCode::BAD_GATEWAY, "save_failed", message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_errors_map_to_codes() {
        let error = ApiError::from(CoreError::UnsupportedStore);
        assert_eq!(error.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(error.code(), "unsupported_store");

        let error = ApiError::from(CoreError::EmptyPath);
        assert_eq!(error.status(), StatusCode::BAD_REQUEST);
        assert_eq!(error.code(), "empty_path");
    }

    #[test]
    fn save_failures_hide_the_cause() {
        let error = ApiError::from(SaveError::Failed(CoreError::Store("disk full".to_string())));
        assert_eq!(error.code(), "save_failed");
        assert_eq!(error.body.error.message, "Failed to save bookmark, please retry");
    }
}
