use axum::extract::rejection::BytesRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kopilot_core::error::{AuthError, CoreError};
use kopilot_db::StoreError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and [`StoreError`] for persistence
/// failures. Implements [`IntoResponse`] to produce consistent JSON error
/// responses. Bus failures never reach this type.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `kopilot_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The raw event store failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// The request body could not be read, e.g. it exceeds the size limit.
    #[error("Failed to read request body: {0}")]
    Body(#[from] BytesRejection),
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        Self::Core(CoreError::Auth(err))
    }
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

/// Message returned for every 500; details stay in the server log.
pub const INTERNAL_ERROR_MESSAGE: &str = "An internal error occurred";

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::Auth(auth) => (StatusCode::FORBIDDEN, "FORBIDDEN", auth.to_string()),
            },

            // --- Storage errors ---
            AppError::Storage(err) => {
                tracing::error!(error = %err, "Failed to store raw event");
                internal()
            }

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::Body(rejection) => {
                tracing::warn!(error = %rejection.body_text(), "Failed to read request body");
                match rejection.status() {
                    StatusCode::PAYLOAD_TOO_LARGE => (
                        StatusCode::PAYLOAD_TOO_LARGE,
                        "PAYLOAD_TOO_LARGE",
                        "Request body too large".to_string(),
                    ),
                    status if status.is_server_error() => internal(),
                    _ => (
                        StatusCode::BAD_REQUEST,
                        "BAD_REQUEST",
                        "Failed to read request body".to_string(),
                    ),
                }
            }
        };

        error_response(status, code, message)
    }
}

fn internal() -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        INTERNAL_ERROR_MESSAGE.to_string(),
    )
}

/// Build the `{ "error": ..., "code": ... }` body shared by every failure.
pub fn error_response(status: StatusCode, code: &str, message: String) -> Response {
    let body = json!({
        "error": message,
        "code": code,
    });

    (status, axum::Json(body)).into_response()
}
