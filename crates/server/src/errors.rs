use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use tracing::error;

use common::types::ErrorBody;
use service::auth::errors::AuthError;
use service::errors::ServiceError;

const INTERNAL_MSG: &str = "Error interno del servidor.";

/// Error returned by handlers and middleware, rendered as `{"error": message}`.
#[derive(Debug)]
pub struct JsonApiError {
    pub status: StatusCode,
    pub message: String,
}

impl JsonApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self { status, message: message.into() }
    }

    pub fn bad_request(message: impl Into<String>) -> Self { Self::new(StatusCode::BAD_REQUEST, message) }

    pub fn unauthorized(message: impl Into<String>) -> Self { Self::new(StatusCode::UNAUTHORIZED, message) }

    pub fn forbidden(message: impl Into<String>) -> Self { Self::new(StatusCode::FORBIDDEN, message) }

    pub fn not_found(message: impl Into<String>) -> Self { Self::new(StatusCode::NOT_FOUND, message) }
}

impl IntoResponse for JsonApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorBody::new(self.message))).into_response()
    }
}

impl From<ServiceError> for JsonApiError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::NotFound(msg) => Self::not_found(msg),
            ServiceError::Validation(msg) | ServiceError::DuplicateId(msg) | ServiceError::ImmutableField(msg) => {
                Self::bad_request(msg)
            }
            ServiceError::Persistence(msg) => {
                error!(error = %msg, "request failed while saving");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
            ServiceError::Io(cause) => {
                error!(error = %cause, "request failed while reading");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_MSG)
            }
        }
    }
}

impl From<AuthError> for JsonApiError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::InvalidCredentials => Self::unauthorized(e.to_string()),
            AuthError::Token(cause) => {
                error!(error = %cause, "token generation failed");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_MSG)
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("cannot bind {addr}: {source}")]
    Bind { addr: String, source: std::io::Error },
    #[error(transparent)]
    Any(#[from] anyhow::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_errors_map_to_statuses() {
        let cases = [
            (ServiceError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (ServiceError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (ServiceError::DuplicateId("x".into()), StatusCode::BAD_REQUEST),
            (ServiceError::ImmutableField("x".into()), StatusCode::BAD_REQUEST),
            (ServiceError::persistence(), StatusCode::INTERNAL_SERVER_ERROR),
            (ServiceError::Io("disk".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(JsonApiError::from(err).status, status);
        }
    }

    #[test]
    fn io_causes_are_not_leaked() {
        let e = JsonApiError::from(ServiceError::Io("/secret/path: permission denied".into()));
        assert_eq!(e.message, INTERNAL_MSG);
        let e = JsonApiError::from(ServiceError::persistence());
        assert_eq!(e.message, service::errors::SAVE_FAILED_MSG);
    }
}
