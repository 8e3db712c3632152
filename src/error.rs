use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::error;

use crate::client::ClientError;
use crate::friday::SignupError;

#[derive(Debug)]
pub enum ApiError {
    Unauthorized(String),
    BadRequest(String),
    NotFound(String),
    Conflict(String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg).into_response(),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg).into_response(),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg).into_response(),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg).into_response(),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg).into_response(),
        }
    }
}

impl From<SignupError> for ApiError {
    fn from(value: SignupError) -> Self {
        match value {
            SignupError::AlreadySignedUp { .. } => ApiError::Conflict(value.to_string()),
            SignupError::NotFriday(_) | SignupError::PastFriday(_) | SignupError::Disabled(_) => {
                ApiError::BadRequest(value.to_string())
            }
            SignupError::InvalidStartHour(_) => {
                error!("{value}");
                ApiError::Internal("Signup is misconfigured".into())
            }
        }
    }
}

impl From<ClientError> for ApiError {
    fn from(value: ClientError) -> Self {
        match value.status() {
            Some(status) if status == reqwest::StatusCode::CONFLICT => {
                ApiError::Conflict("Appointment already exists".into())
            }
            Some(status) if status == reqwest::StatusCode::NOT_FOUND => {
                ApiError::NotFound("Appointment not found".into())
            }
            _ => {
                error!("Backend error: {value}");
                ApiError::Internal("Failed to reach the club backend".into())
            }
        }
    }
}
