use crate::client::ClientError;
use crate::dashboard::{DashboardError, ValidationError};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;

/// Error response
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    /// Set when the agent or controller could not be reached
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    offline: bool,
}

/// API error types
#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    /// Controller or agent unreachable
    Unavailable(String),
    /// Controller answered with an error
    Upstream(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, offline) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg, false),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg, false),
            ApiError::Unavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg, true),
            ApiError::Upstream(msg) => (StatusCode::BAD_GATEWAY, msg, false),
        };
        (status, Json(ErrorResponse { error, offline })).into_response()
    }
}

impl From<DashboardError> for ApiError {
    fn from(e: DashboardError) -> Self {
        let message = e.to_string();
        match e {
            DashboardError::Invalid(ValidationError::UnknownAgent(_)) => ApiError::NotFound(message),
            DashboardError::Invalid(_) => ApiError::BadRequest(message),
            DashboardError::Controller(ClientError::NotFound(_)) => ApiError::NotFound(message),
            DashboardError::Controller(ref c) if c.is_unreachable() => ApiError::Unavailable(message),
            DashboardError::Controller(_) => ApiError::Upstream(message),
        }
    }
}
