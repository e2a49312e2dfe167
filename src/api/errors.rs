use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::warn;

use super::dto::ErrorBody;
use crate::{auth::AuthError, readings::IngestError};

/// Errors surfaced to API callers before the response is committed.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("unauthorized: {0}")]
    Unauthorized(#[from] AuthError),
    #[error("forbidden")]
    Forbidden,
    #[error("illegal request body: {0}")]
    IllegalRequestBody(String),
    #[error("internal server error")]
    Internal(#[source] anyhow::Error),
}

impl From<IngestError> for ApiError {
    fn from(e: IngestError) -> Self {
        match e {
            IngestError::Invalid(v) => Self::IllegalRequestBody(v.to_string()),
            IngestError::Storage(e) => Self::Internal(e),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            Self::Unauthorized(reason) => {
                warn!(reason = %reason, "Request not authenticated");
                (
                    StatusCode::UNAUTHORIZED,
                    ErrorBody::with_details("User unauthorized.", "Missing or illegal token."),
                )
            }
            Self::Forbidden => {
                warn!("Request not authorized");
                (
                    StatusCode::FORBIDDEN,
                    ErrorBody::with_details(
                        "Forbidden",
                        "User is not allowed to access this resource.",
                    ),
                )
            }
            Self::IllegalRequestBody(details) => {
                warn!(details = %details, "Illegal request body");
                (
                    StatusCode::BAD_REQUEST,
                    ErrorBody::with_details("Illegal request body.", details),
                )
            }
            // Already logged where it happened; never leak the cause.
            Self::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorBody::new("Internal server error."),
            ),
        };
        (status, Json(body)).into_response()
    }
}
