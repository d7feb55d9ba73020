use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Every failure a handler can surface maps to exactly one variant here.
/// Variant messages are the client-facing text; internals are never leaked.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("User already exist")]
    DuplicateEmail,
    /// Record vanished between token issuance and use.
    #[error("Invalid user data")]
    NotFound,
    /// Deliberately identical for unknown email and wrong password.
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("{0}")]
    Unauthorized(String),
    #[error("Something went wrong")]
    Internal(#[source] anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::DuplicateEmail | ApiError::NotFound => {
                StatusCode::BAD_REQUEST
            }
            ApiError::InvalidCredentials | ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            // Unexpected failures surface as a generic 400.
            ApiError::Internal(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal(ref e) = self {
            error!(error = %e, "unexpected failure");
        }
        let status = self.status();
        let body = Json(json!({
            "status": status.as_u16(),
            "message": self.to_string(),
        }));
        (status, body).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(e: anyhow::Error) -> Self {
        ApiError::Internal(e)
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::RowNotFound => ApiError::NotFound,
            // Unique violation on the email column: one concurrent creator
            // wins, the other observes a duplicate.
            sqlx::Error::Database(db) if db.code().as_deref() == Some("23505") => {
                ApiError::DuplicateEmail
            }
            _ => ApiError::Internal(e.into()),
        }
    }
}
