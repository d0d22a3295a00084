//! Typed failure taxonomy for the account service, translated to HTTP
//! status codes in one place.

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum AuthError {
    /// A field failed validation; fail-fast, carries the first violation.
    #[error("{field}: {reason}")]
    Validation { field: &'static str, reason: String },

    /// A unique index rejected the insert (email or mobile).
    #[error("{0} already registered")]
    Duplicate(&'static str),

    /// Unknown email or wrong password. Deliberately one variant with one
    /// message so responses never reveal which of the two it was.
    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("user not found")]
    NotFound,

    /// Token past its expiry; the client should re-authenticate.
    #[error("token expired, please login again")]
    ExpiredToken,

    /// Bad signature, bad structure, or wrong purpose claim.
    #[error("invalid token")]
    InvalidToken,

    #[error("database unavailable")]
    Store(#[source] sqlx::Error),

    #[error("internal error")]
    Internal(String),
}

impl AuthError {
    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field,
            reason: reason.into(),
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            AuthError::Validation { .. } => StatusCode::BAD_REQUEST,
            AuthError::Duplicate(_) => StatusCode::CONFLICT,
            AuthError::InvalidCredentials
            | AuthError::ExpiredToken
            | AuthError::InvalidToken => StatusCode::UNAUTHORIZED,
            AuthError::NotFound => StatusCode::NOT_FOUND,
            AuthError::Store(_) | AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<sqlx::Error> for AuthError {
    fn from(e: sqlx::Error) -> Self {
        AuthError::Store(e)
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();

        // Internal detail goes to the log, never to the client.
        let message = match &self {
            AuthError::Store(e) => {
                error!(error = %e, "database error");
                "Server error. Please try again.".to_string()
            }
            AuthError::Internal(detail) => {
                error!(error = %detail, "internal error");
                "Server error. Please try again.".to_string()
            }
            other => other.to_string(),
        };

        let body = match &self {
            AuthError::Validation { field, .. } => json!({
                "success": false,
                "message": message,
                "field": field,
            }),
            _ => json!({
                "success": false,
                "message": message,
            }),
        };

        (status, Json(body)).into_response()
    }
}
