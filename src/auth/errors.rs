use axum::http::StatusCode;
use thiserror::Error;

use crate::auth::repo::StoreError;

/// Every way an auth invocation can end without a user.
///
/// The `Display` text is what the client sees in `{"error": ...}`.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Missing required fields")]
    MissingFields,

    #[error("Phone is required")]
    PhoneRequired,

    #[error("Invalid action")]
    InvalidAction,

    #[error("User already exists")]
    UserExists,

    #[error("User not found")]
    UserNotFound,

    /// Body was not a JSON object.
    #[error("{0}")]
    MalformedBody(#[from] serde_json::Error),

    /// Envelope carried `"body": null`.
    #[error("request body must be a JSON string, got null")]
    NullBody,

    #[error("{0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    /// Reading the HTTP body failed or went over the size limit.
    #[error("{0}")]
    BodyRead(#[from] axum::Error),

    #[error("{0}")]
    Datastore(sqlx::Error),
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict => AuthError::UserExists,
            StoreError::Database(e) => AuthError::Datastore(e),
        }
    }
}

impl AuthError {
    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            AuthError::MissingFields
            | AuthError::PhoneRequired
            | AuthError::InvalidAction
            | AuthError::UserExists => StatusCode::BAD_REQUEST,
            AuthError::UserNotFound => StatusCode::NOT_FOUND,
            AuthError::MalformedBody(_)
            | AuthError::NullBody
            | AuthError::InvalidUtf8(_)
            | AuthError::BodyRead(_)
            | AuthError::Datastore(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn is_internal(&self) -> bool {
        self.status().is_server_error()
    }
}
