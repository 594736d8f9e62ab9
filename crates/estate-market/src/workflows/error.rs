use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use serde_json::json;
use std::fmt::Display;
use thiserror::Error;
use tracing::{error, warn};

use super::auth::credentials::HashError;
use super::auth::mail::MailError;
use super::auth::tokens::TokenError;
use super::estates::storage::StorageError;
use super::validation::FieldErrors;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("record already exists: {0}")]
    Conflict(String),
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Failure kinds surfaced by workflow operations.
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    InvalidStatus(String),
    #[error("{0}")]
    InvalidType(String),
    #[error("request validation failed")]
    Validation(FieldErrors),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("email address has not been verified")]
    EmailNotVerified,
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Duplicate(String),
    #[error("{0}")]
    Gone(String),
    #[error("email address is already verified")]
    AlreadyVerified,
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Mail(#[from] MailError),
    #[error(transparent)]
    Token(#[from] TokenError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Hashing(#[from] HashError),
}

impl WorkflowError {
    pub fn not_found(resource: &str, field: &str, value: impl Display) -> Self {
        Self::NotFound(format!("{resource} not found with {field}: {value}"))
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            WorkflowError::NotFound(_) => StatusCode::NOT_FOUND,
            WorkflowError::BadRequest(_)
            | WorkflowError::InvalidStatus(_)
            | WorkflowError::InvalidType(_)
            | WorkflowError::Validation(_) => StatusCode::BAD_REQUEST,
            WorkflowError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            WorkflowError::Forbidden(_) | WorkflowError::EmailNotVerified => StatusCode::FORBIDDEN,
            WorkflowError::Conflict(_) | WorkflowError::Duplicate(_) => StatusCode::CONFLICT,
            WorkflowError::Gone(_) => StatusCode::GONE,
            WorkflowError::AlreadyVerified => StatusCode::OK,
            WorkflowError::Repository(RepositoryError::Conflict(_)) => StatusCode::CONFLICT,
            WorkflowError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
            WorkflowError::Repository(RepositoryError::Unavailable(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            WorkflowError::Mail(_) => StatusCode::SERVICE_UNAVAILABLE,
            WorkflowError::Token(err) if err.is_client_error() => StatusCode::UNAUTHORIZED,
            WorkflowError::Token(_) => StatusCode::INTERNAL_SERVER_ERROR,
            WorkflowError::Storage(StorageError::NotFound(_)) => StatusCode::NOT_FOUND,
            WorkflowError::Storage(_) => StatusCode::BAD_GATEWAY,
            WorkflowError::Hashing(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short machine-readable label used in the `error` field of responses.
    pub fn kind(&self) -> &'static str {
        match self {
            WorkflowError::NotFound(_) => "NOT_FOUND",
            WorkflowError::BadRequest(_) => "BAD_REQUEST",
            WorkflowError::InvalidStatus(_) => "INVALID_STATUS",
            WorkflowError::InvalidType(_) => "INVALID_TYPE",
            WorkflowError::Validation(_) => "VALIDATION_FAILED",
            WorkflowError::Unauthorized(_) => "UNAUTHORIZED",
            WorkflowError::Forbidden(_) => "FORBIDDEN",
            WorkflowError::EmailNotVerified => "EMAIL_NOT_VERIFIED",
            WorkflowError::Conflict(_) => "CONFLICT",
            WorkflowError::Duplicate(_) => "DUPLICATE_RESOURCE",
            WorkflowError::Gone(_) => "GONE",
            WorkflowError::AlreadyVerified => "ALREADY_VERIFIED",
            WorkflowError::Repository(_) => "REPOSITORY",
            WorkflowError::Mail(_) => "MAIL_DELIVERY",
            WorkflowError::Token(_) => "TOKEN",
            WorkflowError::Storage(_) => "OBJECT_STORAGE",
            WorkflowError::Hashing(_) => "PASSWORD_HASHING",
        }
    }
}

impl IntoResponse for WorkflowError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(status = status.as_u16(), error = %self, "request failed");
        } else if status.is_client_error() {
            warn!(status = status.as_u16(), kind = self.kind(), error = %self, "request rejected");
        }

        let mut body = json!({
            "status": status.as_u16(),
            "error": self.kind(),
            "message": self.to_string(),
            "timestamp": Utc::now().to_rfc3339(),
        });
        if let WorkflowError::Validation(fields) = &self {
            body["errors"] = json!(fields);
        }

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_taxonomy_to_status_codes() {
        let cases = [
            (WorkflowError::not_found("Estate", "id", 7), StatusCode::NOT_FOUND),
            (WorkflowError::InvalidType("wrong type".into()), StatusCode::BAD_REQUEST),
            (WorkflowError::Unauthorized("expired".into()), StatusCode::UNAUTHORIZED),
            (WorkflowError::EmailNotVerified, StatusCode::FORBIDDEN),
            (WorkflowError::Duplicate("taken".into()), StatusCode::CONFLICT),
            (WorkflowError::Gone("expired".into()), StatusCode::GONE),
            (WorkflowError::AlreadyVerified, StatusCode::OK),
            (
                WorkflowError::Repository(RepositoryError::Conflict("slot".into())),
                StatusCode::CONFLICT,
            ),
            (
                WorkflowError::Repository(RepositoryError::Unavailable("down".into())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                WorkflowError::Hashing(HashError("invalid cost".into())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(error.status(), expected, "{error:?}");
        }
    }

    #[test]
    fn not_found_message_names_resource() {
        let error = WorkflowError::not_found("Seller", "id", 12);
        assert_eq!(error.to_string(), "Seller not found with id: 12");
    }
}
