//! API error types with IntoResponse
//!
//! Every error renders as `{"detail": "..."}` with an appropriate status.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::db::RepoError;
use crate::models::ValidationError;

/// API error type with automatic HTTP status mapping
#[derive(Debug)]
pub enum ApiError {
    /// Validation failed (422)
    Validation(ValidationError),

    /// Request body or path could not be parsed (422)
    Malformed { message: String },

    /// Resource not found (404)
    NotFound { resource: &'static str },

    /// Resource with this id already exists (409)
    Conflict { resource: &'static str },

    /// Live schema differs from the migration scripts (500)
    SchemaDrift {
        revision: Option<String>,
        head: Option<String>,
    },

    /// Repository error (500, logged)
    Repository(RepoError),
}

impl ApiError {
    fn status_and_detail(&self) -> (StatusCode, String) {
        match self {
            Self::Validation(e) => (StatusCode::UNPROCESSABLE_ENTITY, e.to_string()),
            Self::Malformed { message } => (StatusCode::UNPROCESSABLE_ENTITY, message.clone()),
            Self::NotFound { resource } => {
                (StatusCode::NOT_FOUND, format!("{} not found", resource))
            }
            Self::Conflict { resource } => {
                (StatusCode::CONFLICT, format!("{} already exists", resource))
            }
            Self::SchemaDrift { revision, head } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!(
                    "Database schema not up to date. Current database schema revision is '{}' \
                     and current head is '{}'.",
                    display_revision(revision),
                    display_revision(head)
                ),
            ),
            Self::Repository(e) => {
                // Log the actual error, return generic message
                tracing::error!(error = %e, "Repository error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_owned(),
                )
            }
        }
    }
}

fn display_revision(revision: &Option<String>) -> &str {
    revision.as_deref().unwrap_or("None")
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = self.status_and_detail();
        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        Self::Validation(e)
    }
}

impl From<RepoError> for ApiError {
    fn from(e: RepoError) -> Self {
        match e {
            RepoError::Duplicate(_) => Self::Conflict { resource: "User" },
            _ => Self::Repository(e),
        }
    }
}
