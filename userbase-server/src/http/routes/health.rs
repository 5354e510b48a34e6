//! Health check endpoint
//!
//! Healthy means the live schema matches the migration scripts.

use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::http::error::ApiError;
use crate::http::server::AppState;

/// Health check response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub current_database_schema_revision: Option<String>,
    pub current_head: Option<String>,
}

/// GET /health
async fn health(State(state): State<Arc<AppState>>) -> Result<Json<HealthResponse>, ApiError> {
    let repo = &state.repository;

    let revision = repo.current_revision().await?;

    // Unreadable scripts are drift, reported by check() below
    let head = match repo.current_head().await {
        Ok(head) => head,
        Err(err) => {
            tracing::warn!(error = %err, "Cannot determine head revision");
            None
        }
    };

    if !repo.check().await? {
        return Err(ApiError::SchemaDrift { revision, head });
    }

    tracing::debug!(?revision, ?head, "Schema up to date");
    Ok(Json(HealthResponse {
        status: "ok",
        current_database_schema_revision: revision,
        current_head: head,
    }))
}

/// Health routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/health", get(health))
}
