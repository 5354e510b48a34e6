//! User endpoints

use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};

use crate::http::error::ApiError;
use crate::http::extractors::{ValidJson, ValidUuid};
use crate::http::server::AppState;
use crate::models::User;

/// GET /users - list all users
async fn list_users(State(state): State<Arc<AppState>>) -> Result<Json<Vec<User>>, ApiError> {
    let users = User::list(&*state.repository).await?;
    Ok(Json(users))
}

/// POST /users - create a user, generating its id if absent
///
/// The body is validated during deserialization (`User: TryFrom<NewUser>`).
async fn create_user(
    State(state): State<Arc<AppState>>,
    ValidJson(user): ValidJson<User>,
) -> Result<Json<User>, ApiError> {
    user.save(&*state.repository).await?;
    tracing::info!(id = %user.id(), name = user.name(), "User created");
    Ok(Json(user))
}

/// GET /users/{id} - get a single user
async fn get_user(
    State(state): State<Arc<AppState>>,
    ValidUuid(id): ValidUuid,
) -> Result<Json<User>, ApiError> {
    User::get(&*state.repository, id)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound { resource: "User" })
}

/// User routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route("/users/{id}", get(get_user))
}
