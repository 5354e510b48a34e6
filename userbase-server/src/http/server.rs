//! Axum server setup
//!
//! Server skeleton with:
//! - Localhost-only CORS by default
//! - Tracing and per-request timeout middleware
//! - Graceful shutdown on SIGTERM/Ctrl+C

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::http::HeaderValue;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use super::routes;
use crate::db::UserRepository;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to (default: 127.0.0.1:8000)
    pub bind_addr: SocketAddr,

    /// Allow permissive CORS (default: false = localhost only)
    pub cors_permissive: bool,

    /// Per-request timeout
    pub request_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8000)),
            cors_permissive: false,
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// Shared application state
pub struct AppState {
    pub repository: Arc<dyn UserRepository>,
}

impl AppState {
    pub fn new(repository: Arc<dyn UserRepository>) -> Self {
        Self { repository }
    }
}

/// Build the application router with all routes and middleware.
pub fn build_router(state: AppState, config: &ServerConfig) -> Router {
    let cors = if config.cors_permissive {
        tracing::warn!("CORS: Permissive mode enabled - all origins allowed");
        CorsLayer::permissive()
    } else {
        CorsLayer::new()
            .allow_origin([
                HeaderValue::from_static("http://localhost:8000"),
                HeaderValue::from_static("http://127.0.0.1:8000"),
            ])
            .allow_methods(Any)
            .allow_headers(Any)
    };

    Router::new()
        .merge(routes::health::router())
        .merge(routes::users::router())
        .layer(cors)
        .layer(TimeoutLayer::new(config.request_timeout))
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

/// Run the HTTP server until a shutdown signal arrives.
///
/// # Example
///
/// ```ignore
/// let repo = PgRepository::initialize(&DatabaseConfig::from_env()?, "migrations");
/// run_server(Arc::new(repo), ServerConfig::default()).await?;
/// ```
pub async fn run_server(
    repository: Arc<dyn UserRepository>,
    config: ServerConfig,
) -> Result<(), ServerError> {
    let app = build_router(AppState::new(repository), &config);

    let listener = TcpListener::bind(config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting shutdown");
        }
    }
}

/// Server error type
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use uuid::Uuid;

    use crate::db::MemoryRepository;
    use crate::models::User;

    fn app(repo: Arc<MemoryRepository>) -> Router {
        build_router(AppState::new(repo), &ServerConfig::default())
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[test]
    fn default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_addr.port(), 8000);
        assert!(!config.cors_permissive);
    }

    #[tokio::test]
    async fn health_ok_when_up_to_date() {
        let repo = Arc::new(MemoryRepository::at_revision(
            Some("revision_1"),
            Some("revision_1"),
        ));
        let response = app(repo).oneshot(get("/health")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            json!({
                "status": "ok",
                "currentDatabaseSchemaRevision": "revision_1",
                "currentHead": "revision_1",
            })
        );
    }

    #[tokio::test]
    async fn health_500_on_drift() {
        let repo = Arc::new(MemoryRepository::at_revision(None, Some("revision_1")));
        let response = app(repo).oneshot(get("/health")).await.unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        let detail = body["detail"].as_str().unwrap();
        assert!(detail.contains("Database schema not up to date."));
        assert!(detail.contains("Current database schema revision is 'None"));
        assert!(detail.contains("and current head is 'revision_1'"));
    }

    #[tokio::test]
    async fn create_user_generates_id() {
        let repo = Arc::new(MemoryRepository::new());
        let response = app(repo.clone())
            .oneshot(post_json(
                "/users",
                json!({"name": "testuser", "fullname": "Test User"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["name"], "testuser");
        assert_eq!(body["fullname"], "Test User");

        let id = Uuid::parse_str(body["id"].as_str().unwrap()).unwrap();
        assert!(User::get(&*repo, id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn create_user_keeps_supplied_id() {
        let repo = Arc::new(MemoryRepository::new());
        let id = Uuid::new_v4();
        let response = app(repo)
            .oneshot(post_json(
                "/users",
                json!({"id": id, "name": "testuser", "fullname": "Test User"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["id"], id.to_string());
    }

    #[tokio::test]
    async fn create_user_rejects_malformed_body() {
        let repo = Arc::new(MemoryRepository::new());
        let response = app(repo)
            .oneshot(post_json("/users", json!({"name": "testuser"})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body_json(response).await["detail"].is_string());
    }

    #[tokio::test]
    async fn create_user_rejects_long_name() {
        let repo = Arc::new(MemoryRepository::new());
        let response = app(repo.clone())
            .oneshot(post_json(
                "/users",
                json!({"name": "x".repeat(31), "fullname": ""}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(User::list(&*repo).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn create_user_accepts_empty_name() {
        let repo = Arc::new(MemoryRepository::new());
        let response = app(repo.clone())
            .oneshot(post_json("/users", json!({"name": "", "fullname": "Anon"})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["name"], "");
        assert_eq!(body["fullname"], "Anon");
        assert_eq!(User::list(&*repo).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn create_user_twice_conflicts() {
        let repo = Arc::new(MemoryRepository::new());
        let body = json!({"id": Uuid::new_v4(), "name": "testuser", "fullname": ""});

        let first = app(repo.clone())
            .oneshot(post_json("/users", body.clone()))
            .await
            .unwrap();
        assert_eq!(first.status(), StatusCode::OK);

        let second = app(repo).oneshot(post_json("/users", body)).await.unwrap();
        assert_eq!(second.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn list_users_empty() {
        let repo = Arc::new(MemoryRepository::new());
        let response = app(repo).oneshot(get("/users")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!([]));
    }

    #[tokio::test]
    async fn list_users_returns_all() {
        let repo = Arc::new(MemoryRepository::new());
        User::new("test1", "Test One")
            .unwrap()
            .save(&*repo)
            .await
            .unwrap();
        User::new("test2", "Test Two")
            .unwrap()
            .save(&*repo)
            .await
            .unwrap();

        let response = app(repo).oneshot(get("/users")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        let users = body.as_array().unwrap();
        assert_eq!(users.len(), 2);
        assert!(users
            .iter()
            .all(|u| u.get("id").is_some() && u.get("name").is_some() && u.get("fullname").is_some()));
    }

    #[tokio::test]
    async fn get_user_by_id() {
        let repo = Arc::new(MemoryRepository::new());
        let user = User::new("testuser", "Test User").unwrap();
        user.save(&*repo).await.unwrap();

        let response = app(repo)
            .oneshot(get(&format!("/users/{}", user.id())))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            json!({"id": user.id().to_string(), "name": "testuser", "fullname": "Test User"})
        );
    }

    #[tokio::test]
    async fn get_unknown_user_is_404() {
        let repo = Arc::new(MemoryRepository::new());
        let response = app(repo)
            .oneshot(get(&format!("/users/{}", Uuid::new_v4())))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await, json!({"detail": "User not found"}));
    }

    #[tokio::test]
    async fn get_user_rejects_bad_uuid() {
        let repo = Arc::new(MemoryRepository::new());
        let response = app(repo).oneshot(get("/users/not-a-uuid")).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            body_json(response).await,
            json!({"detail": "id: invalid UUID format"})
        );
    }

    #[tokio::test]
    async fn get_user_rejects_undecodable_path() {
        let repo = Arc::new(MemoryRepository::new());
        let response = app(repo).oneshot(get("/users/%FF")).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = body_json(response).await;
        let detail = body["detail"].as_str().unwrap();
        assert!(!detail.is_empty());
        assert_ne!(detail, "id cannot be empty");
        assert_ne!(detail, "id: invalid UUID format");
    }
}
