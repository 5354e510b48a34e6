//! userbase-server: user CRUD over HTTP
//!
//! A `User` entity, a repository seam with PostgreSQL and in-memory
//! implementations, and an axum API whose `/health` endpoint reports
//! whether the live schema matches the sqlx migration scripts.

pub mod db;
pub mod http;
pub mod models;

pub use db::{DatabaseConfig, MemoryRepository, PgRepository, RepoError, UserRepository};
pub use http::{run_server, ServerConfig};
pub use models::{User, ValidationError};
