//! Repository implementations for user storage
//!
//! Each repository follows these patterns:
//! - Handles conflicts via ON CONFLICT (no check-then-insert)
//! - One short-lived connection or transaction per operation
//! - Schema inspection through sqlx migration metadata

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::User;

pub use memory::{MemoryRepository, SchemaStatus};
pub use postgres::PgRepository;

/// Repository error type
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("user '{0}' already exists")]
    Duplicate(Uuid),
}

/// Storage and schema-health operations the HTTP layer depends on
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a user. Fails with `Duplicate` if the id is taken.
    async fn add_user(&self, user: &User) -> Result<(), RepoError>;

    /// Look up a user by primary key.
    async fn get_user(&self, id: Uuid) -> Result<Option<User>, RepoError>;

    /// All users, in storage order.
    async fn list_users(&self) -> Result<Vec<User>, RepoError>;

    /// Schema revision recorded in the database, `None` if never migrated.
    async fn current_revision(&self) -> Result<Option<String>, RepoError>;

    /// Latest revision defined by the migration scripts.
    async fn current_head(&self) -> Result<Option<String>, RepoError>;

    /// `true` when the live schema matches the migration scripts.
    ///
    /// Drift is logged and reported as `false`, not as an error.
    async fn check(&self) -> Result<bool, RepoError>;
}
