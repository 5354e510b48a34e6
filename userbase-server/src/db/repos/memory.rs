//! In-process user repository
//!
//! Holds users in insertion order behind a tokio `RwLock`. Schema health is
//! whatever the caller configured, which lets router tests stand in for a
//! migrated (or drifted) database.

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{RepoError, UserRepository};
use crate::models::User;

/// Reported schema state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaStatus {
    pub revision: Option<String>,
    pub head: Option<String>,
    pub up_to_date: bool,
}

/// User repository held in memory
#[derive(Debug)]
pub struct MemoryRepository {
    users: RwLock<Vec<User>>,
    schema: SchemaStatus,
}

impl Default for MemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryRepository {
    /// Empty repository with no recorded revision and no drift.
    pub fn new() -> Self {
        Self::with_schema(SchemaStatus {
            up_to_date: true,
            ..SchemaStatus::default()
        })
    }

    pub fn with_schema(schema: SchemaStatus) -> Self {
        Self {
            users: RwLock::new(Vec::new()),
            schema,
        }
    }

    /// Repository reporting the given revision/head, up to date iff they match.
    pub fn at_revision(revision: Option<&str>, head: Option<&str>) -> Self {
        Self::with_schema(SchemaStatus {
            revision: revision.map(str::to_owned),
            head: head.map(str::to_owned),
            up_to_date: revision == head,
        })
    }
}

#[async_trait]
impl UserRepository for MemoryRepository {
    async fn add_user(&self, user: &User) -> Result<(), RepoError> {
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.id() == user.id()) {
            return Err(RepoError::Duplicate(user.id()));
        }
        users.push(user.clone());
        Ok(())
    }

    async fn get_user(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.id() == id).cloned())
    }

    async fn list_users(&self) -> Result<Vec<User>, RepoError> {
        Ok(self.users.read().await.clone())
    }

    async fn current_revision(&self) -> Result<Option<String>, RepoError> {
        Ok(self.schema.revision.clone())
    }

    async fn current_head(&self) -> Result<Option<String>, RepoError> {
        Ok(self.schema.head.clone())
    }

    async fn check(&self) -> Result<bool, RepoError> {
        if !self.schema.up_to_date {
            tracing::error!(
                revision = ?self.schema.revision,
                head = ?self.schema.head,
                "Schema drift detected: please run migrations"
            );
        }
        Ok(self.schema.up_to_date)
    }
}
