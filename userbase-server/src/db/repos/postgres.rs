//! PostgreSQL user repository
//!
//! Owns the process-wide pool. Row mapping lives here: `UserRow` mirrors
//! `user_account` and a NULL `fullname` reads back as "".

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use sqlx::postgres::PgConnectOptions;
use sqlx::{Connection, FromRow, PgConnection, PgPool};
use uuid::Uuid;

use super::{RepoError, UserRepository};
use crate::db::config::DatabaseConfig;
use crate::db::pool::create_pool;
use crate::db::schema::{self, SchemaDrift};
use crate::models::User;

/// `user_account` row
#[derive(Debug, Clone, FromRow)]
struct UserRow {
    id: Uuid,
    name: String,
    fullname: Option<String>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User::from_row(row.id, row.name, row.fullname)
    }
}

/// User repository backed by PostgreSQL
#[derive(Debug, Clone)]
pub struct PgRepository {
    pool: PgPool,
    options: PgConnectOptions,
    migrations_dir: PathBuf,
}

impl PgRepository {
    /// Create the connection handle from configuration.
    ///
    /// The pool connects lazily, so this succeeds even while the database
    /// is unreachable. Calling it again yields an independent handle.
    pub fn initialize(config: &DatabaseConfig, migrations_dir: impl Into<PathBuf>) -> Self {
        let options = config.connect_options();
        let migrations_dir = migrations_dir.into();
        tracing::info!(
            host = options.get_host(),
            port = options.get_port(),
            database = ?options.get_database(),
            migrations = %migrations_dir.display(),
            "Initializing user repository"
        );

        Self {
            pool: create_pool(options.clone()),
            options,
            migrations_dir,
        }
    }

    pub fn migrations_dir(&self) -> &Path {
        &self.migrations_dir
    }

    /// Apply all pending migrations.
    pub async fn migrate(&self) -> Result<(), RepoError> {
        let migrator = schema::load_scripts(&self.migrations_dir).await?;
        tracing::info!(head = ?schema::head_version(&migrator), "Running migrations...");
        migrator.run(&self.pool).await?;
        tracing::info!("Migrations complete");
        Ok(())
    }

    /// Close the pool, waiting for checked-out connections to return.
    pub async fn close(&self) {
        self.pool.close().await;
        tracing::debug!("User repository closed");
    }

    /// Dedicated connection outside the pool, for migration metadata.
    async fn connect_raw(&self) -> Result<PgConnection, sqlx::Error> {
        PgConnection::connect_with(&self.options).await
    }
}

#[async_trait]
impl UserRepository for PgRepository {
    async fn add_user(&self, user: &User) -> Result<(), RepoError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            INSERT INTO user_account (id, name, fullname)
            VALUES ($1, $2, $3)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(user.id())
        .bind(user.name())
        .bind(user.fullname())
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            // tx rolls back on drop
            return Err(RepoError::Duplicate(user.id()));
        }

        tx.commit().await?;
        tracing::debug!(id = %user.id(), "User saved");
        Ok(())
    }

    async fn get_user(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, name, fullname FROM user_account WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(User::from))
    }

    async fn list_users(&self) -> Result<Vec<User>, RepoError> {
        let rows = sqlx::query_as::<_, UserRow>("SELECT id, name, fullname FROM user_account")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(User::from).collect())
    }

    async fn current_revision(&self) -> Result<Option<String>, RepoError> {
        let mut conn = self.connect_raw().await?;
        let revision = schema::applied_revision(&mut conn).await;
        conn.close().await?;

        Ok(revision?.map(|v| v.to_string()))
    }

    async fn current_head(&self) -> Result<Option<String>, RepoError> {
        let migrator = schema::load_scripts(&self.migrations_dir).await?;
        Ok(schema::head_version(&migrator).map(|v| v.to_string()))
    }

    async fn check(&self) -> Result<bool, RepoError> {
        let migrator = match schema::load_scripts(&self.migrations_dir).await {
            Ok(migrator) => migrator,
            Err(err) => {
                tracing::error!(
                    error = %err,
                    dir = %self.migrations_dir.display(),
                    "Cannot read migration scripts"
                );
                return Ok(false);
            }
        };

        let mut conn = self.connect_raw().await?;
        let state = schema::applied_state(&mut conn).await;
        conn.close().await?;
        let (applied, dirty) = state?;

        let drift = SchemaDrift::between(&migrator, &applied, dirty);
        if drift.is_clean() {
            return Ok(true);
        }

        tracing::error!(
            pending = ?drift.pending,
            modified = ?drift.modified,
            unknown = ?drift.unknown,
            dirty = ?drift.dirty,
            "Schema drift detected: please run migrations"
        );
        Ok(false)
    }
}
