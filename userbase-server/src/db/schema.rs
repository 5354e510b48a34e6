//! Schema revision inspection
//!
//! Revisions are sqlx migration versions. The database records what it has
//! applied in `_sqlx_migrations`; the migrations directory defines the head.

use std::collections::BTreeMap;
use std::path::Path;

use sqlx::migrate::{AppliedMigration, Migrate, MigrateError, Migrator};
use sqlx::PgConnection;

/// Table sqlx uses to track applied migrations
pub const MIGRATIONS_TABLE: &str = "_sqlx_migrations";

/// Load migration scripts from a directory.
pub async fn load_scripts(dir: &Path) -> Result<Migrator, MigrateError> {
    Migrator::new(dir).await
}

/// Highest up-migration version defined by the scripts.
pub fn head_version(migrator: &Migrator) -> Option<i64> {
    migrator
        .iter()
        .filter(|m| !m.migration_type.is_down_migration())
        .map(|m| m.version)
        .max()
}

/// Whether the database has ever been migrated.
pub async fn migrations_table_exists(conn: &mut PgConnection) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar("SELECT to_regclass($1) IS NOT NULL")
        .bind(MIGRATIONS_TABLE)
        .fetch_one(conn)
        .await
}

/// Highest successfully applied version, `None` if nothing was applied.
pub async fn applied_revision(conn: &mut PgConnection) -> Result<Option<i64>, sqlx::Error> {
    if !migrations_table_exists(&mut *conn).await? {
        return Ok(None);
    }

    sqlx::query_scalar("SELECT MAX(version) FROM _sqlx_migrations WHERE success")
        .fetch_one(conn)
        .await
}

/// Applied migrations and the dirty version, if any.
///
/// A database that was never migrated has neither.
pub async fn applied_state(
    conn: &mut PgConnection,
) -> Result<(Vec<AppliedMigration>, Option<i64>), MigrateError> {
    if !migrations_table_exists(&mut *conn).await? {
        return Ok((Vec::new(), None));
    }

    let dirty = conn.dirty_version().await?;
    let applied = conn.list_applied_migrations().await?;
    Ok((applied, dirty))
}

/// Differences between the migration scripts and what the database applied
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SchemaDrift {
    /// Defined in scripts, not applied
    pub pending: Vec<i64>,
    /// Applied with a checksum that no longer matches its script
    pub modified: Vec<i64>,
    /// Applied, but no script defines it
    pub unknown: Vec<i64>,
    /// Migration that failed part-way
    pub dirty: Option<i64>,
}

impl SchemaDrift {
    /// Compare `(version, checksum)` pairs from scripts and database.
    pub fn compare<'a, S, A>(scripts: S, applied: A, dirty: Option<i64>) -> Self
    where
        S: IntoIterator<Item = (i64, &'a [u8])>,
        A: IntoIterator<Item = (i64, &'a [u8])>,
    {
        let scripts: BTreeMap<i64, &[u8]> = scripts.into_iter().collect();
        let applied: BTreeMap<i64, &[u8]> = applied.into_iter().collect();

        let mut drift = Self {
            dirty,
            ..Self::default()
        };

        for (version, checksum) in &scripts {
            match applied.get(version) {
                None => drift.pending.push(*version),
                Some(seen) if seen != checksum => drift.modified.push(*version),
                Some(_) => {}
            }
        }

        drift.unknown = applied
            .keys()
            .filter(|v| !scripts.contains_key(v))
            .copied()
            .collect();

        drift
    }

    /// Compare a loaded migrator against applied migrations.
    pub fn between(migrator: &Migrator, applied: &[AppliedMigration], dirty: Option<i64>) -> Self {
        let scripts = migrator
            .iter()
            .filter(|m| !m.migration_type.is_down_migration())
            .map(|m| (m.version, m.checksum.as_ref()));
        let applied = applied.iter().map(|m| (m.version, m.checksum.as_ref()));
        Self::compare(scripts, applied, dirty)
    }

    pub fn is_clean(&self) -> bool {
        self.pending.is_empty()
            && self.modified.is_empty()
            && self.unknown.is_empty()
            && self.dirty.is_none()
    }
}
