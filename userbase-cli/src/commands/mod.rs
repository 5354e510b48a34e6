//! Command implementations for the userbase CLI

pub mod demo;
pub mod migrate;
pub mod serve;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use userbase_server::{DatabaseConfig, PgRepository};

// Re-export dispatcher functions for flat access from main.rs
pub use demo::run_demo;
pub use migrate::run_migrate;
pub use serve::run_serve;

/// Options shared by every command that touches the database
#[derive(Args, Debug, Clone)]
pub struct DatabaseArgs {
    /// Directory holding the sqlx migration scripts
    #[arg(long, env = "MIGRATIONS_DIR", default_value = "migrations")]
    pub migrations_dir: PathBuf,
}

impl DatabaseArgs {
    /// Build the repository from DATABASE_* variables and these options.
    pub fn repository(&self) -> Result<PgRepository> {
        let config = DatabaseConfig::from_env().context("Invalid database configuration")?;
        tracing::debug!(?config, "Database configuration loaded");
        Ok(PgRepository::initialize(&config, &self.migrations_dir))
    }
}
