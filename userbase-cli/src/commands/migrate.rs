//! Apply pending schema migrations

use anyhow::{Context, Result};
use clap::Parser;
use userbase_server::UserRepository;

use super::DatabaseArgs;

/// Arguments for the migrate command
#[derive(Parser, Debug)]
pub struct MigrateArgs {
    #[command(flatten)]
    pub database: DatabaseArgs,
}

/// Upgrade the database to the head revision
pub async fn run_migrate(args: MigrateArgs) -> Result<()> {
    let repository = args.database.repository()?;

    let result = async {
        repository
            .migrate()
            .await
            .with_context(|| {
                format!(
                    "Failed to apply migrations from {}",
                    repository.migrations_dir().display()
                )
            })?;
        repository
            .current_revision()
            .await
            .context("Failed to read schema revision")
    }
    .await;
    repository.close().await;

    match result? {
        Some(revision) => println!("Database at revision {}", revision),
        None => println!("No migrations to apply"),
    }
    Ok(())
}
