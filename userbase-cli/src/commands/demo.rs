//! Demonstration run: save two users, list them, fetch one back

use anyhow::{Context, Result};
use clap::Parser;
use userbase_server::{MemoryRepository, User, UserRepository};

use super::DatabaseArgs;

/// Arguments for the demo command
#[derive(Parser, Debug)]
pub struct DemoArgs {
    /// Keep users in memory instead of PostgreSQL
    #[arg(long)]
    pub in_memory: bool,

    #[command(flatten)]
    pub database: DatabaseArgs,
}

pub async fn run_demo(args: DemoArgs) -> Result<()> {
    if args.in_memory {
        return demo(&MemoryRepository::new()).await;
    }

    let repository = args.database.repository()?;
    let result = demo(&repository).await;
    repository.close().await;
    result
}

async fn demo(repo: &dyn UserRepository) -> Result<()> {
    let john = User::new("johndoe", "John Doe")?;
    john.save(repo).await.context("Failed to save johndoe")?;

    let jane = User::new("janedoe", "Jane Doe")?;
    jane.save(repo).await.context("Failed to save janedoe")?;

    for user in User::list(repo).await.context("Failed to list users")? {
        println!(
            "User ID: {}, Name: {}, Fullname: {}",
            user.id(),
            user.name(),
            user.fullname()
        );
    }

    match User::get(repo, jane.id()).await.context("Failed to fetch janedoe")? {
        Some(user) => println!("Retrieved User: {} with ID {}", user.name(), user.id()),
        None => println!("User not found."),
    }

    Ok(())
}
