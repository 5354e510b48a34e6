//! Database connection pool management
//!
//! The pool connects lazily: creating it never touches the network, the
//! first query does.

use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::PgPool;

/// Default maximum connections for the pool.
/// Kept low for a demonstration service.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Create a lazily-connecting PostgreSQL pool.
pub fn create_pool(options: PgConnectOptions) -> PgPool {
    create_pool_with_options(options, DEFAULT_MAX_CONNECTIONS)
}

/// Create a lazily-connecting PostgreSQL pool with a custom size.
fn create_pool_with_options(options: PgConnectOptions, max_connections: u32) -> PgPool {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect_lazy_with(options)
}
