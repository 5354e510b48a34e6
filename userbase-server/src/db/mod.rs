//! Database layer - configuration, connection pool, schema inspection and
//! repositories
//!
//! # Design Principles
//!
//! - One pool per process, injected where needed - no global handle
//! - One short-lived connection or transaction per operation
//! - Rely on DB constraints, handle conflicts - no check-then-insert

pub mod config;
pub mod pool;
pub mod repos;
pub mod schema;

pub use config::{ConfigError, DatabaseConfig};
pub use pool::create_pool;
pub use repos::*;
pub use schema::SchemaDrift;
