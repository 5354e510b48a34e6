//! Database connection settings
//!
//! Read from the environment:
//! - `DATABASE_HOST`
//! - `DATABASE_PORT` (default 5432)
//! - `DATABASE_NAME`
//! - `DATABASE_USER`
//! - `DATABASE_PASSWORD`
//!
//! Unset values fall through to sqlx's own `PG*` defaults.

use std::fmt;

use sqlx::postgres::PgConnectOptions;

/// Default PostgreSQL port
pub const DEFAULT_PORT: u16 = 5432;

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid {var}: '{value}' is not a valid port")]
    InvalidPort { var: &'static str, value: String },
}

/// Connection parameters for the user database
#[derive(Clone, Default, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub host: Option<String>,
    pub port: u16,
    pub name: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
}

impl DatabaseConfig {
    /// Load from `DATABASE_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary variable source (for testing)
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = match lookup("DATABASE_PORT") {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidPort {
                var: "DATABASE_PORT",
                value: raw,
            })?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            host: lookup("DATABASE_HOST"),
            port,
            name: lookup("DATABASE_NAME"),
            user: lookup("DATABASE_USER"),
            password: lookup("DATABASE_PASSWORD"),
        })
    }

    /// Build sqlx connect options from these settings.
    pub fn connect_options(&self) -> PgConnectOptions {
        let mut options = PgConnectOptions::new().port(self.port);

        if let Some(host) = &self.host {
            options = options.host(host);
        }
        if let Some(name) = &self.name {
            options = options.database(name);
        }
        if let Some(user) = &self.user {
            options = options.username(user);
        }
        if let Some(password) = &self.password {
            options = options.password(password);
        }

        options
    }
}

// Password stays out of logs
impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("name", &self.name)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .finish()
    }
}
