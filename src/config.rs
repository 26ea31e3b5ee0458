use std::env;
use thiserror::Error;

/// AppConfig
///
/// The service configuration, read once at startup and immutable afterwards.
/// Handlers that need it pull it out of `AppState` through `FromRef`.
#[derive(Clone, Debug)]
pub struct AppConfig {
    // Runtime environment marker. Controls log format and whether a database is mandatory.
    pub env: Env,
    // Postgres connection string. `None` selects the in-memory store (local only).
    pub db_url: Option<String>,
    // Upper bound of the Postgres connection pool.
    pub db_max_connections: u32,
    // TCP port the HTTP server binds on 0.0.0.0.
    pub port: u16,
}

/// Env
///
/// Local runs print human-readable logs and may run without a database;
/// production emits JSON logs and requires `DATABASE_URL`.
#[derive(Clone, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set in production")]
    Missing(&'static str),

    #[error("{name} has an invalid value: {value:?}")]
    Invalid { name: &'static str, value: String },
}

impl Default for AppConfig {
    /// Test scaffolding: local, in-memory, default port.
    fn default() -> Self {
        Self {
            env: Env::Local,
            db_url: None,
            db_max_connections: 5,
            port: 3000,
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads `APP_ENV`, `DATABASE_URL`, `DB_MAX_CONNECTIONS` and `PORT`.
    /// Anything other than `APP_ENV=production` is treated as local.
    pub fn load() -> Result<Self, ConfigError> {
        let env = match env::var("APP_ENV").as_deref() {
            Ok("production") => Env::Production,
            _ => Env::Local,
        };

        let db_url = env::var("DATABASE_URL").ok().filter(|url| !url.is_empty());
        if env == Env::Production && db_url.is_none() {
            return Err(ConfigError::Missing("DATABASE_URL"));
        }

        let defaults = Self::default();
        Ok(Self {
            env,
            db_url,
            db_max_connections: parse_var("DB_MAX_CONNECTIONS", defaults.db_max_connections)?,
            port: parse_var("PORT", defaults.port)?,
        })
    }
}

fn parse_var<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(value) => value
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        Err(_) => Ok(default),
    }
}
