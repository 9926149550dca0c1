use std::env;

use thiserror::Error;

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Postgres,
    Memory,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub database_url: Option<String>,
    pub jwt_secret: String,
    pub backend: Backend,
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{0} cannot be empty")]
    Empty(&'static str),
    #[error("unknown STORE_BACKEND '{0}', expected 'postgres' or 'memory'")]
    UnknownBackend(String),
}

impl Config {
    /// Reads the process environment; `main` loads `.env` into it first.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let jwt_secret = lookup("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?;
        if jwt_secret.is_empty() {
            return Err(ConfigError::Empty("JWT_SECRET"));
        }

        let backend = match lookup("STORE_BACKEND").as_deref() {
            None | Some("postgres") => Backend::Postgres,
            Some("memory") => Backend::Memory,
            Some(other) => return Err(ConfigError::UnknownBackend(other.to_string())),
        };

        let database_url = lookup("DATABASE_URL").filter(|url| !url.is_empty());
        if backend == Backend::Postgres && database_url.is_none() {
            return Err(ConfigError::Missing("DATABASE_URL"));
        }

        Ok(Config {
            bind_addr: lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            database_url,
            jwt_secret,
            backend,
        })
    }
}
