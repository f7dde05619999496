//! Environment-driven configuration.

use std::env;

/// Runtime configuration for the API server.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Socket address to listen on (`BIND_ADDR`).
    pub bind_addr: String,
    /// SQLite URL (`DATABASE_URL`); the in-memory store is used when unset.
    pub database_url: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
            database_url: env::var("DATABASE_URL").ok(),
        }
    }
}
