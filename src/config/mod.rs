use serde::Deserialize;
use std::env;
use std::str::FromStr;

use crate::error::{AppError, Result};

// Top-level configuration, one section per concern
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub storage: StorageBackend,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub environment: String,
    pub rust_log: String,
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub pool_size: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    ///
    /// `DATABASE_URL` wins when present; otherwise the URL is assembled from
    /// the individual `SQL_*` variables.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let database_url = match lookup("DATABASE_URL") {
            Some(url) => url,
            None => format!(
                "postgresql://{}:{}@{}:{}/{}",
                var("SQL_USER_NAME", "postgres"),
                var("SQL_PASSWORD", "123"),
                var("SQL_SERVER", "localhost"),
                var("SQL_PORT", "5432"),
                var("SQL_DATABASE", "cd0046"),
            ),
        };

        let storage = match var("STORAGE", "postgres").to_lowercase().as_str() {
            "postgres" => StorageBackend::Postgres,
            "memory" => StorageBackend::Memory,
            other => {
                return Err(AppError::Config(format!(
                    "STORAGE must be postgres or memory, got {}",
                    other
                )))
            }
        };

        let log_format = match var("LOG_FORMAT", "pretty").to_lowercase().as_str() {
            "json" => LogFormat::Json,
            _ => LogFormat::Pretty,
        };

        Ok(Config {
            app: AppConfig {
                host: var("HOST", "0.0.0.0"),
                port: parse_var(&lookup, "PORT", "8000")?,
                environment: var("ENVIRONMENT", "development"),
                rust_log: var("RUST_LOG", "booking_directory=debug,tower_http=debug"),
                log_format,
            },
            database: DatabaseConfig {
                url: database_url,
                pool_size: parse_var(&lookup, "DB_POOL_SIZE", "10")?,
            },
            storage,
        })
    }
}

fn parse_var<F, T>(lookup: &F, key: &str, default: &str) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    let raw = lookup(key).unwrap_or_else(|| default.to_string());
    raw.parse()
        .map_err(|_| AppError::Config(format!("{} must be a valid number, got {:?}", key, raw)))
}
