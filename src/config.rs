// src/config.rs
use std::{env, fmt::Display, str::FromStr};

use tracing::info;

use crate::error::{AppError, Result};

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub max_connections: u32,
    /// Number of questions shown on the index page.
    pub index_limit: i64,
}

impl Config {
    pub fn load() -> Result<Self> {
        Ok(Self {
            database_url: try_load("DATABASE_URL", "sqlite://polls.db")?,
            port: try_load("PORT", "3030")?,
            max_connections: try_load("MAX_CONNECTIONS", "5")?,
            index_limit: try_load("INDEX_LIMIT", "5")?,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "sqlite://polls.db".to_string(),
            port: 3030,
            max_connections: 5,
            index_limit: 5,
        }
    }
}

fn try_load<T: FromStr>(key: &str, default: &str) -> Result<T>
where
    T::Err: Display,
{
    let raw = env::var(key).unwrap_or_else(|_| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });

    parse_value(key, &raw)
}

fn parse_value<T: FromStr>(key: &str, raw: &str) -> Result<T>
where
    T::Err: Display,
{
    raw.trim()
        .parse()
        .map_err(|e| AppError::Config(format!("Invalid {key} value {raw:?}: {e}")))
}
