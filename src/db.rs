// src/db.rs
use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::info;

use crate::config::Config;
use crate::error::Result;

const SCHEMA: [&str; 3] = [
    "CREATE TABLE IF NOT EXISTS questions (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        text TEXT NOT NULL,
        published_at TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS choices (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        question_id INTEGER NOT NULL REFERENCES questions (id) ON DELETE CASCADE,
        text TEXT NOT NULL,
        votes INTEGER NOT NULL DEFAULT 0 CHECK (votes >= 0)
    )",
    "CREATE INDEX IF NOT EXISTS idx_choices_question_id ON choices (question_id)",
];

pub async fn create_pool(config: &Config) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(&config.database_url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .connect_with(options)
        .await?;

    info!("Connected to {}", config.database_url);
    Ok(pool)
}

pub async fn migrate(pool: &SqlitePool) -> Result<()> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }

    Ok(())
}

/// Single-connection in-memory database; the pool must never recycle the
/// connection or the data goes with it.
#[cfg(test)]
pub async fn test_pool() -> SqlitePool {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .unwrap()
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .unwrap();

    migrate(&pool).await.unwrap();
    pool
}
