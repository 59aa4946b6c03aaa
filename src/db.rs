//! SQLite storage for observations, yearly aggregates and crop yields.

pub mod query;
pub mod schema;
pub mod sqlite;

use std::path::Path;

use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
    SqlitePool,
};

use crate::error::Result;

pub const WEATHER: &str = "weather";
pub const WEATHER_YEARLY: &str = "weather_yearly";
pub const CROP_YIELDS: &str = "crop_yields";

/// Opens a connection pool on the database file, creating it if needed.
pub async fn connect(db_path: &Path) -> Result<SqlitePool> {
    open(db_path, true).await
}

/// Opens a pool on a database that must already exist.
pub async fn connect_existing(db_path: &Path) -> Result<SqlitePool> {
    open(db_path, false).await
}

async fn open(db_path: &Path, create: bool) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(create)
        .journal_mode(SqliteJournalMode::Wal);

    let pool = SqlitePoolOptions::new()
        .max_connections(8)
        .connect_with(options)
        .await?;

    Ok(pool)
}


#[cfg(test)]
pub(crate) mod test_support {
    use sqlx::SqlitePool;
    use tempfile::TempDir;

    use super::{connect, schema};

    /// A fresh database with empty tables. Keep the `TempDir` alive for the
    /// lifetime of the pool.
    pub async fn fresh_pool() -> (TempDir, SqlitePool) {
        let dir = TempDir::new().unwrap();
        let pool = connect(&dir.path().join("test.db")).await.unwrap();
        schema::recreate(&pool).await.unwrap();
        (dir, pool)
    }
}
