use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};

pub type DbPool = sqlx::SqlitePool;

pub async fn connect(database_url: &str) -> Result<DbPool, sqlx::Error> {
    connect_with_settings(database_url, 5, 30).await
}

/// In-memory databases exist per connection, so they are pinned to a single
/// connection that is never recycled.
pub async fn connect_with_settings(
    database_url: &str,
    max_connections: u32,
    timeout_secs: u64,
) -> Result<DbPool, sqlx::Error> {
    open_pool(database_url, max_connections, timeout_secs, true).await
}

/// Like [`connect_with_settings`] but fails instead of creating a missing
/// database file.
pub async fn connect_existing(
    database_url: &str,
    max_connections: u32,
    timeout_secs: u64,
) -> Result<DbPool, sqlx::Error> {
    open_pool(database_url, max_connections, timeout_secs, false).await
}

async fn open_pool(
    database_url: &str,
    max_connections: u32,
    timeout_secs: u64,
    create_if_missing: bool,
) -> Result<DbPool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(create_if_missing)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(5));

    let pool_options = SqlitePoolOptions::new()
        .acquire_timeout(Duration::from_secs(timeout_secs.max(1)));
    let pool_options = if is_in_memory(database_url) {
        pool_options.max_connections(1).min_connections(1).idle_timeout(None).max_lifetime(None)
    } else {
        pool_options.max_connections(max_connections.max(1))
    };

    pool_options.connect_with(options).await
}

fn is_in_memory(database_url: &str) -> bool {
    database_url.contains(":memory:") || database_url.contains("mode=memory")
}
