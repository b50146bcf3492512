//! Low-level SQLite interactions.
//!
//! Everything here is a plain function taking a `&mut SqliteConnection`, rather than a method on a stateful
//! struct. Callers obtain a connection from a pool, or open a transaction and pass `&mut *tx`, so any of these
//! calls can be composed atomically without changes.
use std::{env, str::FromStr};

use log::info;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
    Error as SqlxError,
    SqlitePool,
};

pub mod listings;
pub mod transfers;

const SQLITE_DB_URL: &str = "sqlite://data/escrow_store.db";

pub fn db_url() -> String {
    let result = env::var("TES_DATABASE_URL").unwrap_or_else(|_| {
        info!("TES_DATABASE_URL is not set. Using the default.");
        SQLITE_DB_URL.to_string()
    });
    info!("Using database URL: {result}");
    result
}

/// Opens a connection pool against `url`.
///
/// The journal mode is pinned to `Delete` rather than sqlx's WAL default. With WAL, a pooled reader can lag one
/// commit behind a writer on another connection, and the audit queries must see every record the reconciler has
/// already committed.
pub async fn new_pool(url: &str, max_connections: u32) -> Result<SqlitePool, SqlxError> {
    let options = SqliteConnectOptions::from_str(url)?.journal_mode(SqliteJournalMode::Delete);
    let pool = SqlitePoolOptions::new().max_connections(max_connections).connect_with(options).await?;
    Ok(pool)
}

/// Applies any outstanding embedded migrations. The server calls this at startup.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./src/sqlite/migrations").run(pool).await
}
