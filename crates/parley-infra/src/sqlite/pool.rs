//! Database pool with split reader/writer connections in WAL mode.
//!
//! SQLite allows only one writer at a time. `DatabasePool` pairs a
//! multi-connection read-only pool for concurrent reads with a
//! single-connection writer pool for serialized writes. Both enforce foreign
//! keys. An in-memory database (`:memory:`) lives on one pinned connection
//! that serves as reader and writer.

use std::str::FromStr;

use parley_types::config::SqliteConfig;
use sqlx::migrate::{MigrateError, Migrator};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};

static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

/// Split read/write pool for SQLite.
///
/// - `reader`: Multi-connection pool for concurrent SELECT queries.
/// - `writer`: Single-connection pool for serialized INSERTs and transactions.
#[derive(Clone)]
pub struct DatabasePool {
    pub reader: SqlitePool,
    pub writer: SqlitePool,
}

impl DatabasePool {
    /// Open the database described by `config` and apply the schema.
    pub async fn connect(config: &SqliteConfig) -> Result<Self, sqlx::Error> {
        if config.is_in_memory() {
            let pool = Self::open_in_memory().await?;
            pool.migrate().await?;
            Ok(pool)
        } else {
            Self::open_file(config).await
        }
    }

    async fn open_file(config: &SqliteConfig) -> Result<Self, sqlx::Error> {
        let base_opts = if config.path.starts_with("sqlite:") {
            SqliteConnectOptions::from_str(&config.path)?
        } else {
            SqliteConnectOptions::new().filename(&config.path)
        }
        .journal_mode(SqliteJournalMode::Wal)
        .foreign_keys(true)
        .busy_timeout(config.busy_timeout())
        .create_if_missing(true);

        let read_opts = base_opts.clone().read_only(true);
        let write_opts = base_opts;

        let writer = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(write_opts)
            .await?;

        // Schema must exist before read-only connections open the file.
        MIGRATOR.run(&writer).await?;

        let reader = SqlitePoolOptions::new()
            .max_connections(config.max_readers.max(1))
            .connect_with(read_opts)
            .await?;

        Ok(Self { reader, writer })
    }

    async fn open_in_memory() -> Result<Self, sqlx::Error> {
        let opts = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

        // Every new connection would see a fresh empty database, so the single
        // connection is never allowed to expire.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(opts)
            .await?;

        Ok(Self {
            reader: pool.clone(),
            writer: pool,
        })
    }

    /// Apply pending migrations on the writer. Safe to call repeatedly.
    pub async fn migrate(&self) -> Result<(), MigrateError> {
        MIGRATOR.run(&self.writer).await
    }
}
