//! SQLite connection pool
//!
//! Thin wrapper around `sqlx::SqlitePool` with the connect options the
//! ledger and the transaction source need.

use crate::domain::{QrSyncError, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Pool settings for one SQLite database file
#[derive(Debug, Clone)]
pub struct SqlitePoolConfig {
    /// Path of the database file, or `:memory:`
    pub database_path: PathBuf,

    /// Maximum number of pooled connections
    pub max_connections: u32,

    /// Connection acquire timeout
    pub connect_timeout: Duration,

    /// Create the file if it does not exist
    pub create_if_missing: bool,

    /// Switch the database to WAL journal mode
    pub wal: bool,
}

impl SqlitePoolConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            database_path: path.into(),
            max_connections: 5,
            connect_timeout: Duration::from_secs(30),
            create_if_missing: false,
            wal: false,
        }
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    pub fn create_if_missing(mut self, create: bool) -> Self {
        self.create_if_missing = create;
        self
    }

    pub fn wal(mut self, wal: bool) -> Self {
        self.wal = wal;
        self
    }

    /// In-memory database for tests
    ///
    /// Each connection to `:memory:` is a separate database, so the pool is
    /// limited to a single connection.
    pub fn in_memory() -> Self {
        Self {
            database_path: PathBuf::from(":memory:"),
            max_connections: 1,
            connect_timeout: Duration::from_secs(5),
            create_if_missing: true,
            wal: false,
        }
    }

    fn is_in_memory(&self) -> bool {
        self.database_path.as_os_str() == ":memory:"
    }
}

/// Pooled handle to one SQLite database
#[derive(Debug, Clone)]
pub struct SqliteDatabase {
    pool: SqlitePool,
    path: PathBuf,
}

impl SqliteDatabase {
    /// Opens the pool described by `config`
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened (or created, when allowed)
    pub async fn connect(config: SqlitePoolConfig) -> Result<Self> {
        let options = if config.is_in_memory() {
            SqliteConnectOptions::from_str("sqlite::memory:")
        } else {
            let mode = if config.create_if_missing { "rwc" } else { "rw" };
            SqliteConnectOptions::from_str(&format!(
                "sqlite://{}?mode={}",
                config.database_path.display(),
                mode
            ))
        }
        .map_err(|e| {
            QrSyncError::Configuration(format!(
                "Invalid SQLite path {}: {}",
                config.database_path.display(),
                e
            ))
        })?
        .create_if_missing(config.create_if_missing);

        let options = if config.wal {
            options.journal_mode(SqliteJournalMode::Wal)
        } else {
            options
        };

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.connect_timeout)
            .connect_with(options)
            .await
            .map_err(|e| {
                QrSyncError::Ledger(format!(
                    "Failed to open SQLite database {}: {}",
                    config.database_path.display(),
                    e
                ))
            })?;

        tracing::debug!(
            path = %config.database_path.display(),
            max_connections = config.max_connections,
            "SQLite pool created"
        );

        Ok(Self {
            pool,
            path: config.database_path,
        })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Checks that the database answers a trivial query
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}
