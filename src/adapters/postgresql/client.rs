//! PostgreSQL client implementation
//!
//! Pooled access to PostgreSQL for the completion ledger.

use crate::config::schema::PostgreSQLConfig;
use crate::domain::{QrSyncError, Result};
use deadpool_postgres::{Manager, ManagerConfig, Pool, RecyclingMethod, Runtime};
use secrecy::ExposeSecret;
use std::time::Duration;
use tokio_postgres::{NoTls, Row};

const SCHEMA_SQL: &str = include_str!("../../../migrations/postgresql_ledger.sql");

/// PostgreSQL client for QRSync
///
/// Every statement runs with the configured `statement_timeout`.
pub struct PostgreSQLClient {
    pool: Pool,
    config: PostgreSQLConfig,
}

impl PostgreSQLClient {
    /// Create a new PostgreSQL client
    ///
    /// # Errors
    ///
    /// Returns an error if the connection string is invalid or the pool cannot be built.
    pub async fn new(config: PostgreSQLConfig) -> Result<Self> {
        let pg_config: tokio_postgres::Config = config
            .connection_string
            .expose_secret()
            .as_ref()
            .parse()
            .map_err(|e| {
                QrSyncError::Configuration(format!("Invalid PostgreSQL connection string: {}", e))
            })?;

        let manager = Manager::from_config(
            pg_config,
            NoTls,
            ManagerConfig {
                recycling_method: RecyclingMethod::Fast,
            },
        );

        let timeout = Duration::from_secs(config.connection_timeout_seconds);
        let pool = Pool::builder(manager)
            .max_size(config.max_connections)
            .runtime(Runtime::Tokio1)
            .wait_timeout(Some(timeout))
            .create_timeout(Some(timeout))
            .recycle_timeout(Some(timeout))
            .build()
            .map_err(|e| QrSyncError::Ledger(format!("Failed to create connection pool: {}", e)))?;

        Ok(Self { pool, config })
    }

    /// Runs a trivial query through the pool
    pub async fn test_connection(&self) -> Result<()> {
        let client = self.get_connection().await?;
        client
            .query_one("SELECT 1", &[])
            .await
            .map_err(|e| QrSyncError::Ledger(format!("Connection test failed: {}", e)))?;

        tracing::info!("PostgreSQL connection test successful");
        Ok(())
    }

    /// Creates the ledger table and index if they do not exist
    pub async fn ensure_schema(&self) -> Result<()> {
        let client = self.get_connection().await?;
        client
            .batch_execute(SCHEMA_SQL)
            .await
            .map_err(|e| QrSyncError::Ledger(format!("Failed to create ledger schema: {}", e)))?;

        tracing::info!("PostgreSQL ledger schema ready");
        Ok(())
    }

    async fn get_connection(&self) -> Result<deadpool_postgres::Object> {
        self.pool
            .get()
            .await
            .map_err(|e| QrSyncError::Ledger(format!("Failed to get connection from pool: {}", e)))
    }

    async fn timed_connection(&self) -> Result<deadpool_postgres::Object> {
        let client = self.get_connection().await?;
        let timeout_query = format!(
            "SET statement_timeout = {}",
            self.config.statement_timeout_seconds * 1000
        );
        client
            .execute(&timeout_query, &[])
            .await
            .map_err(|e| QrSyncError::Ledger(format!("Failed to set statement timeout: {}", e)))?;
        Ok(client)
    }

    /// Execute a query and return rows
    pub async fn query(
        &self,
        query: &str,
        params: &[&(dyn tokio_postgres::types::ToSql + Sync)],
    ) -> Result<Vec<Row>> {
        let client = self.timed_connection().await?;
        client
            .query(query, params)
            .await
            .map_err(|e| QrSyncError::Ledger(format!("Query failed: {}", e)))
    }

    /// Execute a statement and return the number of affected rows
    pub async fn execute(
        &self,
        statement: &str,
        params: &[&(dyn tokio_postgres::types::ToSql + Sync)],
    ) -> Result<u64> {
        let client = self.timed_connection().await?;
        client
            .execute(statement, params)
            .await
            .map_err(|e| QrSyncError::Ledger(format!("Statement execution failed: {}", e)))
    }

    /// Connection string with credentials redacted, for log lines
    pub fn connection_string_safe(&self) -> String {
        redact_connection_string(self.config.connection_string.expose_secret().as_ref())
    }
}

fn redact_connection_string(conn_str: &str) -> String {
    conn_str
        .rsplit_once('@')
        .map(|(_, host)| format!("postgresql://***@{}", host))
        .unwrap_or_else(|| "postgresql://***".to_string())
}
