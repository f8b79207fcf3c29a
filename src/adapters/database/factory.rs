//! Storage factory
//!
//! Builds the transaction source and the ledger backend from configuration.

use crate::adapters::database::traits::{LedgerStorage, TransactionSource};
use crate::adapters::postgresql::adapter::PostgreSQLLedger;
use crate::adapters::postgresql::client::PostgreSQLClient;
use crate::adapters::sqlite::client::{SqliteDatabase, SqlitePoolConfig};
use crate::adapters::sqlite::ledger::SqliteLedger;
use crate::adapters::sqlite::transactions::SqliteTransactionSource;
use crate::config::schema::{LedgerTarget, QrSyncConfig};
use crate::domain::{QrSyncError, Result};
use std::sync::Arc;

/// Create the fiscal transaction source
///
/// The transaction database must already exist; it is never created here.
///
/// # Errors
///
/// Returns a source error if the database cannot be opened
pub async fn create_transaction_source(
    config: &QrSyncConfig,
) -> Result<Arc<dyn TransactionSource + Send + Sync>> {
    tracing::info!(
        path = %config.transactions.database_path,
        "Opening fiscal transaction database"
    );

    let pool_config = SqlitePoolConfig::new(&config.transactions.database_path)
        .max_connections(config.transactions.max_connections)
        .create_if_missing(false);
    let database = SqliteDatabase::connect(pool_config)
        .await
        .map_err(|e| match e {
            QrSyncError::Ledger(msg) => QrSyncError::Source(msg),
            other => other,
        })?;

    Ok(Arc::new(SqliteTransactionSource::new(database)) as Arc<dyn TransactionSource + Send + Sync>)
}

/// Create the completion ledger backend selected by `ledger_target`
///
/// The ledger schema is bootstrapped before the storage is returned.
///
/// # Errors
///
/// Returns an error if the backend cannot be reached or the schema cannot be created
pub async fn create_ledger_storage(
    config: &QrSyncConfig,
) -> Result<Arc<dyn LedgerStorage + Send + Sync>> {
    let storage: Arc<dyn LedgerStorage + Send + Sync> = match config.ledger_target {
        LedgerTarget::Sqlite => {
            let sqlite_config = config.sqlite_ledger.as_ref().ok_or_else(|| {
                QrSyncError::Configuration(
                    "sqlite_ledger configuration is required when ledger_target = 'sqlite'"
                        .to_string(),
                )
            })?;

            tracing::info!(path = %sqlite_config.database_path, "Creating SQLite ledger");
            let pool_config = SqlitePoolConfig::new(&sqlite_config.database_path)
                .max_connections(sqlite_config.max_connections)
                .create_if_missing(true)
                .wal(true);
            let database = SqliteDatabase::connect(pool_config).await?;
            Arc::new(SqliteLedger::new(database))
        }
        LedgerTarget::PostgreSQL => {
            let pg_config = config.postgresql.as_ref().ok_or_else(|| {
                QrSyncError::Configuration(
                    "postgresql configuration is required when ledger_target = 'postgresql'"
                        .to_string(),
                )
            })?;

            tracing::info!("Creating PostgreSQL ledger");
            let client = PostgreSQLClient::new(pg_config.clone()).await?;
            Arc::new(PostgreSQLLedger::new(client))
        }
    };

    storage.ensure_schema().await?;
    Ok(storage)
}
