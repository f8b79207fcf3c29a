//! Configuration management for QRSync.
//!
//! This module provides TOML-based configuration loading, parsing, and validation.
//!
//! # Overview
//!
//! QRSync uses TOML configuration files with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `QRSYNC_<SECTION>_<KEY>` environment overrides
//! - Default values for optional settings
//! - Validation on load
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use qrsync::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("qrsync.toml")?;
//! println!("ERP endpoint: {}{}", config.erp.base_url, config.erp.documents_endpoint);
//! println!("QR output: {}", config.artifacts.output_dir);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - Application settings (log level)
//! - [`ErpConfig`] - ERP endpoint, credentials and client code
//! - [`ProcessingConfig`] - Duplicate policy, pacing and event channel settings
//! - [`ArtifactsConfig`] - QR image output directory and scale
//! - [`TransactionsConfig`] - Fiscal transaction SQLite database
//! - [`SqliteLedgerConfig`] / [`PostgreSQLConfig`] - Completion ledger backends
//! - [`LoggingConfig`] - Logging configuration
//!
//! # Example Configuration
//!
//! ```toml
//! environment = "production"
//! ledger_target = "sqlite"
//!
//! [application]
//! log_level = "info"
//!
//! [erp]
//! base_url = "https://erp.example.com:44300"
//! documents_endpoint = "/sap/bc/rest/zfiscal/documents"
//! username = "qrsync"
//! password = "${QRSYNC_ERP_PASSWORD}"
//! client = "100"
//!
//! [artifacts]
//! output_dir = "/var/lib/qrsync/qrcodes"
//!
//! [transactions]
//! database_path = "/var/lib/fiscal/FbTransaction.db"
//!
//! [sqlite_ledger]
//! database_path = "/var/lib/qrsync/ErrorLog.db"
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

// Re-export commonly used types
pub use loader::load_config;
pub use schema::{
    ApplicationConfig, ArtifactsConfig, Environment, ErpConfig, LedgerTarget, LoggingConfig,
    PostgreSQLConfig, ProcessingConfig, QrSyncConfig, SqliteLedgerConfig, TransactionsConfig,
};
pub use secret::{secret_string, SecretString, SecretValue};
