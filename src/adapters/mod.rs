//! External system integrations for QRSync.
//!
//! - [`database`] - storage traits and the backend factory
//! - [`sqlite`] - SQLite transaction source and default completion ledger
//! - [`postgresql`] - PostgreSQL completion ledger
//! - [`erp`] - ERP document endpoint client
//!
//! # Design Pattern
//!
//! Adapters isolate external dependencies behind traits so the batch processor
//! can be exercised with in-memory implementations.
//!
//! ```rust,no_run
//! use qrsync::adapters::erp::{DocumentSync, ErpSyncClient};
//! use qrsync::config::{secret_string, ErpConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ErpConfig {
//!     base_url: "https://erp.example.com:44300".to_string(),
//!     documents_endpoint: "/sap/bc/rest/zfiscal/documents".to_string(),
//!     username: "qrsync".to_string(),
//!     password: secret_string("pass".to_string()),
//!     client: "100".to_string(),
//!     from_date: String::new(),
//!     to_date: String::new(),
//!     timeout_seconds: 30,
//!     insecure_skip_verify: false,
//!     server_header: "sap-server".to_string(),
//! };
//!
//! let client = ErpSyncClient::new(config)?;
//! let probe = client.test_connection().await;
//! println!("{}", probe.message);
//! # Ok(())
//! # }
//! ```

pub mod database;
pub mod erp;
pub mod postgresql;
pub mod sqlite;
