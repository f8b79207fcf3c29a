//! PostgreSQL integration
//!
//! Optional completion ledger backend for deployments that share the ledger
//! between several workstations.

pub mod adapter;
pub mod client;
pub mod models;

pub use adapter::PostgreSQLLedger;
pub use client::PostgreSQLClient;
pub use models::PostgreSQLCompletedDocument;
