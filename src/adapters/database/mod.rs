//! Storage abstraction layer
//!
//! Trait-based seams for the fiscal transaction source and the completion
//! ledger, so the batch processor works against SQLite, PostgreSQL or test fakes.

pub mod factory;
pub mod traits;

pub use factory::{create_ledger_storage, create_transaction_source};
pub use traits::{LedgerStorage, TransactionSource};
