//! SQLite integration
//!
//! The fiscal transaction database and the default completion ledger are
//! both local SQLite files accessed through an `sqlx` pool.

pub mod client;
pub mod ledger;
pub mod transactions;

pub use client::{SqliteDatabase, SqlitePoolConfig};
pub use ledger::SqliteLedger;
pub use transactions::SqliteTransactionSource;
