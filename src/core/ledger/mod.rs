//! Completion ledger
//!
//! Idempotency record of documents whose QR artifact has been regenerated,
//! keyed by document number.

pub mod manager;

pub use manager::CompletionLedger;
