//! Domain models and types for QRSync.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Strongly-typed identifiers** ([`DocNum`], [`DocType`])
//! - **Domain models** ([`TransactionRecord`], [`CompletedDocument`])
//! - **Error types** ([`QrSyncError`], [`ErpError`], [`ErrorKind`])
//! - **Result type alias** ([`Result`])
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T, QrSyncError>`]:
//!
//! ```rust
//! use qrsync::domain::{DocNum, QrSyncError, Result};
//!
//! fn parse(raw: &str) -> Result<DocNum> {
//!     DocNum::new(raw).map_err(QrSyncError::Validation)
//! }
//! # assert!(parse("").is_err());
//! ```

pub mod document;
pub mod errors;
pub mod ids;
pub mod result;
pub mod transaction;

// Re-export commonly used types for convenience
pub use document::{CompletedDocument, CompletedDocumentBuilder};
pub use errors::{ErpError, ErrorKind, QrSyncError};
pub use ids::{DocNum, DocType};
pub use result::Result;
pub use transaction::TransactionRecord;
