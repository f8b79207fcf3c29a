//! Storage abstraction traits
//!
//! This module defines the traits that the transaction source and the
//! completion ledger backends implement.

use crate::domain::{CompletedDocument, DocNum, Result, TransactionRecord};
use async_trait::async_trait;

/// Read-only access to the fiscal transaction store
///
/// All list operations return records ordered by id ascending.
#[async_trait]
pub trait TransactionSource: Send + Sync {
    /// Returns every transaction record
    ///
    /// # Errors
    ///
    /// Returns a source error if the store cannot be read.
    async fn get_all(&self) -> Result<Vec<TransactionRecord>>;

    /// Returns the records whose ids are in `ids`
    ///
    /// An empty `ids` slice yields an empty vector. Unknown ids are ignored.
    async fn get_by_ids(&self, ids: &[i64]) -> Result<Vec<TransactionRecord>>;

    /// Returns a single record, or `None` if the id is unknown
    async fn get_by_id(&self, id: i64) -> Result<Option<TransactionRecord>>;

    /// Returns the number of records in the store
    async fn count(&self) -> Result<u64>;
}

/// Durable idempotency store keyed by document number
///
/// One entry exists per document number. Absence is a normal return.
#[async_trait]
pub trait LedgerStorage: Send + Sync {
    /// Creates the ledger table if it does not exist
    async fn ensure_schema(&self) -> Result<()>;

    /// Inserts or replaces the entry for `document.doc_num`
    ///
    /// # Returns
    ///
    /// Returns `true` if a row was affected.
    async fn upsert(&self, document: &CompletedDocument) -> Result<bool>;

    /// Loads the entry for `doc_num`
    async fn get(&self, doc_num: &DocNum) -> Result<Option<CompletedDocument>>;

    /// Checks whether an entry exists for `doc_num`
    async fn exists(&self, doc_num: &DocNum) -> Result<bool> {
        Ok(self.get(doc_num).await?.is_some())
    }

    /// Returns all entries, most recent timestamp first
    async fn list_all(&self) -> Result<Vec<CompletedDocument>>;

    /// Short backend name for log lines
    fn backend_name(&self) -> &'static str;
}
