//! Ledger manager over a pluggable storage backend

use crate::adapters::database::traits::LedgerStorage;
use crate::domain::{CompletedDocument, DocNum, Result};
use std::sync::Arc;

/// Completion ledger
///
/// One entry per document number; writes are upserts, last write wins.
/// A ledger is owned by a single batch run at a time.
#[derive(Clone)]
pub struct CompletionLedger {
    storage: Arc<dyn LedgerStorage + Send + Sync>,
}

impl CompletionLedger {
    pub fn new(storage: Arc<dyn LedgerStorage + Send + Sync>) -> Self {
        Self { storage }
    }

    /// Insert or replace the entry for `document.doc_num`
    ///
    /// # Returns
    ///
    /// Whether a row was affected.
    pub async fn upsert(&self, document: &CompletedDocument) -> Result<bool> {
        let affected = self.storage.upsert(document).await?;
        tracing::debug!(
            doc_num = %document.doc_num,
            backend = self.storage.backend_name(),
            affected,
            "Ledger entry saved"
        );
        Ok(affected)
    }

    /// Absence is `Ok(None)`, not an error
    pub async fn get(&self, doc_num: &DocNum) -> Result<Option<CompletedDocument>> {
        self.storage.get(doc_num).await
    }

    pub async fn exists(&self, doc_num: &DocNum) -> Result<bool> {
        self.storage.exists(doc_num).await
    }

    /// All entries, most recent first
    pub async fn list_all(&self) -> Result<Vec<CompletedDocument>> {
        self.storage.list_all().await
    }

    pub fn backend_name(&self) -> &'static str {
        self.storage.backend_name()
    }
}
