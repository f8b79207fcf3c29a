//! Document sync abstraction
//!
//! The batch processor talks to the remote system only through this trait,
//! so tests can substitute an in-memory implementation.

use crate::adapters::erp::models::{ConnectionTestResult, SyncResponse, SyncResult};
use crate::domain::{DocNum, TransactionRecord};
use async_trait::async_trait;

#[async_trait]
pub trait DocumentSync: Send + Sync {
    /// Pushes the regenerated QR data for `record`
    ///
    /// A 409 conflict is remediated internally by deleting the document and
    /// retrying once. `Ok` means the endpoint reported `TYPE == "S"`.
    async fn update_document(
        &self,
        record: &TransactionRecord,
        artifact_path: &str,
    ) -> SyncResult<SyncResponse>;

    /// Deletes the document from the remote system
    async fn delete_document(&self, doc_num: &DocNum) -> SyncResult<()>;

    /// Probes the endpoint without modifying anything
    async fn test_connection(&self) -> ConnectionTestResult;
}
