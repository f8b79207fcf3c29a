//! Batch processor
//!
//! Walks the working set one record at a time: QR artifact, ledger entry,
//! ERP update. Record failures are folded into the result; only failing to
//! read the working set aborts a run.

use super::events::{EventSink, ProcessingEvent, ProgressEvent, RecordStatus};
use super::options::{DuplicateHandling, ProcessingOptions, ProcessorConfig, RecordSelection};
use super::result::{ProcessingResult, RecordError};
use crate::adapters::database::traits::TransactionSource;
use crate::adapters::erp::DocumentSync;
use crate::core::ledger::CompletionLedger;
use crate::core::qrcode::QrCodeCodec;
use crate::domain::{CompletedDocument, DocNum, ErrorKind, Result, TransactionRecord};
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::watch;

/// Outcome of the single-record procedure
#[derive(Debug, Clone, PartialEq)]
pub enum RecordOutcome {
    /// Artifact written, ledger updated, ERP accepted the update
    Synced { artifact_path: PathBuf },
    /// Already in the ledger under the skip policy
    Skipped,
    Failed(RecordError),
}

impl RecordOutcome {
    pub fn status(&self) -> RecordStatus {
        match self {
            RecordOutcome::Synced { .. } | RecordOutcome::Skipped => RecordStatus::Success,
            RecordOutcome::Failed(_) => RecordStatus::Failed,
        }
    }
}

/// Batch processor
///
/// Runs are sequential; callers must not start two runs against the same
/// ledger and artifact directory at once.
pub struct BatchProcessor {
    source: Arc<dyn TransactionSource + Send + Sync>,
    ledger: CompletionLedger,
    codec: QrCodeCodec,
    sync: Arc<dyn DocumentSync>,
    config: ProcessorConfig,
}

impl BatchProcessor {
    pub fn new(
        source: Arc<dyn TransactionSource + Send + Sync>,
        ledger: CompletionLedger,
        codec: QrCodeCodec,
        sync: Arc<dyn DocumentSync>,
        config: ProcessorConfig,
    ) -> Self {
        Self {
            source,
            ledger,
            codec,
            sync,
            config,
        }
    }

    /// Run a batch
    ///
    /// Emits one `Progress` event per processed record followed by exactly one
    /// `Completed` event. Cancellation is observed before each record and
    /// during the pacing delay, never during an in-flight request.
    ///
    /// # Errors
    ///
    /// Returns a source error if the working set cannot be read. No record is
    /// processed and no event is emitted in that case.
    pub async fn run_batch(
        &self,
        options: &ProcessingOptions,
        mut cancel: watch::Receiver<bool>,
        events: &EventSink,
    ) -> Result<ProcessingResult> {
        let records = self.resolve_working_set(&options.selection).await?;
        let mut result = ProcessingResult::start(records.len());

        tracing::info!(
            total = records.len(),
            duplicate_handling = %options.duplicate_handling,
            "Starting batch"
        );

        let mut was_cancelled = false;
        for (index, record) in records.iter().enumerate() {
            if *cancel.borrow() {
                tracing::warn!(
                    processed = result.processed,
                    remaining = records.len() - index,
                    "Batch cancelled"
                );
                was_cancelled = true;
                break;
            }

            let outcome = self.process_one(record, options.duplicate_handling).await;
            let status = outcome.status();
            match outcome {
                RecordOutcome::Failed(error) => {
                    tracing::warn!(
                        doc_num = %error.doc_num,
                        kind = %error.kind,
                        error = %error.message,
                        "Record failed"
                    );
                    result.record_failure(error);
                }
                RecordOutcome::Synced { .. } | RecordOutcome::Skipped => result.record_success(),
            }

            crate::log_record_outcome!(
                record.ts_num,
                status.as_str(),
                result.processed,
                result.total
            );

            events
                .emit(ProcessingEvent::Progress(ProgressEvent {
                    processed: result.processed,
                    total: result.total,
                    successful: result.successful,
                    failed: result.failed,
                    current_doc_num: record.ts_num.clone(),
                    status,
                    recent_errors: result.recent_errors(self.config.recent_errors_limit),
                }))
                .await;

            let is_last = index + 1 == records.len();
            if !is_last && !self.config.pacing_delay.is_zero() {
                tokio::select! {
                    _ = tokio::time::sleep(self.config.pacing_delay) => {}
                    _ = wait_for_cancel(&mut cancel) => {
                        tracing::warn!(processed = result.processed, "Batch cancelled during pacing delay");
                        was_cancelled = true;
                        break;
                    }
                }
            }
        }

        result.finish(was_cancelled);
        result.log_summary();
        events
            .emit(ProcessingEvent::Completed(result.clone()))
            .await;

        Ok(result)
    }

    /// Run the single-record procedure
    ///
    /// Never fails the batch: errors and panics become `RecordOutcome::Failed`.
    pub async fn process_one(
        &self,
        record: &TransactionRecord,
        policy: DuplicateHandling,
    ) -> RecordOutcome {
        crate::log_record_start!(record.id, record.ts_num);

        match AssertUnwindSafe(self.process_record(record, policy))
            .catch_unwind()
            .await
        {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(error)) => RecordOutcome::Failed(error),
            Err(panic) => {
                let description = panic_message(panic.as_ref());
                tracing::error!(doc_num = %record.ts_num, panic = %description, "Record procedure panicked");
                RecordOutcome::Failed(RecordError::new(
                    record,
                    ErrorKind::Unexpected,
                    format!("Transaction {}: {}", record.ts_num, description),
                ))
            }
        }
    }

    async fn process_record(
        &self,
        record: &TransactionRecord,
        policy: DuplicateHandling,
    ) -> std::result::Result<RecordOutcome, RecordError> {
        let doc_num = DocNum::new(record.ts_num.clone()).map_err(|_| {
            RecordError::new(
                record,
                ErrorKind::Validation,
                format!("Transaction record {} has no document number", record.id),
            )
        })?;

        let existing = self
            .ledger
            .get(&doc_num)
            .await
            .map_err(|e| RecordError::from_error(record, &e))?;

        if existing.is_some() && policy == DuplicateHandling::Skip {
            tracing::debug!(doc_num = %doc_num, "Already completed, skipping");
            return Ok(RecordOutcome::Skipped);
        }

        let payload = record.payload().ok_or_else(|| {
            RecordError::new(
                record,
                ErrorKind::Validation,
                format!("Transaction {} has no QR code URL", record.ts_num),
            )
        })?;

        let artifact_path = self
            .codec
            .encode(payload, &doc_num.to_file_label(), &self.config.output_dir)
            .await
            .map_err(|e| RecordError::from_error(record, &e))?;
        let artifact_str = artifact_path.to_string_lossy().into_owned();

        let document = CompletedDocument::from_record(
            record,
            doc_num,
            payload,
            &artifact_str,
            existing.as_ref(),
        );

        let saved = self
            .ledger
            .upsert(&document)
            .await
            .map_err(|e| RecordError::from_error(record, &e))?;
        if !saved {
            return Err(RecordError::new(
                record,
                ErrorKind::Ledger,
                format!("Failed to save completed document for {}", record.ts_num),
            ));
        }

        self.sync
            .update_document(record, &artifact_str)
            .await
            .map_err(|e| {
                RecordError::new(
                    record,
                    e.kind(),
                    format!("Failed to update ERP for document {}: {}", record.ts_num, e),
                )
            })?;

        Ok(RecordOutcome::Synced { artifact_path })
    }

    async fn resolve_working_set(
        &self,
        selection: &RecordSelection,
    ) -> Result<Vec<TransactionRecord>> {
        match selection {
            RecordSelection::All => self.source.get_all().await,
            RecordSelection::Ids(ids) if ids.is_empty() => Ok(Vec::new()),
            RecordSelection::Ids(ids) => self.source.get_by_ids(ids).await,
        }
    }
}

/// Resolves once the flag is set; never resolves if the sender is gone
async fn wait_for_cancel(cancel: &mut watch::Receiver<bool>) {
    loop {
        if *cancel.borrow_and_update() {
            return;
        }
        if cancel.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unexpected panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::erp::{ConnectionTestResult, SyncResponse, SyncResult};
    use crate::adapters::sqlite::{SqliteDatabase, SqliteLedger, SqlitePoolConfig};
    use crate::adapters::database::traits::LedgerStorage;
    use crate::domain::QrSyncError;
    use async_trait::async_trait;
    use std::time::Duration;
    use tempfile::TempDir;

    struct VecSource(Vec<TransactionRecord>);

    #[async_trait]
    impl TransactionSource for VecSource {
        async fn get_all(&self) -> Result<Vec<TransactionRecord>> {
            Ok(self.0.clone())
        }

        async fn get_by_ids(&self, ids: &[i64]) -> Result<Vec<TransactionRecord>> {
            Ok(self.0.iter().filter(|r| ids.contains(&r.id)).cloned().collect())
        }

        async fn get_by_id(&self, id: i64) -> Result<Option<TransactionRecord>> {
            Ok(self.0.iter().find(|r| r.id == id).cloned())
        }

        async fn count(&self) -> Result<u64> {
            Ok(self.0.len() as u64)
        }
    }

    struct FailingSource;

    #[async_trait]
    impl TransactionSource for FailingSource {
        async fn get_all(&self) -> Result<Vec<TransactionRecord>> {
            Err(QrSyncError::Source("database is locked".to_string()))
        }

        async fn get_by_ids(&self, _ids: &[i64]) -> Result<Vec<TransactionRecord>> {
            Err(QrSyncError::Source("database is locked".to_string()))
        }

        async fn get_by_id(&self, _id: i64) -> Result<Option<TransactionRecord>> {
            Err(QrSyncError::Source("database is locked".to_string()))
        }

        async fn count(&self) -> Result<u64> {
            Err(QrSyncError::Source("database is locked".to_string()))
        }
    }

    /// Accepts everything, panics on document numbers starting with `PANIC`
    struct AcceptingSync;

    #[async_trait]
    impl DocumentSync for AcceptingSync {
        async fn update_document(
            &self,
            record: &TransactionRecord,
            _artifact_path: &str,
        ) -> SyncResult<SyncResponse> {
            if record.ts_num.starts_with("PANIC") {
                panic!("sync exploded");
            }
            Ok(SyncResponse {
                response_type: Some("S".to_string()),
                ..Default::default()
            })
        }

        async fn delete_document(&self, _doc_num: &DocNum) -> SyncResult<()> {
            Ok(())
        }

        async fn test_connection(&self) -> ConnectionTestResult {
            ConnectionTestResult::connected("ok", String::new(), 200)
        }
    }

    async fn processor(source: Arc<dyn TransactionSource + Send + Sync>, dir: &TempDir) -> BatchProcessor {
        let database = SqliteDatabase::connect(SqlitePoolConfig::in_memory())
            .await
            .unwrap();
        let storage = SqliteLedger::new(database);
        storage.ensure_schema().await.unwrap();

        BatchProcessor::new(
            source,
            CompletionLedger::new(Arc::new(storage)),
            QrCodeCodec::new(2),
            Arc::new(AcceptingSync),
            ProcessorConfig::new(dir.path()).with_pacing_delay(Duration::ZERO),
        )
    }

    #[tokio::test]
    async fn test_panic_becomes_record_failure() {
        let dir = TempDir::new().unwrap();
        let records = vec![
            TransactionRecord::new(1, "PANIC-1").with_qr_code("payload"),
            TransactionRecord::new(2, "DOC-2").with_qr_code("payload"),
        ];
        let processor = processor(Arc::new(VecSource(records)), &dir).await;
        let (_tx, rx) = watch::channel(false);

        let result = processor
            .run_batch(&ProcessingOptions::default(), rx, &EventSink::disabled())
            .await
            .unwrap();

        assert_eq!(result.processed, 2);
        assert_eq!(result.successful, 1);
        assert_eq!(result.failed, 1);
        assert_eq!(result.errors[0].kind, ErrorKind::Unexpected);
        assert!(result.errors[0].message.contains("PANIC-1"));
        assert!(result.errors[0].message.contains("sync exploded"));
    }

    #[tokio::test]
    async fn test_missing_payload_is_validation_failure() {
        let dir = TempDir::new().unwrap();
        let record = TransactionRecord::new(5, "DOC-5");
        let processor = processor(Arc::new(VecSource(vec![record.clone()])), &dir).await;

        let outcome = processor
            .process_one(&record, DuplicateHandling::Overwrite)
            .await;

        match outcome {
            RecordOutcome::Failed(error) => {
                assert_eq!(error.kind, ErrorKind::Validation);
                assert_eq!(error.message, "Transaction DOC-5 has no QR code URL");
            }
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_source_failure_is_batch_fatal() {
        let dir = TempDir::new().unwrap();
        let processor = processor(Arc::new(FailingSource), &dir).await;
        let (sink, mut rx) = EventSink::channel(8);
        let (_tx, cancel) = watch::channel(false);

        let err = processor
            .run_batch(&ProcessingOptions::default(), cancel, &sink)
            .await
            .unwrap_err();
        assert!(matches!(err, QrSyncError::Source(_)));

        drop(sink);
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_empty_id_list_selects_nothing() {
        let dir = TempDir::new().unwrap();
        let records = vec![TransactionRecord::new(1, "DOC-1").with_qr_code("payload")];
        let processor = processor(Arc::new(VecSource(records)), &dir).await;
        let (_tx, cancel) = watch::channel(false);

        let options = ProcessingOptions::default().with_ids(Vec::new());
        let result = processor
            .run_batch(&options, cancel, &EventSink::disabled())
            .await
            .unwrap();

        assert_eq!(result.total, 0);
        assert_eq!(result.processed, 0);
        assert!(result.completed);
        assert!(!result.was_cancelled);
    }

    #[test]
    fn test_panic_message_extraction() {
        let boxed: Box<dyn Any + Send> = Box::new("static message");
        assert_eq!(panic_message(boxed.as_ref()), "static message");

        let boxed: Box<dyn Any + Send> = Box::new(String::from("owned message"));
        assert_eq!(panic_message(boxed.as_ref()), "owned message");

        let boxed: Box<dyn Any + Send> = Box::new(42_u32);
        assert_eq!(panic_message(boxed.as_ref()), "unexpected panic");
    }
}
