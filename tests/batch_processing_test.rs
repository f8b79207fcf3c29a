//! Integration tests for the batch processor using in-memory fakes

use async_trait::async_trait;
use qrsync::adapters::database::{LedgerStorage, TransactionSource};
use qrsync::adapters::erp::{ConnectionTestResult, DocumentSync, SyncResponse, SyncResult};
use qrsync::core::ledger::CompletionLedger;
use qrsync::core::processing::{
    BatchProcessor, DuplicateHandling, EventSink, ProcessingEvent, ProcessingOptions,
    ProcessorConfig, RecordStatus,
};
use qrsync::core::qrcode::QrCodeCodec;
use qrsync::domain::{
    CompletedDocument, DocNum, DocType, ErpError, ErrorKind, Result, TransactionRecord,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::{mpsc, watch};

struct MemorySource(Vec<TransactionRecord>);

#[async_trait]
impl TransactionSource for MemorySource {
    async fn get_all(&self) -> Result<Vec<TransactionRecord>> {
        Ok(self.0.clone())
    }

    async fn get_by_ids(&self, ids: &[i64]) -> Result<Vec<TransactionRecord>> {
        Ok(self
            .0
            .iter()
            .filter(|r| ids.contains(&r.id))
            .cloned()
            .collect())
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<TransactionRecord>> {
        Ok(self.0.iter().find(|r| r.id == id).cloned())
    }

    async fn count(&self) -> Result<u64> {
        Ok(self.0.len() as u64)
    }
}

#[derive(Default)]
struct MemoryLedger {
    entries: Mutex<HashMap<String, CompletedDocument>>,
}

#[async_trait]
impl LedgerStorage for MemoryLedger {
    async fn ensure_schema(&self) -> Result<()> {
        Ok(())
    }

    async fn upsert(&self, document: &CompletedDocument) -> Result<bool> {
        self.entries
            .lock()
            .unwrap()
            .insert(document.doc_num.as_str().to_string(), document.clone());
        Ok(true)
    }

    async fn get(&self, doc_num: &DocNum) -> Result<Option<CompletedDocument>> {
        Ok(self.entries.lock().unwrap().get(doc_num.as_str()).cloned())
    }

    async fn list_all(&self) -> Result<Vec<CompletedDocument>> {
        Ok(self.entries.lock().unwrap().values().cloned().collect())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

/// Records update calls; fails listed documents and can trip cancellation
#[derive(Default)]
struct RecordingSync {
    calls: AtomicUsize,
    failing: Vec<String>,
    cancel_after: Option<(usize, watch::Sender<bool>)>,
}

#[async_trait]
impl DocumentSync for RecordingSync {
    async fn update_document(
        &self,
        record: &TransactionRecord,
        _artifact_path: &str,
    ) -> SyncResult<SyncResponse> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some((after, tx)) = &self.cancel_after {
            if call == *after {
                let _ = tx.send(true);
            }
        }

        if self.failing.contains(&record.ts_num) {
            return Err(ErpError::Rejected {
                doc_num: record.ts_num.clone(),
                response_type: "E".to_string(),
                message: "Document locked".to_string(),
            });
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

fn records(count: i64) -> Vec<TransactionRecord> {
    (1..=count)
        .map(|n| {
            TransactionRecord::new(n, format!("01000000{n:02}"))
                .with_qr_code(format!("https://itax.example/verify?n={n}"))
                .with_control_code(format!("CU-{n}"))
        })
        .collect()
}

struct Harness {
    processor: BatchProcessor,
    ledger: Arc<MemoryLedger>,
    sync: Arc<RecordingSync>,
    _dir: TempDir,
}

fn harness(records: Vec<TransactionRecord>, sync: RecordingSync) -> Harness {
    harness_with_ledger(records, sync, Arc::new(MemoryLedger::default()))
}

fn harness_with_ledger(
    records: Vec<TransactionRecord>,
    sync: RecordingSync,
    ledger: Arc<MemoryLedger>,
) -> Harness {
    let dir = TempDir::new().unwrap();
    let sync = Arc::new(sync);
    let processor = BatchProcessor::new(
        Arc::new(MemorySource(records)),
        CompletionLedger::new(ledger.clone()),
        QrCodeCodec::new(2),
        sync.clone(),
        ProcessorConfig::new(dir.path()).with_pacing_delay(Duration::ZERO),
    );

    Harness {
        processor,
        ledger,
        sync,
        _dir: dir,
    }
}

async fn drain(mut rx: mpsc::Receiver<ProcessingEvent>) -> Vec<ProcessingEvent> {
    let mut events = Vec::new();
    while let Some(event) = rx.recv().await {
        events.push(event);
    }
    events
}

#[tokio::test]
async fn test_counters_and_event_order() {
    let h = harness(
        records(4),
        RecordingSync {
            failing: vec!["0100000003".to_string()],
            ..Default::default()
        },
    );
    let (sink, rx) = EventSink::channel(16);
    let (_cancel_tx, cancel_rx) = watch::channel(false);

    let result = h
        .processor
        .run_batch(&ProcessingOptions::default(), cancel_rx, &sink)
        .await
        .unwrap();
    drop(sink);

    assert_eq!(result.total, 4);
    assert_eq!(result.processed, 4);
    assert_eq!(result.successful, 3);
    assert_eq!(result.failed, 1);
    assert_eq!(result.processed, result.successful + result.failed);
    assert!(result.completed);
    assert!(!result.was_cancelled);
    assert_eq!(result.errors[0].kind, ErrorKind::SyncFailure);
    assert!(result.errors[0].message.contains("0100000003"));

    let events = drain(rx).await;
    assert_eq!(events.len(), 5);

    let processed: Vec<usize> = events
        .iter()
        .filter_map(|e| match e {
            ProcessingEvent::Progress(p) => Some(p.processed),
            ProcessingEvent::Completed(_) => None,
        })
        .collect();
    assert_eq!(processed, vec![1, 2, 3, 4]);

    match &events[2] {
        ProcessingEvent::Progress(p) => {
            assert_eq!(p.current_doc_num, "0100000003");
            assert_eq!(p.status, RecordStatus::Failed);
            assert_eq!(p.recent_errors.len(), 1);
        }
        other => panic!("unexpected event {other:?}"),
    }
    assert!(matches!(events.last(), Some(ProcessingEvent::Completed(r)) if r.processed == 4));

    // Every attempted record has a ledger entry, including the one the ERP rejected
    assert_eq!(h.ledger.entries.lock().unwrap().len(), 4);
}

#[tokio::test]
async fn test_skip_policy_is_idempotent() {
    let ledger = Arc::new(MemoryLedger::default());
    for record in records(3) {
        let entry = CompletedDocument::builder()
            .doc_num(DocNum::new(record.ts_num.clone()).unwrap())
            .fiscal_seal("old")
            .build()
            .unwrap();
        ledger.upsert(&entry).await.unwrap();
    }

    let h = harness_with_ledger(records(3), RecordingSync::default(), ledger);
    let options = ProcessingOptions::new(DuplicateHandling::Skip, Default::default());

    for _ in 0..2 {
        let (_tx, cancel) = watch::channel(false);
        let result = h
            .processor
            .run_batch(&options, cancel, &EventSink::disabled())
            .await
            .unwrap();
        assert_eq!(result.successful, 3);
        assert_eq!(result.failed, 0);
    }

    assert_eq!(h.sync.calls.load(Ordering::SeqCst), 0);
    let entries = h.ledger.entries.lock().unwrap();
    assert!(entries.values().all(|e| e.fiscal_seal == "old"));
}

#[tokio::test]
async fn test_overwrite_preserves_document_type() {
    let ledger = Arc::new(MemoryLedger::default());
    let existing = CompletedDocument::builder()
        .doc_num(DocNum::new("0100000001").unwrap())
        .doc_type(DocType::new("CN"))
        .fiscal_seal("old")
        .build()
        .unwrap();
    ledger.upsert(&existing).await.unwrap();

    let h = harness_with_ledger(records(2), RecordingSync::default(), ledger);
    let (_tx, cancel) = watch::channel(false);
    let result = h
        .processor
        .run_batch(&ProcessingOptions::default(), cancel, &EventSink::disabled())
        .await
        .unwrap();
    assert_eq!(result.successful, 2);

    let entries = h.ledger.entries.lock().unwrap();
    let first = &entries["0100000001"];
    assert_eq!(first.doc_type.as_str(), "CN");
    assert_eq!(first.fiscal_seal, "https://itax.example/verify?n=1");
    assert!(first.qr_code_path.as_deref().unwrap().ends_with(".png"));
    assert_eq!(entries["0100000002"].doc_type.as_str(), "IN");
    assert_eq!(h.sync.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_update_policy_regenerates_existing_entry() {
    let ledger = Arc::new(MemoryLedger::default());
    let existing = CompletedDocument::builder()
        .doc_num(DocNum::new("0100000001").unwrap())
        .doc_type(DocType::new("CN"))
        .fiscal_seal("old")
        .qr_code_path("/stale/QR_0100000001.png")
        .build()
        .unwrap();
    ledger.upsert(&existing).await.unwrap();

    let h = harness_with_ledger(records(1), RecordingSync::default(), ledger);
    let (_tx, cancel) = watch::channel(false);
    let options = ProcessingOptions {
        duplicate_handling: DuplicateHandling::Update,
        ..Default::default()
    };
    let result = h
        .processor
        .run_batch(&options, cancel, &EventSink::disabled())
        .await
        .unwrap();

    assert_eq!(result.successful, 1);
    assert_eq!(h.sync.calls.load(Ordering::SeqCst), 1);

    let entries = h.ledger.entries.lock().unwrap();
    let entry = &entries["0100000001"];
    assert_eq!(entry.doc_type.as_str(), "CN");
    assert_eq!(entry.fiscal_seal, "https://itax.example/verify?n=1");
    let path = entry.qr_code_path.as_deref().unwrap();
    assert_ne!(path, "/stale/QR_0100000001.png");
    assert!(std::path::Path::new(path).exists());
}

#[tokio::test]
async fn test_cancellation_after_n_records() {
    let (cancel_tx, cancel_rx) = watch::channel(false);
    let h = harness(
        records(5),
        RecordingSync {
            cancel_after: Some((2, cancel_tx)),
            ..Default::default()
        },
    );
    let (sink, rx) = EventSink::channel(16);

    let result = h
        .processor
        .run_batch(&ProcessingOptions::default(), cancel_rx, &sink)
        .await
        .unwrap();
    drop(sink);

    assert_eq!(result.total, 5);
    assert_eq!(result.processed, 2);
    assert!(result.was_cancelled);
    assert!(result.completed);
    assert_eq!(h.sync.calls.load(Ordering::SeqCst), 2);

    let events = drain(rx).await;
    let progress = events
        .iter()
        .filter(|e| matches!(e, ProcessingEvent::Progress(_)))
        .count();
    assert_eq!(progress, 2);
    assert!(matches!(events.last(), Some(ProcessingEvent::Completed(r)) if r.was_cancelled));
}

#[tokio::test]
async fn test_cancellation_during_pacing_delay() {
    let dir = TempDir::new().unwrap();
    let (cancel_tx, cancel_rx) = watch::channel(false);
    let sync = Arc::new(RecordingSync {
        cancel_after: Some((1, cancel_tx)),
        ..Default::default()
    });
    let processor = BatchProcessor::new(
        Arc::new(MemorySource(records(3))),
        CompletionLedger::new(Arc::new(MemoryLedger::default())),
        QrCodeCodec::new(2),
        sync.clone(),
        ProcessorConfig::new(dir.path()).with_pacing_delay(Duration::from_secs(30)),
    );

    let result = tokio::time::timeout(
        Duration::from_secs(10),
        processor.run_batch(&ProcessingOptions::default(), cancel_rx, &EventSink::disabled()),
    )
    .await
    .expect("pacing delay should be interrupted")
    .unwrap();

    assert_eq!(result.processed, 1);
    assert!(result.was_cancelled);
}

#[tokio::test]
async fn test_empty_working_set() {
    let h = harness(Vec::new(), RecordingSync::default());
    let (sink, rx) = EventSink::channel(4);
    let (_tx, cancel) = watch::channel(false);

    let result = h
        .processor
        .run_batch(&ProcessingOptions::default(), cancel, &sink)
        .await
        .unwrap();
    drop(sink);

    assert_eq!(result.total, 0);
    assert_eq!(result.processed, 0);
    assert_eq!(result.successful, 0);
    assert_eq!(result.failed, 0);
    assert!(result.errors.is_empty());
    assert!(result.completed);

    let events = drain(rx).await;
    assert_eq!(events.len(), 1);
    assert!(matches!(events[0], ProcessingEvent::Completed(_)));
}

#[tokio::test]
async fn test_id_selection_and_missing_payload() {
    let mut source = records(3);
    source.push(TransactionRecord::new(4, "0100000004"));
    let h = harness(source, RecordingSync::default());
    let (_tx, cancel) = watch::channel(false);

    let options = ProcessingOptions::default().with_ids(vec![2, 4]);
    let result = h
        .processor
        .run_batch(&options, cancel, &EventSink::disabled())
        .await
        .unwrap();

    assert_eq!(result.total, 2);
    assert_eq!(result.successful, 1);
    assert_eq!(result.failed, 1);
    assert_eq!(result.errors[0].kind, ErrorKind::Validation);
    assert_eq!(
        result.errors[0].message,
        "Transaction 0100000004 has no QR code URL"
    );
    assert_eq!(h.sync.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_progress_error_tail_is_bounded() {
    let failing: Vec<String> = records(8).iter().map(|r| r.ts_num.clone()).collect();
    let h = harness(
        records(8),
        RecordingSync {
            failing,
            ..Default::default()
        },
    );
    let (sink, rx) = EventSink::channel(16);
    let (_tx, cancel) = watch::channel(false);

    let result = h
        .processor
        .run_batch(&ProcessingOptions::default(), cancel, &sink)
        .await
        .unwrap();
    drop(sink);

    assert_eq!(result.errors.len(), 8);

    let events = drain(rx).await;
    let last_progress = events
        .iter()
        .rev()
        .find_map(|e| match e {
            ProcessingEvent::Progress(p) => Some(p.clone()),
            ProcessingEvent::Completed(_) => None,
        })
        .unwrap();
    assert_eq!(last_progress.recent_errors.len(), 5);
    assert!(last_progress.recent_errors[4].contains("0100000008"));
}
