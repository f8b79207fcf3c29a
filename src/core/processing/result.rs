//! Batch run results and per-record errors

use crate::domain::{ErrorKind, QrSyncError, TransactionRecord};
use chrono::{DateTime, Utc};
use std::fmt;

/// A failed record, folded into the batch result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordError {
    /// Source id of the record
    pub record_id: i64,
    /// Document number as read from the source, possibly blank
    pub doc_num: String,
    pub kind: ErrorKind,
    pub message: String,
}

impl RecordError {
    pub fn new(record: &TransactionRecord, kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            record_id: record.id,
            doc_num: record.ts_num.clone(),
            kind,
            message: message.into(),
        }
    }

    /// `Transaction {doc_num}: {error}`
    pub fn from_error(record: &TransactionRecord, error: &QrSyncError) -> Self {
        Self::new(
            record,
            error.kind(),
            format!("Transaction {}: {}", record.ts_num, error),
        )
    }
}

impl fmt::Display for RecordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Outcome of a batch run
///
/// Created when the run starts, updated after each record, frozen when
/// the run completes or is cancelled.
#[derive(Debug, Clone)]
pub struct ProcessingResult {
    /// Size of the working set
    pub total: usize,
    pub processed: usize,
    pub successful: usize,
    pub failed: usize,
    /// Every record error in processing order
    pub errors: Vec<RecordError>,
    pub completed: bool,
    pub was_cancelled: bool,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
}

impl ProcessingResult {
    pub fn start(total: usize) -> Self {
        Self {
            total,
            processed: 0,
            successful: 0,
            failed: 0,
            errors: Vec::new(),
            completed: false,
            was_cancelled: false,
            started_at: Utc::now(),
            ended_at: None,
        }
    }

    pub fn record_success(&mut self) {
        self.processed += 1;
        self.successful += 1;
    }

    pub fn record_failure(&mut self, error: RecordError) {
        self.processed += 1;
        self.failed += 1;
        self.errors.push(error);
    }

    /// Freeze the result
    pub fn finish(&mut self, was_cancelled: bool) {
        self.completed = true;
        self.was_cancelled = was_cancelled;
        self.ended_at = Some(Utc::now());
    }

    /// The last `limit` error messages, oldest first
    pub fn recent_errors(&self, limit: usize) -> Vec<String> {
        let skip = self.errors.len().saturating_sub(limit);
        self.errors
            .iter()
            .skip(skip)
            .map(|e| e.message.clone())
            .collect()
    }

    pub fn is_successful(&self) -> bool {
        self.failed == 0 && !self.was_cancelled
    }

    pub fn success_rate(&self) -> f64 {
        if self.processed == 0 {
            return 100.0;
        }
        (self.successful as f64 / self.processed as f64) * 100.0
    }

    pub fn duration(&self) -> chrono::Duration {
        self.ended_at.unwrap_or_else(Utc::now) - self.started_at
    }

    pub fn log_summary(&self) {
        tracing::info!(
            total = self.total,
            processed = self.processed,
            successful = self.successful,
            failed = self.failed,
            was_cancelled = self.was_cancelled,
            duration_ms = self.duration().num_milliseconds(),
            success_rate = format!("{:.2}%", self.success_rate()),
            "Batch completed"
        );

        for error in &self.errors {
            tracing::warn!(
                record_id = error.record_id,
                doc_num = %error.doc_num,
                kind = %error.kind,
                message = %error.message,
                "Record failed"
            );
        }
    }
}
