//! Progress and completion events
//!
//! Events travel over a bounded `tokio::sync::mpsc` channel in emission order.
//! A run emits one progress event per processed record, then exactly one
//! completion event.

use super::result::ProcessingResult;
use std::fmt;
use tokio::sync::mpsc;

/// Per-record status token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordStatus {
    Success,
    Failed,
}

impl RecordStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordStatus::Success => "Success",
            RecordStatus::Failed => "Failed",
        }
    }
}

impl fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cumulative counters after a record finished
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressEvent {
    pub processed: usize,
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    pub current_doc_num: String,
    pub status: RecordStatus,
    pub recent_errors: Vec<String>,
}

impl ProgressEvent {
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            return 100.0;
        }
        (self.processed as f64 / self.total as f64) * 100.0
    }
}

#[derive(Debug, Clone)]
pub enum ProcessingEvent {
    Progress(ProgressEvent),
    /// Final, frozen result; `was_cancelled` tells whether the run stopped early
    Completed(ProcessingResult),
}

/// Sending half handed to `run_batch`
#[derive(Debug, Clone)]
pub struct EventSink {
    tx: Option<mpsc::Sender<ProcessingEvent>>,
}

impl EventSink {
    /// Bounded channel; a slow receiver applies backpressure to the run
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<ProcessingEvent>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx: Some(tx) }, rx)
    }

    /// Drop all events
    pub fn disabled() -> Self {
        Self { tx: None }
    }

    pub async fn emit(&self, event: ProcessingEvent) {
        if let Some(tx) = &self.tx {
            if tx.send(event).await.is_err() {
                tracing::debug!("Event receiver dropped, event discarded");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_events_arrive_in_order() {
        let (sink, mut rx) = EventSink::channel(4);

        for processed in 1..=2 {
            sink.emit(ProcessingEvent::Progress(ProgressEvent {
                processed,
                total: 2,
                successful: processed,
                failed: 0,
                current_doc_num: format!("DOC{processed}"),
                status: RecordStatus::Success,
                recent_errors: Vec::new(),
            }))
            .await;
        }
        drop(sink);

        let mut seen = Vec::new();
        while let Some(ProcessingEvent::Progress(event)) = rx.recv().await {
            seen.push(event.processed);
        }
        assert_eq!(seen, vec![1, 2]);
    }

    #[tokio::test]
    async fn test_disabled_sink_and_dropped_receiver() {
        EventSink::disabled()
            .emit(ProcessingEvent::Completed(ProcessingResult::start(0)))
            .await;

        let (sink, rx) = EventSink::channel(1);
        drop(rx);
        sink.emit(ProcessingEvent::Completed(ProcessingResult::start(0)))
            .await;
    }

    #[test]
    fn test_status_tokens() {
        assert_eq!(RecordStatus::Success.to_string(), "Success");
        assert_eq!(RecordStatus::Failed.to_string(), "Failed");
    }
}
