//! Batch synchronization pipeline
//!
//! - [`BatchProcessor`] - drives QR generation, ledger writes and ERP updates
//! - [`ProcessingOptions`] - duplicate policy and record selection
//! - [`ProcessingResult`] - counters and errors for a run
//! - [`ProcessingEvent`] - progress and completion events

pub mod events;
pub mod options;
pub mod processor;
pub mod result;

pub use events::{EventSink, ProcessingEvent, ProgressEvent, RecordStatus};
pub use options::{DuplicateHandling, ProcessingOptions, ProcessorConfig, RecordSelection};
pub use processor::{BatchProcessor, RecordOutcome};
pub use result::{ProcessingResult, RecordError};
