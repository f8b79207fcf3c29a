//! Logging and observability
//!
//! This module provides structured logging with support for:
//! - Console output with `RUST_LOG`-aware filtering
//! - JSON-formatted local log files with daily or hourly rotation
//! - Per-record helper macros with consistent field names
//!
//! # Example
//!
//! ```no_run
//! use qrsync::logging::init_logging;
//! use qrsync::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!("Application started");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard};

/// Log the start of a single-record procedure
///
/// # Example
///
/// ```no_run
/// use qrsync::log_record_start;
///
/// log_record_start!(42, "0100012345");
/// ```
#[macro_export]
macro_rules! log_record_start {
    ($record_id:expr, $doc_num:expr) => {
        tracing::debug!(
            record_id = $record_id,
            doc_num = %$doc_num,
            "Processing record"
        );
    };
}

/// Log the outcome of a single-record procedure
///
/// # Example
///
/// ```no_run
/// use qrsync::log_record_outcome;
///
/// log_record_outcome!("0100012345", "Success", 3, 10);
/// ```
#[macro_export]
macro_rules! log_record_outcome {
    ($doc_num:expr, $status:expr, $processed:expr, $total:expr) => {
        tracing::info!(
            doc_num = %$doc_num,
            status = $status,
            processed = $processed,
            total = $total,
            "Record processed"
        );
    };
}

/// Log a retry attempt
///
/// # Example
///
/// ```no_run
/// use qrsync::log_retry_attempt;
///
/// log_retry_attempt!(2, 2, "Conflict resolved by delete");
/// ```
#[macro_export]
macro_rules! log_retry_attempt {
    ($attempt:expr, $max_attempts:expr, $reason:expr) => {
        tracing::warn!(
            attempt = $attempt,
            max_attempts = $max_attempts,
            reason = $reason,
            "Retrying operation"
        );
    };
}
