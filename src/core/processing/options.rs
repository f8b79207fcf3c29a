//! Batch run options

use crate::config::ProcessingConfig;
use crate::domain::{QrSyncError, Result};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Policy for records whose document number is already in the ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicateHandling {
    /// Count as success without regenerating or syncing
    Skip,
    /// Regenerate, rewrite the ledger entry and sync again
    #[default]
    Overwrite,
    /// Same pipeline as `Overwrite`
    Update,
}

impl DuplicateHandling {
    pub fn as_str(&self) -> &'static str {
        match self {
            DuplicateHandling::Skip => "skip",
            DuplicateHandling::Overwrite => "overwrite",
            DuplicateHandling::Update => "update",
        }
    }
}

impl FromStr for DuplicateHandling {
    type Err = QrSyncError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "skip" => Ok(DuplicateHandling::Skip),
            "overwrite" => Ok(DuplicateHandling::Overwrite),
            "update" => Ok(DuplicateHandling::Update),
            other => Err(QrSyncError::Configuration(format!(
                "Invalid duplicate handling '{other}'. Must be one of: skip, overwrite, update"
            ))),
        }
    }
}

impl fmt::Display for DuplicateHandling {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which records a batch run covers
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RecordSelection {
    /// Every record in the source, ordered by id
    #[default]
    All,
    /// Only these ids; an empty list selects nothing
    Ids(Vec<i64>),
}

/// Options for a single `run_batch` call
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProcessingOptions {
    pub duplicate_handling: DuplicateHandling,
    pub selection: RecordSelection,
}

impl ProcessingOptions {
    pub fn new(duplicate_handling: DuplicateHandling, selection: RecordSelection) -> Self {
        Self {
            duplicate_handling,
            selection,
        }
    }

    /// All records with the configured duplicate policy
    pub fn from_config(config: &ProcessingConfig) -> Result<Self> {
        Ok(Self::new(
            DuplicateHandling::from_str(&config.duplicate_handling)?,
            RecordSelection::All,
        ))
    }

    pub fn with_ids(mut self, ids: Vec<i64>) -> Self {
        self.selection = RecordSelection::Ids(ids);
        self
    }
}

/// Processor settings fixed for the lifetime of a `BatchProcessor`
#[derive(Debug, Clone)]
pub struct ProcessorConfig {
    /// Directory QR artifacts are written to
    pub output_dir: PathBuf,
    /// Wait between records, cancellable
    pub pacing_delay: Duration,
    /// Length of the error tail carried on progress events
    pub recent_errors_limit: usize,
}

impl ProcessorConfig {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            pacing_delay: Duration::from_millis(100),
            recent_errors_limit: 5,
        }
    }

    pub fn from_config(processing: &ProcessingConfig, output_dir: &str) -> Self {
        Self {
            output_dir: PathBuf::from(output_dir),
            pacing_delay: Duration::from_millis(processing.pacing_delay_ms),
            recent_errors_limit: processing.recent_errors_limit,
        }
    }

    pub fn with_pacing_delay(mut self, pacing_delay: Duration) -> Self {
        self.pacing_delay = pacing_delay;
        self
    }
}
