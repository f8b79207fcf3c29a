//! Domain error types
//!
//! This module defines the error hierarchy for QRSync. All errors are
//! domain-specific and don't expose third-party types.

use thiserror::Error;

/// Main QRSync error type
///
/// This is the primary error type used throughout the application.
/// It wraps specific error types and provides context for error handling.
#[derive(Debug, Error)]
pub enum QrSyncError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Missing payload or identifier on an input
    #[error("Validation error: {0}")]
    Validation(String),

    /// Filesystem failure while writing a QR image
    #[error("Artifact error: {0}")]
    Artifact(String),

    /// Completion ledger persistence errors
    #[error("Ledger error: {0}")]
    Ledger(String),

    /// Transaction source errors (cannot enumerate records)
    #[error("Transaction source error: {0}")]
    Source(String),

    /// Remote document endpoint errors
    #[error("ERP error: {0}")]
    Erp(#[from] ErpError),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

impl QrSyncError {
    /// Classify the error for reporting
    pub fn kind(&self) -> ErrorKind {
        match self {
            QrSyncError::Configuration(_) => ErrorKind::Configuration,
            QrSyncError::Validation(_) => ErrorKind::Validation,
            QrSyncError::Artifact(_) | QrSyncError::Io(_) => ErrorKind::Artifact,
            QrSyncError::Ledger(_) => ErrorKind::Ledger,
            QrSyncError::Source(_) => ErrorKind::Source,
            QrSyncError::Erp(e) => e.kind(),
            QrSyncError::Serialization(_) => ErrorKind::Protocol,
            QrSyncError::Other(_) => ErrorKind::Unexpected,
        }
    }
}

/// Remote document endpoint errors
///
/// Errors that occur when talking to the ERP document endpoint.
/// These errors don't expose third-party HTTP client types.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ErpError {
    /// Remote already holds a record under this key (HTTP 409)
    #[error("Conflict for document {0}")]
    Conflict(String),

    /// Conflict remediation (delete + single retry) did not succeed
    #[error("Conflict remediation failed for document {doc_num}: {reason}")]
    ConflictUnresolved { doc_num: String, reason: String },

    /// The endpoint answered but did not report success
    #[error("Document {doc_num} rejected (TYPE={response_type}): {message}")]
    Rejected {
        doc_num: String,
        response_type: String,
        message: String,
    },

    /// Authentication failed (HTTP 401)
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Unexpected status code
    #[error("Unexpected status {status}: {message}")]
    UnexpectedStatus { status: u16, message: String },

    /// Response body could not be interpreted
    #[error("Invalid response from server: {0}")]
    InvalidResponse(String),

    /// Failed to connect to the endpoint
    #[error("Failed to connect to ERP endpoint: {0}")]
    ConnectionFailed(String),

    /// Request timeout
    #[error("Request timeout: {0}")]
    Timeout(String),

    /// Invalid endpoint URL or request construction failure
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl ErpError {
    /// Classify the error for reporting
    pub fn kind(&self) -> ErrorKind {
        match self {
            ErpError::Conflict(_) => ErrorKind::SyncConflict,
            ErpError::ConflictUnresolved { .. } | ErpError::Rejected { .. } => {
                ErrorKind::SyncFailure
            }
            ErpError::ConnectionFailed(_) | ErpError::Timeout(_) => ErrorKind::Transport,
            ErpError::AuthenticationFailed(_)
            | ErpError::UnexpectedStatus { .. }
            | ErpError::InvalidResponse(_)
            | ErpError::InvalidRequest(_) => ErrorKind::Protocol,
        }
    }
}

/// Error taxonomy used in processing reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Missing payload or identifier
    Validation,
    /// Filesystem failure writing a QR image
    Artifact,
    /// Ledger persistence failure
    Ledger,
    /// HTTP 409, handled inside the sync client
    SyncConflict,
    /// Non-success sync outcome, including exhausted conflict retry
    SyncFailure,
    /// Timeout, connection refused, TLS failure
    Transport,
    /// Unexpected status code, malformed response body
    Protocol,
    /// Invalid configuration
    Configuration,
    /// Transaction source unreachable
    Source,
    /// Fault with no better classification, including caught panics
    Unexpected,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ErrorKind::Validation => "validation",
            ErrorKind::Artifact => "artifact",
            ErrorKind::Ledger => "ledger",
            ErrorKind::SyncConflict => "sync_conflict",
            ErrorKind::SyncFailure => "sync_failure",
            ErrorKind::Transport => "transport",
            ErrorKind::Protocol => "protocol",
            ErrorKind::Configuration => "configuration",
            ErrorKind::Source => "source",
            ErrorKind::Unexpected => "unexpected",
        };
        f.write_str(name)
    }
}

// Conversion from std::io::Error
impl From<std::io::Error> for QrSyncError {
    fn from(err: std::io::Error) -> Self {
        QrSyncError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for QrSyncError {
    fn from(err: serde_json::Error) -> Self {
        QrSyncError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for QrSyncError {
    fn from(err: toml::de::Error) -> Self {
        QrSyncError::Configuration(format!("TOML parse error: {err}"))
    }
}
