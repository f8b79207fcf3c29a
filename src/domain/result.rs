//! Result type alias for QRSync
//!
//! This module provides a convenient Result type alias that uses QrSyncError
//! as the error type.

use super::errors::QrSyncError;

/// Result type alias for QRSync operations
///
/// # Examples
///
/// ```
/// use qrsync::domain::result::Result;
/// use qrsync::domain::errors::QrSyncError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(QrSyncError::Validation("Invalid input".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, QrSyncError>;
