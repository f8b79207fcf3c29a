//! Domain identifier types with validation
//!
//! Newtype wrappers that keep document numbers from being confused with
//! other free-form strings on a transaction record.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Fiscal document number newtype wrapper
///
/// The document number (`TsNum` on the source record) is the idempotency key
/// of the completion ledger and the `vbeln` sent to the ERP endpoint.
///
/// # Examples
///
/// ```
/// use qrsync::domain::ids::DocNum;
/// use std::str::FromStr;
///
/// let doc_num = DocNum::from_str("0100012345").unwrap();
/// assert_eq!(doc_num.as_str(), "0100012345");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DocNum(String);

impl DocNum {
    /// Creates a new DocNum from a string
    ///
    /// # Returns
    ///
    /// Returns `Ok(DocNum)` if the number is non-blank, `Err` otherwise
    pub fn new(doc_num: impl Into<String>) -> Result<Self, String> {
        let doc_num = doc_num.into();
        if doc_num.trim().is_empty() {
            return Err("Document number cannot be empty".to_string());
        }
        Ok(Self(doc_num))
    }

    /// Returns the document number as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes self and returns the inner String
    pub fn into_inner(self) -> String {
        self.0
    }

    /// Returns the document number with path separators replaced by `_`
    ///
    /// Used when the number becomes part of a file name.
    pub fn to_file_label(&self) -> String {
        self.0.replace(['/', '\\'], "_")
    }
}

impl fmt::Display for DocNum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for DocNum {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for DocNum {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Ledger document type
///
/// Free-form on the wire; `"IN"` is the default for newly completed documents.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocType(String);

impl DocType {
    /// Document type used when no prior ledger entry exists
    pub const DEFAULT: &'static str = "IN";

    pub fn new(doc_type: impl Into<String>) -> Self {
        Self(doc_type.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for DocType {
    fn default() -> Self {
        Self(Self::DEFAULT.to_string())
    }
}

impl fmt::Display for DocType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
