//! Completion ledger entry
//!
//! A `CompletedDocument` records that a document number has been through QR
//! generation at least once. One entry exists per document number.

use super::ids::{DocNum, DocType};
use super::transaction::TransactionRecord;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Ledger entry for a completed document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletedDocument {
    /// Ledger key
    pub doc_num: DocNum,

    pub doc_type: DocType,

    /// Control code copy (`CUIN`)
    pub cuin: String,

    /// Serial number copy (`CUSN`)
    pub cusn: String,

    /// The encoded payload (`FiscalSeal`)
    pub fiscal_seal: String,

    /// Path of the generated QR image
    pub qr_code_path: Option<String>,

    pub timestamp: DateTime<Utc>,
}

impl CompletedDocument {
    /// Creates a new builder for constructing a CompletedDocument
    pub fn builder() -> CompletedDocumentBuilder {
        CompletedDocumentBuilder::default()
    }

    /// Builds the ledger entry for a freshly generated artifact
    ///
    /// The document type of `existing` is preserved; otherwise it defaults to `"IN"`.
    pub fn from_record(
        record: &TransactionRecord,
        doc_num: DocNum,
        payload: &str,
        qr_code_path: &str,
        existing: Option<&CompletedDocument>,
    ) -> Self {
        Self {
            doc_num,
            doc_type: existing.map(|e| e.doc_type.clone()).unwrap_or_default(),
            cuin: record.control_code.clone().unwrap_or_default(),
            cusn: record.serial_number.clone().unwrap_or_default(),
            fiscal_seal: payload.to_string(),
            qr_code_path: Some(qr_code_path.to_string()),
            timestamp: Utc::now(),
        }
    }
}

/// Builder for constructing CompletedDocument instances
#[derive(Debug, Default)]
pub struct CompletedDocumentBuilder {
    doc_num: Option<DocNum>,
    doc_type: Option<DocType>,
    cuin: Option<String>,
    cusn: Option<String>,
    fiscal_seal: Option<String>,
    qr_code_path: Option<String>,
    timestamp: Option<DateTime<Utc>>,
}

impl CompletedDocumentBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn doc_num(mut self, doc_num: DocNum) -> Self {
        self.doc_num = Some(doc_num);
        self
    }

    pub fn doc_type(mut self, doc_type: DocType) -> Self {
        self.doc_type = Some(doc_type);
        self
    }

    pub fn cuin(mut self, cuin: impl Into<String>) -> Self {
        self.cuin = Some(cuin.into());
        self
    }

    pub fn cusn(mut self, cusn: impl Into<String>) -> Self {
        self.cusn = Some(cusn.into());
        self
    }

    pub fn fiscal_seal(mut self, fiscal_seal: impl Into<String>) -> Self {
        self.fiscal_seal = Some(fiscal_seal.into());
        self
    }

    pub fn qr_code_path(mut self, qr_code_path: impl Into<String>) -> Self {
        self.qr_code_path = Some(qr_code_path.into());
        self
    }

    pub fn timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Builds the CompletedDocument
    ///
    /// # Errors
    ///
    /// Returns an error if the document number or fiscal seal is missing
    pub fn build(self) -> Result<CompletedDocument, String> {
        Ok(CompletedDocument {
            doc_num: self.doc_num.ok_or("doc_num is required")?,
            doc_type: self.doc_type.unwrap_or_default(),
            cuin: self.cuin.unwrap_or_default(),
            cusn: self.cusn.unwrap_or_default(),
            fiscal_seal: self.fiscal_seal.ok_or("fiscal_seal is required")?,
            qr_code_path: self.qr_code_path,
            timestamp: self.timestamp.unwrap_or_else(Utc::now),
        })
    }
}
