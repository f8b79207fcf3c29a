//! PostgreSQL row models
//!
//! Mirrors of the `completed_documents` table and conversions to and from
//! the domain `CompletedDocument`.

use crate::domain::{CompletedDocument, DocNum, DocType, QrSyncError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio_postgres::Row;

/// Ledger row in PostgreSQL
///
/// This structure maps to the `completed_documents` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostgreSQLCompletedDocument {
    pub doc_num: String,
    pub doc_type: String,
    pub cuin: String,
    pub cusn: String,
    pub fiscal_seal: String,
    pub qr_code_path: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl PostgreSQLCompletedDocument {
    /// Convert from the domain ledger entry
    pub fn from_domain(document: &CompletedDocument) -> Self {
        Self {
            doc_num: document.doc_num.to_string(),
            doc_type: document.doc_type.to_string(),
            cuin: document.cuin.clone(),
            cusn: document.cusn.clone(),
            fiscal_seal: document.fiscal_seal.clone(),
            qr_code_path: document.qr_code_path.clone(),
            timestamp: document.timestamp,
        }
    }

    /// Read a row returned by a `SELECT` on `completed_documents`
    pub fn from_row(row: &Row) -> Result<Self> {
        let column = |e: tokio_postgres::Error| {
            QrSyncError::Ledger(format!("Failed to read ledger row: {}", e))
        };

        Ok(Self {
            doc_num: row.try_get("doc_num").map_err(column)?,
            doc_type: row.try_get("doc_type").map_err(column)?,
            cuin: row.try_get("cuin").map_err(column)?,
            cusn: row.try_get("cusn").map_err(column)?,
            fiscal_seal: row.try_get("fiscal_seal").map_err(column)?,
            qr_code_path: row.try_get("qr_code_path").map_err(column)?,
            timestamp: row.try_get("timestamp").map_err(column)?,
        })
    }

    /// Convert to the domain ledger entry
    pub fn to_domain(&self) -> Result<CompletedDocument> {
        Ok(CompletedDocument {
            doc_num: DocNum::new(&self.doc_num).map_err(QrSyncError::Ledger)?,
            doc_type: DocType::new(&self.doc_type),
            cuin: self.cuin.clone(),
            cusn: self.cusn.clone(),
            fiscal_seal: self.fiscal_seal.clone(),
            qr_code_path: self.qr_code_path.clone(),
            timestamp: self.timestamp,
        })
    }
}
