//! SQLite completion ledger
//!
//! Stores `CompletedDocument` rows in the `CompletedDocuments` table, one row
//! per document number, timestamps as RFC 3339 UTC text.

use crate::adapters::database::traits::LedgerStorage;
use crate::adapters::sqlite::client::SqliteDatabase;
use crate::domain::{CompletedDocument, DocNum, DocType, QrSyncError, Result};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

const SCHEMA_SQL: &str = include_str!("../../../migrations/sqlite_ledger.sql");

const SELECT_COLUMNS: &str =
    "SELECT DocNum, DocType, CUIN, CUSN, FiscalSeal, QRCodePath, Timestamp FROM CompletedDocuments";

/// Ledger backed by a local SQLite file
pub struct SqliteLedger {
    database: SqliteDatabase,
}

impl SqliteLedger {
    pub fn new(database: SqliteDatabase) -> Self {
        Self { database }
    }

    pub fn database(&self) -> &SqliteDatabase {
        &self.database
    }
}

fn ledger_error(action: &str, err: sqlx::Error) -> QrSyncError {
    QrSyncError::Ledger(format!("{action}: {err}"))
}

fn row_to_document(row: &SqliteRow) -> Result<CompletedDocument> {
    let doc_num: String = row
        .try_get("DocNum")
        .map_err(|e| ledger_error("Failed to read DocNum", e))?;
    let timestamp: String = row
        .try_get("Timestamp")
        .map_err(|e| ledger_error("Failed to read Timestamp", e))?;

    let timestamp = DateTime::parse_from_rfc3339(&timestamp)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| {
            QrSyncError::Ledger(format!(
                "Invalid timestamp '{}' for document {}: {}",
                timestamp, doc_num, e
            ))
        })?;

    Ok(CompletedDocument {
        doc_num: DocNum::new(doc_num).map_err(QrSyncError::Ledger)?,
        doc_type: DocType::new(
            row.try_get::<String, _>("DocType")
                .map_err(|e| ledger_error("Failed to read DocType", e))?,
        ),
        cuin: row
            .try_get("CUIN")
            .map_err(|e| ledger_error("Failed to read CUIN", e))?,
        cusn: row
            .try_get("CUSN")
            .map_err(|e| ledger_error("Failed to read CUSN", e))?,
        fiscal_seal: row
            .try_get("FiscalSeal")
            .map_err(|e| ledger_error("Failed to read FiscalSeal", e))?,
        qr_code_path: row
            .try_get("QRCodePath")
            .map_err(|e| ledger_error("Failed to read QRCodePath", e))?,
        timestamp,
    })
}

#[async_trait]
impl LedgerStorage for SqliteLedger {
    async fn ensure_schema(&self) -> Result<()> {
        sqlx::raw_sql(SCHEMA_SQL)
            .execute(self.database.pool())
            .await
            .map_err(|e| ledger_error("Failed to create ledger schema", e))?;

        tracing::debug!(path = %self.database.path().display(), "SQLite ledger schema ready");
        Ok(())
    }

    async fn upsert(&self, document: &CompletedDocument) -> Result<bool> {
        let query = r#"
            INSERT INTO CompletedDocuments
                (DocNum, DocType, CUIN, CUSN, FiscalSeal, QRCodePath, Timestamp)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT (DocNum) DO UPDATE SET
                DocType = excluded.DocType,
                CUIN = excluded.CUIN,
                CUSN = excluded.CUSN,
                FiscalSeal = excluded.FiscalSeal,
                QRCodePath = excluded.QRCodePath,
                Timestamp = excluded.Timestamp
        "#;

        let result = sqlx::query(query)
            .bind(document.doc_num.as_str())
            .bind(document.doc_type.as_str())
            .bind(&document.cuin)
            .bind(&document.cusn)
            .bind(&document.fiscal_seal)
            .bind(document.qr_code_path.as_deref())
            .bind(
                document
                    .timestamp
                    .to_rfc3339_opts(SecondsFormat::Micros, true),
            )
            .execute(self.database.pool())
            .await
            .map_err(|e| {
                ledger_error(
                    &format!("Failed to upsert completed document {}", document.doc_num),
                    e,
                )
            })?;

        tracing::debug!(doc_num = %document.doc_num, "Upserted completed document");
        Ok(result.rows_affected() > 0)
    }

    async fn get(&self, doc_num: &DocNum) -> Result<Option<CompletedDocument>> {
        let query = format!("{SELECT_COLUMNS} WHERE DocNum = ?");
        let row = sqlx::query(&query)
            .bind(doc_num.as_str())
            .fetch_optional(self.database.pool())
            .await
            .map_err(|e| ledger_error(&format!("Failed to get completed document {doc_num}"), e))?;

        row.as_ref().map(row_to_document).transpose()
    }

    async fn exists(&self, doc_num: &DocNum) -> Result<bool> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM CompletedDocuments WHERE DocNum = ?")
                .bind(doc_num.as_str())
                .fetch_one(self.database.pool())
                .await
                .map_err(|e| {
                    ledger_error(&format!("Failed to check document {doc_num}"), e)
                })?;
        Ok(count > 0)
    }

    async fn list_all(&self) -> Result<Vec<CompletedDocument>> {
        let query = format!("{SELECT_COLUMNS} ORDER BY Timestamp DESC");
        let rows = sqlx::query(&query)
            .fetch_all(self.database.pool())
            .await
            .map_err(|e| ledger_error("Failed to list completed documents", e))?;

        rows.iter().map(row_to_document).collect()
    }

    fn backend_name(&self) -> &'static str {
        "sqlite"
    }
}
