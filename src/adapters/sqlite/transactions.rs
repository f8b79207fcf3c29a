//! SQLite fiscal transaction source
//!
//! Reads the `fb_transaction` table written by the fiscal device software.
//! Column affinities in that table are loose, so every column is cast in SQL
//! and parsed here.

use crate::adapters::database::traits::TransactionSource;
use crate::adapters::sqlite::client::SqliteDatabase;
use crate::domain::{QrSyncError, Result, TransactionRecord};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use std::str::FromStr;

const SELECT_COLUMNS: &str = r#"
    SELECT
        CAST(Id AS INTEGER)            AS Id,
        CAST(Date AS TEXT)             AS Date,
        CAST(BuyerPIN AS TEXT)         AS BuyerPIN,
        CAST(TrType AS INTEGER)        AS TrType,
        CAST(TsNum AS TEXT)            AS TsNum,
        CAST(MwNum AS TEXT)            AS MwNum,
        CAST(TotalRounding AS TEXT)    AS TotalRounding,
        CAST(TotalAmount AS TEXT)      AS TotalAmount,
        CAST(VatAmountA AS TEXT)       AS VatAmountA,
        CAST(VatAmountB AS TEXT)       AS VatAmountB,
        CAST(VatAmountC AS TEXT)       AS VatAmountC,
        CAST(VatAmountD AS TEXT)       AS VatAmountD,
        CAST(VatAmountE AS TEXT)       AS VatAmountE,
        CAST(ControlCode AS TEXT)      AS ControlCode,
        CAST(SendDate AS TEXT)         AS SendDate,
        CAST(RelevantMwNum AS TEXT)    AS RelevantMwNum,
        CAST(TypeNote AS TEXT)         AS TypeNote,
        CAST(SerialNumber AS TEXT)     AS SerialNumber,
        CAST(QrCode AS TEXT)           AS QrCode
    FROM fb_transaction
"#;

/// Read-only access to `fb_transaction`
pub struct SqliteTransactionSource {
    database: SqliteDatabase,
}

impl SqliteTransactionSource {
    pub fn new(database: SqliteDatabase) -> Self {
        Self { database }
    }
}

fn source_error(action: &str, err: sqlx::Error) -> QrSyncError {
    QrSyncError::Source(format!("{action}: {err}"))
}

fn text(row: &SqliteRow, column: &str) -> Result<Option<String>> {
    row.try_get(column)
        .map_err(|e| source_error(&format!("Failed to read {column}"), e))
}

fn decimal(row: &SqliteRow, column: &str) -> Result<Decimal> {
    let Some(raw) = text(row, column)? else {
        return Ok(Decimal::ZERO);
    };
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(Decimal::ZERO);
    }
    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .map_err(|e| QrSyncError::Source(format!("Invalid amount '{raw}' in {column}: {e}")))
}

/// Parses the date formats the fiscal software is known to write
fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    const FORMATS: [&str; 4] = [
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
        "%d/%m/%Y %H:%M:%S",
    ];
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

fn timestamp(row: &SqliteRow, column: &str, id: i64) -> Result<Option<NaiveDateTime>> {
    Ok(text(row, column)?.and_then(|raw| {
        let parsed = parse_timestamp(&raw);
        if parsed.is_none() && !raw.trim().is_empty() {
            tracing::warn!(record_id = id, column, value = %raw, "Unrecognized date format");
        }
        parsed
    }))
}

fn row_to_record(row: &SqliteRow) -> Result<TransactionRecord> {
    let id: i64 = row
        .try_get("Id")
        .map_err(|e| source_error("Failed to read Id", e))?;
    let tr_type: Option<i64> = row
        .try_get("TrType")
        .map_err(|e| source_error("Failed to read TrType", e))?;

    Ok(TransactionRecord {
        id,
        date: timestamp(row, "Date", id)?,
        buyer_pin: text(row, "BuyerPIN")?,
        tr_type: tr_type.unwrap_or_default(),
        ts_num: text(row, "TsNum")?.unwrap_or_default(),
        mw_num: text(row, "MwNum")?,
        total_rounding: decimal(row, "TotalRounding")?,
        total_amount: decimal(row, "TotalAmount")?,
        vat_amount_a: decimal(row, "VatAmountA")?,
        vat_amount_b: decimal(row, "VatAmountB")?,
        vat_amount_c: decimal(row, "VatAmountC")?,
        vat_amount_d: decimal(row, "VatAmountD")?,
        vat_amount_e: decimal(row, "VatAmountE")?,
        control_code: text(row, "ControlCode")?,
        send_date: timestamp(row, "SendDate", id)?,
        relevant_mw_num: text(row, "RelevantMwNum")?,
        type_note: text(row, "TypeNote")?,
        serial_number: text(row, "SerialNumber")?,
        qr_code: text(row, "QrCode")?,
    })
}

#[async_trait]
impl TransactionSource for SqliteTransactionSource {
    async fn get_all(&self) -> Result<Vec<TransactionRecord>> {
        let query = format!("{SELECT_COLUMNS} ORDER BY Id");
        let rows = sqlx::query(&query)
            .fetch_all(self.database.pool())
            .await
            .map_err(|e| source_error("Failed to retrieve transactions", e))?;

        tracing::debug!(count = rows.len(), "Loaded all transactions");
        rows.iter().map(row_to_record).collect()
    }

    async fn get_by_ids(&self, ids: &[i64]) -> Result<Vec<TransactionRecord>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = vec!["?"; ids.len()].join(", ");
        let query = format!("{SELECT_COLUMNS} WHERE Id IN ({placeholders}) ORDER BY Id");

        let mut q = sqlx::query(&query);
        for id in ids {
            q = q.bind(*id);
        }

        let rows = q
            .fetch_all(self.database.pool())
            .await
            .map_err(|e| source_error("Failed to retrieve transactions by ids", e))?;

        tracing::debug!(
            requested = ids.len(),
            found = rows.len(),
            "Loaded selected transactions"
        );
        rows.iter().map(row_to_record).collect()
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<TransactionRecord>> {
        let query = format!("{SELECT_COLUMNS} WHERE Id = ?");
        let row = sqlx::query(&query)
            .bind(id)
            .fetch_optional(self.database.pool())
            .await
            .map_err(|e| source_error(&format!("Failed to retrieve transaction {id}"), e))?;

        row.as_ref().map(row_to_record).transpose()
    }

    async fn count(&self) -> Result<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM fb_transaction")
            .fetch_one(self.database.pool())
            .await
            .map_err(|e| source_error("Failed to count transactions", e))?;
        Ok(count.max(0) as u64)
    }
}
