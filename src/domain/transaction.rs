//! Fiscal transaction record
//!
//! A read-only view of one row of the fiscal transaction source.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One fiscal transaction as stored by the fiscal device software
///
/// Records are immutable once read within a run. Only `ts_num`,
/// `control_code`, `serial_number` and `qr_code` take part in a sync; the
/// remaining fields are carried for diagnostics and the status command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub id: i64,
    pub date: Option<NaiveDateTime>,
    pub buyer_pin: Option<String>,
    pub tr_type: i64,

    /// Document number, unique within the source
    pub ts_num: String,

    /// Fiscal device number
    pub mw_num: Option<String>,
    pub total_rounding: Decimal,
    pub total_amount: Decimal,
    pub vat_amount_a: Decimal,
    pub vat_amount_b: Decimal,
    pub vat_amount_c: Decimal,
    pub vat_amount_d: Decimal,
    pub vat_amount_e: Decimal,

    /// Control code, copied to the ledger as `CUIN`
    pub control_code: Option<String>,
    pub send_date: Option<NaiveDateTime>,
    pub relevant_mw_num: Option<String>,
    pub type_note: Option<String>,

    /// Serial number, copied to the ledger as `CUSN`
    pub serial_number: Option<String>,

    /// Raw payload to encode into the QR image
    pub qr_code: Option<String>,
}

impl TransactionRecord {
    /// Creates a record with the fields the sync pipeline needs
    ///
    /// Monetary fields are zero and diagnostic fields are empty.
    pub fn new(id: i64, ts_num: impl Into<String>) -> Self {
        Self {
            id,
            date: None,
            buyer_pin: None,
            tr_type: 0,
            ts_num: ts_num.into(),
            mw_num: None,
            total_rounding: Decimal::ZERO,
            total_amount: Decimal::ZERO,
            vat_amount_a: Decimal::ZERO,
            vat_amount_b: Decimal::ZERO,
            vat_amount_c: Decimal::ZERO,
            vat_amount_d: Decimal::ZERO,
            vat_amount_e: Decimal::ZERO,
            control_code: None,
            send_date: None,
            relevant_mw_num: None,
            type_note: None,
            serial_number: None,
            qr_code: None,
        }
    }

    pub fn with_qr_code(mut self, qr_code: impl Into<String>) -> Self {
        self.qr_code = Some(qr_code.into());
        self
    }

    pub fn with_control_code(mut self, control_code: impl Into<String>) -> Self {
        self.control_code = Some(control_code.into());
        self
    }

    pub fn with_serial_number(mut self, serial_number: impl Into<String>) -> Self {
        self.serial_number = Some(serial_number.into());
        self
    }

    /// Returns the QR payload if present and non-empty
    pub fn payload(&self) -> Option<&str> {
        self.qr_code.as_deref().filter(|p| !p.is_empty())
    }

    /// Sum of the five VAT category amounts
    pub fn total_vat(&self) -> Decimal {
        self.vat_amount_a
            + self.vat_amount_b
            + self.vat_amount_c
            + self.vat_amount_d
            + self.vat_amount_e
    }
}
