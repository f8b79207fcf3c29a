//! Wire models for the ERP document endpoint

use crate::domain::{ErpError, TransactionRecord};
use serde::{Deserialize, Serialize};

/// Result alias for calls against the ERP endpoint
pub type SyncResult<T> = std::result::Result<T, ErpError>;

/// Body of the document update `POST`
///
/// Field names are the endpoint's, lower-case and unprefixed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncPayload {
    /// Document number
    pub vbeln: String,
    /// Serial number
    pub cusn: String,
    /// Control code
    pub cuin: String,
    /// Always empty on regeneration
    pub fiscalerror: String,
    /// The encoded QR payload
    pub fiscalseal: String,
    /// Always `"1"` on regeneration
    pub status: String,
    /// Path of the generated QR image
    pub qrcodepath: String,
}

impl SyncPayload {
    pub fn from_record(record: &TransactionRecord, artifact_path: &str) -> Self {
        Self {
            vbeln: record.ts_num.clone(),
            cusn: record.serial_number.clone().unwrap_or_default(),
            cuin: record.control_code.clone().unwrap_or_default(),
            fiscalerror: String::new(),
            fiscalseal: record.qr_code.clone().unwrap_or_default(),
            status: "1".to_string(),
            qrcodepath: artifact_path.to_string(),
        }
    }
}

/// Body of the document `DELETE`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletePayload {
    pub vbeln: String,
}

/// Response envelope returned by the endpoint
///
/// Every field is optional when parsing. `NUMBER`, `LOG_MSG_NO` and `ROW`
/// arrive as numbers or strings depending on the server release, so they are
/// kept as raw JSON values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SyncResponse {
    #[serde(rename = "TYPE", default)]
    pub response_type: Option<String>,

    #[serde(rename = "ID", default)]
    pub id: Option<String>,

    #[serde(rename = "NUMBER", default)]
    pub number: Option<serde_json::Value>,

    #[serde(rename = "MESSAGE", default)]
    pub message: Option<String>,

    #[serde(rename = "LOG_NO", default)]
    pub log_no: Option<String>,

    #[serde(rename = "LOG_MSG_NO", default)]
    pub log_msg_no: Option<serde_json::Value>,

    #[serde(rename = "MESSAGE_V1", default)]
    pub message_v1: Option<String>,

    #[serde(rename = "MESSAGE_V2", default)]
    pub message_v2: Option<String>,

    #[serde(rename = "MESSAGE_V3", default)]
    pub message_v3: Option<String>,

    #[serde(rename = "MESSAGE_V4", default)]
    pub message_v4: Option<String>,

    #[serde(rename = "PARAMETER", default)]
    pub parameter: Option<String>,

    #[serde(rename = "ROW", default)]
    pub row: Option<serde_json::Value>,

    #[serde(rename = "FIELD", default)]
    pub field: Option<String>,

    #[serde(rename = "SYSTEM", default)]
    pub system: Option<String>,
}

impl SyncResponse {
    /// Parses a response body
    ///
    /// A JSON array is accepted and its first element used.
    pub fn parse(body: &str) -> SyncResult<Self> {
        let value: serde_json::Value = serde_json::from_str(body)
            .map_err(|e| ErpError::InvalidResponse(format!("Response is not JSON: {}", e)))?;

        let value = match value {
            serde_json::Value::Array(items) => items.into_iter().next().ok_or_else(|| {
                ErpError::InvalidResponse("Response array is empty".to_string())
            })?,
            other => other,
        };

        serde_json::from_value(value)
            .map_err(|e| ErpError::InvalidResponse(format!("Unexpected response shape: {}", e)))
    }

    /// `TYPE == "S"`
    pub fn is_success(&self) -> bool {
        self.response_type.as_deref() == Some("S")
    }

    pub fn type_str(&self) -> &str {
        self.response_type.as_deref().unwrap_or("")
    }

    pub fn message_str(&self) -> &str {
        self.message.as_deref().unwrap_or("")
    }
}

/// Outcome of the connection probe
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionTestResult {
    pub connected: bool,
    pub message: String,
    /// Response body as received, empty on transport failures
    pub raw_body: String,
    /// HTTP status, when a response was received
    pub status: Option<u16>,
}

impl ConnectionTestResult {
    pub fn connected(message: impl Into<String>, raw_body: String, status: u16) -> Self {
        Self {
            connected: true,
            message: message.into(),
            raw_body,
            status: Some(status),
        }
    }

    pub fn failed(message: impl Into<String>, raw_body: String, status: Option<u16>) -> Self {
        Self {
            connected: false,
            message: message.into(),
            raw_body,
            status,
        }
    }
}
