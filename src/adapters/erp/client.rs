//! HTTP client for the ERP document endpoint
//!
//! Speaks the endpoint's JSON dialect over basic auth. Every request carries the
//! `sap-client` query parameter.

use super::models::{
    ConnectionTestResult, DeletePayload, SyncPayload, SyncResponse, SyncResult,
};
use super::traits::DocumentSync;
use crate::config::ErpConfig;
use crate::domain::{DocNum, ErpError, QrSyncError, Result, TransactionRecord};
use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use reqwest::header::{ACCEPT, AUTHORIZATION, CACHE_CONTROL, CONNECTION};
use reqwest::{Client, ClientBuilder, Response, StatusCode};
use secrecy::ExposeSecret;
use std::time::Duration;
use url::Url;

/// Client for the ERP document endpoint
pub struct ErpSyncClient {
    client: Client,
    documents_url: Url,
    config: ErpConfig,
}

impl ErpSyncClient {
    /// Create a client from the `[erp]` configuration section
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint URL is malformed or the HTTP client
    /// cannot be constructed.
    pub fn new(config: ErpConfig) -> Result<Self> {
        let documents_url = build_documents_url(&config)?;

        let mut client_builder = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(config.timeout_seconds));

        if config.insecure_skip_verify {
            tracing::warn!(
                base_url = %config.base_url,
                "TLS certificate verification is DISABLED for the ERP endpoint"
            );
            client_builder = client_builder.danger_accept_invalid_certs(true);
        }

        let client = client_builder.build().map_err(|e| {
            QrSyncError::Erp(ErpError::InvalidRequest(format!(
                "Failed to build HTTP client: {e}"
            )))
        })?;

        Ok(Self {
            client,
            documents_url,
            config,
        })
    }

    /// Endpoint URL including the `sap-client` parameter
    pub fn documents_url(&self) -> &Url {
        &self.documents_url
    }

    fn auth_header_value(&self) -> String {
        let credentials = format!(
            "{}:{}",
            self.config.username,
            self.config.password.expose_secret().as_ref()
        );
        let encoded = general_purpose::STANDARD.encode(credentials.as_bytes());
        format!("Basic {encoded}")
    }

    /// True when the response carries the configured server header
    fn has_server_header(&self, response: &Response) -> bool {
        response
            .headers()
            .contains_key(self.config.server_header.as_str())
    }

    /// Single update attempt
    async fn send_update(&self, payload: &SyncPayload) -> SyncResult<SyncResponse> {
        tracing::debug!(doc_num = %payload.vbeln, url = %self.documents_url, "Sending document update");

        let resp = self
            .client
            .post(self.documents_url.clone())
            .header(AUTHORIZATION, self.auth_header_value())
            .json(payload)
            .send()
            .await
            .map_err(|e| map_transport_error(e, self.config.timeout_seconds))?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| {
            ErpError::InvalidResponse(format!("Failed to read response body: {e}"))
        })?;

        if !status.is_success() {
            return Err(map_status_error(status, &payload.vbeln, &body));
        }

        let response = SyncResponse::parse(&body)?;
        if !response.is_success() {
            return Err(ErpError::Rejected {
                doc_num: payload.vbeln.clone(),
                response_type: response.type_str().to_string(),
                message: response.message_str().to_string(),
            });
        }

        Ok(response)
    }

    /// Normalized `fromdate`/`todate` probe bounds
    fn probe_url(&self) -> Url {
        let mut url = self.documents_url.clone();
        url.query_pairs_mut()
            .append_pair("fromdate", &format_probe_date(&self.config.from_date))
            .append_pair("todate", &format_probe_date(&self.config.to_date));
        url
    }
}

#[async_trait]
impl DocumentSync for ErpSyncClient {
    async fn update_document(
        &self,
        record: &TransactionRecord,
        artifact_path: &str,
    ) -> SyncResult<SyncResponse> {
        let payload = SyncPayload::from_record(record, artifact_path);

        match self.send_update(&payload).await {
            Err(ErpError::Conflict(doc_num)) => {
                tracing::warn!(doc_num = %doc_num, "Document already exists, deleting before retry");

                let key = DocNum::new(doc_num.clone()).map_err(ErpError::InvalidRequest)?;
                if let Err(e) = self.delete_document(&key).await {
                    return Err(ErpError::ConflictUnresolved {
                        doc_num,
                        reason: format!("delete failed: {e}"),
                    });
                }

                crate::log_retry_attempt!(2, 2, "Conflict resolved by delete");

                match self.send_update(&payload).await {
                    Err(ErpError::Conflict(_)) => Err(ErpError::ConflictUnresolved {
                        doc_num,
                        reason: "conflict persisted after delete".to_string(),
                    }),
                    other => other,
                }
            }
            other => other,
        }
    }

    async fn delete_document(&self, doc_num: &DocNum) -> SyncResult<()> {
        tracing::info!(doc_num = %doc_num, "Deleting document from ERP");

        let payload = DeletePayload {
            vbeln: doc_num.as_str().to_string(),
        };

        let resp = self
            .client
            .delete(self.documents_url.clone())
            .header(AUTHORIZATION, self.auth_header_value())
            .json(&payload)
            .send()
            .await
            .map_err(|e| map_transport_error(e, self.config.timeout_seconds))?;

        let status = resp.status();
        let has_server_header = self.has_server_header(&resp);
        let body = resp.text().await.map_err(|e| {
            ErpError::InvalidResponse(format!("Failed to read response body: {e}"))
        })?;

        if !status.is_success() {
            return Err(map_status_error(status, doc_num.as_str(), &body));
        }

        if body.trim().is_empty() {
            if has_server_header {
                return Ok(());
            }
            return Err(ErpError::InvalidResponse(format!(
                "Empty delete response without '{}' header",
                self.config.server_header
            )));
        }

        let response = SyncResponse::parse(&body)?;
        if response.is_success() {
            Ok(())
        } else {
            Err(ErpError::Rejected {
                doc_num: doc_num.as_str().to_string(),
                response_type: response.type_str().to_string(),
                message: response.message_str().to_string(),
            })
        }
    }

    async fn test_connection(&self) -> ConnectionTestResult {
        if self.config.base_url.trim().is_empty() || self.config.username.trim().is_empty() {
            return ConnectionTestResult::failed(
                "Invalid settings - BaseUrl and Username are required",
                String::new(),
                None,
            );
        }

        let url = self.probe_url();
        tracing::info!(url = %url, "Testing ERP connection");

        let resp = match self
            .client
            .get(url)
            .header(AUTHORIZATION, self.auth_header_value())
            .header(ACCEPT, "*/*")
            .header(CONNECTION, "keep-alive")
            .header(CACHE_CONTROL, "no-cache")
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(e) if e.is_timeout() => {
                return ConnectionTestResult::failed(
                    format!(
                        "Connection timeout! SAP server did not respond within {} seconds",
                        self.config.timeout_seconds
                    ),
                    String::new(),
                    None,
                );
            }
            Err(e) => {
                return ConnectionTestResult::failed(
                    format!("Network error connecting to SAP: {e}"),
                    String::new(),
                    None,
                );
            }
        };

        let status = resp.status();
        let has_server_header = self.has_server_header(&resp);
        let body = resp.text().await.unwrap_or_default();

        if status.is_success() {
            if body.trim().is_empty() {
                let message = if has_server_header {
                    "Connection successful - SAP server verified (empty response with sap-server header)"
                } else {
                    "Connection successful - SAP server reachable (empty response)"
                };
                return ConnectionTestResult::connected(message, body, status.as_u16());
            }

            let trimmed = body.trim_start();
            if trimmed.starts_with('[') || trimmed.starts_with('{') {
                match serde_json::from_str::<serde_json::Value>(trimmed) {
                    Ok(_) => tracing::debug!("Probe response is valid JSON"),
                    Err(e) => tracing::warn!(error = %e, "Probe response looks like JSON but does not parse"),
                }
            }

            return ConnectionTestResult::connected(
                format!("Connection successful! server responded: {}", status.as_u16()),
                body,
                status.as_u16(),
            );
        }

        let message = match status {
            StatusCode::UNAUTHORIZED => {
                "Authentication failed! Please verify SAP username and password credentials"
                    .to_string()
            }
            StatusCode::NOT_FOUND => {
                "SAP endpoint not found! Please verify Base URL and Documents Endpoint configuration"
                    .to_string()
            }
            other => format!("SAP connection failed: {}", other.as_u16()),
        };

        ConnectionTestResult::failed(message, body, Some(status.as_u16()))
    }
}

/// `{base_url}{documents_endpoint}?sap-client={client}`
fn build_documents_url(config: &ErpConfig) -> Result<Url> {
    let base = config.base_url.trim_end_matches('/');
    let endpoint = config.documents_endpoint.trim();
    let joined = if endpoint.starts_with('/') {
        format!("{base}{endpoint}")
    } else {
        format!("{base}/{endpoint}")
    };

    let mut url = Url::parse(&joined).map_err(|e| {
        QrSyncError::Erp(ErpError::InvalidRequest(format!(
            "Invalid ERP endpoint URL '{joined}': {e}"
        )))
    })?;
    url.query_pairs_mut().append_pair("sap-client", &config.client);

    Ok(url)
}

fn map_transport_error(e: reqwest::Error, timeout_seconds: u64) -> ErpError {
    if e.is_timeout() {
        ErpError::Timeout(format!("no response within {timeout_seconds} seconds"))
    } else {
        ErpError::ConnectionFailed(e.to_string())
    }
}

fn map_status_error(status: StatusCode, doc_num: &str, body: &str) -> ErpError {
    match status {
        StatusCode::CONFLICT => ErpError::Conflict(doc_num.to_string()),
        StatusCode::UNAUTHORIZED => ErpError::AuthenticationFailed(format!(
            "ERP rejected credentials for document {doc_num}"
        )),
        other => ErpError::UnexpectedStatus {
            status: other.as_u16(),
            message: body.chars().take(200).collect(),
        },
    }
}

/// Normalizes a probe date to `yyyyMMdd`
///
/// Values already in that shape pass through. Anything unparseable is sent
/// unchanged.
pub fn format_probe_date(raw: &str) -> String {
    let value = raw.trim();
    if value.is_empty() {
        return String::new();
    }

    if value.len() == 8 && NaiveDate::parse_from_str(value, "%Y%m%d").is_ok() {
        return value.to_string();
    }

    for format in ["%Y-%m-%d", "%Y/%m/%d", "%d.%m.%Y", "%d/%m/%Y", "%m/%d/%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(value, format) {
            return date.format("%Y%m%d").to_string();
        }
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return dt.format("%Y%m%d").to_string();
    }

    if let Ok(dt) = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S") {
        return dt.format("%Y%m%d").to_string();
    }

    tracing::warn!(value = %value, "Could not normalize probe date, sending as-is");
    value.to_string()
}
