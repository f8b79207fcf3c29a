//! PostgreSQL adapter implementing the ledger trait

use crate::adapters::database::traits::LedgerStorage;
use crate::adapters::postgresql::client::PostgreSQLClient;
use crate::adapters::postgresql::models::PostgreSQLCompletedDocument;
use crate::domain::{CompletedDocument, DocNum, Result};
use async_trait::async_trait;
use std::sync::Arc;

const SELECT_COLUMNS: &str = r#"
    SELECT doc_num, doc_type, cuin, cusn, fiscal_seal, qr_code_path, "timestamp"
    FROM completed_documents
"#;

/// Completion ledger stored in PostgreSQL
pub struct PostgreSQLLedger {
    client: Arc<PostgreSQLClient>,
}

impl PostgreSQLLedger {
    pub fn new(client: PostgreSQLClient) -> Self {
        Self {
            client: Arc::new(client),
        }
    }

    pub fn client(&self) -> &Arc<PostgreSQLClient> {
        &self.client
    }
}

#[async_trait]
impl LedgerStorage for PostgreSQLLedger {
    async fn ensure_schema(&self) -> Result<()> {
        tracing::debug!(
            connection = %self.client.connection_string_safe(),
            "Bootstrapping PostgreSQL ledger schema"
        );
        self.client.ensure_schema().await
    }

    async fn upsert(&self, document: &CompletedDocument) -> Result<bool> {
        let row = PostgreSQLCompletedDocument::from_domain(document);

        let upsert_query = r#"
            INSERT INTO completed_documents (
                doc_num, doc_type, cuin, cusn, fiscal_seal, qr_code_path, "timestamp"
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (doc_num) DO UPDATE SET
                doc_type = EXCLUDED.doc_type,
                cuin = EXCLUDED.cuin,
                cusn = EXCLUDED.cusn,
                fiscal_seal = EXCLUDED.fiscal_seal,
                qr_code_path = EXCLUDED.qr_code_path,
                "timestamp" = EXCLUDED."timestamp"
        "#;

        let affected = self
            .client
            .execute(
                upsert_query,
                &[
                    &row.doc_num,
                    &row.doc_type,
                    &row.cuin,
                    &row.cusn,
                    &row.fiscal_seal,
                    &row.qr_code_path,
                    &row.timestamp,
                ],
            )
            .await?;

        tracing::debug!(doc_num = %document.doc_num, "Upserted completed document in PostgreSQL");
        Ok(affected > 0)
    }

    async fn get(&self, doc_num: &DocNum) -> Result<Option<CompletedDocument>> {
        let query = format!("{SELECT_COLUMNS} WHERE doc_num = $1");
        let rows = self.client.query(&query, &[&doc_num.as_str()]).await?;

        match rows.first() {
            Some(row) => Ok(Some(PostgreSQLCompletedDocument::from_row(row)?.to_domain()?)),
            None => Ok(None),
        }
    }

    async fn exists(&self, doc_num: &DocNum) -> Result<bool> {
        let rows = self
            .client
            .query(
                "SELECT 1 FROM completed_documents WHERE doc_num = $1",
                &[&doc_num.as_str()],
            )
            .await?;
        Ok(!rows.is_empty())
    }

    async fn list_all(&self) -> Result<Vec<CompletedDocument>> {
        let query = format!(r#"{SELECT_COLUMNS} ORDER BY "timestamp" DESC"#);
        let rows = self.client.query(&query, &[]).await?;

        rows.iter()
            .map(|row| PostgreSQLCompletedDocument::from_row(row)?.to_domain())
            .collect()
    }

    fn backend_name(&self) -> &'static str {
        "postgresql"
    }
}
