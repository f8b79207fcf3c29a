//! Status command implementation
//!
//! This module implements the `status` command for displaying the size of
//! the transaction source and the most recent ledger entries.

use crate::adapters::database::{create_ledger_storage, create_transaction_source};
use crate::config::load_config;
use crate::core::ledger::CompletionLedger;
use clap::Args;

/// Arguments for the status command
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Show only ledger entries whose document number contains this text
    #[arg(long)]
    pub doc_num: Option<String>,

    /// Maximum number of ledger entries to display
    #[arg(long, default_value_t = 20)]
    pub limit: usize,
}

impl StatusArgs {
    /// Execute the status command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!("Checking sync status");

        println!("📊 Sync Status");
        println!();

        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Failed to load configuration file");
                println!("   Error: {}", e);
                return Ok(2); // Configuration error exit code
            }
        };

        let source = match create_transaction_source(&config).await {
            Ok(s) => s,
            Err(e) => {
                println!("❌ Failed to open transaction database");
                println!("   Error: {}", e);
                return Ok(4); // Connection error exit code
            }
        };

        let ledger = match create_ledger_storage(&config).await {
            Ok(s) => CompletionLedger::new(s),
            Err(e) => {
                println!("❌ Failed to open completion ledger");
                println!("   Error: {}", e);
                return Ok(4);
            }
        };

        let transaction_count = match source.count().await {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Failed to count transactions");
                println!("   Error: {}", e);
                return Ok(5); // Fatal error exit code
            }
        };

        let documents = match ledger.list_all().await {
            Ok(d) => d,
            Err(e) => {
                println!("❌ Failed to read completion ledger");
                println!("   Error: {}", e);
                return Ok(5);
            }
        };

        println!("  Transactions: {}", transaction_count);
        println!(
            "  Completed Documents: {} ({} ledger)",
            documents.len(),
            ledger.backend_name()
        );
        println!();

        if documents.is_empty() {
            println!("No completed documents found.");
            println!("Run 'qrsync sync' to regenerate and sync QR codes.");
            return Ok(0);
        }

        let filtered: Vec<_> = documents
            .iter()
            .filter(|d| match &self.doc_num {
                Some(needle) => d.doc_num.as_str().contains(needle.as_str()),
                None => true,
            })
            .take(self.limit)
            .collect();

        if filtered.is_empty() {
            println!("No ledger entries match the specified filter.");
            return Ok(0);
        }

        println!("Most recent {} entr(ies):", filtered.len());
        println!();
        println!(
            "{:<20} {:<6} {:<22} {:<22} {:<20}",
            "Document", "Type", "CUIN", "CUSN", "Completed"
        );
        println!("{}", "-".repeat(94));

        for document in filtered {
            println!(
                "{:<20} {:<6} {:<22} {:<22} {:<20}",
                document.doc_num.as_str(),
                document.doc_type.as_str(),
                document.cuin,
                document.cusn,
                document.timestamp.format("%Y-%m-%d %H:%M:%S")
            );
        }

        println!();
        Ok(0)
    }
}
