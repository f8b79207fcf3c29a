//! Sync command implementation
//!
//! This module implements the `sync` command: regenerate QR artifacts for
//! the selected transactions and push them to the ERP endpoint.

use crate::adapters::database::{create_ledger_storage, create_transaction_source};
use crate::adapters::erp::ErpSyncClient;
use crate::config::load_config;
use crate::core::ledger::CompletionLedger;
use crate::core::processing::{
    BatchProcessor, DuplicateHandling, EventSink, ProcessingEvent, ProcessingOptions,
    ProcessorConfig, RecordSelection, RecordStatus,
};
use crate::core::qrcode::QrCodeCodec;
use clap::Args;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::watch;

/// Arguments for the sync command
#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Skip confirmation prompt
    #[arg(short, long)]
    pub yes: bool,

    /// Only process these transaction ids (comma-separated)
    #[arg(long)]
    pub ids: Option<String>,

    /// Override duplicate handling (skip, overwrite or update)
    #[arg(long, value_name = "POLICY")]
    pub duplicates: Option<String>,
}

impl SyncArgs {
    /// Execute the sync command
    pub async fn execute(
        &self,
        config_path: &str,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        tracing::info!("Starting sync command");

        let mut config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Failed to load configuration: {e}");
                return Ok(2); // Configuration error exit code
            }
        };

        if let Some(policy) = &self.duplicates {
            tracing::info!(policy = %policy, "Overriding duplicate handling from CLI");
            config.processing.duplicate_handling = policy.trim().to_lowercase();
        }

        if let Err(e) = config.validate() {
            tracing::error!(error = %e, "Configuration validation failed");
            eprintln!("Configuration validation failed: {e}");
            return Ok(2);
        }

        let duplicate_handling = DuplicateHandling::from_str(&config.processing.duplicate_handling)?;
        let selection = match &self.ids {
            Some(raw) => match parse_ids(raw) {
                Ok(ids) => RecordSelection::Ids(ids),
                Err(e) => {
                    eprintln!("{e}");
                    return Ok(2);
                }
            },
            None => RecordSelection::All,
        };
        let options = ProcessingOptions::new(duplicate_handling, selection);

        if !self.yes {
            println!("Sync Configuration:");
            println!("  ERP Endpoint: {}{}", config.erp.base_url, config.erp.documents_endpoint);
            println!("  ERP Client: {}", config.erp.client);
            println!("  Transactions: {}", config.transactions.database_path);
            println!("  Artifacts: {}", config.artifacts.output_dir);
            println!("  Duplicate Handling: {}", options.duplicate_handling);
            println!(
                "  Records: {}",
                match &options.selection {
                    RecordSelection::All => "All".to_string(),
                    RecordSelection::Ids(ids) => format!("{ids:?}"),
                }
            );
            println!();
            print!("Proceed with sync? [y/N]: ");
            use std::io::{self, Write};
            io::stdout().flush()?;

            let mut input = String::new();
            io::stdin().read_line(&mut input)?;

            if !input.trim().eq_ignore_ascii_case("y") {
                println!("Sync cancelled.");
                return Ok(0);
            }
        }

        let source = match create_transaction_source(&config).await {
            Ok(s) => s,
            Err(e) => {
                tracing::error!(error = %e, "Failed to open transaction source");
                eprintln!("Failed to open transaction database: {e}");
                return Ok(4); // Connection error exit code
            }
        };

        let ledger_storage = match create_ledger_storage(&config).await {
            Ok(s) => s,
            Err(e) => {
                tracing::error!(error = %e, "Failed to open completion ledger");
                eprintln!("Failed to open completion ledger: {e}");
                return Ok(4);
            }
        };

        let sync_client = match ErpSyncClient::new(config.erp.clone()) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Failed to create ERP client: {e}");
                return Ok(2);
            }
        };

        let processor = BatchProcessor::new(
            source,
            CompletionLedger::new(ledger_storage),
            QrCodeCodec::from_config(&config.artifacts),
            Arc::new(sync_client),
            ProcessorConfig::from_config(&config.processing, &config.artifacts.output_dir),
        );

        let (events, mut receiver) = EventSink::channel(config.processing.event_channel_capacity);
        let printer = tokio::spawn(async move {
            while let Some(event) = receiver.recv().await {
                match event {
                    ProcessingEvent::Progress(progress) => {
                        let marker = match progress.status {
                            RecordStatus::Success => "✅",
                            RecordStatus::Failed => "❌",
                        };
                        println!(
                            "  {marker} [{}/{}] {} ({:.0}%)",
                            progress.processed,
                            progress.total,
                            progress.current_doc_num,
                            progress.percent()
                        );
                    }
                    ProcessingEvent::Completed(_) => break,
                }
            }
        });

        println!("🚀 Starting sync...");
        println!();

        let run = processor
            .run_batch(&options, shutdown_signal, &events)
            .await;
        drop(events);
        if let Err(e) = printer.await {
            tracing::warn!(error = %e, "Progress printer task failed");
        }

        let result = match run {
            Ok(r) => r,
            Err(e) => {
                tracing::error!(error = %e, "Sync failed");
                eprintln!("Sync failed: {e}");
                return Ok(5); // Fatal error exit code
            }
        };

        println!();
        println!("📊 Sync Summary:");
        println!("  Total Records: {}", result.total);
        println!("  Processed: {}", result.processed);
        println!("  Successful: {}", result.successful);
        println!("  Failed: {}", result.failed);
        println!(
            "  Duration: {:.2}s",
            result.duration().num_milliseconds() as f64 / 1000.0
        );
        println!("  Success Rate: {:.2}%", result.success_rate());
        println!();

        if !result.errors.is_empty() {
            println!("⚠️  Errors encountered:");
            for error in result.errors.iter().take(20) {
                println!("  - [{}] {}", error.kind, error.message);
            }
            if result.errors.len() > 20 {
                println!("  ... and {} more errors", result.errors.len() - 20);
            }
            println!();
        }

        let exit_code = if result.was_cancelled {
            println!("⚠️  Sync interrupted. Completed documents are recorded in the ledger.");
            println!("   Run again with --duplicates skip to continue where it stopped.");
            130 // SIGINT exit code
        } else if result.failed > 0 {
            println!("⚠️  Sync completed with failures");
            1 // Partial success
        } else {
            println!("✅ Sync completed successfully!");
            0
        };

        Ok(exit_code)
    }
}

/// Parse a comma-separated id list
fn parse_ids(raw: &str) -> Result<Vec<i64>, String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<i64>()
                .map_err(|_| format!("Invalid transaction id '{s}' in --ids"))
        })
        .collect()
}
