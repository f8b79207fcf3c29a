//! Core business logic for QRSync.
//!
//! # Modules
//!
//! - [`qrcode`] - QR artifact encoding
//! - [`ledger`] - completion ledger over a storage backend
//! - [`processing`] - batch orchestration, events and results
//!
//! # Sync Workflow
//!
//! For each transaction record in the working set:
//!
//! 1. **Check ledger**: under the skip policy, completed documents are counted as successful
//! 2. **Encode**: write the QR payload as a PNG artifact
//! 3. **Record**: upsert the completion ledger entry
//! 4. **Sync**: push the document to the ERP endpoint, resolving conflicts by delete and retry
//! 5. **Report**: emit a progress event
//!
//! # Example
//!
//! ```rust,no_run
//! use qrsync::adapters::database::{create_ledger_storage, create_transaction_source};
//! use qrsync::adapters::erp::ErpSyncClient;
//! use qrsync::config::load_config;
//! use qrsync::core::ledger::CompletionLedger;
//! use qrsync::core::processing::{BatchProcessor, EventSink, ProcessingOptions, ProcessorConfig};
//! use qrsync::core::qrcode::QrCodeCodec;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("qrsync.toml")?;
//!
//! let processor = BatchProcessor::new(
//!     create_transaction_source(&config).await?,
//!     CompletionLedger::new(create_ledger_storage(&config).await?),
//!     QrCodeCodec::from_config(&config.artifacts),
//!     Arc::new(ErpSyncClient::new(config.erp.clone())?),
//!     ProcessorConfig::from_config(&config.processing, &config.artifacts.output_dir),
//! );
//!
//! let (_shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
//! let options = ProcessingOptions::from_config(&config.processing)?;
//! let result = processor
//!     .run_batch(&options, shutdown_rx, &EventSink::disabled())
//!     .await?;
//!
//! println!("Successful: {}", result.successful);
//! println!("Failed: {}", result.failed);
//! # Ok(())
//! # }
//! ```

pub mod ledger;
pub mod processing;
pub mod qrcode;
