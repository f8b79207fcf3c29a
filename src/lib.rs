// QRSync - Fiscal QR Regeneration and ERP Sync Tool
// Copyright (c) 2025 QRSync Contributors
// Licensed under the MIT License

//! # QRSync - Fiscal QR Regeneration and ERP Sync
//!
//! QRSync regenerates the fiscal QR codes of stored transaction records and
//! pushes the results into an ERP document endpoint.
//!
//! ## Overview
//!
//! This library provides the core functionality for:
//! - **Reading** fiscal transactions from the device software's SQLite database
//! - **Encoding** each transaction's QR payload as a PNG artifact
//! - **Recording** completed documents in an idempotency ledger (SQLite or PostgreSQL)
//! - **Syncing** documents to the ERP endpoint, resolving 409 conflicts by delete and retry
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Business logic (QR codec, completion ledger, batch processing)
//! - [`adapters`] - External integrations (SQLite, PostgreSQL, ERP endpoint)
//! - [`domain`] - Core domain types and errors
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use qrsync::adapters::erp::{DocumentSync, ErpSyncClient};
//! use qrsync::config::load_config;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("qrsync.toml")?;
//!
//!     let client = ErpSyncClient::new(config.erp.clone())?;
//!     let probe = client.test_connection().await;
//!
//!     println!("{}", probe.message);
//!     Ok(())
//! }
//! ```
//!
//! ## Progress Events
//!
//! A batch run reports progress over a bounded channel:
//!
//! ```rust,no_run
//! use qrsync::core::processing::{EventSink, ProcessingEvent};
//!
//! # async fn example() {
//! let (sink, mut events) = EventSink::channel(64);
//! tokio::spawn(async move {
//!     while let Some(event) = events.recv().await {
//!         match event {
//!             ProcessingEvent::Progress(p) => println!("{}/{} {}", p.processed, p.total, p.status),
//!             ProcessingEvent::Completed(r) => println!("done, cancelled: {}", r.was_cancelled),
//!         }
//!     }
//! });
//! # drop(sink);
//! # }
//! ```
//!
//! ## Error Handling
//!
//! All library operations return [`domain::Result`], whose error type
//! [`domain::QrSyncError`] classifies itself with [`domain::ErrorKind`].

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
