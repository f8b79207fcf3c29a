//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for QRSync using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// QRSync - Fiscal QR Regeneration and ERP Sync Tool
#[derive(Parser, Debug)]
#[command(name = "qrsync")]
#[command(version, about, long_about = None)]
#[command(author = "QRSync Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "qrsync.toml", env = "QRSYNC_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "QRSYNC_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Regenerate QR codes and sync documents to the ERP endpoint
    Sync(commands::sync::SyncArgs),

    /// Check connectivity and credentials against the ERP endpoint
    TestConnection(commands::test_connection::TestConnectionArgs),

    /// Delete a single document from the ERP endpoint
    Delete(commands::delete::DeleteArgs),

    /// Show transaction count and completed documents
    Status(commands::status::StatusArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}
