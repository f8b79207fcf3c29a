//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the QRSync configuration file.

use crate::config::load_config;
use crate::config::schema::LedgerTarget;
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        let config = match load_config(config_path) {
            Ok(c) => {
                println!("✅ Configuration file loaded successfully");
                c
            }
            Err(e) => {
                println!("❌ Failed to load configuration file");
                println!("   Error: {e}");
                return Ok(2); // Configuration error exit code
            }
        };

        match config.validate() {
            Ok(_) => {
                println!("✅ Configuration is valid");
                println!();
                println!("Configuration Summary:");
                println!("  Environment: {:?}", config.environment);
                println!("  Log Level: {}", config.application.log_level);
                println!("  ERP Base URL: {}", config.erp.base_url);
                println!("  ERP Endpoint: {}", config.erp.documents_endpoint);
                println!("  ERP Client: {}", config.erp.client);
                println!("  ERP Timeout: {}s", config.erp.timeout_seconds);
                if config.erp.insecure_skip_verify {
                    println!("  ⚠️  TLS certificate verification: DISABLED");
                }
                println!("  Transactions: {}", config.transactions.database_path);

                match config.ledger_target {
                    LedgerTarget::Sqlite => {
                        if let Some(ref sqlite_config) = config.sqlite_ledger {
                            println!("  Ledger Target: SQLite");
                            println!("  Ledger Database: {}", sqlite_config.database_path);
                        }
                    }
                    LedgerTarget::PostgreSQL => {
                        if let Some(ref pg_config) = config.postgresql {
                            use secrecy::ExposeSecret;
                            println!("  Ledger Target: PostgreSQL");
                            println!(
                                "  PostgreSQL Connection: {}",
                                pg_config
                                    .connection_string
                                    .expose_secret()
                                    .as_ref()
                                    .split('@')
                                    .next_back()
                                    .unwrap_or("***")
                            );
                            println!("  Max Connections: {}", pg_config.max_connections);
                        }
                    }
                }

                println!("  Artifacts: {}", config.artifacts.output_dir);
                println!("  Module Scale: {}px", config.artifacts.module_scale);
                println!(
                    "  Duplicate Handling: {}",
                    config.processing.duplicate_handling
                );
                println!("  Pacing Delay: {}ms", config.processing.pacing_delay_ms);
                println!();
                Ok(0)
            }
            Err(e) => {
                println!("❌ Configuration validation failed");
                println!("   Error: {e}");
                println!();
                Ok(2) // Configuration error exit code
            }
        }
    }
}
