//! Test-connection command implementation
//!
//! Probes the ERP document endpoint without modifying anything.

use crate::adapters::erp::{DocumentSync, ErpSyncClient};
use crate::config::load_config;
use clap::Args;

/// Arguments for the test-connection command
#[derive(Args, Debug)]
pub struct TestConnectionArgs {
    /// Print the response body returned by the endpoint
    #[arg(long)]
    pub show_body: bool,
}

impl TestConnectionArgs {
    /// Execute the test-connection command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!("Testing ERP connection");

        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Failed to load configuration file");
                println!("   Error: {e}");
                return Ok(2); // Configuration error exit code
            }
        };

        if let Err(e) = config.validate() {
            println!("❌ Configuration validation failed");
            println!("   Error: {e}");
            return Ok(2);
        }

        let client = match ErpSyncClient::new(config.erp.clone()) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Failed to create ERP client");
                println!("   Error: {e}");
                return Ok(2);
            }
        };

        println!("🔌 Testing connection to {}", client.documents_url());
        println!();

        let result = client.test_connection().await;

        if result.connected {
            println!("✅ {}", result.message);
        } else {
            println!("❌ {}", result.message);
        }

        if self.show_body && !result.raw_body.is_empty() {
            println!();
            println!("Response body:");
            println!("{}", result.raw_body);
        }
        println!();

        Ok(if result.connected { 0 } else { 4 }) // Connection error exit code
    }
}
