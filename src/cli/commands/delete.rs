//! Delete command implementation
//!
//! Removes a single document from the ERP endpoint. This is an operator tool
//! for clearing a document that blocks a sync.

use crate::adapters::erp::{DocumentSync, ErpSyncClient};
use crate::config::load_config;
use crate::domain::{DocNum, ErrorKind};
use clap::Args;

/// Arguments for the delete command
#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Document number to delete
    pub doc_num: String,

    /// Skip confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

impl DeleteArgs {
    /// Execute the delete command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let doc_num = match DocNum::new(self.doc_num.clone()) {
            Ok(d) => d,
            Err(e) => {
                println!("❌ {e}");
                return Ok(2);
            }
        };

        tracing::info!(doc_num = %doc_num, "Delete command");

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

        if !self.yes {
            print!(
                "Delete document {} from {}? [y/N]: ",
                doc_num, config.erp.base_url
            );
            use std::io::{self, Write};
            io::stdout().flush()?;

            let mut input = String::new();
            io::stdin().read_line(&mut input)?;

            if !input.trim().eq_ignore_ascii_case("y") {
                println!("Delete cancelled.");
                return Ok(0);
            }
        }

        let client = match ErpSyncClient::new(config.erp.clone()) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Failed to create ERP client");
                println!("   Error: {e}");
                return Ok(2);
            }
        };

        match client.delete_document(&doc_num).await {
            Ok(()) => {
                println!("✅ Document {doc_num} deleted");
                Ok(0)
            }
            Err(e) => {
                tracing::error!(doc_num = %doc_num, error = %e, "Delete failed");
                println!("❌ Failed to delete document {doc_num}");
                println!("   Error: {e}");
                if e.kind() == ErrorKind::Transport {
                    Ok(4) // Connection error exit code
                } else {
                    Ok(1)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delete_args() {
        let args = DeleteArgs {
            doc_num: "0100012345".to_string(),
            yes: true,
        };
        assert_eq!(args.doc_num, "0100012345");
        assert!(args.yes);
    }
}
