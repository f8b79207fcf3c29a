//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::{LedgerTarget, QrSyncConfig};
use crate::config::secret_string;
use crate::domain::errors::QrSyncError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into QrSyncConfig
/// 4. Applies environment variable overrides (QRSYNC_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns an error if:
/// - File cannot be read
/// - TOML parsing fails
/// - A referenced environment variable is not set
/// - Configuration validation fails
///
/// # Examples
///
/// ```no_run
/// use qrsync::config::loader::load_config;
///
/// let config = load_config("qrsync.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<QrSyncConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(QrSyncError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        QrSyncError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let contents = substitute_env_vars(&contents)?;

    let mut config: QrSyncConfig = toml::from_str(&contents)
        .map_err(|e| QrSyncError::Configuration(format!("Failed to parse TOML: {}", e)))?;

    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        QrSyncError::Configuration(format!("Configuration validation failed: {}", e))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are copied through untouched.
///
/// # Errors
///
/// Returns an error if a referenced environment variable is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| QrSyncError::Configuration(format!("Invalid substitution pattern: {e}")))?;
    let mut lines = Vec::new();
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            lines.push(line.to_string());
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    processed_line = processed_line.replace(&format!("${{{}}}", var_name), &value);
                }
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        lines.push(processed_line);
    }

    if !missing_vars.is_empty() {
        return Err(QrSyncError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(lines.join("\n"))
}

/// Parses a numeric override, rejecting malformed values
fn parse_override<T: std::str::FromStr>(name: &str, value: &str) -> Result<T> {
    value.parse().map_err(|_| {
        QrSyncError::Configuration(format!("Invalid value '{}' for {}", value, name))
    })
}

/// Applies environment variable overrides using QRSYNC_* prefix
///
/// Environment variables follow the pattern: QRSYNC_<SECTION>_<KEY>
/// For example: QRSYNC_ERP_BASE_URL, QRSYNC_PROCESSING_DUPLICATE_HANDLING
fn apply_env_overrides(config: &mut QrSyncConfig) -> Result<()> {
    // Application overrides
    if let Ok(val) = std::env::var("QRSYNC_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }

    // ERP overrides
    if let Ok(val) = std::env::var("QRSYNC_ERP_BASE_URL") {
        config.erp.base_url = val;
    }
    if let Ok(val) = std::env::var("QRSYNC_ERP_DOCUMENTS_ENDPOINT") {
        config.erp.documents_endpoint = val;
    }
    if let Ok(val) = std::env::var("QRSYNC_ERP_USERNAME") {
        config.erp.username = val;
    }
    if let Ok(val) = std::env::var("QRSYNC_ERP_PASSWORD") {
        config.erp.password = secret_string(val);
    }
    if let Ok(val) = std::env::var("QRSYNC_ERP_CLIENT") {
        config.erp.client = val;
    }
    if let Ok(val) = std::env::var("QRSYNC_ERP_FROM_DATE") {
        config.erp.from_date = val;
    }
    if let Ok(val) = std::env::var("QRSYNC_ERP_TO_DATE") {
        config.erp.to_date = val;
    }
    if let Ok(val) = std::env::var("QRSYNC_ERP_TIMEOUT_SECONDS") {
        config.erp.timeout_seconds = parse_override("QRSYNC_ERP_TIMEOUT_SECONDS", &val)?;
    }
    if let Ok(val) = std::env::var("QRSYNC_ERP_INSECURE_SKIP_VERIFY") {
        config.erp.insecure_skip_verify = val.parse().unwrap_or(false);
    }

    // Processing overrides
    if let Ok(val) = std::env::var("QRSYNC_PROCESSING_DUPLICATE_HANDLING") {
        config.processing.duplicate_handling = val;
    }
    if let Ok(val) = std::env::var("QRSYNC_PROCESSING_PACING_DELAY_MS") {
        config.processing.pacing_delay_ms =
            parse_override("QRSYNC_PROCESSING_PACING_DELAY_MS", &val)?;
    }

    // Artifact overrides
    if let Ok(val) = std::env::var("QRSYNC_ARTIFACTS_OUTPUT_DIR") {
        config.artifacts.output_dir = val;
    }

    // Source and ledger overrides
    if let Ok(val) = std::env::var("QRSYNC_TRANSACTIONS_DATABASE_PATH") {
        config.transactions.database_path = val;
    }
    if let Ok(val) = std::env::var("QRSYNC_LEDGER_TARGET") {
        config.ledger_target = match val.to_lowercase().as_str() {
            "sqlite" => LedgerTarget::Sqlite,
            "postgresql" => LedgerTarget::PostgreSQL,
            other => {
                return Err(QrSyncError::Configuration(format!(
                    "Invalid QRSYNC_LEDGER_TARGET '{}'. Must be one of: sqlite, postgresql",
                    other
                )))
            }
        };
    }
    if let Some(ref mut sqlite) = config.sqlite_ledger {
        if let Ok(val) = std::env::var("QRSYNC_SQLITE_LEDGER_DATABASE_PATH") {
            sqlite.database_path = val;
        }
    }
    if let Some(ref mut pg) = config.postgresql {
        if let Ok(val) = std::env::var("QRSYNC_POSTGRESQL_CONNECTION_STRING") {
            pg.connection_string = secret_string(val);
        }
    }

    // Logging overrides
    if let Ok(val) = std::env::var("QRSYNC_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = val.parse().unwrap_or(false);
    }
    if let Ok(val) = std::env::var("QRSYNC_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }

    Ok(())
}
