//! PNG encoding of fiscal QR payloads
//!
//! Codes are generated at error-correction level Q and written as grayscale
//! PNG files named `QR_{label}_{yyyyMMddHHmmss}.png`.

use crate::config::ArtifactsConfig;
use crate::domain::{QrSyncError, Result};
use chrono::Local;
use image::{ImageFormat, Luma};
use qrcode::{EcLevel, QrCode};
use std::io::Cursor;
use std::path::{Path, PathBuf};

/// Pixels per QR module unless configured otherwise
pub const DEFAULT_MODULE_SCALE: u32 = 25;

/// Encodes payloads into PNG files
#[derive(Debug, Clone, Copy)]
pub struct QrCodeCodec {
    module_scale: u32,
}

impl QrCodeCodec {
    pub fn new(module_scale: u32) -> Self {
        Self {
            module_scale: module_scale.max(1),
        }
    }

    pub fn from_config(config: &ArtifactsConfig) -> Self {
        Self::new(config.module_scale)
    }

    pub fn module_scale(&self) -> u32 {
        self.module_scale
    }

    /// Encode `payload` into a PNG under `output_dir`
    ///
    /// The directory is created if missing. Path separators in `label` are
    /// replaced so the file always lands directly under `output_dir`.
    ///
    /// # Returns
    ///
    /// The absolute path of the written file.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an empty payload or label, and an
    /// artifact error if encoding or writing fails.
    pub async fn encode(&self, payload: &str, label: &str, output_dir: &Path) -> Result<PathBuf> {
        if payload.is_empty() {
            return Err(QrSyncError::Validation(
                "QR payload cannot be empty".to_string(),
            ));
        }
        if label.trim().is_empty() {
            return Err(QrSyncError::Validation(
                "QR file label cannot be empty".to_string(),
            ));
        }

        tokio::fs::create_dir_all(output_dir).await.map_err(|e| {
            QrSyncError::Artifact(format!(
                "Failed to create output directory {}: {e}",
                output_dir.display()
            ))
        })?;

        let codec = *self;
        let owned_payload = payload.to_string();
        let png = tokio::task::spawn_blocking(move || codec.render_png(&owned_payload))
            .await
            .map_err(|e| QrSyncError::Artifact(format!("QR rendering task failed: {e}")))??;

        let file_name = format!(
            "QR_{}_{}.png",
            sanitize_label(label),
            Local::now().format("%Y%m%d%H%M%S")
        );
        let path = output_dir.join(file_name);

        tokio::fs::write(&path, png).await.map_err(|e| {
            QrSyncError::Artifact(format!("Failed to write {}: {e}", path.display()))
        })?;

        let absolute = absolute_path(path)?;

        tracing::debug!(path = %absolute.display(), "QR artifact written");
        Ok(absolute)
    }

    /// Render the payload to PNG bytes
    pub fn render_png(&self, payload: &str) -> Result<Vec<u8>> {
        let code = QrCode::with_error_correction_level(payload.as_bytes(), EcLevel::Q)
            .map_err(|e| QrSyncError::Artifact(format!("Failed to encode QR payload: {e}")))?;

        let image = code
            .render::<Luma<u8>>()
            .module_dimensions(self.module_scale, self.module_scale)
            .build();

        let mut bytes = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .map_err(|e| QrSyncError::Artifact(format!("Failed to encode PNG: {e}")))?;

        Ok(bytes)
    }
}

impl Default for QrCodeCodec {
    fn default() -> Self {
        Self::new(DEFAULT_MODULE_SCALE)
    }
}

/// Anchor a relative path at the working directory without resolving links
fn absolute_path(path: PathBuf) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path);
    }
    let cwd = std::env::current_dir().map_err(|e| {
        QrSyncError::Artifact(format!("Failed to resolve {}: {e}", path.display()))
    })?;
    Ok(cwd.join(path))
}

fn sanitize_label(label: &str) -> String {
    label.trim().replace(['/', '\\'], "_")
}
