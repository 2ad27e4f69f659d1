//! Capture results and saving them to disk

use crate::error::Result;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::Path;
use tracing::{debug, instrument};

/// Result of a full-page capture
#[derive(Debug, Clone, Serialize)]
pub struct CaptureResult {
    /// Encoded PNG
    #[serde(skip)]
    pub data: Vec<u8>,
    /// Image width
    pub width: u32,
    /// Image height
    pub height: u32,
    /// Number of stitched tiles
    pub tile_count: usize,
    /// URL that was captured
    pub url: String,
    /// When stitching finished
    pub captured_at: DateTime<Utc>,
}

impl CaptureResult {
    /// Get data as base64
    pub fn to_base64(&self) -> String {
        BASE64.encode(&self.data)
    }

    /// Get appropriate MIME type
    pub fn mime_type(&self) -> &'static str {
        "image/png"
    }

    /// Get file extension
    pub fn extension(&self) -> &'static str {
        "png"
    }

    /// Size in bytes
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Write the image to `path`, creating parent directories.
    pub async fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        save_to_file(path, &self.data).await
    }
}

/// Write `bytes` to `path`, creating missing parent directories.
#[instrument(skip(path, bytes), fields(file = %path.as_ref().display(), size = bytes.len()))]
pub async fn save_to_file<P: AsRef<Path>>(path: P, bytes: &[u8]) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }
    tokio::fs::write(path, bytes).await?;
    debug!("Saved {} bytes", bytes.len());
    Ok(())
}
