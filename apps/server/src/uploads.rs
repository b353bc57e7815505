//! # Upload Handling
//!
//! Product images and the shop logo land in the configured upload
//! directory as `<timestamp>_<sanitized original name>`. Replacing an
//! image deletes the previous file.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::error::ApiError;

/// Strips path components and anything outside `[A-Za-z0-9._-]` from an
/// uploaded file name.
pub fn sanitize_filename(original: &str) -> String {
    // Drop any client-supplied directory part.
    let base = original
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(original);

    base.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Builds the stored file name: `YYYYMMDD_HHMMSS_<sanitized>`.
pub fn upload_filename(original: &str, now: DateTime<Utc>) -> String {
    format!("{}_{}", now.format("%Y%m%d_%H%M%S"), sanitize_filename(original))
}

/// Writes an uploaded file into the upload directory and returns the
/// stored file name.
pub async fn save_upload(
    upload_dir: &Path,
    original_name: &str,
    bytes: &[u8],
) -> Result<String, ApiError> {
    let filename = upload_filename(original_name, Utc::now());
    let path: PathBuf = upload_dir.join(&filename);

    tokio::fs::create_dir_all(upload_dir)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to create upload dir: {}", e)))?;

    tokio::fs::write(&path, bytes)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to store upload: {}", e)))?;

    debug!(file = %filename, size = bytes.len(), "Stored upload");
    Ok(filename)
}

/// Deletes a previously stored upload. Best-effort: a missing file is not
/// an error.
pub async fn delete_upload(upload_dir: &Path, filename: &str) {
    let path = upload_dir.join(filename);

    if let Err(e) = tokio::fs::remove_file(&path).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            warn!(file = %filename, error = %e, "Failed to delete old upload");
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
