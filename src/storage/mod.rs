//! Media storage backends for generated artifacts.
//!
//! Which backend is in use is decided once at startup from the resolved
//! configuration; nothing re-probes credentials at request time.

mod bucket;
mod local;

pub use bucket::{BucketStore, ServiceAccountKey};
pub use local::LocalMediaStore;

use crate::config::AppConfig;
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

/// Errors that can occur while storing a generated artifact.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("invalid service account key: {0}")]
    InvalidKey(String),

    #[error("token exchange failed: {0}")]
    TokenExchange(String),

    #[error("upload failed with status {0}: {1}")]
    UploadRejected(reqwest::StatusCode, String),

    #[error("storage request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A place generated artifacts can be uploaded to.
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Store the file at `local_path` under `destination` and return the
    /// URL (or served path) clients can fetch it from.
    async fn upload_file(&self, local_path: &Path, destination: &str)
        -> Result<String, StorageError>;
}

/// Select the media store once, from the resolved configuration.
///
/// With a bucket name and credentials present the bucket store is used;
/// otherwise uploads land in the locally served media directory.
pub fn resolve_media_store(config: &AppConfig) -> anyhow::Result<Arc<dyn MediaStore>> {
    match (&config.firebase_bucket, &config.firebase_credentials) {
        (Some(bucket), Some(credentials)) => {
            let key = ServiceAccountKey::from_json(credentials)?;
            info!("Uploading generated media to bucket {}", bucket);
            Ok(Arc::new(BucketStore::new(bucket.clone(), key)))
        }
        _ => {
            warn!("Firebase credentials missing; uploads will be stored in the local media directory.");
            Ok(Arc::new(LocalMediaStore::new(config.media_root.clone())))
        }
    }
}

/// Content type for an artifact, by file extension.
pub(crate) fn content_type_for_extension(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase());

    match ext.as_deref() {
        Some("wav") => "audio/wav",
        Some("mid") | Some("midi") => "audio/midi",
        Some("pdf") => "application/pdf",
        _ => "application/octet-stream",
    }
}
