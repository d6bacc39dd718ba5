//! Fallback store copying artifacts into the locally served media directory.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;

use super::{MediaStore, StorageError};

/// Copies uploads under the media root; the server exposes that directory
/// at `/media`.
pub struct LocalMediaStore {
    media_root: PathBuf,
}

impl LocalMediaStore {
    pub fn new(media_root: impl Into<PathBuf>) -> Self {
        Self {
            media_root: media_root.into(),
        }
    }

    pub fn media_root(&self) -> &Path {
        &self.media_root
    }
}

#[async_trait]
impl MediaStore for LocalMediaStore {
    async fn upload_file(
        &self,
        local_path: &Path,
        destination: &str,
    ) -> Result<String, StorageError> {
        let sanitized = destination.trim_start_matches('/');
        let target = self.media_root.join(sanitized);

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::copy(local_path, &target).await?;

        Ok(format!("/media/{}", sanitized))
    }
}
