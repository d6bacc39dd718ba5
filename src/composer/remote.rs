//! HTTP client for the remote composer service.

use async_trait::async_trait;
use std::time::Duration;

use super::{Composer, ComposerError};
use crate::composition::{ComposeRequest, ComposerResult};

/// HTTP client for a composer service exposing `POST /compose`.
pub struct RemoteComposer {
    client: reqwest::Client,
    base_url: String,
}

impl RemoteComposer {
    /// Create a new remote composer client.
    ///
    /// # Arguments
    /// * `base_url` - Base URL of the composer service (e.g., "http://localhost:8000")
    /// * `timeout_sec` - Request timeout in seconds
    pub fn new(base_url: String, timeout_sec: u64) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_sec))
            .build()
            .expect("Failed to create HTTP client");

        // Ensure base_url doesn't have trailing slash
        let base_url = base_url.trim_end_matches('/').to_string();

        Self { client, base_url }
    }

    /// Get the base URL of the composer service.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl Composer for RemoteComposer {
    async fn request_composition(
        &self,
        payload: &ComposeRequest,
    ) -> Result<ComposerResult, ComposerError> {
        let url = format!("{}/compose", self.base_url);
        let response = self.client.post(&url).json(payload).send().await?;

        if !response.status().is_success() {
            return Err(ComposerError::RemoteStatus(response.status()));
        }

        // A body missing any of the three artifacts fails here, which
        // sends the caller down the local fallback path.
        Ok(response.json().await?)
    }
}
