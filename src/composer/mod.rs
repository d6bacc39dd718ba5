//! Clients for the composer service that turns lyrics into audio, MIDI and
//! sheet music: a remote HTTP composer, a local subprocess fallback, and the
//! wrapper that chains them.

mod local;
mod remote;

pub use local::LocalComposer;
pub use remote::RemoteComposer;

use crate::composition::{ComposeRequest, ComposerResult};
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

/// Errors that can occur while requesting a composition.
#[derive(Debug, Error)]
pub enum ComposerError {
    #[error("composer service returned status {0}")]
    RemoteStatus(reqwest::StatusCode),

    #[error("composer service request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("{0}")]
    ScriptFailed(String),

    #[error("failed to parse composer output: {0}; raw output: {1}")]
    InvalidOutput(String, String),

    #[error("local composer timed out after {0:?}")]
    Timeout(Duration),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Anything that can turn a compose request into the three artifacts.
#[async_trait]
pub trait Composer: Send + Sync {
    async fn request_composition(
        &self,
        payload: &ComposeRequest,
    ) -> Result<ComposerResult, ComposerError>;
}

/// Tries the remote composer first when one is configured, then the local
/// subprocess. The two paths never run concurrently, and a remote failure
/// is never surfaced directly; the local result (or error) is what the
/// caller sees.
pub struct FallbackComposer {
    remote: Option<RemoteComposer>,
    local: LocalComposer,
}

impl FallbackComposer {
    pub fn new(remote: Option<RemoteComposer>, local: LocalComposer) -> Self {
        Self { remote, local }
    }
}

#[async_trait]
impl Composer for FallbackComposer {
    async fn request_composition(
        &self,
        payload: &ComposeRequest,
    ) -> Result<ComposerResult, ComposerError> {
        if let Some(remote) = &self.remote {
            match remote.request_composition(payload).await {
                Ok(result) => return Ok(result),
                Err(err) => {
                    warn!("Remote composer failed, falling back to local: {}", err);
                }
            }
        }
        self.local.request_composition(payload).await
    }
}
