//! Scripted composers standing in for the AI service in tests.

use async_trait::async_trait;
use harmonyai_relay::composer::{Composer, ComposerError};
use harmonyai_relay::composition::{ComposeRequest, ComposerResult};
use tempfile::TempDir;

/// Composer that writes three artifact files into its own temp directory
/// and returns their paths, like a successful composer run would.
pub struct StubComposer {
    artifacts_dir: TempDir,
}

impl StubComposer {
    pub fn new() -> Self {
        Self {
            artifacts_dir: TempDir::new().expect("Failed to create artifacts dir"),
        }
    }
}

#[async_trait]
impl Composer for StubComposer {
    async fn request_composition(
        &self,
        payload: &ComposeRequest,
    ) -> Result<ComposerResult, ComposerError> {
        let dir = self.artifacts_dir.path();
        let audio = dir.join("out.wav");
        let midi = dir.join("out.mid");
        let pdf = dir.join("out.pdf");

        tokio::fs::write(&audio, format!("WAV {}", payload.lyrics)).await?;
        tokio::fs::write(&midi, b"MThd").await?;
        tokio::fs::write(&pdf, b"%PDF-1.4").await?;

        Ok(ComposerResult {
            audio: audio.to_string_lossy().to_string(),
            midi: midi.to_string_lossy().to_string(),
            pdf: pdf.to_string_lossy().to_string(),
        })
    }
}

/// Composer that always fails with a fixed message.
pub struct FailingComposer {
    pub message: String,
}

impl FailingComposer {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[async_trait]
impl Composer for FailingComposer {
    async fn request_composition(
        &self,
        _payload: &ComposeRequest,
    ) -> Result<ComposerResult, ComposerError> {
        Err(ComposerError::ScriptFailed(self.message.clone()))
    }
}
