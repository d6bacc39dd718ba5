//! Local composer fallback running the scripted composer as a subprocess.
//!
//! The exchange is one-shot: the JSON payload goes to the child's stdin,
//! the child writes a single JSON object to stdout and exits 0. A non-zero
//! exit or malformed output is a failure.

use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use super::{Composer, ComposerError};
use crate::composition::{ComposeRequest, ComposerResult};

pub struct LocalComposer {
    interpreter: String,
    script: PathBuf,
    timeout: Duration,
}

impl LocalComposer {
    /// Create a new local composer.
    ///
    /// # Arguments
    /// * `interpreter` - Binary used to run the script (e.g., "python3")
    /// * `script` - Path to the composer script
    /// * `timeout` - Hard cap on the subprocess lifetime
    pub fn new(interpreter: impl Into<String>, script: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            interpreter: interpreter.into(),
            script: script.into(),
            timeout,
        }
    }

    async fn run(&self, payload: &ComposeRequest) -> Result<ComposerResult, ComposerError> {
        let body = serde_json::to_vec(payload)?;

        let mut child = Command::new(&self.interpreter)
            .arg(&self.script)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(&body).await?;
            stdin.flush().await?;
            // Closing stdin signals the child that the payload is complete
        }

        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(output) => output?,
            // Dropping the timed-out future kills the child via kill_on_drop
            Err(_) => return Err(ComposerError::Timeout(self.timeout)),
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let message = if stderr.is_empty() {
                format!("local composer exited with {}", output.status)
            } else {
                stderr
            };
            return Err(ComposerError::ScriptFailed(message));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let raw = stdout.trim();
        serde_json::from_str(raw)
            .map_err(|err| ComposerError::InvalidOutput(err.to_string(), raw.to_string()))
    }
}

#[async_trait]
impl Composer for LocalComposer {
    async fn request_composition(
        &self,
        payload: &ComposeRequest,
    ) -> Result<ComposerResult, ComposerError> {
        self.run(payload).await
    }
}
