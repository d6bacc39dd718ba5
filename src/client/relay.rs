//! Sends the compose request to the first backend candidate that answers.

use serde::Deserialize;
use thiserror::Error;
use tokio::sync::OnceCell;
use tracing::debug;

use super::resolver::{resolve_base_candidates, ClientEnv};
use super::runtime_config::{load_runtime_config, RuntimeConfig};
use crate::composition::{ComposerResult, CompositionRequest};

const FALLBACK_MESSAGE: &str = "Unable to contact the HarmonyAI composer service.";

#[derive(Debug, Error)]
pub enum RelayError {
    /// A backend was reached and rejected the request; no other candidate
    /// is tried after this.
    #[error("{message}")]
    Rejected { status: u16, message: String },

    /// A backend answered success with a body that was not a composition
    /// result. Terminal, like any non-404 rejection.
    #[error("failed to decode composer response: {0}")]
    Decode(#[source] reqwest::Error),

    /// Every candidate was tried without success.
    #[error(
        "{message} (Attempted: {attempts})\nUpdate your Composer API URL in Settings or ensure the backend is running.",
        attempts = .attempted.join(", ")
    )]
    Exhausted {
        message: String,
        attempted: Vec<String>,
    },
}

#[derive(Clone, Debug, Default)]
pub struct ComposeOptions {
    pub preferred_base_url: Option<String>,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Client for the backend `/generate` endpoint with candidate fallback.
pub struct RelayClient {
    http: reqwest::Client,
    env: ClientEnv,
    stored_base_url: Option<String>,
    runtime_config: OnceCell<RuntimeConfig>,
}

impl RelayClient {
    pub fn new(env: ClientEnv, stored_base_url: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            env,
            stored_base_url: stored_base_url.filter(|url| !url.trim().is_empty()),
            runtime_config: OnceCell::new(),
        }
    }

    /// The runtime config is fetched once per client, lazily.
    async fn runtime_config(&self) -> &RuntimeConfig {
        self.runtime_config
            .get_or_init(|| async { load_runtime_config(&self.http, &self.env).await })
            .await
    }

    pub async fn compose(
        &self,
        payload: &CompositionRequest,
        options: &ComposeOptions,
    ) -> Result<ComposerResult, RelayError> {
        let runtime = self.runtime_config().await;
        let candidates = resolve_base_candidates(
            options.preferred_base_url.as_deref(),
            runtime,
            self.stored_base_url.as_deref(),
            &self.env,
        );
        self.compose_with_candidates(payload, &candidates).await
    }

    /// One strictly sequential pass over the candidates. A 404 means "the
    /// endpoint does not live here, try the next address"; any other
    /// rejection means the backend was reached and is terminal.
    pub async fn compose_with_candidates(
        &self,
        payload: &CompositionRequest,
        candidates: &[String],
    ) -> Result<ComposerResult, RelayError> {
        let mut attempted = Vec::with_capacity(candidates.len());
        let mut last_error: Option<String> = None;

        for base in candidates {
            let endpoint = build_url(base, "generate");
            attempted.push(endpoint.clone());

            let response = match self.http.post(&endpoint).json(payload).send().await {
                Ok(response) => response,
                Err(err) => {
                    debug!("Request to {} failed: {}", endpoint, err);
                    last_error = Some(err.to_string());
                    continue;
                }
            };

            let status = response.status();
            if !status.is_success() {
                let message = error_message(response).await;
                if status == reqwest::StatusCode::NOT_FOUND {
                    last_error = Some(message);
                    continue;
                }
                return Err(RelayError::Rejected {
                    status: status.as_u16(),
                    message,
                });
            }

            return response
                .json::<ComposerResult>()
                .await
                .map_err(RelayError::Decode);
        }

        Err(RelayError::Exhausted {
            message: last_error.unwrap_or_else(|| FALLBACK_MESSAGE.to_string()),
            attempted,
        })
    }
}

/// Extract the backend's `message` field, falling back to a generic status
/// line when the body is not the expected JSON.
async fn error_message(response: reqwest::Response) -> String {
    let fallback = format!("Request failed with status {}", response.status().as_u16());
    match response.json::<ErrorBody>().await {
        Ok(body) => body.message.unwrap_or(fallback),
        Err(_) => fallback,
    }
}

fn build_url(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    if path.starts_with('/') {
        format!("{}{}", base, path)
    } else {
        format!("{}/{}", base, path)
    }
}
