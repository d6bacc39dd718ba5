//! HTTP client for end-to-end tests
//!
//! When API routes or request formats change, update only this file.

use super::constants::*;
use reqwest::Response;
use serde_json::json;
use std::time::Duration;

/// Thin wrapper around reqwest for the relay server's endpoints
pub struct TestClient {
    /// The underlying reqwest client (public for custom requests in tests)
    pub client: reqwest::Client,
    /// The base URL of the test server
    pub base_url: String,
}

impl TestClient {
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build reqwest client");

        Self { client, base_url }
    }

    /// GET /health
    pub async fn health(&self) -> Response {
        self.client
            .get(format!("{}/health", self.base_url))
            .send()
            .await
            .expect("Health request failed")
    }

    /// POST /generate
    pub async fn generate(&self, body: serde_json::Value) -> Response {
        self.client
            .post(format!("{}/generate", self.base_url))
            .json(&body)
            .send()
            .await
            .expect("Generate request failed")
    }

    /// POST /generate with the canonical test payload
    pub async fn generate_default(&self) -> Response {
        self.generate(json!({
            "lyrics": TEST_LYRICS,
            "emotion": TEST_EMOTION,
            "genre": TEST_GENRE,
            "tempo": TEST_TEMPO,
        }))
        .await
    }

    /// GET /metrics
    pub async fn metrics(&self) -> Response {
        self.client
            .get(format!("{}/metrics", self.base_url))
            .send()
            .await
            .expect("Metrics request failed")
    }

    /// GET an arbitrary server path (e.g. a returned /media URL)
    pub async fn get_path(&self, path: &str) -> Response {
        self.client
            .get(format!("{}{}", self.base_url, path))
            .send()
            .await
            .expect("GET request failed")
    }
}
