//! Test server lifecycle management
//!
//! Each test gets an isolated server with its own media directory and a
//! scripted composer; no real AI service or bucket is involved.

use super::constants::*;
use super::fixtures::StubComposer;
use harmonyai_relay::composer::Composer;
use harmonyai_relay::server::server::make_app;
use harmonyai_relay::server::{RequestsLoggingLevel, ServerConfig};
use harmonyai_relay::storage::LocalMediaStore;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::net::TcpListener;

/// Test server instance with an isolated media directory
///
/// When dropped, the server gracefully shuts down and temp resources are
/// cleaned up.
pub struct TestServer {
    /// Base URL for making requests (e.g., "http://127.0.0.1:12345")
    pub base_url: String,

    /// The port the server is listening on
    pub port: u16,

    /// Where uploaded media lands, for direct filesystem assertions
    pub media_root: PathBuf,

    // Private fields - keep resources alive until drop
    _temp_media_dir: TempDir,
    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestServer {
    /// Spawns a test server backed by the stub composer.
    pub async fn spawn() -> Self {
        Self::spawn_with_composer(Arc::new(StubComposer::new())).await
    }

    /// Spawns a test server with the given composer on a random port.
    pub async fn spawn_with_composer(composer: Arc<dyn Composer>) -> Self {
        let temp_media_dir = TempDir::new().expect("Failed to create media dir");
        let media_root = temp_media_dir.path().to_path_buf();

        // Bind to random port
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let port = listener
            .local_addr()
            .expect("Failed to get local address")
            .port();
        let base_url = format!("http://127.0.0.1:{}", port);

        // Create shutdown channel
        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        let config = ServerConfig {
            requests_logging_level: RequestsLoggingLevel::None,
            port,
            media_root: media_root.clone(),
        };
        let media_store = Arc::new(LocalMediaStore::new(media_root.clone()));

        let app = make_app(config, composer, media_store).expect("Failed to build app");

        // Spawn server in background task with graceful shutdown
        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .expect("Server failed");
        });

        let server = Self {
            base_url,
            port,
            media_root,
            _temp_media_dir: temp_media_dir,
            _shutdown_tx: Some(shutdown_tx),
        };

        server.wait_for_ready().await;

        server
    }

    /// Waits for the server to become ready by polling the health endpoint
    async fn wait_for_ready(&self) {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(100))
            .build()
            .expect("Failed to build reqwest client");

        let start = std::time::Instant::now();
        let timeout = Duration::from_millis(SERVER_READY_TIMEOUT_MS);

        loop {
            if start.elapsed() > timeout {
                panic!(
                    "Server did not become ready within {}ms",
                    SERVER_READY_TIMEOUT_MS
                );
            }

            match client
                .get(format!("{}/health", self.base_url))
                .send()
                .await
            {
                Ok(response) if response.status().is_success() => {
                    return;
                }
                _ => {
                    tokio::time::sleep(Duration::from_millis(SERVER_READY_POLL_INTERVAL_MS)).await;
                }
            }
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        // Send shutdown signal
        if let Some(tx) = self._shutdown_tx.take() {
            let _ = tx.send(());
        }
        // TempDir will be cleaned up automatically
    }
}
