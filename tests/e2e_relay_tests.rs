//! End-to-end tests for the client relay's candidate fallback, driven
//! against throwaway scripted backends.

mod common;

use axum::{routing::post, Json, Router};
use common::TestServer;
use harmonyai_relay::client::{ClientEnv, ComposeOptions, RelayClient};
use harmonyai_relay::composition::{ComposerResult, CompositionRequest, Emotion, Genre};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn payload() -> CompositionRequest {
    CompositionRequest {
        lyrics: "saawan ki raaton mein".to_string(),
        emotion: Emotion::Love,
        genre: Genre::BollywoodFusion,
        tempo: 110,
    }
}

fn sample_result() -> ComposerResult {
    ComposerResult {
        audio: "/media/compositions/1_sufi_calm.wav".to_string(),
        midi: "/media/compositions/1_sufi_calm.mid".to_string(),
        pdf: "/media/compositions/1_sufi_calm.pdf".to_string(),
    }
}

async fn spawn_backend(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

/// Backend that answers /generate successfully and counts hits.
async fn spawn_ok_backend(hits: Arc<AtomicUsize>) -> String {
    let app = Router::new().route(
        "/generate",
        post(move || {
            let hits = hits.clone();
            async move {
                hits.fetch_add(1, Ordering::SeqCst);
                Json(sample_result())
            }
        }),
    );
    spawn_backend(app).await
}

/// Backend with no /generate route at all; every POST is a plain 404.
async fn spawn_missing_backend() -> String {
    spawn_backend(Router::new()).await
}

/// Backend that rejects /generate with the given status and message.
async fn spawn_rejecting_backend(status: u16, message: &'static str) -> String {
    let app = Router::new().route(
        "/generate",
        post(move || async move {
            (
                axum::http::StatusCode::from_u16(status).unwrap(),
                Json(serde_json::json!({ "message": message })),
            )
        }),
    );
    spawn_backend(app).await
}

#[tokio::test]
async fn relay_tries_candidates_until_one_succeeds() {
    let hits = Arc::new(AtomicUsize::new(0));
    let missing_a = spawn_missing_backend().await;
    let missing_b = spawn_missing_backend().await;
    let ok = spawn_ok_backend(hits.clone()).await;

    let relay = RelayClient::new(ClientEnv::default(), None);
    let candidates = vec![missing_a, missing_b, ok];

    let result = relay
        .compose_with_candidates(&payload(), &candidates)
        .await
        .unwrap();

    assert_eq!(result, sample_result());
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn relay_stops_at_first_non_404_rejection() {
    let hits = Arc::new(AtomicUsize::new(0));
    let rejecting = spawn_rejecting_backend(500, "the AI burped").await;
    let ok = spawn_ok_backend(hits.clone()).await;

    let relay = RelayClient::new(ClientEnv::default(), None);
    let candidates = vec![rejecting, ok];

    let err = relay
        .compose_with_candidates(&payload(), &candidates)
        .await
        .unwrap_err();

    match err {
        harmonyai_relay::client::RelayError::Rejected { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "the AI burped");
        }
        other => panic!("unexpected error: {}", other),
    }
    // The healthy backend was never consulted
    assert_eq!(hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn relay_treats_400_as_terminal_too() {
    let rejecting = spawn_rejecting_backend(400, "tempo out of range").await;

    let relay = RelayClient::new(ClientEnv::default(), None);
    let err = relay
        .compose_with_candidates(&payload(), &[rejecting])
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        harmonyai_relay::client::RelayError::Rejected { status: 400, .. }
    ));
}

#[tokio::test]
async fn exhaustion_error_lists_every_attempted_url() {
    let bases = vec![
        spawn_missing_backend().await,
        spawn_missing_backend().await,
        spawn_missing_backend().await,
    ];

    let relay = RelayClient::new(ClientEnv::default(), None);
    let err = relay
        .compose_with_candidates(&payload(), &bases)
        .await
        .unwrap_err();

    let text = err.to_string();
    for base in &bases {
        assert!(
            text.contains(&format!("{}/generate", base)),
            "missing {} in: {}",
            base,
            text
        );
    }
    assert!(text.contains("Request failed with status 404"));
    assert!(text.contains("Update your Composer API URL in Settings"));
}

#[tokio::test]
async fn exhaustion_message_carries_last_backend_message() {
    let rejecting = spawn_rejecting_backend(404, "no such studio").await;

    let relay = RelayClient::new(ClientEnv::default(), None);
    let err = relay
        .compose_with_candidates(&payload(), &[rejecting])
        .await
        .unwrap_err();

    assert!(err.to_string().starts_with("no such studio"));
}

#[tokio::test]
async fn success_with_malformed_body_is_terminal() {
    let hits = Arc::new(AtomicUsize::new(0));
    let garbled = spawn_backend(Router::new().route(
        "/generate",
        post(|| async { Json(serde_json::json!({ "audio": "/a.wav" })) }),
    ))
    .await;
    let ok = spawn_ok_backend(hits.clone()).await;

    let relay = RelayClient::new(ClientEnv::default(), None);
    let err = relay
        .compose_with_candidates(&payload(), &[garbled, ok])
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        harmonyai_relay::client::RelayError::Decode(_)
    ));
    assert_eq!(hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn network_failure_moves_on_to_the_next_candidate() {
    let hits = Arc::new(AtomicUsize::new(0));
    // Nothing listens on port 1
    let unreachable = "http://127.0.0.1:1".to_string();
    let ok = spawn_ok_backend(hits.clone()).await;

    let relay = RelayClient::new(ClientEnv::default(), None);
    let result = relay
        .compose_with_candidates(&payload(), &[unreachable, ok])
        .await
        .unwrap();

    assert_eq!(result, sample_result());
}

#[tokio::test]
async fn preferred_base_url_reaches_a_real_server() {
    let server = TestServer::spawn().await;

    let relay = RelayClient::new(ClientEnv::default(), None);
    let options = ComposeOptions {
        preferred_base_url: Some(server.base_url.clone()),
    };

    let result = relay.compose(&payload(), &options).await.unwrap();

    assert!(result.audio.starts_with("/media/compositions/"));
    assert!(result.audio.ends_with("_bollywood-fusion_love.wav"));
}

#[tokio::test]
async fn origin_candidates_reach_a_real_server() {
    let server = TestServer::spawn().await;

    // The backend doubles as the page origin; the origin candidate is the
    // first one tried and succeeds
    let relay = RelayClient::new(ClientEnv::with_origin(server.base_url.clone()), None);
    let result = relay
        .compose(&payload(), &ComposeOptions::default())
        .await
        .unwrap();

    assert!(result.midi.ends_with(".mid"));
}
