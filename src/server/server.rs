use anyhow::Result;
use std::path::Path;

use tower_http::{cors::CorsLayer, services::ServeDir};
use tracing::error;

use axum::{
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;

use crate::composition::{ComposeRequest, ComposerResult};

use super::{log_requests, metrics, state::*, ServerConfig};

const MAX_JSON_BODY_BYTES: usize = 1024 * 1024;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
}

#[derive(Serialize)]
struct GenerateResponse {
    audio: String,
    midi: String,
    pdf: String,
}

/// Single JSON error responder: anything a handler fails with comes back as
/// a 500 with the error's message.
struct ApiError(anyhow::Error);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        error!("{:#}", self.0);
        let body = Json(serde_json::json!({ "message": self.0.to_string() }));
        (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
    }
}

impl<E> From<E> for ApiError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

async fn health() -> impl IntoResponse {
    Json(HealthResponse { status: "ok" })
}

async fn generate(
    State(state): State<ServerState>,
    Json(body): Json<ComposeRequest>,
) -> Result<Json<GenerateResponse>, ApiError> {
    let composition: ComposerResult = match state.composer.request_composition(&body).await {
        Ok(composition) => composition,
        Err(err) => {
            metrics::record_composition("composer_error");
            return Err(err.into());
        }
    };

    // One stamp for the whole request so the three artifacts share a stem
    let stamp = chrono::Utc::now().timestamp_millis();

    let (audio, midi, pdf) = futures::future::try_join3(
        state
            .media_store
            .upload_file(Path::new(&composition.audio), &destination_key(&body, stamp, "wav")),
        state
            .media_store
            .upload_file(Path::new(&composition.midi), &destination_key(&body, stamp, "mid")),
        state
            .media_store
            .upload_file(Path::new(&composition.pdf), &destination_key(&body, stamp, "pdf")),
    )
    .await
    .inspect_err(|_| metrics::record_composition("upload_error"))?;

    metrics::record_composition("success");
    Ok(Json(GenerateResponse { audio, midi, pdf }))
}

/// Lowercase, collapse non-alphanumeric runs to single hyphens, trim
/// hyphens at both ends. Empty inputs fall back to a fixed stem token.
fn slugify(value: &str, fallback: &'static str) -> String {
    let mut slug = String::with_capacity(value.len());
    let mut pending_hyphen = false;
    for c in value.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            slug.extend(c.to_lowercase());
            pending_hyphen = false;
        } else {
            pending_hyphen = true;
        }
    }
    if slug.is_empty() {
        fallback.to_string()
    } else {
        slug
    }
}

fn destination_key(body: &ComposeRequest, stamp_ms: i64, extension: &str) -> String {
    let genre_slug = slugify(&body.genre, "track");
    let emotion_slug = slugify(&body.emotion, "mood");
    format!(
        "compositions/{}_{}_{}.{}",
        stamp_ms, genre_slug, emotion_slug, extension
    )
}

pub fn make_app(
    config: ServerConfig,
    composer: SharedComposer,
    media_store: SharedMediaStore,
) -> Result<Router> {
    // Idempotent; registration errors for already-registered metrics are
    // ignored so repeated app construction in tests is fine
    metrics::init_metrics();

    let media_root = config.media_root.clone();
    let state = ServerState {
        config,
        composer,
        media_store,
    };

    let mut app: Router = Router::new()
        .route("/health", get(health))
        .route(
            "/generate",
            post(generate).layer(DefaultBodyLimit::max(MAX_JSON_BODY_BYTES)),
        )
        .route("/metrics", get(metrics::metrics_handler))
        .nest_service("/media", ServeDir::new(media_root))
        .layer(CorsLayer::permissive())
        .with_state(state.clone());

    app = app.layer(middleware::from_fn_with_state(state, log_requests));

    Ok(app)
}

pub async fn run_server(
    config: ServerConfig,
    composer: SharedComposer,
    media_store: SharedMediaStore,
) -> Result<()> {
    let port = config.port;
    let app = make_app(config, composer, media_store)?;

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

    Ok(axum::serve(listener, app).await?)
}
