use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use harmonyai_relay::composer::{Composer, FallbackComposer, LocalComposer, RemoteComposer};
use harmonyai_relay::config::{AppConfig, CliConfig, EnvConfig};
use harmonyai_relay::server::{metrics, run_server, RequestsLoggingLevel, ServerConfig};
use harmonyai_relay::storage::resolve_media_store;

fn parse_path(s: &str) -> Result<PathBuf> {
    let path_buf = PathBuf::from(s);
    let original_path = match path_buf.canonicalize() {
        Ok(path) => path,
        Err(msg) => {
            if msg.kind() == std::io::ErrorKind::NotFound {
                path_buf
            } else {
                return Err(msg).with_context(|| format!("Error resolving path: {}", s));
            }
        }
    };
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
struct CliArgs {
    /// The port to listen on. Falls back to PORT, then 4000.
    #[clap(short, long)]
    pub port: Option<u16>,

    /// Base URL of the remote composer service. Falls back to
    /// AI_SERVICE_URL; when neither is set only the local composer runs.
    #[clap(long)]
    pub ai_service_url: Option<String>,

    /// Timeout in seconds for remote composer requests.
    #[clap(long)]
    pub remote_timeout_sec: Option<u64>,

    /// Interpreter used to run the local composer script. Falls back to
    /// PYTHON_BIN, then "python3".
    #[clap(long)]
    pub python_bin: Option<String>,

    /// Path to the local composer script.
    #[clap(long, value_parser = parse_path)]
    pub composer_script: Option<PathBuf>,

    /// Hard cap in seconds on a local composer run.
    #[clap(long)]
    pub composer_timeout_sec: Option<u64>,

    /// Directory served at /media; uploads land here when no bucket is
    /// configured.
    #[clap(long, value_parser = parse_path)]
    pub media_root: Option<PathBuf>,

    /// Bucket generated artifacts are uploaded to. Falls back to
    /// FIREBASE_BUCKET.
    #[clap(long)]
    pub firebase_bucket: Option<String>,

    /// Service account key JSON, or a path to the key file. Falls back to
    /// FIREBASE_CREDENTIALS.
    #[clap(long)]
    pub firebase_credentials: Option<String>,

    /// The level of logging to perform on each request.
    #[clap(long)]
    pub logging_level: Option<RequestsLoggingLevel>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .unwrap();

    let cli_config = CliConfig {
        port: cli_args.port,
        ai_service_url: cli_args.ai_service_url,
        remote_timeout_sec: cli_args.remote_timeout_sec,
        python_bin: cli_args.python_bin,
        composer_script: cli_args.composer_script,
        composer_timeout_sec: cli_args.composer_timeout_sec,
        media_root: cli_args.media_root,
        firebase_bucket: cli_args.firebase_bucket,
        firebase_credentials: cli_args.firebase_credentials,
        logging_level: cli_args.logging_level,
    };
    let config = AppConfig::resolve(&cli_config, &EnvConfig::from_env())?;

    info!("Initializing metrics...");
    metrics::init_metrics();

    let media_store = resolve_media_store(&config)?;

    let remote = config.ai_service_url.clone().map(|url| {
        info!("Remote composer configured at {}", url);
        RemoteComposer::new(url, config.remote_timeout_sec)
    });
    if remote.is_none() {
        info!("No remote composer configured; composing with the local script only");
    }
    let local = LocalComposer::new(
        config.python_bin.clone(),
        config.composer_script.clone(),
        Duration::from_secs(config.composer_timeout_sec),
    );
    let composer: Arc<dyn Composer> = Arc::new(FallbackComposer::new(remote, local));

    info!("Ready to serve at port {}!", config.port);
    run_server(
        ServerConfig {
            requests_logging_level: config.logging_level.clone(),
            port: config.port,
            media_root: config.media_root.clone(),
        },
        composer,
        media_store,
    )
    .await
}
