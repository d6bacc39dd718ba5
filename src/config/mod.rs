use crate::server::RequestsLoggingLevel;
use anyhow::{Context, Result};
use std::path::PathBuf;

pub const DEFAULT_PORT: u16 = 4000;
pub const DEFAULT_PYTHON_BIN: &str = "python3";
pub const DEFAULT_COMPOSER_SCRIPT: &str = "composer-ai/app/cli.py";
pub const DEFAULT_MEDIA_ROOT: &str = "public";
pub const DEFAULT_REMOTE_TIMEOUT_SEC: u64 = 60;
pub const DEFAULT_COMPOSER_TIMEOUT_SEC: u64 = 120;

/// CLI arguments that take part in config resolution. Mirrors the flags
/// accepted by the server binary; `None` means the flag was not given.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub port: Option<u16>,
    pub ai_service_url: Option<String>,
    pub remote_timeout_sec: Option<u64>,
    pub python_bin: Option<String>,
    pub composer_script: Option<PathBuf>,
    pub composer_timeout_sec: Option<u64>,
    pub media_root: Option<PathBuf>,
    pub firebase_bucket: Option<String>,
    pub firebase_credentials: Option<String>,
    pub logging_level: Option<RequestsLoggingLevel>,
}

/// Environment surface, read once at startup.
#[derive(Debug, Clone, Default)]
pub struct EnvConfig {
    pub port: Option<u16>,
    pub ai_service_url: Option<String>,
    pub firebase_bucket: Option<String>,
    pub firebase_credentials: Option<String>,
    pub python_bin: Option<String>,
}

fn non_empty_var(name: &str) -> Option<String> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Some(value.trim().to_string()),
        _ => None,
    }
}

impl EnvConfig {
    pub fn from_env() -> Self {
        Self {
            port: non_empty_var("PORT").and_then(|v| v.parse().ok()),
            ai_service_url: non_empty_var("AI_SERVICE_URL"),
            firebase_bucket: non_empty_var("FIREBASE_BUCKET"),
            firebase_credentials: non_empty_var("FIREBASE_CREDENTIALS"),
            python_bin: non_empty_var("PYTHON_BIN"),
        }
    }
}

/// Fully resolved server configuration, computed once at process start and
/// passed by reference into the subsystems that need it. There is no lazy
/// re-resolution later.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    /// Base URL of the remote composer service. `None` means the local
    /// fallback composer is the only path.
    pub ai_service_url: Option<String>,
    pub remote_timeout_sec: u64,
    pub python_bin: String,
    pub composer_script: PathBuf,
    pub composer_timeout_sec: u64,
    pub media_root: PathBuf,
    pub firebase_bucket: Option<String>,
    /// Service account key JSON, already read from disk when the variable
    /// held a file path.
    pub firebase_credentials: Option<String>,
    pub logging_level: RequestsLoggingLevel,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and the environment.
    /// CLI flags win over environment variables, which win over defaults.
    pub fn resolve(cli: &CliConfig, env: &EnvConfig) -> Result<Self> {
        let port = cli.port.or(env.port).unwrap_or(DEFAULT_PORT);

        let ai_service_url = cli
            .ai_service_url
            .clone()
            .or_else(|| env.ai_service_url.clone())
            .map(|url| url.trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty());

        let firebase_bucket = cli
            .firebase_bucket
            .clone()
            .or_else(|| env.firebase_bucket.clone());

        let firebase_credentials = cli
            .firebase_credentials
            .clone()
            .or_else(|| env.firebase_credentials.clone())
            .map(|raw| resolve_credentials(&raw))
            .transpose()?;

        Ok(Self {
            port,
            ai_service_url,
            remote_timeout_sec: cli
                .remote_timeout_sec
                .unwrap_or(DEFAULT_REMOTE_TIMEOUT_SEC),
            python_bin: cli
                .python_bin
                .clone()
                .or_else(|| env.python_bin.clone())
                .unwrap_or_else(|| DEFAULT_PYTHON_BIN.to_string()),
            composer_script: cli
                .composer_script
                .clone()
                .unwrap_or_else(|| PathBuf::from(DEFAULT_COMPOSER_SCRIPT)),
            composer_timeout_sec: cli
                .composer_timeout_sec
                .unwrap_or(DEFAULT_COMPOSER_TIMEOUT_SEC),
            media_root: cli
                .media_root
                .clone()
                .unwrap_or_else(|| PathBuf::from(DEFAULT_MEDIA_ROOT)),
            firebase_bucket,
            firebase_credentials,
            logging_level: cli.logging_level.clone().unwrap_or_default(),
        })
    }
}

/// The credentials variable holds either the service account key JSON
/// itself or a path to a file containing it.
fn resolve_credentials(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    if trimmed.starts_with('{') {
        return Ok(trimmed.to_string());
    }
    std::fs::read_to_string(trimmed)
        .with_context(|| format!("Error reading credentials file: {}", trimmed))
}
