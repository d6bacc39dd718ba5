use super::RequestsLoggingLevel;
use std::path::PathBuf;

#[derive(Clone)]
pub struct ServerConfig {
    pub requests_logging_level: RequestsLoggingLevel,
    pub port: u16,
    /// Directory served at `/media`; the local media store writes here.
    pub media_root: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            requests_logging_level: RequestsLoggingLevel::Path,
            port: 4000,
            media_root: PathBuf::from("public"),
        }
    }
}
