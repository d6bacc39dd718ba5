//! Runtime configuration fetched from the serving origin at startup,
//! overriding build-time defaults without a rebuild.

use serde::Deserialize;
use tracing::debug;

use super::resolver::ClientEnv;

pub const RUNTIME_CONFIG_PATH: &str = "/app-config.json";

#[derive(Clone, Debug, Default, Deserialize)]
pub struct RuntimeConfig {
    #[serde(rename = "apiBaseUrl")]
    pub api_base_url: Option<String>,
}

/// Best-effort fetch of `{origin}/app-config.json`. Absence of an origin,
/// a non-OK response, a transport failure or unparseable JSON all yield
/// the empty config; this never fails.
pub async fn load_runtime_config(client: &reqwest::Client, env: &ClientEnv) -> RuntimeConfig {
    let Some(origin) = env.origin.as_deref() else {
        return RuntimeConfig::default();
    };

    let url = format!("{}{}", origin.trim_end_matches('/'), RUNTIME_CONFIG_PATH);
    match client.get(&url).send().await {
        Ok(response) if response.status().is_success() => {
            response.json().await.unwrap_or_else(|err| {
                debug!("Runtime config was not valid JSON: {}", err);
                RuntimeConfig::default()
            })
        }
        Ok(response) => {
            debug!("Runtime config fetch returned {}", response.status());
            RuntimeConfig::default()
        }
        Err(err) => {
            debug!("Runtime config fetch failed: {}", err);
            RuntimeConfig::default()
        }
    }
}
