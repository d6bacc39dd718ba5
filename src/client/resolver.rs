//! Builds the ordered list of backend base URLs the relay will try.

use url::Url;

use super::runtime_config::RuntimeConfig;

/// Compile-time default backend URL, baked into the binary the way a
/// bundler would inline it.
pub const BUILD_TIME_API_URL: Option<&str> = option_env!("HARMONYAI_API_URL");

const FINAL_FALLBACK: &str = "http://localhost:4000";

/// Where the client is running from; the non-browser analogue of
/// `window.location`. With no origin only the explicit, stored, build-time
/// and loopback sources apply.
#[derive(Clone, Debug, Default)]
pub struct ClientEnv {
    /// Origin the client is served from (e.g. "http://localhost:5173").
    pub origin: Option<String>,
}

impl ClientEnv {
    pub fn with_origin(origin: impl Into<String>) -> Self {
        Self {
            origin: Some(origin.into()),
        }
    }

    fn parsed_origin(&self) -> Option<Url> {
        self.origin.as_deref().and_then(|o| Url::parse(o).ok())
    }

    pub fn hostname(&self) -> Option<String> {
        self.parsed_origin()
            .and_then(|u| u.host_str().map(|h| h.to_string()))
    }

    pub fn scheme(&self) -> Option<String> {
        self.parsed_origin().map(|u| u.scheme().to_string())
    }

    pub fn is_local(&self) -> bool {
        self.hostname()
            .map(|h| is_local_hostname(&h))
            .unwrap_or(false)
    }
}

pub fn is_local_hostname(hostname: &str) -> bool {
    matches!(
        hostname.to_lowercase().as_str(),
        "localhost" | "127.0.0.1" | "0.0.0.0"
    )
}

/// Does the candidate point at a loopback address? Relative candidates are
/// resolved against the origin when there is one.
fn is_local_url(candidate: &str, env: &ClientEnv) -> bool {
    if candidate.is_empty() {
        return false;
    }
    let url = match Url::parse(candidate) {
        Ok(url) => url,
        Err(_) => {
            let base = env
                .parsed_origin()
                .unwrap_or_else(|| Url::parse("http://localhost").expect("static URL"));
            match base.join(candidate) {
                Ok(url) => url,
                Err(_) => return false,
            }
        }
    };
    url.host_str().map(is_local_hostname).unwrap_or(false)
}

/// Trim and strip trailing slashes. The empty string is a valid candidate
/// meaning "same origin"; whitespace-only input is no candidate at all.
fn normalize_candidate(value: &str) -> Option<String> {
    if value.is_empty() {
        return Some(String::new());
    }
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.trim_end_matches('/').to_string())
}

/// Produce the ordered, de-duplicated candidate list.
///
/// Candidates from the runtime config, the stored settings and the
/// same-origin shorthand are dropped when they would point a page served
/// from a non-local origin at somebody's loopback; an explicitly passed
/// preferred base is always honored.
pub fn resolve_base_candidates(
    preferred: Option<&str>,
    runtime: &RuntimeConfig,
    stored: Option<&str>,
    env: &ClientEnv,
) -> Vec<String> {
    let mut candidates: Vec<String> = Vec::new();
    let origin_is_remote = matches!(env.hostname(), Some(ref h) if !is_local_hostname(h));

    let mut add = |list: &mut Vec<String>, value: Option<&str>, allow_remote_localhost: bool| {
        let Some(value) = value else { return };
        let Some(normalized) = normalize_candidate(value) else {
            return;
        };
        if list.contains(&normalized) {
            return;
        }
        if !allow_remote_localhost && origin_is_remote && is_local_url(&normalized, env) {
            return;
        }
        list.push(normalized);
    };

    // Empty runtime-config and stored values mean "not configured", not
    // "same origin"
    let runtime_base = runtime
        .api_base_url
        .as_deref()
        .filter(|v| !v.trim().is_empty());
    let stored = stored.filter(|v| !v.trim().is_empty());

    add(&mut candidates, preferred, true);
    add(&mut candidates, runtime_base, false);
    add(&mut candidates, stored, false);
    add(&mut candidates, BUILD_TIME_API_URL, true);

    if let Some(origin) = env.origin.as_deref().and_then(normalize_candidate) {
        add(&mut candidates, Some(origin.as_str()), true);
        add(&mut candidates, Some(format!("{}/api", origin).as_str()), true);
        add(&mut candidates, Some(""), false);

        if env.is_local() {
            let scheme = env.scheme().unwrap_or_else(|| "http".to_string());
            add(
                &mut candidates,
                Some(format!("{}://localhost:4000", scheme).as_str()),
                true,
            );
            add(
                &mut candidates,
                Some(format!("{}://127.0.0.1:4000", scheme).as_str()),
                true,
            );
        }
    } else {
        add(&mut candidates, Some(""), true);
    }

    add(&mut candidates, Some(FINAL_FALLBACK), true);

    candidates
}
