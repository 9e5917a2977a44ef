use std::time::Duration;

use crate::remote::SyncMode;

pub const DEFAULT_GIST_API_URL: &str = "https://api.github.com/gists";
pub const DEFAULT_GIST_FILE_NAME: &str = "db.json";

/// Gist connection configuration.
#[derive(Clone)]
pub struct GistConfig {
    /// Gist holding the shared document. `None` means local-only.
    pub gist_id: Option<String>,
    /// Bearer token for writes. `None` means read-only.
    pub token: Option<String>,
    /// API base, without a trailing slash.
    pub api_url: String,
    /// File inside the gist that holds the document.
    pub file_name: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for GistConfig {
    fn default() -> Self {
        Self {
            gist_id: None,
            token: None,
            api_url: DEFAULT_GIST_API_URL.to_string(),
            file_name: DEFAULT_GIST_FILE_NAME.to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

impl GistConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            gist_id: non_empty_var("GIST_ID"),
            token: non_empty_var("GITHUB_TOKEN"),
            api_url: non_empty_var("GIST_API_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_GIST_API_URL.to_string()),
            file_name: non_empty_var("GIST_FILE_NAME")
                .unwrap_or_else(|| DEFAULT_GIST_FILE_NAME.to_string()),
            timeout: Duration::from_secs(timeout_secs(
                std::env::var("HTTP_TIMEOUT_SECS").ok().as_deref(),
            )),
        }
    }

    /// The sync mode these settings allow.
    pub fn mode(&self) -> SyncMode {
        match (&self.gist_id, &self.token) {
            (None, _) => SyncMode::LocalOnly,
            (Some(_), None) => SyncMode::ReadOnly,
            (Some(_), Some(_)) => SyncMode::ReadWrite,
        }
    }
}

// Keeps the token out of debug output
impl std::fmt::Debug for GistConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GistConfig")
            .field("gist_id", &self.gist_id)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("api_url", &self.api_url)
            .field("file_name", &self.file_name)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Seconds from `HTTP_TIMEOUT_SECS`; zero or unparsable falls back to 10.
fn timeout_secs(raw: Option<&str>) -> u64 {
    raw.and_then(|s| s.trim().parse().ok())
        .filter(|secs| *secs > 0)
        .unwrap_or(10)
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
