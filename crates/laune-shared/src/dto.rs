//! Data Transfer Objects - GitHub Gist REST payloads.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Response of `GET /gists/{id}`, reduced to the fields the client reads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GistResponse {
    pub id: String,
    #[serde(default)]
    pub files: HashMap<String, GistFile>,
}

/// One file inside a gist.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GistFile {
    #[serde(default)]
    pub content: Option<String>,
    /// Large files arrive truncated; the full text is at `raw_url`.
    #[serde(default)]
    pub truncated: bool,
    #[serde(default)]
    pub raw_url: Option<String>,
}

/// Body of `PATCH /gists/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GistPatchRequest {
    pub files: HashMap<String, GistFileContent>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GistFileContent {
    pub content: String,
}

impl GistPatchRequest {
    /// Replace a single file's content.
    pub fn single(file_name: impl Into<String>, content: impl Into<String>) -> Self {
        let mut files = HashMap::new();
        files.insert(
            file_name.into(),
            GistFileContent {
                content: content.into(),
            },
        );
        Self { files }
    }
}
