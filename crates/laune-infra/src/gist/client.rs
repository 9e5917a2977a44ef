//! Gist-backed shared document over the GitHub REST API.

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::{Client, Response, StatusCode};

use laune_core::ports::{RemoteError, SharedDocumentStore};
use laune_shared::dto::{GistPatchRequest, GistResponse};

use super::GistConfig;

const GITHUB_ACCEPT: &str = "application/vnd.github.v3+json";
const USER_AGENT: &str = concat!("laune-map/", env!("CARGO_PKG_VERSION"));
const MAX_ERROR_BODY: usize = 200;

/// Reads and replaces one file of one gist.
///
/// Reads are public; writes need the configured token.
pub struct GistDocumentStore {
    client: Client,
    gist_url: String,
    file_name: String,
    token: Option<String>,
}

impl GistDocumentStore {
    pub fn new(gist_id: &str, config: &GistConfig) -> Result<Self, RemoteError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| RemoteError::Http(e.to_string()))?;

        Ok(Self {
            client,
            gist_url: format!("{}/{}", config.api_url, gist_id),
            file_name: config.file_name.clone(),
            token: config.token.clone(),
        })
    }

    pub fn gist_url(&self) -> &str {
        &self.gist_url
    }

    async fn fetch_raw(&self, raw_url: &str) -> Result<String, RemoteError> {
        let response = self.client.get(raw_url).send().await.map_err(transport)?;
        let response = check_status(response).await?;
        response.text().await.map_err(transport)
    }
}

/// What the gist holds for `file_name`.
#[derive(Debug, PartialEq)]
enum FileContent {
    Missing,
    Inline(String),
    Truncated(String),
}

fn select_file(gist: GistResponse, file_name: &str) -> FileContent {
    let Some(file) = gist.files.get(file_name) else {
        return FileContent::Missing;
    };

    match (file.truncated, &file.raw_url, &file.content) {
        (true, Some(raw_url), _) => FileContent::Truncated(raw_url.clone()),
        (_, _, Some(content)) => FileContent::Inline(content.clone()),
        _ => FileContent::Missing,
    }
}

fn transport(e: reqwest::Error) -> RemoteError {
    if e.is_timeout() {
        RemoteError::Timeout
    } else {
        RemoteError::Http(e.to_string())
    }
}

async fn check_status(response: Response) -> Result<Response, RemoteError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(RemoteError::Unauthorized);
    }

    let mut body = response.text().await.unwrap_or_default();
    if body.len() > MAX_ERROR_BODY {
        let cut = (0..=MAX_ERROR_BODY)
            .rev()
            .find(|i| body.is_char_boundary(*i))
            .unwrap_or(0);
        body.truncate(cut);
    }
    Err(RemoteError::Status {
        status: status.as_u16(),
        body,
    })
}

#[async_trait]
impl SharedDocumentStore for GistDocumentStore {
    async fn read(&self) -> Result<Option<String>, RemoteError> {
        let mut request = self.client.get(&self.gist_url).header(ACCEPT, GITHUB_ACCEPT);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(transport)?;
        let response = check_status(response).await?;
        let gist: GistResponse = response
            .json()
            .await
            .map_err(|e| RemoteError::Decode(e.to_string()))?;

        match select_file(gist, &self.file_name) {
            FileContent::Missing => {
                tracing::debug!(gist = %self.gist_url, file = %self.file_name, "Gist has no document file");
                Ok(None)
            }
            FileContent::Inline(content) => Ok(Some(content)),
            FileContent::Truncated(raw_url) => {
                tracing::debug!(raw_url = %raw_url, "Document truncated, fetching raw file");
                self.fetch_raw(&raw_url).await.map(Some)
            }
        }
    }

    async fn write(&self, content: &str) -> Result<(), RemoteError> {
        let token = self.token.as_ref().ok_or(RemoteError::ReadOnly)?;
        let body = GistPatchRequest::single(self.file_name.clone(), content);

        let response = self
            .client
            .patch(&self.gist_url)
            .header(ACCEPT, GITHUB_ACCEPT)
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .map_err(transport)?;
        check_status(response).await?;

        tracing::debug!(gist = %self.gist_url, bytes = content.len(), "Gist document replaced");
        Ok(())
    }

    fn can_write(&self) -> bool {
        self.token.is_some()
    }
}
