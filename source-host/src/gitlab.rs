//! GitLab provider (REST v4) for merge request diffs and repository files.
//!
//! Endpoints used:
//!   * GET /projects/:id/merge_requests/:iid/changes
//!   * GET /projects/:id/repository/files/:path?ref=:ref

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::{Client, Response, header::RETRY_AFTER};
use serde::Deserialize;
use tracing::{debug, error, warn};

use crate::errors::{SourceHostError, SourceHostResult};
use crate::types::Change;
use crate::{ProviderConfig, SourceHost, short_ref};

/// GitLab HTTP client wrapper.
#[derive(Debug, Clone)]
pub struct GitLabClient {
    http: Client,
    base_api: String, // e.g. "https://gitlab.com/api/v4"
    token: String,    // "PRIVATE-TOKEN"
}

impl GitLabClient {
    /// Constructs a GitLab client with a shared HTTP instance and auth token.
    pub fn new(http: Client, base_api: impl Into<String>, token: impl Into<String>) -> Self {
        let base_api = base_api.into().trim_end_matches('/').to_string();
        debug!("Creating GitLabClient with base_api={}", base_api);
        Self {
            http,
            base_api,
            token: token.into(),
        }
    }

    /// Builds the underlying HTTP client (user agent, timeout) from configuration.
    pub fn from_config(cfg: &ProviderConfig) -> SourceHostResult<Self> {
        let http = Client::builder()
            .user_agent("release-tracker/0.1")
            .timeout(cfg.timeout)
            .build()?;
        Ok(Self::new(http, cfg.base_api.clone(), cfg.token.clone()))
    }

    /// Fetches the diff file list of a merge request.
    ///
    /// A payload without a `changes` array is treated as an empty diff.
    pub async fn fetch_changes(&self, project_id: u64, mr_iid: u64) -> SourceHostResult<Vec<Change>> {
        let url = format!(
            "{}/projects/{}/merge_requests/{}/changes",
            self.base_api, project_id, mr_iid
        );
        debug!("GitLab fetch_changes: {}", url);

        let resp = self
            .http
            .get(url)
            .header("PRIVATE-TOKEN", &self.token)
            .send()
            .await?;

        let body: GitLabMrChanges = ensure_success(resp).await?.json().await?;

        match body.changes {
            Some(changes) => Ok(changes),
            None => {
                warn!(project_id, mr_iid, "GitLab returned no changes list for MR");
                Ok(Vec::new())
            }
        }
    }

    /// Fetches a repository file at `git_ref` and decodes it to UTF-8 text.
    ///
    /// Returns `Ok(None)` when the file does not exist at the given ref (404)
    /// or when the payload is not valid base64-encoded UTF-8.
    pub async fn fetch_file(
        &self,
        project_id: u64,
        file_path: &str,
        git_ref: &str,
    ) -> SourceHostResult<Option<String>> {
        let url = format!(
            "{}/projects/{}/repository/files/{}",
            self.base_api,
            project_id,
            urlencoding::encode(file_path),
        );
        debug!("GitLab fetch_file: {}", url);

        let resp = self
            .http
            .get(url)
            .query(&[("ref", git_ref)])
            .header("PRIVATE-TOKEN", &self.token)
            .send()
            .await?;

        if resp.status().as_u16() == 404 {
            warn!(
                project_id,
                path = file_path,
                git_ref = short_ref(git_ref),
                "file not found via GitLab API"
            );
            return Ok(None);
        }

        let resp = match ensure_success(resp).await {
            Ok(r) => r,
            Err(e) => {
                error!(
                    project_id,
                    path = file_path,
                    git_ref = short_ref(git_ref),
                    error = %e,
                    "GitLab API error fetching file"
                );
                return Err(e);
            }
        };

        let file: GitLabFileContent = resp.json().await?;
        match decode_file_content(&file) {
            Ok(text) => Ok(Some(text)),
            Err(e) => {
                warn!(path = file_path, error = %e, "discarding undecodable file content");
                Ok(None)
            }
        }
    }
}

impl SourceHost for GitLabClient {
    async fn merge_request_changes(&self, project_id: u64, mr_iid: u64) -> Option<Vec<Change>> {
        match self.fetch_changes(project_id, mr_iid).await {
            Ok(changes) => Some(changes),
            Err(e) => {
                error!(
                    project_id,
                    mr_iid,
                    status = ?e.status(),
                    error = %e,
                    "GitLab API error fetching MR changes"
                );
                None
            }
        }
    }

    async fn file_content(
        &self,
        project_id: u64,
        file_path: &str,
        git_ref: &str,
    ) -> SourceHostResult<Option<String>> {
        self.fetch_file(project_id, file_path, git_ref).await
    }
}

/// Passes 2xx responses through; turns anything else into a typed error
/// carrying the response body.
async fn ensure_success(resp: Response) -> SourceHostResult<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let retry_after = resp
        .headers()
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok());
    let body = resp.text().await.unwrap_or_default();

    Err(SourceHostError::from_status(
        status.as_u16(),
        &body,
        retry_after,
    ))
}

fn decode_file_content(file: &GitLabFileContent) -> SourceHostResult<String> {
    let encoding = file.encoding.as_deref().unwrap_or_default();
    if !encoding.eq_ignore_ascii_case("base64") {
        return Err(SourceHostError::Decode(format!(
            "unsupported encoding '{encoding}' for {}",
            file.display_name()
        )));
    }
    let Some(content) = file.content.as_deref() else {
        return Err(SourceHostError::Decode(format!(
            "missing content for {}",
            file.display_name()
        )));
    };

    // GitLab may wrap long base64 payloads.
    let compact: String = content.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = STANDARD
        .decode(compact)
        .map_err(|e| SourceHostError::Decode(format!("base64: {e}")))?;

    String::from_utf8(bytes).map_err(|e| SourceHostError::Decode(format!("utf-8: {e}")))
}

/// `/merge_requests/:iid/changes` response (subset).
#[derive(Debug, Deserialize)]
struct GitLabMrChanges {
    #[serde(default)]
    changes: Option<Vec<Change>>,
}

/// `/repository/files/:path` response (subset).
#[derive(Debug, Deserialize)]
struct GitLabFileContent {
    #[serde(default)]
    file_name: Option<String>,
    #[serde(default)]
    file_path: Option<String>,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    encoding: Option<String>,
}

impl GitLabFileContent {
    fn display_name(&self) -> &str {
        self.file_path
            .as_deref()
            .or(self.file_name.as_deref())
            .unwrap_or("<unnamed>")
    }
}
