//! Source-control host access for the release tracker.
//!
//! The pipeline only needs two capabilities from the host: the file list of a
//! merge request diff and the text of a file at a given ref. They are exposed
//! through the [`SourceHost`] trait (plain `async fn`-style methods returning
//! `Send` futures, no `async-trait`, no trait objects) and implemented for
//! GitLab REST v4 by [`GitLabClient`].

pub mod errors;
pub mod gitlab;
pub mod types;

use std::future::Future;
use std::time::Duration;

pub use errors::{SourceHostError, SourceHostResult};
pub use gitlab::GitLabClient;
pub use types::Change;

/// Default per-request deadline for outbound provider calls.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Runtime configuration for the provider client.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// API base, e.g. "https://gitlab.com/api/v4".
    pub base_api: String,
    /// Access token sent as `PRIVATE-TOKEN`.
    pub token: String,
    /// Deadline applied to every request.
    pub timeout: Duration,
}

impl ProviderConfig {
    pub fn new(base_api: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            base_api: base_api.into(),
            token: token.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Read-only view of a source-control host.
pub trait SourceHost: Send + Sync {
    /// Diff entries of a merge request.
    ///
    /// Returns `None` on any error or when the merge request cannot be found;
    /// failures are logged by the implementation and never surface here.
    fn merge_request_changes(
        &self,
        project_id: u64,
        mr_iid: u64,
    ) -> impl Future<Output = Option<Vec<Change>>> + Send;

    /// UTF-8 text of `file_path` at `git_ref`.
    ///
    /// `Ok(None)` when the file does not exist at that ref or its content
    /// cannot be decoded; `Err` for transport, auth and server failures.
    fn file_content(
        &self,
        project_id: u64,
        file_path: &str,
        git_ref: &str,
    ) -> impl Future<Output = SourceHostResult<Option<String>>> + Send;
}

/// Shortens a commit SHA for log lines; short inputs are returned unchanged.
pub fn short_ref(git_ref: &str) -> &str {
    git_ref.get(..8).unwrap_or(git_ref)
}
