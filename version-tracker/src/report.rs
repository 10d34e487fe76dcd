//! The record emitted for every fully processed merge event.

use serde::Serialize;
use tracing::info;

use crate::event::MergeRequestEvent;
use crate::extractor::UNKNOWN_VERSION;

/// Number of leading SHA characters used in reports and code versions.
pub const SHORT_SHA_LEN: usize = 8;

/// Log target of emitted reports, for routing them to a dedicated sink.
pub const REPORT_TARGET: &str = "version_tracker::report";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractedVersions {
    pub mr_iid: u64,
    /// `<manifest version>-<short sha>`, or `unknown`.
    pub code_version: String,
    pub api_spec_version: String,
    pub short_sha: String,
    pub target_branch: String,
    pub mr_url: Option<String>,
    /// Spec file the API version was read from.
    pub spec_path: String,
}

impl ExtractedVersions {
    /// Assembles the report from a validated event and the two resolved versions.
    pub fn compose(
        event: &MergeRequestEvent,
        spec_path: &str,
        manifest_version: &str,
        api_spec_version: String,
    ) -> Self {
        let short_sha = short_sha(event.commit_sha());
        Self {
            mr_iid: event.iid().unwrap_or_default(),
            code_version: code_version(manifest_version, &short_sha),
            api_spec_version,
            short_sha,
            target_branch: event.target_branch().unwrap_or_default().to_string(),
            mr_url: event.url().map(str::to_string),
            spec_path: spec_path.to_string(),
        }
    }

    /// Writes the report to the log at INFO under [`REPORT_TARGET`].
    pub fn emit(&self) {
        info!(
            target: REPORT_TARGET,
            mr_iid = self.mr_iid,
            code_version = %self.code_version,
            api_spec_version = %self.api_spec_version,
            commit = %self.short_sha,
            target_branch = %self.target_branch,
            mr_url = self.mr_url.as_deref().unwrap_or(""),
            spec_path = %self.spec_path,
            "extracted versions for MR !{}",
            self.mr_iid
        );
    }
}

/// First [`SHORT_SHA_LEN`] characters of the SHA, or `unknown` if it is shorter or absent.
pub fn short_sha(sha: Option<&str>) -> String {
    match sha {
        Some(s) if s.chars().count() >= SHORT_SHA_LEN => s.chars().take(SHORT_SHA_LEN).collect(),
        _ => UNKNOWN_VERSION.to_string(),
    }
}

/// Manifest version suffixed with the short SHA; stays `unknown` when the
/// manifest version is unknown.
pub fn code_version(manifest_version: &str, short_sha: &str) -> String {
    if manifest_version == UNKNOWN_VERSION {
        UNKNOWN_VERSION.to_string()
    } else {
        format!("{manifest_version}-{short_sha}")
    }
}
