//! Watch configuration shared by every event-processing task.
//!
//! Built once at startup and handed out behind an `Arc`; nothing writes to it
//! afterwards.

use std::collections::BTreeSet;

use tracing::warn;

use crate::errors::ConfigError;

pub const ENV_TARGET_BRANCHES: &str = "WEBHOOK_TARGET_BRANCHES";
pub const ENV_API_SPEC_FILES: &str = "WEBHOOK_API_SPEC_FILES";
pub const ENV_MANIFEST_PATH: &str = "WEBHOOK_MANIFEST_PATH";

/// Manifest fetched at the merge commit when nothing else is configured.
pub const DEFAULT_MANIFEST_PATH: &str = "pom.xml";

/// Branches and files that gate the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchConfig {
    target_branches: BTreeSet<String>,
    api_spec_files: BTreeSet<String>,
    manifest_path: String,
}

impl WatchConfig {
    /// Creates a config from explicit sets; entries are trimmed and blanks dropped.
    pub fn new<B, F>(target_branches: B, api_spec_files: F) -> Self
    where
        B: IntoIterator,
        B::Item: AsRef<str>,
        F: IntoIterator,
        F::Item: AsRef<str>,
    {
        Self {
            target_branches: normalize(target_branches),
            api_spec_files: normalize(api_spec_files),
            manifest_path: DEFAULT_MANIFEST_PATH.to_string(),
        }
    }

    pub fn with_manifest_path(mut self, path: impl Into<String>) -> Self {
        self.manifest_path = path.into();
        self
    }

    /// Loads the config from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads the config through an arbitrary variable lookup.
    ///
    /// Branch and spec-file lists are comma-separated. Unset lists yield empty
    /// sets, which makes the pipeline reject everything.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let branches = lookup(ENV_TARGET_BRANCHES).unwrap_or_default();
        let spec_files = lookup(ENV_API_SPEC_FILES).unwrap_or_default();

        let manifest_path = match lookup(ENV_MANIFEST_PATH) {
            None => DEFAULT_MANIFEST_PATH.to_string(),
            Some(v) if v.trim().is_empty() => {
                return Err(ConfigError::InvalidFormat {
                    var: ENV_MANIFEST_PATH,
                    reason: "manifest path must not be blank",
                });
            }
            Some(v) => v.trim().to_string(),
        };

        let cfg = Self::new(split_list(&branches), split_list(&spec_files))
            .with_manifest_path(manifest_path);

        if cfg.target_branches.is_empty() {
            warn!("{ENV_TARGET_BRANCHES} is empty; every merge event will be skipped");
        }
        if cfg.api_spec_files.is_empty() {
            warn!("{ENV_API_SPEC_FILES} is empty; no merge request will be analyzed");
        }

        Ok(cfg)
    }

    pub fn watches_branch(&self, branch: &str) -> bool {
        self.target_branches.contains(branch)
    }

    pub fn is_watched_spec(&self, path: &str) -> bool {
        self.api_spec_files.contains(path)
    }

    pub fn has_spec_files(&self) -> bool {
        !self.api_spec_files.is_empty()
    }

    pub fn target_branches(&self) -> &BTreeSet<String> {
        &self.target_branches
    }

    pub fn api_spec_files(&self) -> &BTreeSet<String> {
        &self.api_spec_files
    }

    pub fn manifest_path(&self) -> &str {
        &self.manifest_path
    }
}

/// Splits a comma-separated list, trimming entries and dropping blanks.
pub fn split_list(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(',').map(str::trim).filter(|s| !s.is_empty())
}

fn normalize<I>(items: I) -> BTreeSet<String>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    items
        .into_iter()
        .map(|s| s.as_ref().trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Reads a required, non-blank variable.
pub fn required_var(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
) -> Result<String, ConfigError> {
    match lookup(var) {
        Some(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
        _ => Err(ConfigError::MissingVar(var)),
    }
}

/// Reads an optional unsigned number, falling back to `default` when unset.
pub fn number_var(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    default: u64,
) -> Result<u64, ConfigError> {
    match lookup(var) {
        None => Ok(default),
        Some(v) => v.trim().parse().map_err(|e| ConfigError::InvalidNumber {
            var,
            reason: format!("{e}"),
        }),
    }
}
