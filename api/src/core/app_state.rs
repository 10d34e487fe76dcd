use std::sync::Arc;
use std::time::Duration;

use source_host::{GitLabClient, ProviderConfig, SourceHost};
use tracing::info;
use version_tracker::config::{number_var, required_var};
use version_tracker::{MergeRequestService, WatchConfig};

use crate::error_handler::AppError;

/// Shared state for all HTTP handlers.
pub struct AppState<S> {
    /// Pipeline run for every accepted webhook event.
    pub service: Arc<MergeRequestService<S>>,
    /// Expected `X-Gitlab-Token` value; `None` disables the check.
    pub webhook_secret: Option<String>,
}

impl<S: SourceHost + 'static> AppState<S> {
    pub fn new(service: MergeRequestService<S>, webhook_secret: Option<String>) -> Self {
        Self {
            service: Arc::new(service),
            webhook_secret,
        }
    }
}

impl AppState<GitLabClient> {
    /// Load shared state from environment variables.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load shared state through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let base_api = required_var(&lookup, "GITLAB_API_BASE")?;
        let token = required_var(&lookup, "GITLAB_TOKEN")?;
        let timeout_secs = number_var(&lookup, "GITLAB_TIMEOUT_SECS", 30)?;

        let provider = ProviderConfig::new(base_api, token)
            .with_timeout(Duration::from_secs(timeout_secs));
        let client = GitLabClient::from_config(&provider)?;

        let watch = WatchConfig::from_lookup(&lookup)?;
        info!(
            base_api = %provider.base_api,
            timeout_secs,
            target_branches = ?watch.target_branches(),
            api_spec_files = ?watch.api_spec_files(),
            manifest_path = watch.manifest_path(),
            "webhook pipeline configured"
        );

        let webhook_secret = lookup("WEBHOOK_SECRET").filter(|s| !s.is_empty());

        Ok(Self::new(
            MergeRequestService::new(Arc::new(watch), Arc::new(client)),
            webhook_secret,
        ))
    }
}
