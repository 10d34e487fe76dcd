//! Narrows a merge request diff down to the watched API spec files.

use std::collections::HashSet;
use std::sync::Arc;

use source_host::{Change, SourceHost};
use tracing::{debug, warn};

use crate::config::WatchConfig;
use crate::event::MergeRequestEvent;

pub struct ChangeAnalyzer<S> {
    config: Arc<WatchConfig>,
    host: Arc<S>,
}

impl<S: SourceHost> ChangeAnalyzer<S> {
    pub fn new(config: Arc<WatchConfig>, host: Arc<S>) -> Self {
        Self { config, host }
    }

    /// Watched spec paths touched by the merge request, in diff order.
    ///
    /// A failed diff fetch and an empty diff both yield an empty list: the
    /// caller cannot and need not tell "no relevant change" from "fetch error".
    /// No request is made when no spec files are watched.
    pub async fn find_changed_spec_paths(&self, event: &MergeRequestEvent) -> Vec<String> {
        if !self.config.has_spec_files() {
            debug!("no API spec files configured for checking");
            return Vec::new();
        }

        let (Some(project_id), Some(mr_iid)) = (event.target_project_id(), event.iid()) else {
            debug!("event lacks project id or iid; nothing to analyze");
            return Vec::new();
        };

        let Some(changes) = self.host.merge_request_changes(project_id, mr_iid).await else {
            warn!(project_id, mr_iid, "no changes available for MR");
            return Vec::new();
        };

        if changes.is_empty() {
            warn!(project_id, mr_iid, "MR diff is empty");
            return Vec::new();
        }

        let matched = filter_watched(&changes, &self.config);
        debug!(
            project_id,
            mr_iid,
            files = changes.len(),
            matched = matched.len(),
            "diff filtered against watched spec files"
        );
        matched
    }
}

/// Effective paths of `changes` that are watched, first occurrence kept.
pub fn filter_watched(changes: &[Change], config: &WatchConfig) -> Vec<String> {
    let mut seen = HashSet::new();
    changes
        .iter()
        .filter_map(Change::effective_path)
        .filter(|path| config.is_watched_spec(path))
        .filter(|path| seen.insert(*path))
        .map(str::to_string)
        .collect()
}
