//! Cheap, synchronous gate in front of the pipeline.

use std::fmt;
use std::sync::Arc;

use tracing::{info, warn};

use crate::config::WatchConfig;
use crate::event::MergeRequestEvent;

pub const MERGE_REQUEST_KIND: &str = "merge_request";
pub const MERGE_ACTION: &str = "merge";

/// The first rule an event failed. Rules are checked in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// `object_kind` is not `merge_request`.
    NotMergeRequest,
    /// Attributes, last commit or a non-blank commit id are missing.
    MissingCommit,
    /// Target project id or iid are missing.
    MissingIdentifiers,
    /// Action is not `merge` (case-insensitive).
    NotMergeAction,
    /// Target branch is absent or not watched.
    UnwatchedBranch,
}

impl Rejection {
    /// 1-based position of the failed rule.
    pub fn rule(self) -> u8 {
        match self {
            Rejection::NotMergeRequest => 1,
            Rejection::MissingCommit => 2,
            Rejection::MissingIdentifiers => 3,
            Rejection::NotMergeAction => 4,
            Rejection::UnwatchedBranch => 5,
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Rejection::NotMergeRequest => "object_kind is not merge_request",
            Rejection::MissingCommit => "missing attributes or last commit id",
            Rejection::MissingIdentifiers => "missing target project id or iid",
            Rejection::NotMergeAction => "action is not merge",
            Rejection::UnwatchedBranch => "target branch is not watched",
        };
        f.write_str(s)
    }
}

/// Stateless predicate over inbound events.
#[derive(Debug, Clone)]
pub struct EventValidator {
    config: Arc<WatchConfig>,
}

impl EventValidator {
    pub fn new(config: Arc<WatchConfig>) -> Self {
        Self { config }
    }

    /// Returns the first failed rule, if any. Pure; no logging.
    pub fn check(&self, event: &MergeRequestEvent) -> Result<(), Rejection> {
        if event.object_kind.as_deref() != Some(MERGE_REQUEST_KIND) {
            return Err(Rejection::NotMergeRequest);
        }

        let Some(attrs) = event.attributes.as_ref() else {
            return Err(Rejection::MissingCommit);
        };
        let has_commit = attrs
            .last_commit
            .as_ref()
            .and_then(|c| c.id.as_deref())
            .is_some_and(|id| !id.trim().is_empty());
        if !has_commit {
            return Err(Rejection::MissingCommit);
        }

        if attrs.target_project_id.is_none() || attrs.iid.is_none() {
            return Err(Rejection::MissingIdentifiers);
        }

        let is_merge = attrs
            .action
            .as_deref()
            .is_some_and(|a| a.eq_ignore_ascii_case(MERGE_ACTION));
        if !is_merge {
            return Err(Rejection::NotMergeAction);
        }

        match attrs.target_branch.as_deref() {
            Some(branch) if self.config.watches_branch(branch) => Ok(()),
            _ => Err(Rejection::UnwatchedBranch),
        }
    }

    /// `true` when the event warrants processing; logs the failed rule otherwise.
    pub fn validate(&self, event: &MergeRequestEvent) -> bool {
        let Err(rejection) = self.check(event) else {
            return true;
        };

        let iid = event.iid();
        match rejection {
            Rejection::NotMergeRequest | Rejection::MissingCommit | Rejection::MissingIdentifiers => {
                warn!(
                    rule = rejection.rule(),
                    object_kind = ?event.object_kind,
                    mr_iid = ?iid,
                    "skipping event: {rejection}"
                );
            }
            Rejection::NotMergeAction => {
                info!(
                    rule = rejection.rule(),
                    mr_iid = ?iid,
                    action = ?event.action(),
                    "skipping MR: {rejection}"
                );
            }
            Rejection::UnwatchedBranch => {
                info!(
                    rule = rejection.rule(),
                    mr_iid = ?iid,
                    target_branch = ?event.target_branch(),
                    watched = ?self.config.target_branches(),
                    "skipping MR: {rejection}"
                );
            }
        }
        false
    }
}
