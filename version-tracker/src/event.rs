//! Inbound GitLab "Merge Request Hook" payload (subset).
//!
//! Every field is optional on the wire; presence is checked by the validator
//! rather than by deserialization, so that an incomplete event is skipped
//! instead of rejected at the HTTP layer. Unknown fields are ignored.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeRequestEvent {
    #[serde(default)]
    pub object_kind: Option<String>,
    #[serde(default)]
    pub event_type: Option<String>,
    #[serde(default, rename = "object_attributes")]
    pub attributes: Option<MergeRequestAttributes>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeRequestAttributes {
    #[serde(default)]
    pub state: Option<String>,
    /// Lifecycle action: "open", "update", "merge", "close", ...
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub target_branch: Option<String>,
    #[serde(default)]
    pub last_commit: Option<Commit>,
    /// Merge request number, scoped to the project.
    #[serde(default)]
    pub iid: Option<u64>,
    #[serde(default)]
    pub source_project_id: Option<u64>,
    #[serde(default)]
    pub target_project_id: Option<u64>,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    #[serde(default)]
    pub id: Option<String>,
}

impl MergeRequestEvent {
    pub fn iid(&self) -> Option<u64> {
        self.attributes.as_ref()?.iid
    }

    pub fn target_project_id(&self) -> Option<u64> {
        self.attributes.as_ref()?.target_project_id
    }

    pub fn target_branch(&self) -> Option<&str> {
        self.attributes.as_ref()?.target_branch.as_deref()
    }

    pub fn action(&self) -> Option<&str> {
        self.attributes.as_ref()?.action.as_deref()
    }

    /// SHA of the last commit of the merge request.
    pub fn commit_sha(&self) -> Option<&str> {
        self.attributes.as_ref()?.last_commit.as_ref()?.id.as_deref()
    }

    pub fn url(&self) -> Option<&str> {
        self.attributes.as_ref()?.url.as_deref()
    }
}
