//! Provider-agnostic data model for merge request diffs.

use serde::{Deserialize, Serialize};

/// One file entry of a merge request diff.
///
/// Either path may be missing in provider payloads; see [`Change::effective_path`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Change {
    #[serde(default)]
    pub old_path: Option<String>,
    #[serde(default)]
    pub new_path: Option<String>,
    #[serde(default, rename = "new_file")]
    pub is_new: bool,
    #[serde(default, rename = "renamed_file")]
    pub is_renamed: bool,
    #[serde(default, rename = "deleted_file")]
    pub is_deleted: bool,
}

impl Change {
    /// Shorthand for a plain modification of `path`.
    pub fn modified(path: impl Into<String>) -> Self {
        let path = path.into();
        Self {
            old_path: Some(path.clone()),
            new_path: Some(path),
            ..Self::default()
        }
    }

    /// Path the change is attributed to: `new_path` if present, else `old_path`.
    pub fn effective_path(&self) -> Option<&str> {
        self.new_path.as_deref().or(self.old_path.as_deref())
    }
}
