//! Shared fixtures for unit tests.

use std::collections::HashMap;
use std::sync::Mutex;

use source_host::{Change, SourceHost, SourceHostError, SourceHostResult};

use crate::event::{Commit, MergeRequestAttributes, MergeRequestEvent};

pub const PROJECT_ID: u64 = 123;
pub const MR_IID: u64 = 456;
pub const COMMIT_SHA: &str = "abcdef1234567890";
pub const MR_URL: &str = "http://example.com/mr/456";

/// A merge into `main` that passes validation with `main` watched.
pub fn merge_event() -> MergeRequestEvent {
    MergeRequestEvent {
        object_kind: Some("merge_request".into()),
        event_type: Some("merge_request".into()),
        attributes: Some(MergeRequestAttributes {
            state: Some("merged".into()),
            action: Some("merge".into()),
            target_branch: Some("main".into()),
            last_commit: Some(Commit {
                id: Some(COMMIT_SHA.into()),
            }),
            iid: Some(MR_IID),
            source_project_id: Some(PROJECT_ID),
            target_project_id: Some(PROJECT_ID),
            url: Some(MR_URL.into()),
        }),
    }
}

/// Recorded call against [`FakeSourceHost`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCall {
    Changes { project_id: u64, mr_iid: u64 },
    File { project_id: u64, path: String, git_ref: String },
}

/// Canned answer for one file path.
#[derive(Debug, Clone)]
pub enum FakeFile {
    Text(String),
    Missing,
    Status(u16),
    /// The fetch itself panics.
    Panic,
}

/// In-memory host that serves canned diffs and files and records every call.
#[derive(Debug, Default)]
pub struct FakeSourceHost {
    changes: Option<Vec<Change>>,
    files: HashMap<String, FakeFile>,
    calls: Mutex<Vec<HostCall>>,
}

impl FakeSourceHost {
    pub fn with_changes<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        Self {
            changes: Some(paths.into_iter().map(Change::modified).collect()),
            ..Self::default()
        }
    }

    /// Host whose diff endpoint fails (answers "absent").
    pub fn failing_diff() -> Self {
        Self::default()
    }

    pub fn change_list(mut self, changes: Vec<Change>) -> Self {
        self.changes = Some(changes);
        self
    }

    pub fn file(mut self, path: &str, answer: FakeFile) -> Self {
        self.files.insert(path.to_string(), answer);
        self
    }

    pub fn text(self, path: &str, content: &str) -> Self {
        self.file(path, FakeFile::Text(content.to_string()))
    }

    pub fn calls(&self) -> Vec<HostCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn file_paths_requested(&self) -> Vec<String> {
        let mut paths: Vec<String> = self
            .calls()
            .into_iter()
            .filter_map(|c| match c {
                HostCall::File { path, .. } => Some(path),
                HostCall::Changes { .. } => None,
            })
            .collect();
        paths.sort();
        paths
    }
}

impl SourceHost for FakeSourceHost {
    async fn merge_request_changes(&self, project_id: u64, mr_iid: u64) -> Option<Vec<Change>> {
        self.calls
            .lock()
            .unwrap()
            .push(HostCall::Changes { project_id, mr_iid });
        self.changes.clone()
    }

    async fn file_content(
        &self,
        project_id: u64,
        file_path: &str,
        git_ref: &str,
    ) -> SourceHostResult<Option<String>> {
        self.calls.lock().unwrap().push(HostCall::File {
            project_id,
            path: file_path.to_string(),
            git_ref: git_ref.to_string(),
        });
        match self.files.get(file_path) {
            Some(FakeFile::Text(t)) => Ok(Some(t.clone())),
            Some(FakeFile::Missing) | None => Ok(None),
            Some(FakeFile::Status(status)) => {
                Err(SourceHostError::from_status(*status, "fake failure", None))
            }
            Some(FakeFile::Panic) => panic!("fake host crashed fetching {file_path}"),
        }
    }
}
