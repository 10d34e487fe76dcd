//! Pipeline orchestration for one merge event.
//!
//! validate → find changed spec files → fetch manifest and spec concurrently
//! at the merge commit → compose and emit the report.
//!
//! Every recoverable failure is absorbed here. A fetch or parse failure turns
//! that one version into `unknown`; a rejected event or an MR without watched
//! changes ends the run without a report. Nothing is retried.

use std::sync::Arc;

use source_host::{SourceHost, SourceHostError};
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use crate::analyzer::ChangeAnalyzer;
use crate::config::WatchConfig;
use crate::errors::ExtractionResult;
use crate::event::MergeRequestEvent;
use crate::extractor::{UNKNOWN_VERSION, extract_manifest_version, extract_spec_version};
use crate::report::{ExtractedVersions, short_sha};
use crate::validator::EventValidator;

/// File to resolve a version from at the merge commit.
#[derive(Debug, Clone)]
enum VersionSource {
    Manifest(String),
    Spec(String),
}

impl VersionSource {
    fn path(&self) -> &str {
        match self {
            VersionSource::Manifest(p) | VersionSource::Spec(p) => p,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            VersionSource::Manifest(_) => "manifest version",
            VersionSource::Spec(_) => "API spec version",
        }
    }

    fn extract(&self, content: &str) -> ExtractionResult<String> {
        match self {
            VersionSource::Manifest(_) => extract_manifest_version(content),
            VersionSource::Spec(path) => extract_spec_version(content, path),
        }
    }
}

pub struct MergeRequestService<S> {
    config: Arc<WatchConfig>,
    validator: EventValidator,
    analyzer: ChangeAnalyzer<S>,
    host: Arc<S>,
}

impl<S> MergeRequestService<S>
where
    S: SourceHost + 'static,
{
    pub fn new(config: Arc<WatchConfig>, host: Arc<S>) -> Self {
        Self {
            validator: EventValidator::new(config.clone()),
            analyzer: ChangeAnalyzer::new(config.clone(), host.clone()),
            config,
            host,
        }
    }

    pub fn config(&self) -> &WatchConfig {
        &self.config
    }

    /// Runs the pipeline for one event and returns the emitted report, if any.
    ///
    /// Only the first watched spec file in diff order is inspected, even when
    /// several changed in the same merge request.
    pub async fn process(&self, event: &MergeRequestEvent) -> Option<ExtractedVersions> {
        if !self.validator.validate(event) {
            return None;
        }

        let changed = self.analyzer.find_changed_spec_paths(event).await;
        let Some(spec_path) = changed.first() else {
            debug!(mr_iid = ?event.iid(), "no watched API spec file changed");
            return None;
        };
        if changed.len() > 1 {
            debug!(
                mr_iid = ?event.iid(),
                changed = ?changed,
                "several watched spec files changed; using the first"
            );
        }

        // Both were checked by the validator.
        let project_id = event.target_project_id()?;
        let sha = event.commit_sha()?.to_string();

        let manifest_source = VersionSource::Manifest(self.config.manifest_path().to_string());
        let spec_source = VersionSource::Spec(spec_path.clone());
        let (manifest_label, spec_label) = (manifest_source.label(), spec_source.label());

        let manifest = self.spawn_resolve(project_id, sha.clone(), manifest_source);
        let spec = self.spawn_resolve(project_id, sha, spec_source);

        let (manifest_version, api_spec_version) = tokio::join!(
            join_version(manifest, manifest_label),
            join_version(spec, spec_label),
        );

        let report =
            ExtractedVersions::compose(event, spec_path, &manifest_version, api_spec_version);
        report.emit();
        Some(report)
    }

    /// Processes `event` on its own task; a panic inside the pipeline is
    /// logged and does not reach the caller.
    pub fn spawn(self: &Arc<Self>, event: MergeRequestEvent) -> JoinHandle<()> {
        let service = Arc::clone(self);
        tokio::spawn(async move {
            let iid = event.iid();
            let run = tokio::spawn(async move { service.process(&event).await });
            if let Err(e) = run.await {
                error!(mr_iid = ?iid, error = %e, "merge request processing aborted");
            }
        })
    }

    fn spawn_resolve(&self, project_id: u64, sha: String, source: VersionSource) -> JoinHandle<String> {
        let host = Arc::clone(&self.host);
        tokio::spawn(async move { resolve_version(host.as_ref(), project_id, &sha, &source).await })
    }
}

/// Fetches one file and extracts its version, degrading every failure to `unknown`.
async fn resolve_version<S: SourceHost>(
    host: &S,
    project_id: u64,
    sha: &str,
    source: &VersionSource,
) -> String {
    let path = source.path();
    let commit = short_sha(Some(sha));

    let content = match host.file_content(project_id, path, sha).await {
        Ok(Some(content)) => content,
        Ok(None) => {
            warn!(path, commit = %commit, "{} unavailable: file missing at commit", source.label());
            return UNKNOWN_VERSION.to_string();
        }
        Err(e) => {
            log_fetch_error(source, &commit, &e);
            return UNKNOWN_VERSION.to_string();
        }
    };

    match source.extract(&content) {
        Ok(version) => version,
        Err(e) => {
            warn!(path, commit = %commit, error = %e, "failed to extract {}", source.label());
            UNKNOWN_VERSION.to_string()
        }
    }
}

fn log_fetch_error(source: &VersionSource, commit: &str, e: &SourceHostError) {
    warn!(
        path = source.path(),
        commit,
        status = ?e.status(),
        error = %e,
        "failed to fetch file for {}",
        source.label()
    );
}

async fn join_version(handle: JoinHandle<String>, label: &str) -> String {
    match handle.await {
        Ok(version) => version,
        Err(e) => {
            error!(error = %e, "{label} task failed");
            UNKNOWN_VERSION.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{
        COMMIT_SHA, FakeFile, FakeSourceHost, HostCall, MR_IID, PROJECT_ID, merge_event,
    };

    const POM: &str = "<project><version>1.0.0</version></project>";
    const SPEC: &str = "info:\n  version: \"1.2.3\"";
    const SPEC_PATH: &str = "spec/api.yaml";

    fn service(host: FakeSourceHost) -> (MergeRequestService<FakeSourceHost>, Arc<FakeSourceHost>) {
        let cfg = Arc::new(WatchConfig::new(["main"], [SPEC_PATH, "other/spec.json"]));
        let host = Arc::new(host);
        (MergeRequestService::new(cfg, host.clone()), host)
    }

    #[tokio::test]
    async fn reports_both_versions() {
        let (svc, host) = service(
            FakeSourceHost::with_changes([SPEC_PATH])
                .text("pom.xml", POM)
                .text(SPEC_PATH, SPEC),
        );

        let report = svc.process(&merge_event()).await.expect("report");
        assert_eq!(report.mr_iid, MR_IID);
        assert_eq!(report.code_version, "1.0.0-abcdef12");
        assert_eq!(report.api_spec_version, "1.2.3");
        assert_eq!(report.short_sha, "abcdef12");
        assert_eq!(report.target_branch, "main");

        let calls = host.calls();
        assert_eq!(calls.len(), 3);
        assert!(calls.contains(&HostCall::File {
            project_id: PROJECT_ID,
            path: "pom.xml".into(),
            git_ref: COMMIT_SHA.into(),
        }));
        assert!(calls.contains(&HostCall::File {
            project_id: PROJECT_ID,
            path: SPEC_PATH.into(),
            git_ref: COMMIT_SHA.into(),
        }));
    }

    #[tokio::test]
    async fn invalid_event_makes_no_calls() {
        let (svc, host) = service(FakeSourceHost::with_changes([SPEC_PATH]));

        let mut wrong_action = merge_event();
        wrong_action.attributes.as_mut().unwrap().action = Some("open".into());
        let mut wrong_branch = merge_event();
        wrong_branch.attributes.as_mut().unwrap().target_branch = Some("feature".into());
        let mut wrong_kind = merge_event();
        wrong_kind.object_kind = Some("push".into());

        let mut blank_commit = merge_event();
        blank_commit.attributes.as_mut().unwrap().last_commit.as_mut().unwrap().id =
            Some("  ".into());
        let mut missing_iid = merge_event();
        missing_iid.attributes.as_mut().unwrap().iid = None;

        for event in [wrong_kind, blank_commit, missing_iid, wrong_action, wrong_branch] {
            assert!(svc.process(&event).await.is_none());
        }
        assert!(host.calls().is_empty());
    }

    #[tokio::test]
    async fn unrelated_diff_fetches_diff_only() {
        let (svc, host) = service(FakeSourceHost::with_changes(["README.md"]).text("pom.xml", POM));

        assert!(svc.process(&merge_event()).await.is_none());
        assert_eq!(
            host.calls(),
            vec![HostCall::Changes {
                project_id: PROJECT_ID,
                mr_iid: MR_IID
            }]
        );
    }

    #[tokio::test]
    async fn only_first_changed_spec_is_used() {
        let (svc, host) = service(
            FakeSourceHost::with_changes([SPEC_PATH, "other/spec.json"])
                .text("pom.xml", POM)
                .text(SPEC_PATH, SPEC)
                .text("other/spec.json", r#"{"info":{"version":"9.9.9"}}"#),
        );

        let report = svc.process(&merge_event()).await.expect("report");
        assert_eq!(report.api_spec_version, "1.2.3");
        assert_eq!(report.spec_path, SPEC_PATH);
        assert_eq!(host.file_paths_requested(), vec!["pom.xml", SPEC_PATH]);
    }

    #[tokio::test]
    async fn missing_manifest_degrades_code_version() {
        let (svc, _) = service(
            FakeSourceHost::with_changes([SPEC_PATH])
                .file("pom.xml", FakeFile::Missing)
                .text(SPEC_PATH, SPEC),
        );

        let report = svc.process(&merge_event()).await.expect("report");
        assert_eq!(report.code_version, "unknown");
        assert_eq!(report.api_spec_version, "1.2.3");
    }

    #[tokio::test]
    async fn transport_failure_degrades_spec_version() {
        let (svc, _) = service(
            FakeSourceHost::with_changes([SPEC_PATH])
                .text("pom.xml", POM)
                .file(SPEC_PATH, FakeFile::Status(503)),
        );

        let report = svc.process(&merge_event()).await.expect("report");
        assert_eq!(report.code_version, "1.0.0-abcdef12");
        assert_eq!(report.api_spec_version, "unknown");
    }

    #[tokio::test]
    async fn parse_failures_degrade_independently() {
        let (svc, _) = service(
            FakeSourceHost::with_changes([SPEC_PATH])
                .text("pom.xml", "<project><version>1.0.0</project>")
                .text(SPEC_PATH, "info:\n  title: API"),
        );

        let report = svc.process(&merge_event()).await.expect("report");
        assert_eq!(report.code_version, "unknown");
        assert_eq!(report.api_spec_version, "unknown");
    }

    #[tokio::test]
    async fn manifest_without_version_reports_unknown() {
        let (svc, _) = service(
            FakeSourceHost::with_changes([SPEC_PATH])
                .text("pom.xml", "<project><artifactId>x</artifactId></project>")
                .text(SPEC_PATH, SPEC),
        );

        let report = svc.process(&merge_event()).await.expect("report");
        assert_eq!(report.code_version, "unknown");
    }

    #[tokio::test]
    async fn short_commit_sha_is_unknown() {
        let (svc, _) = service(
            FakeSourceHost::with_changes([SPEC_PATH])
                .text("pom.xml", POM)
                .text(SPEC_PATH, SPEC),
        );
        let mut event = merge_event();
        event.attributes.as_mut().unwrap().last_commit.as_mut().unwrap().id = Some("abc123".into());

        let report = svc.process(&event).await.expect("report");
        assert_eq!(report.short_sha, "unknown");
        assert_eq!(report.code_version, "1.0.0-unknown");
    }

    #[tokio::test]
    async fn custom_manifest_path_is_fetched() {
        let cfg = Arc::new(
            WatchConfig::new(["main"], [SPEC_PATH]).with_manifest_path("service/pom.xml"),
        );
        let host = Arc::new(
            FakeSourceHost::with_changes([SPEC_PATH])
                .text("service/pom.xml", POM)
                .text(SPEC_PATH, SPEC),
        );
        let svc = MergeRequestService::new(cfg, host.clone());

        let report = svc.process(&merge_event()).await.expect("report");
        assert_eq!(report.code_version, "1.0.0-abcdef12");
        assert_eq!(host.file_paths_requested(), vec!["service/pom.xml", SPEC_PATH]);
    }

    #[tokio::test]
    async fn panicking_manifest_fetch_degrades_code_version() {
        let (svc, _) = service(
            FakeSourceHost::with_changes([SPEC_PATH])
                .file("pom.xml", FakeFile::Panic)
                .text(SPEC_PATH, SPEC),
        );

        let report = svc.process(&merge_event()).await.expect("report");
        assert_eq!(report.code_version, "unknown");
        assert_eq!(report.api_spec_version, "1.2.3");
    }

    #[tokio::test]
    async fn spawned_processing_completes() {
        let (svc, host) = service(
            FakeSourceHost::with_changes([SPEC_PATH])
                .text("pom.xml", POM)
                .text(SPEC_PATH, SPEC),
        );
        let svc = Arc::new(svc);

        svc.spawn(merge_event()).await.unwrap();
        assert_eq!(host.calls().len(), 3);
    }
}
