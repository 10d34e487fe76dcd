//! Release tracking for merged merge requests.
//!
//! For each "merge request merged" webhook event the pipeline:
//!
//! 1) **Validate**: cheap synchronous checks on the payload and the watched
//!    target branches ([`validator`]).
//! 2) **Analyze**: fetch the MR diff and keep only watched API spec files
//!    ([`analyzer`]).
//! 3) **Extract**: fetch the manifest and the first changed spec at the merge
//!    commit concurrently and read their versions ([`extractor`]).
//! 4) **Report**: emit one [`ExtractedVersions`] record to the log
//!    ([`report`]).
//!
//! Events are independent; the only shared state is the read-only
//! [`WatchConfig`]. Provider access goes through [`source_host::SourceHost`]
//! with static dispatch.

pub mod analyzer;
pub mod config;
pub mod errors;
pub mod event;
pub mod extractor;
pub mod report;
pub mod service;
pub mod telemetry;
pub mod validator;

#[cfg(test)]
pub(crate) mod test_utils;

pub use config::WatchConfig;
pub use errors::{ConfigError, VersionExtractionError};
pub use event::MergeRequestEvent;
pub use extractor::UNKNOWN_VERSION;
pub use report::ExtractedVersions;
pub use service::MergeRequestService;
