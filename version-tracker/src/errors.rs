//! Error types for version-tracker.
//!
//! Only extraction and configuration can fail here. Validation rejections and
//! "no relevant change" are plain outcomes, not errors.

use thiserror::Error;

/// Result alias for the two content parsers.
pub type ExtractionResult<T> = Result<T, VersionExtractionError>;

/// Failure to read a version out of fetched file content.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VersionExtractionError {
    /// Manifest XML is malformed or is not a project descriptor.
    #[error("failed to parse manifest: {0}")]
    ManifestParse(String),

    /// API spec is neither valid YAML nor valid JSON.
    #[error("failed to parse API spec {path}: {reason}")]
    SpecParse { path: String, reason: String },

    /// API spec parsed but lacks a usable `info.version`.
    #[error("invalid API spec {path}: {reason}")]
    SpecStructure { path: String, reason: &'static str },
}

/// Error enum for environment-driven setup.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Required environment variable is missing or empty.
    #[error("missing required environment variable: {0}")]
    MissingVar(&'static str),

    /// A number failed to parse (timeouts, ports).
    #[error("invalid number in {var}: {reason}")]
    InvalidNumber { var: &'static str, reason: String },

    /// Value had the wrong format.
    #[error("invalid format in {var}: {reason}")]
    InvalidFormat { var: &'static str, reason: &'static str },
}
