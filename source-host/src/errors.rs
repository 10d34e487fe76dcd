//! Crate-wide error hierarchy for source-host.

use thiserror::Error;

/// Convenient alias for crate-wide results.
pub type SourceHostResult<T> = Result<T, SourceHostError>;

/// Longest error body kept from a failed provider response.
pub const MAX_ERROR_BODY: usize = 512;

/// Failure talking to the source-control host.
///
/// `NotFound` is only produced by calls that cannot express absence in their
/// success type; file lookups report a missing file as `Ok(None)`.
#[derive(Debug, Error)]
pub enum SourceHostError {
    /// Not found (HTTP 404).
    #[error("not found")]
    NotFound,

    /// Unauthorized (HTTP 401).
    #[error("unauthorized")]
    Unauthorized,

    /// Forbidden (HTTP 403).
    #[error("forbidden")]
    Forbidden,

    /// Rate limited (HTTP 429).
    #[error("rate limited")]
    RateLimited {
        /// `Retry-After` hint in seconds when the provider sent one.
        retry_after_secs: Option<u64>,
    },

    /// Any other non-2xx answer, with the (truncated) response body.
    #[error("http status {status}: {body}")]
    Transport { status: u16, body: String },

    /// Timeout at transport level.
    #[error("timeout")]
    Timeout,

    /// Network/transport failure without HTTP status (DNS/connect/reset).
    #[error("network error: {0}")]
    Network(String),

    /// Unexpected/invalid shape of provider response.
    #[error("invalid provider response: {0}")]
    InvalidResponse(String),

    /// Payload could not be decoded into text.
    #[error("decode error: {0}")]
    Decode(String),
}

impl SourceHostError {
    /// Builds the error for a non-success HTTP status and its response body.
    pub fn from_status(status: u16, body: &str, retry_after_secs: Option<u64>) -> Self {
        match status {
            401 => SourceHostError::Unauthorized,
            403 => SourceHostError::Forbidden,
            404 => SourceHostError::NotFound,
            429 => SourceHostError::RateLimited { retry_after_secs },
            _ => SourceHostError::Transport {
                status,
                body: truncate_body(body),
            },
        }
    }

    /// HTTP status behind this error, when there is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            SourceHostError::NotFound => Some(404),
            SourceHostError::Unauthorized => Some(401),
            SourceHostError::Forbidden => Some(403),
            SourceHostError::RateLimited { .. } => Some(429),
            SourceHostError::Transport { status, .. } => Some(*status),
            _ => None,
        }
    }
}

fn truncate_body(body: &str) -> String {
    let body = body.trim();
    if body.is_empty() {
        return "[empty error body]".to_string();
    }
    match body.char_indices().nth(MAX_ERROR_BODY) {
        Some((cut, _)) => format!("{}…", &body[..cut]),
        None => body.to_string(),
    }
}

// ===== Mapping from reqwest::Error =====

impl From<reqwest::Error> for SourceHostError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            return SourceHostError::Timeout;
        }
        if e.is_decode() {
            return SourceHostError::InvalidResponse(e.to_string());
        }
        if let Some(status) = e.status() {
            return SourceHostError::from_status(status.as_u16(), "", None);
        }
        SourceHostError::Network(e.to_string())
    }
}
