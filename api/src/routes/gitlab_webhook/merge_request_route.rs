use std::sync::Arc;

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode},
};
use source_host::SourceHost;
use tracing::{info, warn};
use version_tracker::MergeRequestEvent;

use crate::{
    core::app_state::AppState,
    error_handler::{AppError, AppResult},
};

/// Header GitLab uses to echo the webhook's secret token.
pub const GITLAB_TOKEN_HEADER: &str = "X-Gitlab-Token";

/// POST /webhooks/gitlab/mergerequest
///
/// Acknowledges with 202 Accepted as soon as the payload is decoded; the
/// pipeline runs on its own task and its outcome never changes the response.
pub async fn merge_request_webhook<S: SourceHost + 'static>(
    State(state): State<Arc<AppState<S>>>,
    headers: HeaderMap,
    payload: Result<Json<MergeRequestEvent>, JsonRejection>,
) -> AppResult<StatusCode> {
    if let Some(expected) = state.webhook_secret.as_deref() {
        let given = headers
            .get(GITLAB_TOKEN_HEADER)
            .and_then(|v| v.to_str().ok());
        if given != Some(expected) {
            warn!("rejecting webhook call with missing or invalid token");
            return Err(AppError::Unauthorized("invalid webhook token"));
        }
    }

    let Json(event) = payload?;
    match event.iid() {
        Some(iid) => info!("Received webhook event for MR !{iid}"),
        None => info!("Received webhook event for MR !unknown"),
    }

    state.service.spawn(event);
    Ok(StatusCode::ACCEPTED)
}
