//! HTTP ingest endpoint that turns client batches into PR comments.
//!
//! Requests move through a fixed sequence of checks: method, body, token,
//! repository, pull request number and repository access. The first failing
//! check decides the response; only a batch that passes all of them reaches
//! the [`PrCommentService`].

mod error;
mod settings;

pub use error::IngestError;
pub use settings::IngestSettings;

use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::Method;
use axum::routing::any;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, info, warn};

use crate::comment::{PrCommentService, PullRequestLocks};
use crate::entry::LogEntry;
use crate::github::{
    CommentError, CommentGateway, OctocrabCommentGateway, PullRequestNumber, RepositoryLocator,
};

/// State shared by every request to the ingest endpoint.
pub struct IngestState {
    settings: IngestSettings,
    gateway: Option<Arc<dyn CommentGateway>>,
    locks: PullRequestLocks,
}

impl IngestState {
    /// Builds the Octocrab gateway when a token is configured.
    ///
    /// Must be called inside a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`CommentError`] when the API base is unusable.
    pub fn new(settings: IngestSettings) -> Result<Self, CommentError> {
        let gateway = settings
            .token
            .as_ref()
            .map(|token| OctocrabCommentGateway::for_token(token, &settings.api_base))
            .transpose()?
            .map(|octocrab| Arc::new(octocrab) as Arc<dyn CommentGateway>);
        Ok(Self::with_gateway(settings, gateway))
    }

    /// Uses `gateway` for GitHub calls; `None` behaves as an unset token.
    #[must_use]
    pub fn with_gateway(
        settings: IngestSettings,
        gateway: Option<Arc<dyn CommentGateway>>,
    ) -> Self {
        Self {
            settings,
            gateway,
            locks: PullRequestLocks::new(),
        }
    }

    /// Settings this state was built from.
    #[must_use]
    pub const fn settings(&self) -> &IngestSettings {
        &self.settings
    }
}

/// Router serving the ingest handler on the configured endpoint.
///
/// Every method is routed to the handler so that non-`POST` requests get the
/// JSON 405 body rather than an empty default.
#[must_use]
pub fn router(state: Arc<IngestState>) -> Router {
    let endpoint = state.settings.endpoint.clone();
    Router::new()
        .route(&endpoint, any(handle_error_logs))
        .with_state(state)
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RequestConfig {
    repository: Option<String>,
    owner: Option<String>,
}

/// Successful response body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct IngestResponse {
    message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pr_number: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    log_count: Option<usize>,
}

struct Batch {
    logs: Vec<LogEntry>,
    config: RequestConfig,
}

async fn handle_error_logs(
    State(state): State<Arc<IngestState>>,
    method: Method,
    body: Bytes,
) -> Result<Json<IngestResponse>, IngestError> {
    if method != Method::POST {
        return Err(IngestError::MethodNotAllowed);
    }

    let Batch { logs, config } = decode_batch(&body)?;

    let Some(gateway) = state.gateway.as_deref() else {
        error!("GitHub token is not configured");
        return Err(IngestError::TokenNotConfigured);
    };

    let locator = resolve_repository(&state.settings, config)?;

    let Some(number) = logs
        .first()
        .and_then(|entry| entry.pr_number)
        .and_then(|number| PullRequestNumber::new(number).ok())
    else {
        info!(logs = logs.len(), "no PR number found, skipping GitHub comment");
        return Ok(Json(IngestResponse {
            message: "Logs received but no PR number found",
            pr_number: None,
            log_count: None,
        }));
    };
    warn_on_mixed_pull_requests(&logs, number);

    let service = PrCommentService::new(gateway, &locator, &state.locks);
    if !service.verify_access().await {
        return Err(IngestError::AccessVerificationFailed);
    }

    service
        .post_or_update(number, &logs)
        .await
        .map_err(|failure| {
            error!(
                repository = %locator.slug(),
                pr = number.get(),
                error = %failure,
                "failed to process error logs"
            );
            IngestError::Processing {
                details: failure.to_string(),
            }
        })?;

    Ok(Json(IngestResponse {
        message: "Error logs processed successfully",
        pr_number: Some(number.get()),
        log_count: Some(logs.len()),
    }))
}

/// Validates the JSON body into entries plus the optional request config.
///
/// A body that is not JSON, or lacks a non-empty `logs` array, is treated as
/// carrying no logs.
fn decode_batch(body: &[u8]) -> Result<Batch, IngestError> {
    let Ok(Value::Object(mut fields)) = serde_json::from_slice::<Value>(body) else {
        return Err(IngestError::NoLogs);
    };
    let items = match fields.remove("logs") {
        Some(Value::Array(array)) if !array.is_empty() => array,
        _ => return Err(IngestError::NoLogs),
    };
    let logs: Vec<LogEntry> = serde_json::from_value(Value::Array(items)).map_err(|failure| {
        IngestError::InvalidEntries {
            details: failure.to_string(),
        }
    })?;
    let config = fields
        .remove("config")
        .and_then(|value| serde_json::from_value(value).ok())
        .unwrap_or_default();
    Ok(Batch { logs, config })
}

fn resolve_repository(
    settings: &IngestSettings,
    config: RequestConfig,
) -> Result<RepositoryLocator, IngestError> {
    let owner = non_blank(config.owner).or_else(|| non_blank(settings.owner.clone()));
    let repository =
        non_blank(config.repository).or_else(|| non_blank(settings.repository.clone()));
    let (Some(owner), Some(repository)) = (owner, repository) else {
        error!("repository information not available");
        return Err(IngestError::RepositoryUnavailable);
    };
    RepositoryLocator::new(&settings.api_base, &owner, &repository).map_err(|failure| {
        IngestError::Processing {
            details: failure.to_string(),
        }
    })
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|text| !text.trim().is_empty())
}

fn warn_on_mixed_pull_requests(logs: &[LogEntry], number: PullRequestNumber) {
    let stray = logs
        .iter()
        .filter_map(|entry| entry.pr_number)
        .filter(|other| *other != number.get())
        .count();
    if stray > 0 {
        warn!(
            pr = number.get(),
            stray,
            "batch carries entries for other pull requests; commenting on the first entry's PR"
        );
    }
}

#[cfg(test)]
mod tests;
