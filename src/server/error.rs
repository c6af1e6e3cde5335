//! HTTP-facing failures of the ingest endpoint.

use axum::Json;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

/// Every non-success outcome of a request to the ingest endpoint.
///
/// The display text is the `error` field of the JSON body.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IngestError {
    /// The request did not use `POST`.
    #[error("Method not allowed")]
    MethodNotAllowed,

    /// `logs` was missing, empty or not an array.
    #[error("No logs provided")]
    NoLogs,

    /// At least one element of `logs` did not decode as a log entry.
    #[error("Invalid log entries")]
    InvalidEntries {
        /// Decoder message naming the offending field.
        details: String,
    },

    /// No GitHub token is configured on the server.
    #[error("GitHub token not configured")]
    TokenNotConfigured,

    /// Neither the request nor the server supplied owner and repository.
    #[error("Repository information not available")]
    RepositoryUnavailable,

    /// The repository probe failed.
    #[error("GitHub access verification failed")]
    AccessVerificationFailed,

    /// The comment could not be written.
    #[error("Failed to process error logs")]
    Processing {
        /// Underlying failure.
        details: String,
    },
}

impl IngestError {
    /// HTTP status for this failure.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::NoLogs | Self::InvalidEntries { .. } | Self::RepositoryUnavailable => {
                StatusCode::BAD_REQUEST
            }
            Self::TokenNotConfigured
            | Self::AccessVerificationFailed
            | Self::Processing { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn details(&self) -> Option<&str> {
        match self {
            Self::InvalidEntries { details } | Self::Processing { details } => Some(details),
            _ => None,
        }
    }
}

/// JSON body of an error response.
#[derive(Debug, Serialize)]
struct ErrorBody<'error> {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<&'error str>,
}

impl IntoResponse for IngestError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorBody {
            error: self.to_string(),
            details: self.details(),
        };
        let mut response = (status, Json(body)).into_response();

        if matches!(self, Self::MethodNotAllowed) {
            response
                .headers_mut()
                .insert(header::ALLOW, HeaderValue::from_static("POST"));
        }

        response
    }
}
