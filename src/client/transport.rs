//! Delivery of batches to the ingest endpoint.

use async_trait::async_trait;
use http::StatusCode;
use serde::Serialize;
use thiserror::Error;
use url::Url;

use crate::entry::LogEntry;

/// Routing context sent alongside every batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RepositoryContext {
    /// Repository name; empty when unknown.
    pub repository: String,
    /// Repository owner; empty when unknown.
    pub owner: String,
}

/// Request body posted to the ingest endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchPayload {
    /// Entries in capture order.
    pub logs: Vec<LogEntry>,
    /// Repository the entries belong to.
    pub config: RepositoryContext,
}

/// Failures while delivering a batch.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The endpoint could not be resolved to an absolute URL.
    #[error("invalid ingest endpoint {endpoint}: {message}")]
    InvalidEndpoint {
        /// Configured endpoint.
        endpoint: String,
        /// Parser detail.
        message: String,
    },

    /// The request never produced a response.
    #[error("request to ingest endpoint failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The endpoint answered with a non-success status.
    #[error("ingest endpoint returned {status}: {body}")]
    Status {
        /// HTTP status returned.
        status: StatusCode,
        /// Response body, possibly empty.
        body: String,
    },
}

/// Sends batches to the ingest endpoint.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    /// Delivers one batch.
    async fn send(&self, payload: &BatchPayload) -> Result<(), TransportError>;
}

/// `reqwest`-backed transport posting JSON.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: Url,
}

impl HttpTransport {
    /// Creates a transport for an absolute endpoint URL.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::InvalidEndpoint`] when `endpoint` is not an
    /// absolute URL.
    pub fn new(endpoint: &str) -> Result<Self, TransportError> {
        let url = Url::parse(endpoint).map_err(|error| TransportError::InvalidEndpoint {
            endpoint: endpoint.to_owned(),
            message: error.to_string(),
        })?;
        Ok(Self::with_client(reqwest::Client::new(), url))
    }

    /// Resolves `endpoint` against the page origin, so relative paths such as
    /// `/api/log-error` work like they would in a browser.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::InvalidEndpoint`] when joining fails.
    pub fn for_origin(origin: &Url, endpoint: &str) -> Result<Self, TransportError> {
        let url = origin
            .join(endpoint)
            .map_err(|error| TransportError::InvalidEndpoint {
                endpoint: endpoint.to_owned(),
                message: error.to_string(),
            })?;
        Ok(Self::with_client(reqwest::Client::new(), url))
    }

    /// Resolves `endpoint` the way a page would: against `page_href` when it
    /// is a valid URL, otherwise as an absolute URL on its own.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::InvalidEndpoint`] when the endpoint cannot be
    /// made absolute.
    pub fn for_page(page_href: Option<&str>, endpoint: &str) -> Result<Self, TransportError> {
        page_href
            .and_then(|href| Url::parse(href).ok())
            .map_or_else(
                || Self::new(endpoint),
                |origin| Self::for_origin(&origin, endpoint),
            )
    }

    /// Uses a preconfigured client.
    #[must_use]
    pub const fn with_client(client: reqwest::Client, endpoint: Url) -> Self {
        Self { client, endpoint }
    }

    /// Absolute URL batches are posted to.
    #[must_use]
    pub const fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, payload: &BatchPayload) -> Result<(), TransportError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(TransportError::Status { status, body })
    }
}
