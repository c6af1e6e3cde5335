//! Resolved server-side settings for the ingest endpoint.

use crate::client::config::DEFAULT_API_ENDPOINT;
use crate::github::{GITHUB_API_BASE, PersonalAccessToken};

/// Immutable settings shared by every ingest request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestSettings {
    /// Token used for every GitHub call; `None` rejects batches with 500.
    pub token: Option<PersonalAccessToken>,
    /// Owner used when a batch does not name one.
    pub owner: Option<String>,
    /// Repository used when a batch does not name one.
    pub repository: Option<String>,
    /// GitHub API root.
    pub api_base: String,
    /// Route the ingest handler is mounted on.
    pub endpoint: String,
}

impl Default for IngestSettings {
    fn default() -> Self {
        Self {
            token: None,
            owner: None,
            repository: None,
            api_base: GITHUB_API_BASE.to_owned(),
            endpoint: DEFAULT_API_ENDPOINT.to_owned(),
        }
    }
}
