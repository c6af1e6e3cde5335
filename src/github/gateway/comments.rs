//! Octocrab implementation of [`CommentGateway`].

use async_trait::async_trait;
use http::Uri;
use octocrab::{Octocrab, Page};
use serde::Serialize;
use tracing::debug;

use crate::github::error::CommentError;
use crate::github::locator::{PersonalAccessToken, PullRequestNumber, RepositoryLocator};
use crate::github::models::{ApiComment, ApiRepository, CommentBody, IssueComment};

use super::CommentGateway;
use super::error_mapping::map_octocrab_error;

/// Largest page size GitHub accepts for issue comments.
const COMMENTS_PER_PAGE: u8 = 100;

#[derive(Serialize)]
struct ListParams {
    per_page: u8,
}

/// Gateway for pull request discussion comments backed by Octocrab.
#[derive(Debug, Clone)]
pub struct OctocrabCommentGateway {
    client: Octocrab,
}

impl OctocrabCommentGateway {
    /// Wraps an existing Octocrab client.
    #[must_use]
    pub const fn new(client: Octocrab) -> Self {
        Self { client }
    }

    /// Authenticates with `token` against `api_base`, which may be a GitHub
    /// Enterprise `/api/v3` root.
    ///
    /// Octocrab spawns its connection service on construction, so this must
    /// run inside a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns `CommentError::InvalidUrl` for an unparsable base and
    /// `CommentError::Api` when Octocrab rejects the configuration.
    pub fn for_token(token: &PersonalAccessToken, api_base: &str) -> Result<Self, CommentError> {
        let base_uri = api_base
            .parse::<Uri>()
            .map_err(|error| CommentError::InvalidUrl(error.to_string()))?;
        let client = Octocrab::builder()
            .personal_token(token.value())
            .base_uri(base_uri)
            .map_err(|error| CommentError::InvalidUrl(error.to_string()))?
            .build()
            .map_err(|error| map_octocrab_error("build client", &error))?;
        Ok(Self::new(client))
    }
}

#[async_trait]
impl CommentGateway for OctocrabCommentGateway {
    async fn repository_access(&self, locator: &RepositoryLocator) -> Result<(), CommentError> {
        let repository: ApiRepository = self
            .client
            .get(locator.repository_path(), None::<&()>)
            .await
            .map_err(|error| map_octocrab_error("repository access", &error))?;
        debug!(
            repository = repository.full_name.as_deref().unwrap_or_default(),
            "repository access confirmed"
        );
        Ok(())
    }

    async fn list_issue_comments(
        &self,
        locator: &RepositoryLocator,
        number: PullRequestNumber,
    ) -> Result<Vec<IssueComment>, CommentError> {
        let params = ListParams {
            per_page: COMMENTS_PER_PAGE,
        };
        let page = self
            .client
            .get::<Page<ApiComment>, _, _>(locator.issue_comments_path(number), Some(&params))
            .await
            .map_err(|error| map_octocrab_error("issue comments", &error))?;

        self.client
            .all_pages(page)
            .await
            .map(|comments| comments.into_iter().map(IssueComment::from).collect())
            .map_err(|error| map_octocrab_error("issue comments", &error))
    }

    async fn create_issue_comment(
        &self,
        locator: &RepositoryLocator,
        number: PullRequestNumber,
        body: &str,
    ) -> Result<IssueComment, CommentError> {
        let created: ApiComment = self
            .client
            .post(locator.issue_comments_path(number), Some(&CommentBody { body }))
            .await
            .map_err(|error| map_octocrab_error("create comment", &error))?;
        Ok(created.into())
    }

    async fn update_issue_comment(
        &self,
        locator: &RepositoryLocator,
        comment_id: u64,
        body: &str,
    ) -> Result<IssueComment, CommentError> {
        let updated: ApiComment = self
            .client
            .patch(locator.issue_comment_path(comment_id), Some(&CommentBody { body }))
            .await
            .map_err(|error| map_octocrab_error("update comment", &error))?;
        Ok(updated.into())
    }
}

#[cfg(test)]
#[path = "comments_tests.rs"]
mod tests;
