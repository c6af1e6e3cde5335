//! Gateway for pull request discussion comments through Octocrab.
//!
//! The trait-based design lets the comment service be exercised against
//! mocks and in-memory fakes while [`OctocrabCommentGateway`] handles the
//! real HTTP requests.

mod comments;
mod error_mapping;

pub use comments::OctocrabCommentGateway;

use async_trait::async_trait;

use crate::github::error::CommentError;
use crate::github::locator::{PullRequestNumber, RepositoryLocator};
use crate::github::models::IssueComment;

/// Gateway that can read and write pull request discussion comments.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommentGateway: Send + Sync {
    /// Probe that the token can see the repository.
    async fn repository_access(&self, locator: &RepositoryLocator) -> Result<(), CommentError>;

    /// Fetch every discussion comment on the pull request, across all pages.
    async fn list_issue_comments(
        &self,
        locator: &RepositoryLocator,
        number: PullRequestNumber,
    ) -> Result<Vec<IssueComment>, CommentError>;

    /// Create a new discussion comment on the pull request.
    async fn create_issue_comment(
        &self,
        locator: &RepositoryLocator,
        number: PullRequestNumber,
        body: &str,
    ) -> Result<IssueComment, CommentError>;

    /// Replace the body of an existing discussion comment.
    async fn update_issue_comment(
        &self,
        locator: &RepositoryLocator,
        comment_id: u64,
        body: &str,
    ) -> Result<IssueComment, CommentError>;
}
