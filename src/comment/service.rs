//! Find-or-create management of the aggregate pull request comment.

use tracing::{info, warn};

use super::locks::PullRequestLocks;
use super::render::{COMMENT_MARKER, render_comment_body};
use crate::entry::LogEntry;
use crate::github::{CommentError, CommentGateway, PullRequestNumber, RepositoryLocator};

/// What [`PrCommentService::post_or_update`] did on GitHub.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentAction {
    /// No marked comment existed, so a new one was posted.
    Created {
        /// Identifier of the new comment.
        comment_id: u64,
    },
    /// The existing marked comment was rewritten in place.
    Updated {
        /// Identifier of the rewritten comment.
        comment_id: u64,
    },
}

impl CommentAction {
    /// Identifier of the comment that now carries the render.
    #[must_use]
    pub const fn comment_id(self) -> u64 {
        match self {
            Self::Created { comment_id } | Self::Updated { comment_id } => comment_id,
        }
    }
}

/// Keeps a single marked error-summary comment per pull request.
pub struct PrCommentService<'client, Gateway>
where
    Gateway: CommentGateway + ?Sized,
{
    gateway: &'client Gateway,
    locator: &'client RepositoryLocator,
    locks: &'client PullRequestLocks,
}

impl<'client, Gateway> PrCommentService<'client, Gateway>
where
    Gateway: CommentGateway + ?Sized,
{
    /// Binds the service to a gateway, a repository and the process-wide lock
    /// table.
    #[must_use]
    pub const fn new(
        gateway: &'client Gateway,
        locator: &'client RepositoryLocator,
        locks: &'client PullRequestLocks,
    ) -> Self {
        Self {
            gateway,
            locator,
            locks,
        }
    }

    /// Checks that the token can read the repository.
    ///
    /// Failures are logged and reported as `false`.
    pub async fn verify_access(&self) -> bool {
        match self.gateway.repository_access(self.locator).await {
            Ok(()) => true,
            Err(error) => {
                warn!(
                    repository = %self.locator.slug(),
                    %error,
                    "GitHub access verification failed"
                );
                false
            }
        }
    }

    /// Rewrites the marked comment on `number` with a render of `entries`,
    /// creating it when absent.
    ///
    /// Calls for the same pull request are serialised through the lock table
    /// so concurrent batches never post two marked comments.
    ///
    /// # Errors
    ///
    /// Returns [`CommentError::Render`] if the body cannot be rendered and
    /// propagates gateway failures from listing, creating or updating.
    pub async fn post_or_update(
        &self,
        number: PullRequestNumber,
        entries: &[LogEntry],
    ) -> Result<CommentAction, CommentError> {
        let body = render_comment_body(entries)?;
        let _guard = self.locks.acquire(self.locator, number).await;

        let comments = self
            .gateway
            .list_issue_comments(self.locator, number)
            .await?;
        let Some(existing) = comments
            .iter()
            .find(|comment| comment.carries_marker(COMMENT_MARKER))
        else {
            let created = self
                .gateway
                .create_issue_comment(self.locator, number, &body)
                .await?;
            info!(
                repository = %self.locator.slug(),
                pr = number.get(),
                comment_id = created.id,
                entries = entries.len(),
                "created error summary comment"
            );
            return Ok(CommentAction::Created {
                comment_id: created.id,
            });
        };

        let updated = self
            .gateway
            .update_issue_comment(self.locator, existing.id, &body)
            .await?;
        info!(
            repository = %self.locator.slug(),
            pr = number.get(),
            comment_id = updated.id,
            entries = entries.len(),
            "updated error summary comment"
        );
        Ok(CommentAction::Updated {
            comment_id: updated.id,
        })
    }
}

#[cfg(test)]
#[path = "service_tests.rs"]
mod tests;
