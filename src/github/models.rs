//! Data models for pull request discussion comments.

use serde::{Deserialize, Serialize};

/// Pull request issue comment details.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueComment {
    /// Comment identifier.
    pub id: u64,
    /// Comment body.
    pub body: Option<String>,
    /// Author login.
    pub author: Option<String>,
}

impl IssueComment {
    /// Whether the body opens with `marker`.
    ///
    /// Only a leading marker counts, so a reply quoting the marker further
    /// down is never mistaken for the summary comment.
    #[must_use]
    pub fn carries_marker(&self, marker: &str) -> bool {
        self.body
            .as_deref()
            .is_some_and(|body| body.trim_start().starts_with(marker))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct ApiComment {
    pub(super) id: u64,
    pub(super) body: Option<String>,
    pub(super) user: Option<ApiUser>,
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct ApiUser {
    pub(super) login: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct ApiRepository {
    pub(super) full_name: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub(super) struct CommentBody<'body> {
    pub(super) body: &'body str,
}

impl From<ApiComment> for IssueComment {
    fn from(value: ApiComment) -> Self {
        Self {
            id: value.id,
            body: value.body,
            author: value.user.and_then(|user| user.login),
        }
    }
}
