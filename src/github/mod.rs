//! GitHub pull request discussion comments.
//!
//! This module wraps Octocrab to probe repository access and to list, create
//! and update the discussion comments on a pull request. Errors are mapped
//! into [`CommentError`] variants so callers can surface precise failures
//! without exposing Octocrab internals.

pub mod error;
pub mod gateway;
pub mod locator;
pub mod models;

pub use error::CommentError;
pub use gateway::{CommentGateway, OctocrabCommentGateway};
pub use locator::{
    GITHUB_API_BASE, PersonalAccessToken, PullRequestNumber, RepositoryLocator, RepositoryName,
    RepositoryOwner,
};
pub use models::IssueComment;

#[cfg(test)]
pub use gateway::MockCommentGateway;

#[cfg(test)]
mod tests;
