//! Error types exposed by the GitHub comment layer.

use thiserror::Error;

/// Errors surfaced while resolving repositories or talking to GitHub.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CommentError {
    /// The authentication token was missing.
    #[error("personal access token is required")]
    MissingToken,

    /// Owner or repository name was empty.
    #[error("repository owner and name are required")]
    MissingRepository,

    /// The pull request number is not a valid integer.
    #[error("pull request number must be a positive integer")]
    InvalidPullRequestNumber,

    /// An API base URL could not be parsed.
    #[error("GitHub API URL is invalid: {0}")]
    InvalidUrl(String),

    /// The authentication token was rejected by GitHub.
    #[error("GitHub rejected the token: {message}")]
    Authentication {
        /// GitHub error message returned with the 401/403 response.
        message: String,
    },

    /// Rate limit exceeded.
    #[error("GitHub API rate limit exceeded: {message}")]
    RateLimitExceeded {
        /// Error message from GitHub.
        message: String,
    },

    /// GitHub returned a non-authentication API error.
    #[error("GitHub API error: {message}")]
    Api {
        /// Response body from GitHub describing the failure.
        message: String,
    },

    /// Networking failed while calling GitHub.
    #[error("network error talking to GitHub: {message}")]
    Network {
        /// Transport-level error detail.
        message: String,
    },

    /// Required server configuration was missing or unusable.
    #[error("configuration error: {message}")]
    Configuration {
        /// Description of the configuration problem.
        message: String,
    },

    /// The comment body could not be rendered.
    #[error("failed to render comment: {message}")]
    Render {
        /// Template engine detail.
        message: String,
    },
}
