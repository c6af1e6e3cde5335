//! Identity wrappers and the repository locator used for API paths.

use url::Url;

use super::error::CommentError;

/// Public GitHub API root.
pub const GITHUB_API_BASE: &str = "https://api.github.com";

/// Repository owner wrapper to avoid stringly typed parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryOwner(String);

impl RepositoryOwner {
    /// Validates that the owner is non-blank.
    ///
    /// # Errors
    ///
    /// Returns [`CommentError::MissingRepository`] when the value is blank.
    pub fn new(value: &str) -> Result<Self, CommentError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(CommentError::MissingRepository);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the owner value.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Repository name wrapper to prevent parameter mix-ups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryName(String);

impl RepositoryName {
    /// Validates that the name is non-blank.
    ///
    /// # Errors
    ///
    /// Returns [`CommentError::MissingRepository`] when the value is blank.
    pub fn new(value: &str) -> Result<Self, CommentError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(CommentError::MissingRepository);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the repository name.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Pull request number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PullRequestNumber(u64);

impl PullRequestNumber {
    /// Rejects zero, which GitHub never assigns.
    ///
    /// # Errors
    ///
    /// Returns [`CommentError::InvalidPullRequestNumber`] for zero.
    pub const fn new(value: u64) -> Result<Self, CommentError> {
        if value == 0 {
            return Err(CommentError::InvalidPullRequestNumber);
        }
        Ok(Self(value))
    }

    /// Returns the numeric value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// Personal access token wrapper enforcing presence.
#[derive(Clone, PartialEq, Eq)]
pub struct PersonalAccessToken(String);

impl PersonalAccessToken {
    /// Validates that the token is non-empty and trims whitespace.
    ///
    /// # Errors
    ///
    /// Returns `CommentError::MissingToken` when the supplied string is blank.
    pub fn new(token: impl AsRef<str>) -> Result<Self, CommentError> {
        let trimmed = token.as_ref().trim();
        if trimmed.is_empty() {
            return Err(CommentError::MissingToken);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the token value.
    #[must_use]
    pub const fn value(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for PersonalAccessToken {
    fn as_ref(&self) -> &str {
        self.value()
    }
}

impl std::fmt::Debug for PersonalAccessToken {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str("PersonalAccessToken(***)")
    }
}

/// Repository on a GitHub host together with its API base.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryLocator {
    api_base: Url,
    owner: RepositoryOwner,
    repository: RepositoryName,
}

impl RepositoryLocator {
    /// Creates a locator on the public GitHub API.
    ///
    /// # Errors
    ///
    /// Returns `CommentError::MissingRepository` when owner or repo is blank.
    pub fn from_owner_repo(owner: &str, repo: &str) -> Result<Self, CommentError> {
        Self::new(GITHUB_API_BASE, owner, repo)
    }

    /// Creates a locator against an explicit API base, such as a GitHub
    /// Enterprise `https://ghe.example.com/api/v3` root.
    ///
    /// # Errors
    ///
    /// Returns `CommentError::InvalidUrl` when the base cannot be parsed and
    /// `CommentError::MissingRepository` when owner or repo is blank.
    pub fn new(api_base: &str, owner: &str, repo: &str) -> Result<Self, CommentError> {
        let parsed =
            Url::parse(api_base).map_err(|error| CommentError::InvalidUrl(error.to_string()))?;
        Ok(Self {
            api_base: parsed,
            owner: RepositoryOwner::new(owner)?,
            repository: RepositoryName::new(repo)?,
        })
    }

    /// API base URL.
    #[must_use]
    pub const fn api_base(&self) -> &Url {
        &self.api_base
    }

    /// Repository owner.
    #[must_use]
    pub const fn owner(&self) -> &RepositoryOwner {
        &self.owner
    }

    /// Repository name.
    #[must_use]
    pub const fn repository(&self) -> &RepositoryName {
        &self.repository
    }

    /// `owner/repo` form used in logs and lock keys.
    #[must_use]
    pub fn slug(&self) -> String {
        format!("{}/{}", self.owner.as_str(), self.repository.as_str())
    }

    /// Returns the API path for the repository itself.
    pub(crate) fn repository_path(&self) -> String {
        format!(
            "/repos/{}/{}",
            self.owner.as_str(),
            self.repository.as_str()
        )
    }

    /// Returns the API path for pull request discussion comments.
    pub(crate) fn issue_comments_path(&self, number: PullRequestNumber) -> String {
        format!("{}/issues/{}/comments", self.repository_path(), number.get())
    }

    /// Returns the API path for a single discussion comment.
    pub(crate) fn issue_comment_path(&self, comment_id: u64) -> String {
        format!("{}/issues/comments/{comment_id}", self.repository_path())
    }
}
