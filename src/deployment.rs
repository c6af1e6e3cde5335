//! Deployment environment discovery and pull request number extraction.
//!
//! Preview deployments encode the pull request number in their hostname
//! (for example `my-app-git-pr-42-team.vercel.app`). The helpers here read
//! the deployment variables once and recover that number.

use std::env;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

#[expect(clippy::expect_used, reason = "pattern is a compile-time constant")]
static DEPLOYMENT_PR_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"pr-(\d+)").expect("deployment PR pattern should compile"));

#[expect(clippy::expect_used, reason = "patterns are compile-time constants")]
static URL_PR_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [r"(?i)pr-(\d+)", r"pull/(\d+)", r"(?i)pr(\d+)", r"(?i)preview-(\d+)"]
        .into_iter()
        .map(|pattern| Regex::new(pattern).expect("URL PR pattern should compile"))
        .collect()
});

fn first_number(pattern: &Regex, input: &str) -> Option<u64> {
    pattern
        .captures(input)
        .and_then(|captures| captures.get(1))
        .and_then(|digits| digits.as_str().parse::<u64>().ok())
}

/// Parses the `pr-<digits>` marker used by preview deployment hostnames.
#[must_use]
pub fn pr_number_from_deployment_url(url: &str) -> Option<u64> {
    first_number(&DEPLOYMENT_PR_PATTERN, url)
}

/// Extracts a pull request number from any URL shape we know about.
///
/// Patterns are tried in order: `pr-<n>`, `pull/<n>`, `pr<n>` and
/// `preview-<n>`. The first pattern that yields a number wins.
#[must_use]
pub fn extract_pr_number_from_url(url: &str) -> Option<u64> {
    URL_PR_PATTERNS
        .iter()
        .find_map(|pattern| first_number(pattern, url))
}

/// Deployment variables read once from the process environment.
///
/// Empty variables are treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeploymentEnvironment {
    /// `VERCEL_ENV`: `production`, `preview` or `development`.
    #[serde(rename = "vercelEnv")]
    pub environment: Option<String>,
    /// `VERCEL_URL`: hostname of the current deployment.
    #[serde(rename = "vercelUrl")]
    pub deployment_url: Option<String>,
    /// `VERCEL_REGION`.
    #[serde(rename = "vercelRegion")]
    pub region: Option<String>,
    /// `VERCEL_GIT_PROVIDER`.
    #[serde(rename = "vercelGitProvider")]
    pub git_provider: Option<String>,
    /// `VERCEL_GIT_REPO_OWNER`.
    #[serde(rename = "vercelGitRepoOwner")]
    pub repository_owner: Option<String>,
    /// `VERCEL_GIT_REPO_SLUG`.
    #[serde(rename = "vercelGitRepoSlug")]
    pub repository_slug: Option<String>,
    /// `VERCEL_GIT_COMMIT_REF`.
    #[serde(rename = "vercelGitCommitRef")]
    pub commit_ref: Option<String>,
    /// `VERCEL_GIT_COMMIT_SHA`.
    #[serde(rename = "vercelGitCommitSha")]
    pub commit_sha: Option<String>,
    #[serde(skip)]
    platform_flag: bool,
}

impl DeploymentEnvironment {
    /// Reads the deployment variables from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the environment from an arbitrary variable lookup.
    #[must_use]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        Self {
            environment: read("VERCEL_ENV"),
            deployment_url: read("VERCEL_URL"),
            region: read("VERCEL_REGION"),
            git_provider: read("VERCEL_GIT_PROVIDER"),
            repository_owner: read("VERCEL_GIT_REPO_OWNER"),
            repository_slug: read("VERCEL_GIT_REPO_SLUG"),
            commit_ref: read("VERCEL_GIT_COMMIT_REF"),
            commit_sha: read("VERCEL_GIT_COMMIT_SHA"),
            platform_flag: read("VERCEL").is_some(),
        }
    }

    /// Whether the process runs on a Vercel deployment.
    #[must_use]
    pub const fn is_vercel(&self) -> bool {
        self.platform_flag || self.environment.is_some()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use rstest::rstest;

    use super::{DeploymentEnvironment, extract_pr_number_from_url, pr_number_from_deployment_url};

    #[rstest]
    #[case("my-app-git-pr-42-team.vercel.app", Some(42))]
    #[case("https://app-pr-7.example.com/path", Some(7))]
    #[case("https://app.example.com/", None)]
    #[case("https://app-PR-9.example.com/", None)]
    fn deployment_url_pattern(#[case] url: &str, #[case] expected: Option<u64>) {
        assert_eq!(pr_number_from_deployment_url(url), expected);
    }

    #[rstest]
    #[case("https://app-PR-9.example.com/", Some(9))]
    #[case("https://github.com/octo/repo/pull/314", Some(314))]
    #[case("https://pr15.preview.example.com", Some(15))]
    #[case("https://preview-88.example.com", Some(88))]
    #[case("https://example.com/about", None)]
    fn generic_url_patterns(#[case] url: &str, #[case] expected: Option<u64>) {
        assert_eq!(extract_pr_number_from_url(url), expected);
    }

    #[rstest]
    fn lookup_ignores_blank_values() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("VERCEL_ENV", "preview"),
            ("VERCEL_URL", "app-pr-3.vercel.app"),
            ("VERCEL_GIT_REPO_OWNER", "  "),
            ("VERCEL_GIT_REPO_SLUG", "web"),
        ]);

        let environment =
            DeploymentEnvironment::from_lookup(|key| vars.get(key).map(|value| (*value).to_owned()));

        assert_eq!(environment.environment.as_deref(), Some("preview"));
        assert_eq!(environment.repository_slug.as_deref(), Some("web"));
        assert!(environment.repository_owner.is_none());
        assert!(environment.is_vercel());
    }

    #[rstest]
    fn summary_uses_vercel_key_names() {
        let environment = DeploymentEnvironment::from_lookup(|key| {
            (key == "VERCEL_GIT_COMMIT_SHA").then(|| "abc123".to_owned())
        });

        let summary = serde_json::to_value(&environment).expect("summary should serialise");

        assert_eq!(summary["vercelGitCommitSha"], "abc123");
        assert!(summary["vercelEnv"].is_null());
        assert!(!environment.is_vercel());
    }
}
