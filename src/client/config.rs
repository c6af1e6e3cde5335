//! Logger configuration resolved once at construction.
//!
//! # Precedence
//!
//! Each field is taken from the first source that provides it:
//!
//! 1. **Explicit options** passed by the host application
//! 2. **Deployment environment** (`VERCEL_GIT_REPO_SLUG`,
//!    `VERCEL_GIT_REPO_OWNER`)
//! 3. **Built-in defaults**

use std::time::Duration;

use crate::deployment::DeploymentEnvironment;

/// Endpoint the batches are posted to when none is configured.
pub const DEFAULT_API_ENDPOINT: &str = "/api/log-error";

/// Buffer capacity when none is configured.
pub const DEFAULT_MAX_LOG_ENTRIES: usize = 100;

/// Debounce window when none is configured.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(1000);

/// Caller-supplied overrides; every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoggerOptions {
    /// Repository name sent with each batch.
    pub repository: Option<String>,
    /// Repository owner sent with each batch.
    pub owner: Option<String>,
    /// Ingest endpoint, absolute or relative to the page origin.
    pub api_endpoint: Option<String>,
    /// Intercept the console levels.
    pub enable_console_capture: Option<bool>,
    /// Capture uncaught errors.
    pub enable_error_capture: Option<bool>,
    /// Capture unhandled rejections.
    pub enable_rejection_capture: Option<bool>,
    /// Record `console.warn` output.
    pub enable_warning_capture: Option<bool>,
    /// Buffer capacity; zero selects the default.
    pub max_log_entries: Option<usize>,
    /// Debounce window; zero selects the default.
    pub debounce: Option<Duration>,
}

/// Fully resolved logger configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggerConfig {
    /// Repository name sent with each batch.
    pub repository: String,
    /// Repository owner sent with each batch.
    pub owner: String,
    /// Ingest endpoint.
    pub api_endpoint: String,
    /// Console interception enabled.
    pub capture_console: bool,
    /// Uncaught error capture enabled.
    pub capture_errors: bool,
    /// Unhandled rejection capture enabled.
    pub capture_rejections: bool,
    /// `console.warn` recording enabled.
    pub capture_warnings: bool,
    /// Buffer capacity, always at least one.
    pub max_log_entries: usize,
    /// Debounce window, never zero.
    pub debounce: Duration,
    /// Deployment variables used for entry enrichment.
    pub deployment: DeploymentEnvironment,
}

impl LoggerConfig {
    /// Merges explicit options over deployment values and defaults.
    #[must_use]
    pub fn resolve(options: LoggerOptions, deployment: DeploymentEnvironment) -> Self {
        let LoggerOptions {
            repository,
            owner,
            api_endpoint,
            enable_console_capture,
            enable_error_capture,
            enable_rejection_capture,
            enable_warning_capture,
            max_log_entries,
            debounce,
        } = options;

        let capture_errors = enable_error_capture.unwrap_or(true);

        Self {
            repository: non_blank(repository)
                .or_else(|| deployment.repository_slug.clone())
                .unwrap_or_default(),
            owner: non_blank(owner)
                .or_else(|| deployment.repository_owner.clone())
                .unwrap_or_default(),
            api_endpoint: non_blank(api_endpoint)
                .unwrap_or_else(|| DEFAULT_API_ENDPOINT.to_owned()),
            capture_console: enable_console_capture.unwrap_or(true),
            capture_errors,
            capture_rejections: enable_rejection_capture.unwrap_or(capture_errors),
            capture_warnings: enable_warning_capture.unwrap_or(true),
            max_log_entries: max_log_entries
                .filter(|cap| *cap > 0)
                .unwrap_or(DEFAULT_MAX_LOG_ENTRIES),
            debounce: debounce
                .filter(|window| !window.is_zero())
                .unwrap_or(DEFAULT_DEBOUNCE),
            deployment,
        }
    }

    /// Resolves options against the process environment.
    #[must_use]
    pub fn from_env(options: LoggerOptions) -> Self {
        Self::resolve(options, DeploymentEnvironment::from_env())
    }
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self::resolve(LoggerOptions::default(), DeploymentEnvironment::default())
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|text| !text.trim().is_empty())
}
