//! Server configuration loaded from CLI, environment, and files.
//!
//! This module provides the configuration struct for the ingest server,
//! merging values from command-line arguments, environment variables, and
//! configuration files using ortho-config's layered approach.
//!
//! # Precedence
//!
//! Configuration values are loaded with the following precedence (lowest to
//! highest):
//!
//! 1. **Defaults** – built-in values (public GitHub API, `127.0.0.1:3000`,
//!    `/api/log-error`)
//! 2. **Configuration file** – `.pr-error-logger.toml` in the current
//!    directory, home directory, or XDG config directory
//! 3. **Environment variables** – `PR_ERROR_LOGGER_TOKEN`,
//!    `PR_ERROR_LOGGER_OWNER`, and so on
//! 4. **Command-line arguments** – `--token`/`-t`, `--owner`/`-o`, ...
//!
//! Deployment variables fill gaps after all layers are merged: `GITHUB_TOKEN`
//! for the token, `VERCEL_GIT_REPO_OWNER` and `VERCEL_GIT_REPO_SLUG` for the
//! default repository.
//!
//! # Configuration File
//!
//! ```toml
//! token = "ghp_example"
//! owner = "octocat"
//! repository = "hello-world"
//! api_base = "https://api.github.com"
//! bind_address = "0.0.0.0:8080"
//! endpoint = "/api/log-error"
//! ```

use std::env;
use std::net::SocketAddr;

use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::client::config::DEFAULT_API_ENDPOINT;
use crate::github::{CommentError, GITHUB_API_BASE, PersonalAccessToken};
use crate::server::IngestSettings;

/// Address the server listens on when none is configured.
pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:3000";

/// Ingest server configuration supporting CLI, environment, and file sources.
///
/// # Example
///
/// ```no_run
/// use pr_error_logger::ServerConfig;
/// use ortho_config::OrthoConfig;
///
/// let config = ServerConfig::load().expect("failed to load configuration");
/// let settings = config.ingest_settings().expect("invalid configuration");
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize, OrthoConfig)]
#[serde(default)]
#[ortho_config(
    prefix = "PR_ERROR_LOGGER",
    discovery(
        dotfile_name = ".pr-error-logger.toml",
        config_file_name = "pr-error-logger.toml",
        app_name = "pr-error-logger"
    )
)]
pub struct ServerConfig {
    /// Personal access token used for GitHub API calls.
    ///
    /// Can be provided via:
    /// - CLI: `--token <TOKEN>` or `-t <TOKEN>`
    /// - Environment: `PR_ERROR_LOGGER_TOKEN` or `GITHUB_TOKEN`
    /// - Config file: `token = "..."`
    #[ortho_config(cli_short = 't')]
    pub token: Option<String>,

    /// Repository owner used when a batch does not name one.
    ///
    /// Falls back to `VERCEL_GIT_REPO_OWNER`.
    #[ortho_config(cli_short = 'o')]
    pub owner: Option<String>,

    /// Repository name used when a batch does not name one.
    ///
    /// Falls back to `VERCEL_GIT_REPO_SLUG`.
    #[ortho_config(cli_short = 'r')]
    pub repository: Option<String>,

    /// GitHub API root, e.g. `https://ghe.example.com/api/v3`.
    ///
    /// Defaults to the public GitHub API.
    #[ortho_config(cli_short = 'a')]
    pub api_base: Option<String>,

    /// Socket address to listen on.
    ///
    /// Defaults to `127.0.0.1:3000`.
    #[ortho_config(cli_short = 'b')]
    pub bind_address: Option<String>,

    /// Route serving the ingest handler.
    ///
    /// Defaults to `/api/log-error`.
    #[ortho_config(cli_short = 'e')]
    pub endpoint: Option<String>,
}

impl ServerConfig {
    /// Resolves the token from configuration or the `GITHUB_TOKEN`
    /// environment variable.
    ///
    /// Returns `None` when neither source provides a non-blank value; the
    /// server still starts and rejects batches until a token is configured.
    #[must_use]
    pub fn resolve_token(&self) -> Option<PersonalAccessToken> {
        self.token
            .clone()
            .or_else(|| env::var("GITHUB_TOKEN").ok())
            .and_then(|value| PersonalAccessToken::new(value).ok())
    }

    /// Default owner, falling back to `VERCEL_GIT_REPO_OWNER`.
    #[must_use]
    pub fn resolve_owner(&self) -> Option<String> {
        configured_or_env(self.owner.as_deref(), "VERCEL_GIT_REPO_OWNER")
    }

    /// Default repository, falling back to `VERCEL_GIT_REPO_SLUG`.
    #[must_use]
    pub fn resolve_repository(&self) -> Option<String> {
        configured_or_env(self.repository.as_deref(), "VERCEL_GIT_REPO_SLUG")
    }

    /// GitHub API root.
    #[must_use]
    pub fn api_base(&self) -> &str {
        self.api_base.as_deref().unwrap_or(GITHUB_API_BASE)
    }

    /// Route serving the ingest handler.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        self.endpoint.as_deref().unwrap_or(DEFAULT_API_ENDPOINT)
    }

    /// Parses the listen address.
    ///
    /// # Errors
    ///
    /// Returns [`CommentError::Configuration`] when the address is not a
    /// valid socket address.
    pub fn bind_address(&self) -> Result<SocketAddr, CommentError> {
        let raw = self.bind_address.as_deref().unwrap_or(DEFAULT_BIND_ADDRESS);
        raw.parse().map_err(|error| CommentError::Configuration {
            message: format!("invalid bind address `{raw}`: {error}"),
        })
    }

    /// Validates the configuration and resolves it into ingest settings.
    ///
    /// # Errors
    ///
    /// Returns [`CommentError::InvalidUrl`] when the API base cannot be
    /// parsed and [`CommentError::Configuration`] when the endpoint is not an
    /// absolute path.
    pub fn ingest_settings(&self) -> Result<IngestSettings, CommentError> {
        let api_base = self.api_base();
        Url::parse(api_base).map_err(|error| CommentError::InvalidUrl(error.to_string()))?;

        let endpoint = self.endpoint();
        if !endpoint.starts_with('/') {
            return Err(CommentError::Configuration {
                message: format!("endpoint `{endpoint}` must start with `/`"),
            });
        }

        Ok(IngestSettings {
            token: self.resolve_token(),
            owner: self.resolve_owner(),
            repository: self.resolve_repository(),
            api_base: api_base.to_owned(),
            endpoint: endpoint.to_owned(),
        })
    }
}

fn configured_or_env(configured: Option<&str>, variable: &str) -> Option<String> {
    configured
        .map(str::to_owned)
        .or_else(|| env::var(variable).ok())
        .filter(|value| !value.trim().is_empty())
}
