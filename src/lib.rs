//! Relay client-side errors from preview deployments onto GitHub pull
//! requests.
//!
//! The crate has two halves:
//!
//! - [`client`]: a capturing logger that hooks a page's console and global
//!   error events, buffers [`LogEntry`] values and posts them in debounced
//!   batches to an ingest endpoint.
//! - [`server`]: an axum router that validates those batches and, through
//!   [`comment::PrCommentService`], keeps a single marked summary comment on
//!   the pull request the deployment was built from.

pub mod client;
pub mod comment;
pub mod config;
pub mod deployment;
pub mod entry;
pub mod github;
pub mod sanitize;
pub mod server;

pub use client::{LoggerOptions, PrErrorLogger};
pub use comment::{CommentAction, PrCommentService, PullRequestLocks, render_comment_body};
pub use config::ServerConfig;
pub use deployment::{DeploymentEnvironment, extract_pr_number_from_url};
pub use entry::{DeviceInfo, LogEntry, LogLevel};
pub use github::{CommentError, CommentGateway, OctocrabCommentGateway};
pub use sanitize::sanitize_error_message;
pub use server::{IngestError, IngestSettings, IngestState};
