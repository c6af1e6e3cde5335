//! The aggregate error-summary comment kept on each pull request.

pub mod locks;
pub mod render;
pub mod service;

pub use locks::PullRequestLocks;
pub use render::{COMMENT_MARKER, MAX_RENDERED_ENTRIES, render_comment_body};
pub use service::{CommentAction, PrCommentService};
