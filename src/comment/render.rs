//! Markdown rendering of the aggregate pull request comment.
//!
//! The body is produced by a `minijinja` template from the batch alone, so
//! the same entries in the same order always render byte-identical output.
//!
//! # Layout
//!
//! - the [`COMMENT_MARKER`] on the first line, used to find the comment again
//! - a per-level count table covering every entry in the batch
//! - one section per entry (the most recent [`MAX_RENDERED_ENTRIES`]) with the
//!   sanitised message and, when present, a collapsible stack trace

use minijinja::{Environment, context};
use serde::Serialize;

use crate::entry::{LogEntry, LogLevel};
use crate::github::CommentError;
use crate::sanitize::sanitize_error_message;

/// Hidden marker identifying the comment this service owns.
pub const COMMENT_MARKER: &str = "<!-- pr-error-logger -->";

/// Entries beyond this count are summarised rather than rendered.
pub const MAX_RENDERED_ENTRIES: usize = 50;

/// Longest message or stack rendered before truncation, in characters.
pub const MAX_TEXT_CHARS: usize = 2_000;

const TEMPLATE_NAME: &str = "pr-comment";

const COMMENT_TEMPLATE: &str = r"{{ marker }}
## Client errors captured on this pull request

{{ total }} log {{ noun }} received from the preview deployment.

| Level | Count |
| --- | ---: |
{% for row in levels %}
| `{{ row.level }}` | {{ row.count }} |
{% endfor %}
{% for entry in entries %}

### {{ entry.position }}. `{{ entry.level }}` at {{ entry.timestamp }}

- **Page:** {{ entry.url }}
{% if entry.deployment %}
- **Deployment:** {{ entry.deployment }}
{% endif %}
- **Browser:** {{ entry.user_agent }} ({{ entry.viewport }})

{{ entry.message_fence }}text
{{ entry.message }}
{{ entry.message_fence }}
{% if entry.stack %}

<details>
<summary>Stack trace</summary>

{{ entry.stack_fence }}text
{{ entry.stack }}
{{ entry.stack_fence }}

</details>
{% endif %}
{% endfor %}
{% if omitted > 0 %}

_{{ omitted }} earlier {{ omitted_noun }} not shown._
{% endif %}
";

#[derive(Debug, Serialize)]
struct LevelRow {
    level: LogLevel,
    count: usize,
}

#[derive(Debug, Serialize)]
struct TemplateEntry {
    position: usize,
    level: LogLevel,
    timestamp: String,
    url: String,
    deployment: String,
    user_agent: String,
    viewport: String,
    message: String,
    message_fence: String,
    stack: String,
    stack_fence: String,
}

impl TemplateEntry {
    fn new(position: usize, entry: &LogEntry) -> Self {
        let deployment = match (&entry.deployment_url, &entry.vercel_env) {
            (Some(url), Some(environment)) => format!("{url} ({environment})"),
            (Some(url), None) => url.clone(),
            (None, _) => String::new(),
        };
        let viewport = entry.device_info.viewport;
        let message = render_text(&entry.message);
        let stack = entry.stack.as_deref().map(render_text).unwrap_or_default();
        Self {
            position,
            level: entry.level,
            timestamp: entry.timestamp.clone(),
            url: entry.url.clone(),
            deployment,
            user_agent: entry.user_agent.clone(),
            viewport: format!("{}x{}", viewport.width, viewport.height),
            message_fence: code_fence(&message),
            message,
            stack_fence: code_fence(&stack),
            stack,
        }
    }
}

fn render_text(text: &str) -> String {
    truncate_chars(&sanitize_error_message(text), MAX_TEXT_CHARS)
}

fn truncate_chars(text: &str, limit: usize) -> String {
    if text.chars().nth(limit).is_none() {
        return text.to_owned();
    }
    let kept: String = text.chars().take(limit).collect();
    format!("{kept}\n… (truncated)")
}

/// Backtick fence one longer than the longest run inside `text`, and never
/// shorter than three, so captured text cannot close its own block.
fn code_fence(text: &str) -> String {
    let longest_run = text
        .split(|character| character != '`')
        .map(str::len)
        .max()
        .unwrap_or_default();
    "`".repeat(longest_run.saturating_add(1).max(3))
}

const fn noun(count: usize) -> &'static str {
    if count == 1 { "entry" } else { "entries" }
}

fn level_rows(entries: &[LogEntry]) -> Vec<LevelRow> {
    LogLevel::ALL
        .into_iter()
        .map(|level| LevelRow {
            level,
            count: entries.iter().filter(|entry| entry.level == level).count(),
        })
        .filter(|row| row.count > 0)
        .collect()
}

/// Renders the comment body for a batch of entries.
///
/// # Errors
///
/// Returns [`CommentError::Render`] if the template fails to compile or
/// render.
pub fn render_comment_body(entries: &[LogEntry]) -> Result<String, CommentError> {
    let mut env = Environment::new();
    env.set_trim_blocks(true);
    env.set_lstrip_blocks(true);
    env.set_auto_escape_callback(|_| minijinja::AutoEscape::None);
    env.add_template(TEMPLATE_NAME, COMMENT_TEMPLATE)
        .map_err(|error| CommentError::Render {
            message: format!("invalid comment template: {error}"),
        })?;

    let omitted = entries.len().saturating_sub(MAX_RENDERED_ENTRIES);
    let rendered: Vec<TemplateEntry> = entries
        .iter()
        .enumerate()
        .skip(omitted)
        .map(|(index, entry)| TemplateEntry::new(index + 1, entry))
        .collect();

    let ctx = context! {
        marker => COMMENT_MARKER,
        total => entries.len(),
        noun => noun(entries.len()),
        levels => level_rows(entries),
        entries => rendered,
        omitted => omitted,
        omitted_noun => noun(omitted),
    };

    env.get_template(TEMPLATE_NAME)
        .and_then(|template| template.render(ctx))
        .map_err(|error| CommentError::Render {
            message: format!("comment rendering failed: {error}"),
        })
}

#[cfg(test)]
#[path = "render_tests.rs"]
mod tests;
