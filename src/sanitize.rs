//! Redaction of credentials that leak into captured error text.

use std::sync::LazyLock;

use regex::Regex;

#[expect(clippy::expect_used, reason = "patterns are compile-time constants")]
static REDACTIONS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    [
        (r"Bearer\s+[A-Za-z0-9\-._~+/]+=*", "Bearer [REDACTED]"),
        (r"(?i)token[=:]\s*[A-Za-z0-9\-._~+/]+=*", "token=[REDACTED]"),
        (r"(?i)password[=:]\s*\S+", "password=[REDACTED]"),
        (r"(?i)secret[=:]\s*\S+", "secret=[REDACTED]"),
        (r"(?i)key[=:]\s*\S+", "key=[REDACTED]"),
    ]
    .into_iter()
    .map(|(pattern, replacement)| {
        (
            Regex::new(pattern).expect("redaction pattern should compile"),
            replacement,
        )
    })
    .collect()
});

/// Replaces bearer tokens, passwords, secrets and keys with placeholders.
///
/// Redactions apply in a fixed order so the output is a pure function of the
/// input.
#[must_use]
pub fn sanitize_error_message(message: &str) -> String {
    REDACTIONS
        .iter()
        .fold(message.to_owned(), |text, (pattern, replacement)| {
            pattern.replace_all(&text, *replacement).into_owned()
        })
}
