//! Console argument values and their textual rendering.
//!
//! Console calls accept heterogeneous arguments. They are modelled as
//! [`ConsoleArg`] values so that interception can pass the originals through
//! untouched while also flattening them into a single message string.

use std::error::Error as StdError;
use std::fmt;

use serde::Serialize;

/// Error-like argument: a name, a message and an optional stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorValue {
    /// Error kind, e.g. `TypeError`.
    pub name: String,
    /// Human-readable message.
    pub message: String,
    /// Stack trace or cause chain.
    pub stack: Option<String>,
}

impl ErrorValue {
    /// Creates an error value without a stack.
    #[must_use]
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
            stack: None,
        }
    }

    /// Attaches a stack trace.
    #[must_use]
    pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
        self.stack = Some(stack.into());
        self
    }

    /// Captures a Rust error, using its source chain as the stack.
    #[must_use]
    pub fn from_error(error: &(dyn StdError + 'static)) -> Self {
        let mut causes = Vec::new();
        let mut source = error.source();
        while let Some(cause) = source {
            causes.push(format!("caused by: {cause}"));
            source = cause.source();
        }

        Self {
            name: "Error".to_owned(),
            message: error.to_string(),
            stack: (!causes.is_empty()).then(|| causes.join("\n")),
        }
    }

    fn headline(&self) -> String {
        format!("{}: {}", self.name, self.message)
    }
}

/// A single argument passed to a console call.
#[derive(Debug, Clone, PartialEq)]
pub enum ConsoleArg {
    /// Plain string, rendered verbatim.
    Text(String),
    /// Error-like object.
    Error(ErrorValue),
    /// Structured value, rendered as pretty-printed JSON.
    Value(serde_json::Value),
    /// A value that could not be serialised; holds its debug form.
    Opaque(String),
}

impl ConsoleArg {
    /// Wraps a string argument.
    #[must_use]
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Wraps a Rust error.
    #[must_use]
    pub fn error(error: &(dyn StdError + 'static)) -> Self {
        Self::Error(ErrorValue::from_error(error))
    }

    /// Serialises an arbitrary value, falling back to its debug form when
    /// serialisation fails.
    #[must_use]
    pub fn structured<T>(value: &T) -> Self
    where
        T: Serialize + fmt::Debug + ?Sized,
    {
        serde_json::to_value(value).map_or_else(|_| Self::Opaque(format!("{value:?}")), Self::Value)
    }

    /// Full rendering used when building a log message.
    #[must_use]
    pub fn render(&self) -> String {
        match self {
            Self::Text(text) | Self::Opaque(text) => text.clone(),
            Self::Error(error) => match &error.stack {
                Some(stack) => format!("{}\n{stack}", error.headline()),
                None => error.headline(),
            },
            Self::Value(value) => {
                serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
            }
        }
    }

    /// Single-line summary, used for rejection reasons.
    #[must_use]
    pub fn summary(&self) -> String {
        match self {
            Self::Text(text) | Self::Opaque(text) => text.clone(),
            Self::Error(error) => error.headline(),
            Self::Value(value) => value.to_string(),
        }
    }

    /// Stack carried by an error-like argument.
    #[must_use]
    pub fn stack(&self) -> Option<&str> {
        match self {
            Self::Error(error) => error.stack.as_deref(),
            _ => None,
        }
    }
}

impl From<&str> for ConsoleArg {
    fn from(value: &str) -> Self {
        Self::text(value)
    }
}

impl From<String> for ConsoleArg {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<ErrorValue> for ConsoleArg {
    fn from(value: ErrorValue) -> Self {
        Self::Error(value)
    }
}

impl From<serde_json::Value> for ConsoleArg {
    fn from(value: serde_json::Value) -> Self {
        Self::Value(value)
    }
}

/// Joins console arguments into one message separated by single spaces.
#[must_use]
pub fn format_console_args(args: &[ConsoleArg]) -> String {
    args.iter()
        .map(ConsoleArg::render)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Renders one error, string or value the way console capture does.
#[must_use]
pub fn format_error_for_logging(value: &ConsoleArg) -> String {
    value.render()
}
