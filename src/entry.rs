//! Log entry data model shared by the client logger and the ingest handler.
//!
//! Entries are serialised with camelCase field names so that the wire format
//! matches what browser clients post to the ingest endpoint.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Severity of a captured log entry, mirroring the four console levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// `console.error`, global errors and unhandled rejections.
    Error,
    /// `console.warn`.
    Warn,
    /// `console.info`.
    Info,
    /// `console.log`.
    Log,
}

impl LogLevel {
    /// Every level in severity order.
    pub const ALL: [Self; 4] = [Self::Error, Self::Warn, Self::Info, Self::Log];

    /// Lowercase wire name of the level.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Log => "log",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Width and height pair used for viewport and screen sizes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width in CSS pixels.
    pub width: u32,
    /// Height in CSS pixels.
    pub height: u32,
}

impl Dimensions {
    /// Creates a dimension pair.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Snapshot of the client environment taken when an entry is created.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DeviceInfo {
    /// Platform string reported by the navigator.
    pub platform: String,
    /// User agent string.
    pub user_agent: String,
    /// Inner window size.
    pub viewport: Dimensions,
    /// Physical screen size.
    pub screen: Dimensions,
    /// Preferred locale, e.g. `en-GB`.
    pub language: String,
    /// IANA timezone name.
    pub timezone: String,
    /// Whether cookies are enabled.
    pub cookie_enabled: bool,
    /// Whether the client reported network connectivity.
    pub online_status: bool,
}

/// A single captured log record.
///
/// Entries are immutable once created; the client logger enriches them with
/// environment state at capture time and never recomputes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    /// Formatted message text.
    pub message: String,
    /// Stack trace when the source was error-like.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
    /// Severity.
    pub level: LogLevel,
    /// ISO-8601 capture time.
    #[serde(default)]
    pub timestamp: String,
    /// Page or script URL associated with the entry.
    #[serde(default)]
    pub url: String,
    /// User agent at capture time.
    #[serde(default)]
    pub user_agent: String,
    /// Device snapshot at capture time.
    #[serde(default)]
    pub device_info: DeviceInfo,
    /// Pull request number inferred from the deployment URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pr_number: Option<u64>,
    /// Deployment URL the client was served from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployment_url: Option<String>,
    /// Deployment environment tag (`preview`, `production`, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vercel_env: Option<String>,
}

impl LogEntry {
    /// Creates an entry with empty capture context.
    #[must_use]
    pub fn new(message: impl Into<String>, level: LogLevel) -> Self {
        Self {
            message: message.into(),
            stack: None,
            level,
            timestamp: String::new(),
            url: String::new(),
            user_agent: String::new(),
            device_info: DeviceInfo::default(),
            pr_number: None,
            deployment_url: None,
            vercel_env: None,
        }
    }

    /// Attaches a pull request number.
    #[must_use]
    pub const fn with_pr_number(mut self, number: u64) -> Self {
        self.pr_number = Some(number);
        self
    }
}
