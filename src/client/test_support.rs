//! In-memory doubles for exercising the logger without a browser or network.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use http::StatusCode;

use super::console::{Console, ConsoleSink};
use super::events::GlobalEvents;
use super::format::{ConsoleArg, format_console_args};
use super::host::{BrowserContext, HostEnvironment};
use super::transport::{BatchPayload, Transport, TransportError};
use crate::entry::{DeviceInfo, Dimensions, LogLevel};

/// Console sink that remembers every rendered call.
#[derive(Debug, Default)]
pub struct RecordingSink {
    calls: Mutex<Vec<(LogLevel, String)>>,
}

impl RecordingSink {
    /// Level and rendered message of every call so far.
    #[must_use]
    pub fn messages(&self) -> Vec<(LogLevel, String)> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl ConsoleSink for RecordingSink {
    fn write(&self, level: LogLevel, args: &[ConsoleArg]) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((level, format_console_args(args)));
    }
}

/// Host environment with fixed values.
#[derive(Debug, Clone)]
pub struct StaticHost {
    /// Value returned for the page URL.
    pub href: String,
    /// Value returned for the user agent.
    pub user_agent: String,
    /// Fixed clock reading.
    pub now: DateTime<Utc>,
}

impl StaticHost {
    /// Creates a host serving `href`.
    #[must_use]
    pub fn new(href: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            user_agent: "TestAgent/1.0".to_owned(),
            now: Utc
                .with_ymd_and_hms(2025, 1, 2, 3, 4, 5)
                .single()
                .unwrap_or_default(),
        }
    }
}

impl HostEnvironment for StaticHost {
    fn location_href(&self) -> String {
        self.href.clone()
    }

    fn user_agent(&self) -> String {
        self.user_agent.clone()
    }

    fn device_info(&self) -> DeviceInfo {
        DeviceInfo {
            platform: "TestOS".to_owned(),
            user_agent: self.user_agent.clone(),
            viewport: Dimensions::new(1280, 720),
            screen: Dimensions::new(1920, 1080),
            language: "en-GB".to_owned(),
            timezone: "Europe/London".to_owned(),
            cookie_enabled: true,
            online_status: true,
        }
    }

    fn now(&self) -> DateTime<Utc> {
        self.now
    }
}

/// Page capabilities backed by in-memory doubles.
pub struct TestPage {
    /// Sink bound to every console level before any interception.
    pub output: Arc<RecordingSink>,
    /// Shared console.
    pub console: Arc<Console>,
    /// Shared event hub.
    pub events: Arc<GlobalEvents>,
    /// Context handed to the logger.
    pub context: BrowserContext,
}

impl TestPage {
    /// Builds a page served from `href`.
    #[must_use]
    pub fn new(href: &str) -> Self {
        let output = Arc::new(RecordingSink::default());
        let console = Arc::new(Console::new(output.clone()));
        let events = Arc::new(GlobalEvents::new());
        let context = BrowserContext::new(
            Arc::clone(&console),
            Arc::clone(&events),
            Arc::new(StaticHost::new(href)),
        );
        Self {
            output,
            console,
            events,
            context,
        }
    }
}

/// Transport that records payloads and can be told to fail.
#[derive(Debug, Default)]
pub struct RecordingTransport {
    sent: Mutex<Vec<BatchPayload>>,
    failures: Mutex<VecDeque<StatusCode>>,
}

impl RecordingTransport {
    /// Makes the next send attempt fail with `status`.
    pub fn fail_next(&self, status: StatusCode) {
        self.failures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(status);
    }

    /// Every payload that was delivered successfully.
    #[must_use]
    pub fn delivered(&self) -> Vec<BatchPayload> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send(&self, payload: &BatchPayload) -> Result<(), TransportError> {
        let failure = self
            .failures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();
        if let Some(status) = failure {
            return Err(TransportError::Status {
                status,
                body: "simulated failure".to_owned(),
            });
        }

        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(payload.clone());
        Ok(())
    }
}
