//! Browser-like execution context the logger attaches to.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::console::Console;
use super::events::GlobalEvents;
use crate::entry::DeviceInfo;

/// Ambient state of the page the logger runs in.
pub trait HostEnvironment: Send + Sync {
    /// Current page URL.
    fn location_href(&self) -> String;

    /// User agent string.
    fn user_agent(&self) -> String;

    /// Snapshot of device and viewport details.
    fn device_info(&self) -> DeviceInfo;

    /// Wall-clock time used to stamp entries.
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Console, event hub and environment of one page.
///
/// A logger built without a context is inert: it installs no hooks and
/// enriches manual entries with empty values.
#[derive(Clone)]
pub struct BrowserContext {
    console: Arc<Console>,
    events: Arc<GlobalEvents>,
    host: Arc<dyn HostEnvironment>,
}

impl BrowserContext {
    /// Bundles the page capabilities.
    #[must_use]
    pub fn new(
        console: Arc<Console>,
        events: Arc<GlobalEvents>,
        host: Arc<dyn HostEnvironment>,
    ) -> Self {
        Self {
            console,
            events,
            host,
        }
    }

    /// The page console.
    #[must_use]
    pub const fn console(&self) -> &Arc<Console> {
        &self.console
    }

    /// The global event hub.
    #[must_use]
    pub const fn events(&self) -> &Arc<GlobalEvents> {
        &self.events
    }

    /// The page environment.
    #[must_use]
    pub fn host(&self) -> &dyn HostEnvironment {
        self.host.as_ref()
    }
}
