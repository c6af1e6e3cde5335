//! Capturing logger that batches entries to the ingest endpoint.
//!
//! The logger owns the original console bindings it replaced and the event
//! listener it registered. [`PrErrorLogger::teardown`] hands both back, so
//! installing the logger is fully reversible.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use chrono::SecondsFormat;

use super::buffer::CaptureBuffer;
use super::config::{LoggerConfig, LoggerOptions};
use super::console::ConsoleSink;
use super::debounce::Debouncer;
use super::events::{ErrorEvent, GlobalEventListener, ListenerId, RejectionEvent};
use super::format::{ConsoleArg, format_console_args};
use super::host::BrowserContext;
use super::transport::{BatchPayload, HttpTransport, RepositoryContext, Transport, TransportError};
use crate::deployment::pr_number_from_deployment_url;
use crate::entry::{DeviceInfo, LogEntry, LogLevel};

/// Result of one send attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The buffer was empty; nothing was sent.
    Empty,
    /// The batch of this many entries was accepted.
    Delivered(usize),
    /// Delivery failed and the batch was put back at the front of the buffer.
    Requeued(usize),
}

/// Client-side error logger.
///
/// Construct one per page. Without a [`BrowserContext`] the logger is inert:
/// it installs no hooks, though [`manual_log`](Self::manual_log) and
/// [`flush`](Self::flush) keep working.
pub struct PrErrorLogger {
    inner: Arc<LoggerInner>,
}

struct LoggerInner {
    config: LoggerConfig,
    context: Option<BrowserContext>,
    transport: Arc<dyn Transport>,
    buffer: Mutex<CaptureBuffer>,
    debouncer: Debouncer,
    error_sink: Option<Arc<dyn ConsoleSink>>,
    hooks: Mutex<Option<InstalledHooks>>,
}

#[derive(Default)]
struct InstalledHooks {
    originals: Vec<(LogLevel, Arc<dyn ConsoleSink>)>,
    listener: Option<ListenerId>,
}

struct EntryDraft {
    message: String,
    stack: Option<String>,
    level: LogLevel,
    url: Option<String>,
}

impl EntryDraft {
    const fn new(level: LogLevel, message: String) -> Self {
        Self {
            message,
            stack: None,
            level,
            url: None,
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl PrErrorLogger {
    /// Resolves `options` against the process environment and posts batches
    /// over HTTP to the resolved `api_endpoint`.
    ///
    /// # Errors
    ///
    /// See [`over_http`](Self::over_http).
    pub fn new(
        options: LoggerOptions,
        context: Option<BrowserContext>,
    ) -> Result<Self, TransportError> {
        Self::over_http(LoggerConfig::from_env(options), context)
    }

    /// Posts batches to `config.api_endpoint`.
    ///
    /// A relative endpoint resolves against the page location, the way a
    /// browser resolves a relative `fetch` URL.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::InvalidEndpoint`] when the endpoint is
    /// relative and no page URL is available to resolve it against.
    pub fn over_http(
        config: LoggerConfig,
        context: Option<BrowserContext>,
    ) -> Result<Self, TransportError> {
        let page_href = context.as_ref().map(|page| page.host().location_href());
        let transport = HttpTransport::for_page(page_href.as_deref(), &config.api_endpoint)?;
        tracing::debug!(endpoint = %transport.endpoint(), "error logs will be posted over HTTP");
        Ok(Self::with_config(config, context, Arc::new(transport)))
    }

    /// Builds a logger that delivers through `transport`.
    ///
    /// The configured `api_endpoint` is not consulted; the transport already
    /// knows where it posts.
    #[must_use]
    pub fn with_config(
        config: LoggerConfig,
        context: Option<BrowserContext>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        let error_sink = context
            .as_ref()
            .map(|page| page.console().binding(LogLevel::Error));
        let inner = Arc::new(LoggerInner {
            buffer: Mutex::new(CaptureBuffer::new(config.max_log_entries)),
            debouncer: Debouncer::new(config.debounce),
            config,
            context,
            transport,
            error_sink,
            hooks: Mutex::new(None),
        });
        LoggerInner::install(&inner);
        Self { inner }
    }

    /// The resolved configuration.
    #[must_use]
    pub fn config(&self) -> &LoggerConfig {
        &self.inner.config
    }

    /// Whether console or event hooks are currently installed.
    #[must_use]
    pub fn is_installed(&self) -> bool {
        lock(&self.inner.hooks).is_some()
    }

    /// Enqueues an application message, bypassing console interception.
    ///
    /// When `extra` is supplied its pretty-printed JSON is appended on a new
    /// line.
    pub fn manual_log(&self, message: &str, level: LogLevel, extra: Option<&serde_json::Value>) {
        let text = match extra {
            Some(data) => format!("{message}\n{}", ConsoleArg::from(data.clone()).render()),
            None => message.to_owned(),
        };
        self.inner.record(EntryDraft::new(level, text));
    }

    /// Cancels the pending timer and sends the buffer immediately.
    pub async fn flush(&self) -> DispatchOutcome {
        self.inner.debouncer.cancel();
        self.inner.send_pending().await
    }

    /// Snapshot of the entries waiting to be sent, oldest first.
    #[must_use]
    pub fn pending(&self) -> Vec<LogEntry> {
        lock(&self.inner.buffer).iter().cloned().collect()
    }

    /// Whether a debounced send is scheduled.
    #[must_use]
    pub fn has_pending_send(&self) -> bool {
        self.inner.debouncer.is_pending()
    }

    /// Cancels the pending timer and restores every hook. Safe to call twice.
    pub fn teardown(&self) {
        self.inner.debouncer.cancel();
        let Some(hooks) = lock(&self.inner.hooks).take() else {
            return;
        };
        let Some(page) = self.inner.context.as_ref() else {
            return;
        };

        for (level, original) in hooks.originals {
            page.console().rebind(level, original);
        }
        if let Some(id) = hooks.listener {
            page.events().remove_listener(id);
        }
        tracing::debug!("error logger hooks removed");
    }
}

impl Drop for PrErrorLogger {
    fn drop(&mut self) {
        self.teardown();
    }
}

impl LoggerInner {
    fn install(this: &Arc<Self>) {
        let Some(page) = this.context.as_ref() else {
            tracing::debug!("no browser context; error logger hooks skipped");
            return;
        };

        let mut hooks = InstalledHooks::default();

        if this.config.capture_errors || this.config.capture_rejections {
            let listener = Arc::new(EventCapture {
                logger: Arc::downgrade(this),
            });
            hooks.listener = Some(page.events().add_listener(listener));
        }

        if this.config.capture_console {
            for level in LogLevel::ALL {
                let original = page.console().binding(level);
                let interceptor = Arc::new(CapturingSink {
                    level,
                    original: Arc::clone(&original),
                    logger: Arc::downgrade(this),
                });
                page.console().rebind(level, interceptor);
                hooks.originals.push((level, original));
            }
        }

        *lock(&this.hooks) = Some(hooks);
    }

    fn record(self: &Arc<Self>, draft: EntryDraft) {
        let entry = self.enrich(draft);
        let evicted = lock(&self.buffer).push(entry);
        if evicted > 0 {
            tracing::debug!(evicted, "log buffer full; dropped oldest entries");
        }

        let logger = Arc::downgrade(self);
        self.debouncer.schedule(move || async move {
            if let Some(inner) = logger.upgrade() {
                inner.send_pending().await;
            }
        });
    }

    fn enrich(&self, draft: EntryDraft) -> LogEntry {
        let host = self.context.as_ref().map(BrowserContext::host);
        let href = host.map(|page| page.location_href()).unwrap_or_default();
        let timestamp = host
            .map_or_else(chrono::Utc::now, |page| page.now())
            .to_rfc3339_opts(SecondsFormat::Millis, true);
        let deployment_url = self
            .config
            .deployment
            .deployment_url
            .clone()
            .or_else(|| (!href.is_empty()).then(|| href.clone()));

        LogEntry {
            message: draft.message,
            stack: draft.stack,
            level: draft.level,
            timestamp,
            url: draft.url.unwrap_or(href),
            user_agent: host.map(|page| page.user_agent()).unwrap_or_default(),
            device_info: host.map_or_else(DeviceInfo::default, |page| page.device_info()),
            pr_number: deployment_url
                .as_deref()
                .and_then(pr_number_from_deployment_url),
            deployment_url,
            vercel_env: self.config.deployment.environment.clone(),
        }
    }

    async fn send_pending(&self) -> DispatchOutcome {
        let logs = {
            let mut buffer = lock(&self.buffer);
            if buffer.is_empty() {
                return DispatchOutcome::Empty;
            }
            buffer.take()
        };
        let count = logs.len();
        let payload = BatchPayload {
            logs,
            config: RepositoryContext {
                repository: self.config.repository.clone(),
                owner: self.config.owner.clone(),
            },
        };

        let Err(error) = self.transport.send(&payload).await else {
            tracing::debug!(count, "error log batch delivered");
            return DispatchOutcome::Delivered(count);
        };

        tracing::warn!(count, "failed to send error logs: {error}");
        if let Some(sink) = &self.error_sink {
            sink.write(
                LogLevel::Error,
                &[
                    ConsoleArg::text("Failed to send error logs:"),
                    ConsoleArg::error(&error),
                ],
            );
        }

        let evicted = lock(&self.buffer).requeue_front(payload.logs);
        if evicted > 0 {
            tracing::debug!(evicted, "log buffer full after re-queue");
        }
        DispatchOutcome::Requeued(count)
    }
}

/// Replacement console binding for one level.
struct CapturingSink {
    level: LogLevel,
    original: Arc<dyn ConsoleSink>,
    logger: Weak<LoggerInner>,
}

impl ConsoleSink for CapturingSink {
    fn write(&self, level: LogLevel, args: &[ConsoleArg]) {
        self.original.write(level, args);

        let Some(inner) = self.logger.upgrade() else {
            return;
        };
        if self.level == LogLevel::Warn && !inner.config.capture_warnings {
            return;
        }
        inner.record(EntryDraft::new(self.level, format_console_args(args)));
    }
}

struct EventCapture {
    logger: Weak<LoggerInner>,
}

impl GlobalEventListener for EventCapture {
    fn on_error(&self, event: &ErrorEvent) {
        let Some(inner) = self.logger.upgrade() else {
            return;
        };
        if !inner.config.capture_errors {
            return;
        }
        inner.record(EntryDraft {
            message: event.message.clone(),
            stack: event.error.as_ref().and_then(|error| error.stack.clone()),
            level: LogLevel::Error,
            url: event.filename.clone().filter(|name| !name.is_empty()),
        });
    }

    fn on_unhandled_rejection(&self, event: &RejectionEvent) {
        let Some(inner) = self.logger.upgrade() else {
            return;
        };
        if !inner.config.capture_rejections {
            return;
        }
        inner.record(EntryDraft {
            message: format!("Unhandled Promise Rejection: {}", event.reason.summary()),
            stack: event.reason.stack().map(ToOwned::to_owned),
            level: LogLevel::Error,
            url: None,
        });
    }
}

#[cfg(test)]
#[path = "logger_tests.rs"]
mod tests;
