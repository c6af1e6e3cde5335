//! Client-side capture and batching of console output and runtime errors.
//!
//! The page is modelled as a [`BrowserContext`]: a rebindable [`Console`], a
//! [`GlobalEvents`] hub and a [`HostEnvironment`]. [`PrErrorLogger`] hooks
//! into the console and event hub, turns each captured call into a
//! [`LogEntry`](crate::entry::LogEntry), keeps them in a bounded
//! [`CaptureBuffer`] and posts them in debounced batches through a
//! [`Transport`].

pub mod buffer;
pub mod config;
pub mod console;
pub mod debounce;
pub mod events;
pub mod format;
pub mod host;
pub mod logger;
pub mod transport;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use buffer::CaptureBuffer;
pub use config::{LoggerConfig, LoggerOptions};
pub use console::{Console, ConsoleSink, TracingSink};
pub use debounce::Debouncer;
pub use events::{ErrorEvent, GlobalEventListener, GlobalEvents, ListenerId, RejectionEvent};
pub use format::{ConsoleArg, ErrorValue, format_console_args, format_error_for_logging};
pub use host::{BrowserContext, HostEnvironment};
pub use logger::{DispatchOutcome, PrErrorLogger};
pub use transport::{BatchPayload, HttpTransport, RepositoryContext, Transport, TransportError};
