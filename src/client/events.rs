//! Global error and unhandled rejection event dispatch.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use super::format::{ConsoleArg, ErrorValue};

/// Uncaught error raised by host code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorEvent {
    /// Error message as reported by the runtime.
    pub message: String,
    /// Script that raised the error, when known.
    pub filename: Option<String>,
    /// The thrown error, when available.
    pub error: Option<ErrorValue>,
}

impl ErrorEvent {
    /// Creates an event carrying only a message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            filename: None,
            error: None,
        }
    }
}

/// Asynchronous task that failed without anyone awaiting its result.
#[derive(Debug, Clone, PartialEq)]
pub struct RejectionEvent {
    /// Value the task was rejected with.
    pub reason: ConsoleArg,
}

/// Receiver of global runtime events.
pub trait GlobalEventListener: Send + Sync {
    /// Called for every uncaught error.
    fn on_error(&self, event: &ErrorEvent);

    /// Called for every unhandled rejection.
    fn on_unhandled_rejection(&self, event: &RejectionEvent);
}

/// Handle returned by [`GlobalEvents::add_listener`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listeners = Vec<(ListenerId, Arc<dyn GlobalEventListener>)>;

/// Registry of global event listeners.
#[derive(Default)]
pub struct GlobalEvents {
    next_id: AtomicU64,
    listeners: Mutex<Listeners>,
}

impl GlobalEvents {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a listener.
    pub fn add_listener(&self, listener: Arc<dyn GlobalEventListener>) -> ListenerId {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, listener));
        id
    }

    /// Removes a listener; returns `false` when it was not registered.
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.lock().unwrap_or_else(PoisonError::into_inner);
        let before = listeners.len();
        listeners.retain(|(candidate, _)| *candidate != id);
        listeners.len() != before
    }

    /// Number of registered listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Delivers an uncaught error to every listener.
    pub fn dispatch_error(&self, event: &ErrorEvent) {
        for listener in self.snapshot() {
            listener.on_error(event);
        }
    }

    /// Delivers an unhandled rejection to every listener.
    pub fn dispatch_rejection(&self, event: &RejectionEvent) {
        for listener in self.snapshot() {
            listener.on_unhandled_rejection(event);
        }
    }

    fn snapshot(&self) -> Vec<Arc<dyn GlobalEventListener>> {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect()
    }
}
