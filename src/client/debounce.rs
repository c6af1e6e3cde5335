//! Single-slot debounce timer.
//!
//! Scheduling always replaces the pending timer, so at most one task is
//! waiting at any moment. The debounced task itself is spawned separately
//! once the timer fires: cancelling or rescheduling the timer never aborts
//! a task that has already started.

use std::future::Future;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;

/// Holds at most one pending timer.
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    slot: Mutex<Option<JoinHandle<()>>>,
}

impl Debouncer {
    /// Creates an idle debouncer.
    #[must_use]
    pub const fn new(delay: Duration) -> Self {
        Self {
            delay,
            slot: Mutex::new(None),
        }
    }

    /// Debounce window.
    #[must_use]
    pub const fn delay(&self) -> Duration {
        self.delay
    }

    /// Cancels any pending timer and schedules `task` to run after the delay.
    ///
    /// Returns `false` without scheduling when no Tokio runtime is available.
    pub fn schedule<F, Fut>(&self, task: F) -> bool
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let Ok(runtime) = Handle::try_current() else {
            tracing::debug!("no Tokio runtime available; debounced send not scheduled");
            return false;
        };

        let delay = self.delay;
        let spawner = runtime.clone();
        let timer = runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            drop(spawner.spawn(task()));
        });

        let previous = self
            .slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(timer);
        if let Some(handle) = previous {
            handle.abort();
        }
        true
    }

    /// Cancels the pending timer; returns `true` when one was still waiting.
    pub fn cancel(&self) -> bool {
        let pending = self
            .slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        pending.is_some_and(|handle| {
            let waiting = !handle.is_finished();
            handle.abort();
            waiting
        })
    }

    /// Whether a timer is waiting to fire.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}
