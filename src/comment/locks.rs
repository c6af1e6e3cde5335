//! Per pull request serialisation of find-then-write comment updates.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, Weak};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::github::{PullRequestNumber, RepositoryLocator};

/// Async locks keyed by (API host, repository, pull request).
///
/// Slots are held weakly, so a key's lock is dropped once the last guard
/// and waiter release it. Share one instance across requests in a process.
#[derive(Debug, Default)]
pub struct PullRequestLocks {
    slots: Mutex<HashMap<String, Weak<AsyncMutex<()>>>>,
}

impl PullRequestLocks {
    /// Creates an empty lock table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for exclusive access to the pull request's aggregate comment.
    pub async fn acquire(
        &self,
        locator: &RepositoryLocator,
        number: PullRequestNumber,
    ) -> OwnedMutexGuard<()> {
        let lock = self.slot(&lock_key(locator, number));
        lock.lock_owned().await
    }

    /// Number of keys with a live lock.
    #[must_use]
    pub fn active(&self) -> usize {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|slot| slot.strong_count() > 0)
            .count()
    }

    fn slot(&self, key: &str) -> Arc<AsyncMutex<()>> {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots.retain(|_, slot| slot.strong_count() > 0);
        if let Some(existing) = slots.get(key).and_then(Weak::upgrade) {
            return existing;
        }
        let created = Arc::new(AsyncMutex::new(()));
        slots.insert(key.to_owned(), Arc::downgrade(&created));
        created
    }
}

/// GitHub resolves owner and repository names case-insensitively, so the
/// slug is folded to keep `Octo/Web` and `octo/web` on one lock.
fn lock_key(locator: &RepositoryLocator, number: PullRequestNumber) -> String {
    format!(
        "{}{}#{}",
        locator.api_base(),
        locator.slug().to_lowercase(),
        number.get()
    )
}
