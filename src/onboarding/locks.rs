//! Per-principal mutual exclusion.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};

/// One FIFO lock per uid, so attempts for the same principal run in the
/// order they started while different principals proceed concurrently.
#[derive(Default)]
pub struct PrincipalLocks {
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

/// Held for the duration of one attempt.
pub struct PrincipalGuard {
    uid: String,
    _guard: OwnedMutexGuard<()>,
}

impl PrincipalGuard {
    /// The uid this guard holds exclusive access to.
    pub fn uid(&self) -> &str {
        &self.uid
    }
}

impl PrincipalLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `uid`.
    pub async fn acquire(&self, uid: &str) -> PrincipalGuard {
        let lock = {
            let mut locks = self.locks.lock().await;
            // Entries nobody holds or waits on are only referenced by the map.
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            Arc::clone(locks.entry(uid.to_string()).or_default())
        };
        PrincipalGuard {
            uid: uid.to_string(),
            _guard: lock.lock_owned().await,
        }
    }

    /// Number of uids currently tracked.
    pub async fn tracked(&self) -> usize {
        self.locks.lock().await.len()
    }
}
