//! In-process serialisation of mutations per commission.
//!
//! Each commission id maps to an async mutex held for the duration of a
//! read-decide-commit cycle. Entries are weak so idle commissions do not pin
//! memory; the revision check in storage still guards other processes.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, Weak};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use uuid::Uuid;

/// Registry of per-commission async locks.
#[derive(Debug, Default)]
pub struct CommissionLocks {
    entries: Mutex<HashMap<Uuid, Weak<AsyncMutex<()>>>>,
}

impl CommissionLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `commission_id`.
    pub async fn acquire(&self, commission_id: Uuid) -> OwnedMutexGuard<()> {
        let lock = self.lock_for(commission_id);
        lock.lock_owned().await
    }

    fn lock_for(&self, commission_id: Uuid) -> Arc<AsyncMutex<()>> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(existing) = entries.get(&commission_id).and_then(Weak::upgrade) {
            return existing;
        }
        entries.retain(|_, weak| weak.strong_count() > 0);
        let fresh = Arc::new(AsyncMutex::new(()));
        entries.insert(commission_id, Arc::downgrade(&fresh));
        fresh
    }

    #[cfg(test)]
    fn tracked(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
