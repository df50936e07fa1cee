use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Exclusive per-conversation lease. Holding the guard serializes the
/// read-history, generate, append sequence for one conversation.
#[derive(Default)]
pub struct ConversationLocks {
    inner: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl ConversationLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, conversation_id: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            // Entries nobody holds or waits on can go
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            locks
                .entry(conversation_id.to_string())
                .or_insert_with(|| Arc::new(AsyncMutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }

    /// Conversations that currently have a lease or a waiter
    pub fn active(&self) -> usize {
        let locks = self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        locks.values().filter(|lock| Arc::strong_count(lock) > 1).count()
    }
}
