use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use muse_types::SearchResult;
use tokio::sync::RwLock;

pub type CachedResults = Arc<Vec<SearchResult>>;

/// Per-user store of computed result lists keyed by query signature.
///
/// Entries are never invalidated when content changes.
#[async_trait]
pub trait QueryCache: Send + Sync {
    async fn get(&self, user_id: &str, signature: &str) -> Option<CachedResults>;

    /// Overwrites any previous value for the signature
    async fn put(&self, user_id: &str, signature: &str, results: CachedResults);

    async fn clear(&self);

    async fn len(&self) -> usize;
}

#[derive(Default)]
struct CacheState {
    by_user: HashMap<String, HashMap<String, CachedResults>>,
    // (user, signature) in insertion order, for eviction
    order: VecDeque<(String, String)>,
}

/// Process-local cache. With a capacity, the oldest inserted signature is
/// evicted once the bound is reached.
pub struct InMemoryQueryCache {
    capacity: Option<usize>,
    state: RwLock<CacheState>,
}

impl InMemoryQueryCache {
    pub fn unbounded() -> Self {
        Self {
            capacity: None,
            state: RwLock::new(CacheState::default()),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: Some(capacity),
            state: RwLock::new(CacheState::default()),
        }
    }
}

impl Default for InMemoryQueryCache {
    fn default() -> Self {
        Self::unbounded()
    }
}

#[async_trait]
impl QueryCache for InMemoryQueryCache {
    async fn get(&self, user_id: &str, signature: &str) -> Option<CachedResults> {
        let state = self.state.read().await;
        state.by_user.get(user_id)?.get(signature).cloned()
    }

    async fn put(&self, user_id: &str, signature: &str, results: CachedResults) {
        if self.capacity == Some(0) {
            return;
        }

        let mut state = self.state.write().await;
        let user_entries = state.by_user.entry(user_id.to_string()).or_default();
        if let Some(existing) = user_entries.get_mut(signature) {
            *existing = results;
            return;
        }
        user_entries.insert(signature.to_string(), results);
        state.order.push_back((user_id.to_string(), signature.to_string()));

        if let Some(capacity) = self.capacity {
            while state.order.len() > capacity {
                let Some((old_user, old_signature)) = state.order.pop_front() else {
                    break;
                };
                let now_empty = match state.by_user.get_mut(&old_user) {
                    Some(entries) => {
                        entries.remove(&old_signature);
                        entries.is_empty()
                    }
                    None => false,
                };
                if now_empty {
                    state.by_user.remove(&old_user);
                }
                tracing::debug!(user_id = %old_user, signature = %old_signature, "evicted cached search");
            }
        }
    }

    async fn clear(&self) {
        let mut state = self.state.write().await;
        state.by_user.clear();
        state.order.clear();
    }

    async fn len(&self) -> usize {
        self.state.read().await.order.len()
    }
}
