use std::sync::Arc;
use std::time::Instant;

use futures::future::join_all;
use muse_types::{AccessPolicy, Caller, SearchResult, SearchType};

use crate::cache::{CachedResults, QueryCache};
use crate::collate::{deduplicate, rank, rerank};
use crate::error::Result;
use crate::request::SearchRequest;
use crate::searcher::{ContentSearcher, SearchScope};

const TEXT_CATEGORIES: [SearchType; 6] = [
    SearchType::Org,
    SearchType::Markdown,
    SearchType::Pdf,
    SearchType::Github,
    SearchType::Notion,
    SearchType::Plaintext,
];

/// Ranked, deduplicated and cached search over every registered searcher
pub struct SearchOrchestrator {
    cache: Arc<dyn QueryCache>,
    searchers: Vec<Arc<dyn ContentSearcher>>,
    access: Arc<dyn AccessPolicy>,
}

impl SearchOrchestrator {
    pub fn new(cache: Arc<dyn QueryCache>, access: Arc<dyn AccessPolicy>) -> Self {
        Self {
            cache,
            searchers: Vec::new(),
            access,
        }
    }

    pub fn with_searcher(mut self, searcher: Arc<dyn ContentSearcher>) -> Self {
        self.searchers.push(searcher);
        self
    }

    fn categories(t: SearchType) -> Vec<SearchType> {
        match t {
            SearchType::All => TEXT_CATEGORIES.to_vec(),
            other => vec![other],
        }
    }

    /// Run a search for the caller.
    ///
    /// Blank queries and agents the caller may not use both yield an empty
    /// list. A cached list for the same signature is returned as-is.
    pub async fn search(&self, caller: &Caller, request: &SearchRequest) -> Result<CachedResults> {
        let query = request.q.trim();
        if query.is_empty() {
            return Ok(Arc::new(Vec::new()));
        }

        if let Some(agent) = &request.agent {
            if !self.access.can_use_agent(agent, caller) {
                tracing::debug!(agent = %agent.slug, user_id = %caller.user_id, "search agent not accessible");
                return Ok(Arc::new(Vec::new()));
            }
        }

        let signature = request.signature();
        if let Some(cached) = self.cache.get(&caller.user_id, &signature).await {
            tracing::debug!(%signature, "search cache hit");
            return Ok(cached);
        }

        let started = Instant::now();
        let scopes: Vec<SearchScope<'_>> = Self::categories(request.t)
            .into_iter()
            .map(|category| SearchScope {
                query,
                category,
                user_id: &caller.user_id,
                agent: request.agent.as_ref(),
                max_distance: request.max_distance,
            })
            .collect();

        let lookups = scopes.iter().flat_map(|scope| {
            self.searchers
                .iter()
                .filter(|searcher| searcher.serves(scope.category))
                .map(move |searcher| async move {
                    match searcher.search(scope).await {
                        Ok(hits) => hits,
                        Err(e) => {
                            tracing::warn!(searcher = searcher.name(), category = %scope.category, error = %e, "search lookup failed");
                            Vec::new()
                        }
                    }
                })
        });

        let merged: Vec<SearchResult> = join_all(lookups).await.into_iter().flatten().collect();

        let mut collated = if request.dedupe { deduplicate(merged) } else { merged };
        if request.rerank {
            rerank(&mut collated, query);
        }
        let results = Arc::new(rank(collated, request.n));

        self.cache.put(&caller.user_id, &signature, results.clone()).await;
        tracing::debug!(
            %signature,
            hits = results.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "search computed"
        );
        Ok(results)
    }
}
