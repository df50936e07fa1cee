use std::collections::HashSet;

use async_trait::async_trait;
use muse_persist::{EntryFilter, EntryStore};
use muse_types::{Agent, Entry, SearchResult, SearchType};

use crate::error::Result;

/// One category lookup handed to a searcher
#[derive(Debug, Clone)]
pub struct SearchScope<'a> {
    pub query: &'a str,
    pub category: SearchType,
    pub user_id: &'a str,
    pub agent: Option<&'a Agent>,
    pub max_distance: Option<f64>,
}

/// Lookup path for one or more content categories
#[async_trait]
pub trait ContentSearcher: Send + Sync {
    fn name(&self) -> &str;

    fn serves(&self, category: SearchType) -> bool;

    async fn search(&self, scope: &SearchScope<'_>) -> Result<Vec<SearchResult>>;
}

/// Lexical scorer over stored entries.
///
/// Score is the fraction of distinct query terms found in the entry, and
/// distance is `1 - score`.
pub struct TextSearcher {
    entries: EntryStore,
}

impl TextSearcher {
    pub fn new(entries: EntryStore) -> Self {
        Self { entries }
    }
}

pub(crate) fn query_terms(query: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    query
        .split_whitespace()
        .map(str::to_lowercase)
        .filter(|t| seen.insert(t.clone()))
        .collect()
}

fn score_entry(terms: &[String], entry: &Entry) -> f64 {
    if terms.is_empty() {
        return 0.0;
    }
    let raw = entry.raw.to_lowercase();
    let compiled = entry.compiled.to_lowercase();
    let found = terms
        .iter()
        .filter(|t| raw.contains(t.as_str()) || compiled.contains(t.as_str()))
        .count();
    found as f64 / terms.len() as f64
}

#[async_trait]
impl ContentSearcher for TextSearcher {
    fn name(&self) -> &str {
        "text"
    }

    fn serves(&self, category: SearchType) -> bool {
        !matches!(category, SearchType::Image | SearchType::All)
    }

    async fn search(&self, scope: &SearchScope<'_>) -> Result<Vec<SearchResult>> {
        let mut filter = EntryFilter::for_user(scope.user_id).file_type(scope.category.as_str());
        if let Some(agent) = scope.agent {
            filter = filter.with_agent(agent.id.clone());
        }

        let terms = query_terms(scope.query);
        let entries = self.entries.find(&filter, None).await?;

        let hits = entries
            .into_iter()
            .filter_map(|entry| {
                let score = score_entry(&terms, &entry);
                let distance = 1.0 - score;
                if score <= 0.0 || scope.max_distance.is_some_and(|max| distance > max) {
                    return None;
                }
                Some(SearchResult {
                    entry_id: entry.id,
                    content: entry.raw,
                    heading: entry.heading,
                    file: entry.file_path,
                    hashed_value: entry.hashed_value,
                    score,
                    source: scope.category,
                    additional: serde_json::json!({
                        "file_source": entry.file_source,
                        "corpus_id": entry.corpus_id,
                        "distance": distance,
                    }),
                })
            })
            .collect::<Vec<_>>();

        tracing::debug!(category = %scope.category, hits = hits.len(), "text search");
        Ok(hits)
    }
}
