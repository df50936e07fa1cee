//! Merging of per-category hits into one ranked list.

use std::collections::HashMap;

use muse_types::SearchResult;

/// Keep only the best-scoring hit per content hash. Order of first
/// appearance is preserved.
pub fn deduplicate(results: Vec<SearchResult>) -> Vec<SearchResult> {
    let mut best: HashMap<String, usize> = HashMap::new();
    let mut kept: Vec<SearchResult> = Vec::with_capacity(results.len());

    for hit in results {
        match best.get(&hit.hashed_value) {
            Some(&idx) => {
                if hit.score > kept[idx].score {
                    kept[idx] = hit;
                }
            }
            None => {
                best.insert(hit.hashed_value.clone(), kept.len());
                kept.push(hit);
            }
        }
    }

    kept
}

/// Sort by descending score and keep the first `n`
pub fn rank(mut results: Vec<SearchResult>, n: usize) -> Vec<SearchResult> {
    results.sort_by(|a, b| b.score.total_cmp(&a.score));
    results.truncate(n);
    results
}

/// Blend each score with whether the whole query appears verbatim
pub fn rerank(results: &mut [SearchResult], query: &str) {
    let phrase = query.trim().to_lowercase();
    for hit in results.iter_mut() {
        let exact = if !phrase.is_empty() && hit.content.to_lowercase().contains(&phrase) {
            1.0
        } else {
            0.0
        };
        hit.score = 0.7 * hit.score + 0.3 * exact;
    }
}
