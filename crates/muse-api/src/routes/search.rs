use axum::{
    extract::{Query, State},
    Json,
};
use muse_search::SearchRequest;
use muse_types::{SearchResult, SearchType};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::{
    auth::CurrentUser,
    error::{ApiError, ApiResult},
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: String,
    pub n: Option<usize>,
    pub t: Option<String>,
    #[serde(default)]
    pub r: bool,
    pub max_distance: Option<f64>,
    #[serde(default = "default_dedupe")]
    pub dedupe: bool,
    /// Agent slug
    pub agent: Option<String>,
}

fn default_dedupe() -> bool {
    true
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SearchResultResponse {
    pub entry_id: String,
    pub content: String,
    pub heading: Option<String>,
    pub file: Option<String>,
    pub hashed_value: String,
    pub score: f64,
    pub source: String,
    #[schema(value_type = Object)]
    pub additional: serde_json::Value,
}

impl From<&SearchResult> for SearchResultResponse {
    fn from(result: &SearchResult) -> Self {
        Self {
            entry_id: result.entry_id.clone(),
            content: result.content.clone(),
            heading: result.heading.clone(),
            file: result.file.clone(),
            hashed_value: result.hashed_value.clone(),
            score: result.score,
            source: result.source.to_string(),
            additional: result.additional.clone(),
        }
    }
}

/// Search the caller's indexed content
#[utoipa::path(
    get,
    path = "/api/search",
    params(
        ("q" = String, Query, description = "Query text"),
        ("n" = Option<usize>, Query, description = "Maximum results"),
        ("t" = Option<String>, Query, description = "Content type: all, org, markdown, pdf, github, notion, plaintext, image"),
        ("r" = Option<bool>, Query, description = "Rerank results"),
        ("max_distance" = Option<f64>, Query, description = "Drop results further than this"),
        ("dedupe" = Option<bool>, Query, description = "Collapse results with identical content (default true)"),
        ("agent" = Option<String>, Query, description = "Also search this agent's knowledge (slug)")
    ),
    responses(
        (status = 200, description = "Ranked results", body = [SearchResultResponse]),
        (status = 400, description = "Unknown content type")
    ),
    tag = "search"
)]
pub async fn search(
    State(state): State<Arc<AppState>>,
    CurrentUser(caller): CurrentUser,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Json<Vec<SearchResultResponse>>> {
    let search_type = match query.t.as_deref() {
        Some(t) => t.parse::<SearchType>().map_err(ApiError::BadRequest)?,
        None => SearchType::All,
    };

    let mut request = SearchRequest::new(query.q)
        .n(query.n.unwrap_or(state.config.search.default_results))
        .search_type(search_type)
        .rerank(query.r)
        .dedupe(query.dedupe);
    if let Some(max_distance) = query.max_distance {
        request = request.max_distance(max_distance);
    }
    if let Some(slug) = &query.agent {
        // Unknown agents look the same as inaccessible ones
        match state.persist.get_agent_by_slug(slug).await? {
            Some(agent) => request = request.agent(agent),
            None => return Ok(Json(Vec::new())),
        }
    }

    let results = state.search.search(&caller, &request).await?;
    Ok(Json(results.iter().map(SearchResultResponse::from).collect()))
}
