use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use muse_persist::{EntryFilter, IndexOutcome};
use muse_types::Entry;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::{
    auth::CurrentUser,
    error::{ApiError, ApiResult},
    state::AppState,
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct IndexRequest {
    pub files: Vec<IndexFile>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct IndexFile {
    pub file_name: String,
    pub content: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct IndexResponse {
    pub indexed: Vec<IndexedFile>,
    /// Files with an extension there is no reader for
    pub skipped: Vec<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct IndexedFile {
    pub file_name: String,
    pub file_object_id: String,
    pub entries: Vec<EntryResponse>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct EntryResponse {
    pub id: String,
    pub heading: Option<String>,
    pub raw: String,
    pub file_type: String,
    pub file_name: Option<String>,
    pub hashed_value: String,
    pub created_at: DateTime<Utc>,
}

impl From<Entry> for EntryResponse {
    fn from(entry: Entry) -> Self {
        Self {
            id: entry.id,
            heading: entry.heading,
            raw: entry.raw,
            file_type: entry.file_type,
            file_name: entry.file_name,
            hashed_value: entry.hashed_value,
            created_at: entry.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct EntriesQuery {
    pub file_type: Option<String>,
    pub file_name: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct DeleteContentQuery {
    pub file_type: Option<String>,
    pub file_name: Option<String>,
}

fn caller_filter(user_id: &str, file_type: Option<&String>, file_name: Option<&String>) -> EntryFilter {
    let mut filter = EntryFilter::for_user(user_id);
    if let Some(file_type) = file_type {
        filter = filter.file_type(file_type.clone());
    }
    if let Some(file_name) = file_name {
        filter = filter.file_name(file_name.clone());
    }
    filter
}

/// Index text files for the caller
///
/// A file indexed again replaces the entries it produced before.
#[utoipa::path(
    post,
    path = "/api/content/index",
    request_body = IndexRequest,
    responses(
        (status = 200, description = "Files indexed", body = IndexResponse),
        (status = 400, description = "No files given")
    ),
    tag = "content"
)]
pub async fn index_content(
    State(state): State<Arc<AppState>>,
    CurrentUser(caller): CurrentUser,
    Json(req): Json<IndexRequest>,
) -> ApiResult<Json<IndexResponse>> {
    if req.files.is_empty() {
        return Err(ApiError::BadRequest("no files to index".to_string()));
    }

    let mut response = IndexResponse {
        indexed: Vec::new(),
        skipped: Vec::new(),
    };
    for file in req.files {
        let previous = EntryFilter::for_user(caller.user_id.clone()).file_name(file.file_name.clone());
        let replaced = state.entries.delete(&previous).await?;
        if replaced.entries > 0 {
            tracing::info!(file_name = %file.file_name, entries = replaced.entries, "replacing indexed file");
        }

        match state.entries.index_text(&caller.user_id, &file.file_name, &file.content).await? {
            IndexOutcome::Indexed { file_object_id, entries } => {
                response.indexed.push(IndexedFile {
                    file_name: file.file_name,
                    file_object_id,
                    entries: entries.into_iter().map(EntryResponse::from).collect(),
                });
            }
            IndexOutcome::Unsupported { file_name } => response.skipped.push(file_name),
        }
    }

    Ok(Json(response))
}

/// List the caller's entries
#[utoipa::path(
    get,
    path = "/api/content/entries",
    params(
        ("file_type" = Option<String>, Query, description = "Only entries of this type"),
        ("file_name" = Option<String>, Query, description = "Only entries from this file"),
        ("limit" = Option<usize>, Query, description = "Maximum entries to return")
    ),
    responses(
        (status = 200, description = "Entries", body = [EntryResponse])
    ),
    tag = "content"
)]
pub async fn list_entries(
    State(state): State<Arc<AppState>>,
    CurrentUser(caller): CurrentUser,
    Query(query): Query<EntriesQuery>,
) -> ApiResult<Json<Vec<EntryResponse>>> {
    let filter = caller_filter(&caller.user_id, query.file_type.as_ref(), query.file_name.as_ref());
    let entries = state.entries.find(&filter, query.limit).await?;
    Ok(Json(entries.into_iter().map(EntryResponse::from).collect()))
}

/// Delete the caller's entries by file name and/or type
#[utoipa::path(
    delete,
    path = "/api/content/index",
    params(
        ("file_type" = Option<String>, Query, description = "Only entries of this type"),
        ("file_name" = Option<String>, Query, description = "Only entries from this file")
    ),
    responses(
        (status = 204, description = "Entries deleted")
    ),
    tag = "content"
)]
pub async fn delete_content(
    State(state): State<Arc<AppState>>,
    CurrentUser(caller): CurrentUser,
    Query(query): Query<DeleteContentQuery>,
) -> ApiResult<StatusCode> {
    let filter = caller_filter(&caller.user_id, query.file_type.as_ref(), query.file_name.as_ref());
    let summary = state.entries.delete(&filter).await?;
    tracing::info!(
        user = %caller.user_id,
        entries = summary.entries,
        file_objects = summary.file_objects,
        "content deleted"
    );

    Ok(StatusCode::NO_CONTENT)
}
