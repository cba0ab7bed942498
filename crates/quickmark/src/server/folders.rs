//! Folder, tab and bookmark endpoints.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::host::{CloseRequest, HostFrame};
use crate::picker::FolderMatch;
use crate::resolver::FolderResolver;
use crate::save::{save_bookmark, SaveRequest, SavedBookmark};
use crate::server::error::ApiError;
use crate::server::ServerState;
use crate::store::ActiveTab;

#[derive(Debug, Default, Deserialize)]
pub struct FolderQuery {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Serialize)]
pub struct FolderMatches {
    pub matches: Vec<FolderMatch>,
}

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub count: usize,
}

#[derive(Debug, Deserialize)]
pub struct CreateFolderRequest {
    pub path: String,
}

#[derive(Debug, Serialize)]
pub struct CreateFolderResponse {
    pub id: String,
}

/// Request payload for saving a bookmark.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveBookmarkRequest {
    #[serde(flatten)]
    pub save: SaveRequest,
    /// Whether the popup runs inside a page frame.
    #[serde(default)]
    pub embedded: bool,
    /// Stands in for the active tab when saving into a profile file.
    #[serde(default)]
    pub tab: Option<ActiveTab>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveBookmarkResponse {
    pub ok: bool,
    pub bookmark: SavedBookmark,
    pub close: CloseRequest,
}

/// GET /tab
pub(crate) async fn active_tab(
    State(state): State<Arc<ServerState>>,
) -> Result<Json<ActiveTab>, ApiError> {
    let store = state.store(None).await?;
    Ok(Json(store.query_active_tab().await?))
}

/// GET /folders?q=
///
/// Matching folders in tree order, with highlight segments for `q`.
pub(crate) async fn search(
    State(state): State<Arc<ServerState>>,
    Query(query): Query<FolderQuery>,
) -> Result<Json<FolderMatches>, ApiError> {
    let (_store, cache) = state.folders().await?;
    let index = cache.snapshot().await;
    let matches = index
        .search(&query.q)
        .into_iter()
        .map(|record| FolderMatch::new(record, &query.q))
        .collect();
    Ok(Json(FolderMatches { matches }))
}

/// POST /folders/refresh
pub(crate) async fn refresh(
    State(state): State<Arc<ServerState>>,
) -> Result<Json<RefreshResponse>, ApiError> {
    let (_store, cache) = state.folders().await?;
    let index = cache.refresh().await?;
    Ok(Json(RefreshResponse { count: index.len() }))
}

/// POST /folders
///
/// Creates the missing folders of `path` and returns the deepest id.
pub(crate) async fn create(
    State(state): State<Arc<ServerState>>,
    Json(payload): Json<CreateFolderRequest>,
) -> Result<Json<CreateFolderResponse>, ApiError> {
    let (store, cache) = state.folders().await?;
    let resolver = FolderResolver::new(store, cache, state.config.root_folder_id.as_str());
    let id = resolver.resolve(&payload.path).await?;
    Ok(Json(CreateFolderResponse { id }))
}

/// POST /bookmarks
pub(crate) async fn save(
    State(state): State<Arc<ServerState>>,
    Json(payload): Json<SaveBookmarkRequest>,
) -> Result<Json<SaveBookmarkResponse>, ApiError> {
    let store = state.store(payload.tab).await?;
    let (_cached, cache) = state.folders().await?;
    let root_id = state.config.root_folder_id.as_str();
    let resolver = FolderResolver::new(store.clone(), cache, root_id);

    let bookmark = save_bookmark(&store, &resolver, &payload.save).await?;
    let host = HostFrame::detect(payload.embedded, &state.config.host_message_tag);
    Ok(Json(SaveBookmarkResponse {
        ok: true,
        bookmark,
        close: host.close_request(),
    }))
}
