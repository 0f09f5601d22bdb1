use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::Serialize;
use std::sync::Arc;

use crate::{
    error::AppResult,
    middleware::request_id::RequestId,
    models::{CategoryGroup, NewWatchedShow, WatchedShow},
    routes::AppState,
};

#[derive(Debug, Serialize)]
pub struct ShowListResponse {
    pub shows: Vec<WatchedShow>,
}

#[derive(Debug, Serialize)]
pub struct CategoryListResponse {
    pub categories: Vec<CategoryGroup>,
}

#[derive(Debug, Serialize)]
pub struct ShowAddedResponse {
    pub message: String,
    pub show: WatchedShow,
}

#[derive(Debug, Serialize)]
pub struct ShowRemovedResponse {
    pub message: String,
}

/// Lists every watched show
pub async fn list(State(state): State<Arc<AppState>>) -> AppResult<Json<ShowListResponse>> {
    let shows = state.store.list_all().await?;
    Ok(Json(ShowListResponse { shows }))
}

/// Watched shows grouped by the fixed categories
pub async fn by_category(
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<CategoryListResponse>> {
    let categories = state.store.grouped_by_category().await?;
    Ok(Json(CategoryListResponse { categories }))
}

pub async fn add(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<NewWatchedShow>,
) -> AppResult<Json<ShowAddedResponse>> {
    tracing::info!(request_id = %request_id, title = %request.title, "Adding watched show");

    let show = state.store.add(request).await?;

    Ok(Json(ShowAddedResponse {
        message: format!("\"{}\" added to your list", show.title),
        show,
    }))
}

pub async fn remove(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Path(id): Path<i64>,
) -> AppResult<Json<ShowRemovedResponse>> {
    tracing::info!(request_id = %request_id, id, "Removing watched show");

    let show = state.store.delete(id).await?;

    Ok(Json(ShowRemovedResponse {
        message: format!("\"{}\" removed from your list", show.title),
    }))
}
