use axum::{
    http::StatusCode,
    middleware,
    routing::{delete, get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    db::WatchedShowStore,
    middleware::request_id::{make_span_with_request_id, request_id_middleware},
    services::{ChatModel, ShowVerifier},
};

pub mod recommendations;
pub mod watched_shows;

/// Shared state handed to every handler
pub struct AppState {
    pub store: WatchedShowStore,
    pub chat_model: Arc<dyn ChatModel>,
    pub verifier: Arc<dyn ShowVerifier>,
    /// Used when a recommendation request carries no key of its own
    pub default_api_key: Option<String>,
}

/// Creates the application router with all routes
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route(
            "/watched_shows",
            get(watched_shows::list).post(watched_shows::add),
        )
        .route("/watched_shows/by_category", get(watched_shows::by_category))
        .route("/watched_shows/:id", delete(watched_shows::remove))
        .route("/get_recommendations", post(recommendations::recommend))
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}
