use axum::{extract::State, Extension, Json};
use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    middleware::request_id::RequestId,
    routes::AppState,
    services::recommendations::{self, RecommendationResponse},
};

#[derive(Debug, Default, Deserialize)]
pub struct RecommendationRequest {
    #[serde(default)]
    pub api_key: Option<String>,
}

/// Handler for the recommendations endpoint
///
/// The key from the request body wins over the configured one. It is passed
/// down for this call only and never stored.
pub async fn recommend(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    request: Option<Json<RecommendationRequest>>,
) -> AppResult<Json<RecommendationResponse>> {
    let request = request.map(|Json(body)| body).unwrap_or_default();

    let api_key = request
        .api_key
        .map(|key| key.trim().to_string())
        .filter(|key| !key.is_empty())
        .or_else(|| state.default_api_key.clone())
        .ok_or(AppError::CredentialMissing)?;

    let watched_titles = state.store.titles().await?;

    tracing::info!(
        request_id = %request_id,
        watched_count = watched_titles.len(),
        "Processing recommendation request"
    );

    let response = recommendations::get_recommendations(
        state.chat_model.as_ref(),
        state.verifier.as_ref(),
        &api_key,
        &watched_titles,
        Utc::now().date_naive(),
    )
    .await?;

    tracing::info!(request_id = %request_id, "Recommendations ready");

    Ok(Json(response))
}
