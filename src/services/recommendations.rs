use chrono::NaiveDate;
use serde::Serialize;

use crate::{
    error::{AppError, AppResult},
    services::{enrichment, providers::ChatModel, verification::ShowVerifier},
};

/// How many shows the model is asked to suggest
pub const RECOMMENDATION_COUNT: usize = 5;

/// Enriched model output plus the size of the watched list it was based on
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RecommendationResponse {
    /// JSON document `{"shows": [...]}`, serialized
    pub response: String,
    pub watched_count: usize,
}

/// System prompt: pins the date and the response schema
pub fn system_prompt(today: NaiveDate) -> String {
    format!(
        "You are a TV series expert who follows every new release. Today is {today}. \
         Recommend ONLY recent TV series available on Netflix Italy. \
         Analyse the user's taste from the series they have already watched. \
         Answer in JSON with a 'shows' array of objects with the fields: \
         'title': the actual title of the series, \
         'genre': the main genre or genres, \
         'description': a short plot summary, \
         'release_date': the release date on Netflix Italy, \
         'similar_to': a list of 1-3 already watched series it resembles, \
         'image_url': URL of a poster image (a real Netflix or TMDB URL), \
         'info_url': URL of the official Netflix or IMDB page of the series.",
        today = today.format("%Y-%m-%d")
    )
}

/// User prompt embedding the watched titles
pub fn user_prompt(watched_titles: &[String]) -> String {
    format!(
        "Considering the TV series I have already watched: {watched}, \
         suggest {count} new TV series available on Netflix Italy that were released recently \
         and that I might like based on my taste. \
         Important: make sure they are series that really exist on Netflix Italy, \
         ideally cross-checking with sites such as \"Netflix Lovers Italia\". \
         Include ONLY verifiable titles and make sure the image and info URLs work \
         (preferably from TMDB or official Netflix/IMDB pages).",
        watched = watched_titles.join(", "),
        count = RECOMMENDATION_COUNT,
    )
}

/// Generates personalized show recommendations
///
/// Asks the language model for suggestions based on the watched titles, checks
/// that the answer is JSON, then verifies and enriches every suggested show.
/// Enrichment problems never fail the call; model and format problems do.
pub async fn get_recommendations(
    chat_model: &dyn ChatModel,
    verifier: &dyn ShowVerifier,
    api_key: &str,
    watched_titles: &[String],
    today: NaiveDate,
) -> AppResult<RecommendationResponse> {
    if api_key.trim().is_empty() {
        return Err(AppError::CredentialMissing);
    }

    tracing::info!(watched = watched_titles.len(), "Requesting recommendations");

    let raw = chat_model
        .complete_json(api_key, &system_prompt(today), &user_prompt(watched_titles))
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Language model call failed");
            e
        })?;

    serde_json::from_str::<serde_json::Value>(&raw).map_err(|e| {
        tracing::error!(error = %e, "Model response is not valid JSON");
        AppError::ResponseFormat(e.to_string())
    })?;

    tracing::info!("Verifying recommendations");
    let response = enrichment::enrich_all(verifier, &raw).await;

    Ok(RecommendationResponse {
        response,
        watched_count: watched_titles.len(),
    })
}
