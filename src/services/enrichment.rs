use serde_json::Value;

use crate::{
    models::{RecommendationItem, VerificationResult},
    services::{fallback_urls::justwatch_url, verification::ShowVerifier},
};

/// Minimum length for a scraped description to be worth showing
const MIN_DESCRIPTION_LEN: usize = 10;

/// Verifies one recommendation and merges what the verifier found into it
///
/// Items without a title come back untouched. Every other item leaves with an
/// explicit `verified` flag and a non-empty `info_url`: the article URL when
/// verification succeeded, a JustWatch search otherwise. Whatever the model
/// put under those keys is overwritten; all other keys are left alone.
pub async fn enrich(verifier: &dyn ShowVerifier, item: RecommendationItem) -> RecommendationItem {
    let Some(title) = item.lookup_title().map(str::to_string) else {
        return item;
    };

    match verifier.lookup(&title).await {
        Ok(result) => apply_verification(item, &title, result),
        Err(reason) => {
            tracing::info!(title = %title, reason = %reason, "Recommendation not verified");
            let mut item = item;
            item.set_verified(false);
            item.set_info_url(justwatch_url(&title));
            item
        }
    }
}

fn apply_verification(
    mut item: RecommendationItem,
    title: &str,
    result: VerificationResult,
) -> RecommendationItem {
    item.set_verified(true);

    if result.article_url.is_empty() {
        // A found result always carries a link, but never emit an empty info_url
        item.set_info_url(justwatch_url(title));
    } else {
        item.set_info_url(result.article_url);
    }
    if let Some(description) = result
        .description
        .filter(|d| d.chars().count() > MIN_DESCRIPTION_LEN)
    {
        item.set_verified_description(description);
    }
    if let Some(image_url) = result.image_url.filter(|url| url.starts_with("http")) {
        item.set_verified_image_url(image_url);
    }

    item
}

/// Enriches every show of a `{"shows": [...]}` document
///
/// Items are processed one after another, in order, each independently of the
/// others. Elements that are not JSON objects are kept as they are.
/// Input that is not a JSON object is returned unchanged.
pub async fn enrich_all(verifier: &dyn ShowVerifier, recommendations_json: &str) -> String {
    let mut document: Value = match serde_json::from_str(recommendations_json) {
        Ok(document) => document,
        Err(e) => {
            tracing::error!(error = %e, "Recommendations are not valid JSON, returning them as-is");
            return recommendations_json.to_string();
        }
    };

    let Some(object) = document.as_object_mut() else {
        tracing::error!("Recommendations are not a JSON object, returning them as-is");
        return recommendations_json.to_string();
    };

    let shows = match object.remove("shows") {
        Some(Value::Array(shows)) => shows,
        Some(other) => {
            tracing::warn!("'shows' is not an array, leaving it untouched");
            object.insert("shows".to_string(), other);
            return reserialize(&document, recommendations_json);
        }
        None => Vec::new(),
    };

    let total = shows.len();
    let mut enriched = Vec::with_capacity(total);
    let mut verified = 0;

    for show in shows {
        match show {
            Value::Object(fields) => {
                let item = enrich(verifier, RecommendationItem::from(fields)).await;
                if item.get("verified") == Some(&Value::Bool(true)) {
                    verified += 1;
                }
                enriched.push(item.into_value());
            }
            other => {
                tracing::warn!("Skipping enrichment of non-object show entry");
                enriched.push(other);
            }
        }
    }

    tracing::info!(total, verified, "Recommendations enriched");

    object.insert("shows".to_string(), Value::Array(enriched));
    reserialize(&document, recommendations_json)
}

fn reserialize(document: &Value, original: &str) -> String {
    serde_json::to_string(document).unwrap_or_else(|e| {
        tracing::error!(error = %e, "Could not serialize recommendations, returning them as-is");
        original.to_string()
    })
}
