use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use crate::config::Variant;
use crate::models::{CatalogRecord, Recommendation, RecommendRequest};
use crate::pipeline;
use crate::query::Query;
use crate::state::AppState;

/// POST /api/recommend - Custom query:
///   1. Normalize free text or the profile form into one query string
///   2. Near-text retrieval (top 10) from the vector database
///   3. LLM re-ranking, falling back to retrieval order on failure
///   4. Optional illustration of the top dish
pub async fn recommend<R: CatalogRecord>(
    State(state): State<AppState>,
    Json(req): Json<RecommendRequest>,
) -> Result<Json<Recommendation<R>>, (StatusCode, String)> {
    let query = normalize_request(&req);
    if !query.submitted {
        return Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            not_ready_message(state.config.variant).to_string(),
        ));
    }

    let recommendation = pipeline::recommend::<R>(&state, &query.text).await;
    Ok(Json(recommendation))
}

fn normalize_request(req: &RecommendRequest) -> Query {
    match (&req.form, &req.query) {
        (Some(form), _) => form.normalize(),
        (None, Some(text)) => Query::free_text(text),
        (None, None) => Query::not_submitted(),
    }
}

fn not_ready_message(variant: Variant) -> &'static str {
    match variant {
        Variant::Dish => {
            "Please describe your preference, e.g. Indian or Japanese, Veg or Non-Veg, Sweet or Spicy"
        }
        Variant::MealPlan => "Please fill in every field of the form before submitting",
    }
}
