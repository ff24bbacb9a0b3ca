//! Custom-query orchestration: retrieve → rank → (illustrate) → present.

use crate::llm::image::generate_image;
use crate::llm::rerank::rank;
use crate::models::{CandidateSet, CatalogRecord, RankedResult, Recommendation, RecommendStatus, TopPick};
use crate::retrieval::{retrieve, RetrievalOutcome};
use crate::state::AppState;

/// Run the full pipeline for an already-submitted query.
///
/// Retrieval failures end early with the apology. Ranking failures of any
/// kind fall back to the unranked candidates and are reported in
/// `ranking_error`. Image failures only drop the image.
pub async fn recommend<R: CatalogRecord>(state: &AppState, query: &str) -> Recommendation<R> {
    let config = &state.config;
    let outcome = retrieve::<R>(
        state.search.as_ref(),
        query,
        config.retrieval_limit,
        Some(config.artifact_path.as_path()),
    )
    .await;

    let candidates = match outcome {
        RetrievalOutcome::Found(candidates) => candidates,
        RetrievalOutcome::Failed { apology } => {
            return Recommendation::retrieval_failed(query.to_string(), apology)
        }
    };

    let mut recommendation = Recommendation {
        query: query.to_string(),
        status: RecommendStatus::Ready,
        apology: None,
        ranked: false,
        top_pick: None,
        others: CandidateSet::new(),
        text: None,
        candidates: CandidateSet::new(),
        ranking_error: None,
        image: None,
    };

    if candidates.is_empty() {
        tracing::info!("No candidates for '{query}', skipping ranking");
        return recommendation;
    }

    match rank::<R>(state.generator.as_ref(), &candidates, query).await {
        Ok(RankedResult::Structured(ranked)) => {
            tracing::info!("Ranking kept {} of {} candidates", ranked.len(), candidates.len());
            recommendation.ranked = true;
            (recommendation.top_pick, recommendation.others) = split_top(ranked);
        }
        Ok(RankedResult::Text(text)) => {
            recommendation.ranked = true;
            recommendation.text = Some(text);
        }
        Err(e) => {
            tracing::warn!("Ranking failed, showing retrieval order: {e}");
            recommendation.ranking_error = Some(e.to_string());
            (recommendation.top_pick, recommendation.others) = split_top(candidates.clone());
        }
    }
    recommendation.candidates = candidates;

    if config.image_enabled() {
        let prompt = recommendation
            .top_pick
            .as_ref()
            .and_then(|top| top.record.description())
            .map(str::to_string);
        if let Some(prompt) = prompt {
            match generate_image(&state.http_client, &config.image, &prompt).await {
                Ok(image) => recommendation.image = Some(image),
                Err(e) => tracing::warn!("Image generation skipped: {e}"),
            }
        }
    }

    recommendation
}

/// Separate the first entry from the rest.
pub fn split_top<R>(mut ranked: CandidateSet<R>) -> (Option<TopPick<R>>, CandidateSet<R>) {
    let top = ranked
        .shift_remove_index(0)
        .map(|(name, record)| TopPick { name, record });
    (top, ranked)
}
