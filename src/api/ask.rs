use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use crate::llm::ask::ask;
use crate::models::{AskRequest, AskResponse};
use crate::query::clamp_chars;
use crate::state::AppState;

pub const MAX_ASK_CHARS: usize = 2000;

/// POST /api/ask - Ask AI: free-form recommendation over the whole catalog.
pub async fn ask_ai(
    State(state): State<AppState>,
    Json(req): Json<AskRequest>,
) -> Result<Json<AskResponse>, (StatusCode, String)> {
    let message = req.message.trim();
    if message.is_empty() {
        return Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            "Message is required".to_string(),
        ));
    }
    let message = clamp_chars(message, MAX_ASK_CHARS);

    let answer = ask(
        state.generator.as_ref(),
        &state.catalog,
        state.config.variant,
        message,
    )
    .await
    .map_err(|e| {
        tracing::warn!("Ask AI failed: {e:#}");
        (StatusCode::BAD_GATEWAY, format!("LLM error: {e}"))
    })?;

    Ok(Json(AskResponse { answer }))
}
