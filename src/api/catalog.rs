use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use crate::catalog::CatalogItem;
use crate::config::ConfigSummary;
use crate::models::{Mode, ModeInfo};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct InfoResponse {
    pub config: ConfigSummary,
    pub modes: Vec<ModeInfo>,
}

/// GET /api/info - What each mode does, shown before a choice is made.
pub async fn info(State(state): State<AppState>) -> Json<InfoResponse> {
    Json(InfoResponse {
        config: state.config.summary(),
        modes: Mode::ALL
            .iter()
            .map(|&mode| ModeInfo {
                mode,
                description: mode.description(),
            })
            .collect(),
    })
}

/// GET /api/catalog - The full static menu or plan list.
pub async fn list_catalog(State(state): State<AppState>) -> Json<Vec<CatalogItem>> {
    Json(state.catalog.items().cloned().collect())
}

/// GET /api/lucky - I'm Feeling Lucky: one random catalog entry.
pub async fn lucky(
    State(state): State<AppState>,
) -> Result<Json<CatalogItem>, (StatusCode, String)> {
    state
        .random_pick()
        .map(Json)
        .ok_or((StatusCode::NOT_FOUND, "Catalog is empty".to_string()))
}
