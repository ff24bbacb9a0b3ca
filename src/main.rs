use axum::response::Html;
use axum::routing::{get, post};
use axum::Router;
use tracing_subscriber::EnvFilter;

use rag_recommender::api;
use rag_recommender::config::{Config, Variant};
use rag_recommender::models::{CatalogRecord, DishRecord, MealPlanRecord};
use rag_recommender::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env();
    tracing::info!("Recommender variant: {:?}", config.variant);
    tracing::info!("LLM provider: {} ({})", config.llm.provider, config.llm.model);
    if config.vector_db.cluster_url.is_none() {
        tracing::warn!("WEAVIATE_CLUSTER_URL is not set; custom queries will fail retrieval");
    }

    let bind_addr = config.bind_addr.clone();
    let variant = config.variant;
    let state = AppState::new(config)?;

    let app = match variant {
        Variant::Dish => build_router::<DishRecord>(state),
        Variant::MealPlan => build_router::<MealPlanRecord>(state),
    };

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("Server listening on {}", bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}

fn build_router<R: CatalogRecord>(state: AppState) -> Router {
    Router::new()
        // Serve frontend
        .route("/", get(serve_index))
        // API routes
        .route("/api/info", get(api::catalog::info))
        .route("/api/catalog", get(api::catalog::list_catalog))
        .route("/api/lucky", get(api::catalog::lucky))
        .route("/api/recommend", post(api::recommend::recommend::<R>))
        .route("/api/ask", post(api::ask::ask_ai))
        .with_state(state)
}

async fn serve_index() -> Html<&'static str> {
    Html(include_str!("../static/index.html"))
}
