use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use std::time::Duration;

use crate::catalog::{Catalog, CatalogItem};
use crate::config::Config;
use crate::llm::generate::{Generator, HttpGenerator};
use crate::retrieval::weaviate::WeaviateConnector;
use crate::retrieval::SearchConnector;

/// Shared application state. Everything here is built once at startup and
/// read-only afterwards, apart from the seeded RNG.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub catalog: Arc<Catalog>,
    pub http_client: reqwest::Client,
    pub search: Arc<dyn SearchConnector>,
    pub generator: Arc<dyn Generator>,
    /// Present only when `RANDOM_SEED` is configured.
    pub seeded_rng: Option<Arc<Mutex<StdRng>>>,
}

impl AppState {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let catalog = Catalog::load(&config.catalog_path)?;
        tracing::info!(
            "Loaded {} catalog entries from {}",
            catalog.len(),
            config.catalog_path.display()
        );

        let http_client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .build()?;

        let search = Arc::new(WeaviateConnector::new(
            http_client.clone(),
            config.vector_db.clone(),
        ));
        let generator = Arc::new(HttpGenerator::new(http_client.clone(), config.llm.clone()));

        Ok(Self::with_services(config, catalog, http_client, search, generator))
    }

    /// Assemble state from already-built services.
    pub fn with_services(
        config: Config,
        catalog: Catalog,
        http_client: reqwest::Client,
        search: Arc<dyn SearchConnector>,
        generator: Arc<dyn Generator>,
    ) -> Self {
        let seeded_rng = config
            .random_seed
            .map(|seed| Arc::new(Mutex::new(StdRng::seed_from_u64(seed))));

        Self {
            config: Arc::new(config),
            catalog: Arc::new(catalog),
            http_client,
            search,
            generator,
            seeded_rng,
        }
    }

    /// "I'm Feeling Lucky": one uniformly random catalog entry.
    pub fn random_pick(&self) -> Option<CatalogItem> {
        match &self.seeded_rng {
            Some(rng) => self.catalog.random_pick(&mut *rng.lock()).cloned(),
            None => self.catalog.random_pick(&mut rand::thread_rng()).cloned(),
        }
    }
}
