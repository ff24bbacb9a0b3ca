use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

use crate::retrieval::DEFAULT_LIMIT;

/// Which recommender this process serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    /// Restaurant dish recommender (`FoodRecommend` collection).
    Dish,
    /// Meal-plan recommender (`MealRAGi` collection).
    MealPlan,
}

impl FromStr for Variant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dish" | "menu" => Ok(Variant::Dish),
            "meal_plan" | "meal-plan" | "mealplan" => Ok(Variant::MealPlan),
            other => Err(format!("Unknown recommender variant: {other}")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub variant: Variant,
    /// Server bind address
    pub bind_addr: String,
    /// Static catalog loaded at startup
    pub catalog_path: PathBuf,
    /// Debug artifact overwritten on every retrieval
    pub artifact_path: PathBuf,
    /// Near-text result limit
    pub retrieval_limit: usize,
    /// Seed for "I'm Feeling Lucky" picks; random when unset
    pub random_seed: Option<u64>,
    /// Timeout for every outbound HTTP call, in seconds
    pub http_timeout_secs: u64,
    pub llm: LlmConfig,
    pub vector_db: VectorDbConfig,
    pub image: ImageConfig,
}

#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// "gemini", "openai" or "ollama"
    pub provider: String,
    /// Base URL for the LLM API
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
}

/// Weaviate cloud cluster credentials.
#[derive(Debug, Clone, Default)]
pub struct VectorDbConfig {
    pub cluster_url: Option<String>,
    pub api_key: Option<String>,
    /// Forwarded as `X-HuggingFace-Api-Key` for the collection's vectorizer.
    pub hf_api_key: Option<String>,
}

/// Text-to-image endpoint used to illustrate the top dish.
#[derive(Debug, Clone)]
pub struct ImageConfig {
    pub api_url: String,
    /// Sent verbatim as the `Authorization` header. Image generation is
    /// disabled when unset.
    pub token: Option<String>,
}

/// Secret-free view of the configuration.
#[derive(Debug, Clone, Serialize)]
pub struct ConfigSummary {
    pub variant: Variant,
    pub llm_provider: String,
    pub llm_model: String,
    pub llm_key_set: bool,
    pub vector_db_configured: bool,
    pub image_generation: bool,
    pub retrieval_limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            variant: Variant::Dish,
            bind_addr: "127.0.0.1:8501".to_string(),
            catalog_path: PathBuf::from("data.json"),
            artifact_path: PathBuf::from("resp.json"),
            retrieval_limit: DEFAULT_LIMIT,
            random_seed: None,
            http_timeout_secs: 120,
            llm: LlmConfig::default(),
            vector_db: VectorDbConfig::default(),
            image: ImageConfig::default(),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "gemini".to_string(),
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            model: "gemini-1.5-flash".to_string(),
            api_key: None,
        }
    }
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api-inference.huggingface.co/models/CompVis/stable-diffusion-v1-4"
                .to_string(),
            token: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; `from_env` passes the process
    /// environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(val) = lookup("RECOMMENDER_VARIANT") {
            match val.parse() {
                Ok(v) => config.variant = v,
                Err(e) => tracing::warn!("{e}, using {:?}", config.variant),
            }
        }
        if let Some(addr) = lookup("RECOMMENDER_BIND_ADDR") {
            config.bind_addr = addr;
        }
        if let Some(path) = lookup("RECOMMENDER_CATALOG_PATH") {
            config.catalog_path = PathBuf::from(path);
        }
        if let Some(path) = lookup("RECOMMENDER_ARTIFACT_PATH") {
            config.artifact_path = PathBuf::from(path);
        }
        if let Some(val) = lookup("RETRIEVAL_LIMIT") {
            if let Ok(v) = val.parse::<usize>() {
                if v > 0 {
                    config.retrieval_limit = v;
                }
            }
        }
        if let Some(val) = lookup("RANDOM_SEED") {
            if let Ok(v) = val.parse() {
                config.random_seed = Some(v);
            }
        }
        if let Some(val) = lookup("HTTP_TIMEOUT_SECS") {
            if let Ok(v) = val.parse() {
                config.http_timeout_secs = v;
            }
        }

        // Generative model
        if let Some(provider) = lookup("LLM_PROVIDER") {
            config.llm.provider = provider;
        }
        if let Some(url) = lookup("LLM_BASE_URL") {
            config.llm.base_url = url;
        }
        if let Some(model) = lookup("LLM_MODEL") {
            config.llm.model = model;
        }
        if let Some(key) = lookup("LLM_API_KEY") {
            config.llm.api_key = Some(key);
        }

        // Vector database
        if let Some(url) = lookup("WEAVIATE_CLUSTER_URL") {
            config.vector_db.cluster_url = Some(url);
        }
        if let Some(key) = lookup("WEAVIATE_API_KEY") {
            config.vector_db.api_key = Some(key);
        }
        if let Some(key) = lookup("HF_API_KEY") {
            config.vector_db.hf_api_key = Some(key);
        }

        // Image generation
        if let Some(url) = lookup("IMAGE_API_URL") {
            config.image.api_url = url;
        }
        if let Some(token) = lookup("IMAGE_API_TOKEN") {
            config.image.token = Some(token);
        }

        config
    }

    /// Image generation only applies to the dish recommender.
    pub fn image_enabled(&self) -> bool {
        self.variant == Variant::Dish && self.image.token.is_some()
    }

    pub fn summary(&self) -> ConfigSummary {
        ConfigSummary {
            variant: self.variant,
            llm_provider: self.llm.provider.clone(),
            llm_model: self.llm.model.clone(),
            llm_key_set: self.llm.api_key.is_some(),
            vector_db_configured: self.vector_db.cluster_url.is_some(),
            image_generation: self.image_enabled(),
            retrieval_limit: self.retrieval_limit,
        }
    }
}
