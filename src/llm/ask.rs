use anyhow::Result;

use crate::catalog::Catalog;
use crate::config::Variant;
use crate::llm::generate::{Generator, ResponseFormat};

/// Answer a free-form request from the whole catalog, skipping retrieval.
pub async fn ask(
    generator: &dyn Generator,
    catalog: &Catalog,
    variant: Variant,
    message: &str,
) -> Result<String> {
    let prompt = build_ask_prompt(catalog, variant, message);
    generator.generate(&prompt, ResponseFormat::Text).await
}

fn build_ask_prompt(catalog: &Catalog, variant: Variant, message: &str) -> String {
    let catalog_json = catalog.to_prompt_json();
    match variant {
        Variant::Dish => format!(
            "Recommend some dishes along with description, allergies etc. from the menu: \
             {catalog_json}\n\nranked by relevance, according to the prompt: {message}\n\
             E.g. if the prompt is something like a mildly spicy gravy dish with paneer, \
             recommend paneer butter masala."
        ),
        Variant::MealPlan => format!(
            "Recommend suitable meal plans, with their meals and calories, from this list: \
             {catalog_json}\n\nranked by relevance, according to the request: {message}"
        ),
    }
}
