use anyhow::{Context, Result};
use indexmap::IndexMap;
use rand::seq::IteratorRandom;
use rand::Rng;
use serde::Serialize;
use serde_json::Value;
use std::path::Path;

/// One entry of the static menu or meal-plan list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogItem {
    pub name: String,
    pub attributes: IndexMap<String, String>,
}

/// Read-only catalog loaded once at startup.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    items: IndexMap<String, CatalogItem>,
}

impl Catalog {
    /// Load a JSON object of `{ name: { attribute: value } }`.
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read catalog {}", path.display()))?;
        Self::from_json(&data).with_context(|| format!("Invalid catalog {}", path.display()))
    }

    pub fn from_json(data: &str) -> Result<Self> {
        let raw: IndexMap<String, Value> =
            serde_json::from_str(data).context("Catalog must be a JSON object keyed by name")?;

        let items = raw
            .into_iter()
            .map(|(name, value)| {
                let attributes = match value {
                    Value::Object(map) => map
                        .into_iter()
                        .map(|(k, v)| (k, stringify(v)))
                        .collect(),
                    other => anyhow::bail!("Catalog entry '{name}' is not an object: {other}"),
                };
                Ok(CatalogItem { name, attributes })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self::from_items(items))
    }

    pub fn from_items(items: impl IntoIterator<Item = CatalogItem>) -> Self {
        Self {
            items: items
                .into_iter()
                .map(|item| (item.name.clone(), item))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&CatalogItem> {
        self.items.get(name)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.items.keys().map(String::as_str)
    }

    pub fn items(&self) -> impl Iterator<Item = &CatalogItem> {
        self.items.values()
    }

    /// Uniform pick over the catalog keys.
    pub fn random_pick<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&CatalogItem> {
        self.items.values().choose(rng)
    }

    /// Whole catalog as a JSON object, for prompts that reason over every item.
    pub fn to_prompt_json(&self) -> String {
        let view: IndexMap<&str, &IndexMap<String, String>> = self
            .items
            .iter()
            .map(|(name, item)| (name.as_str(), &item.attributes))
            .collect();
        serde_json::to_string(&view).unwrap_or_default()
    }
}

fn stringify(value: Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s,
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const MENU: &str = r#"{
        "Paneer Butter Masala": {"cuisine": "Indian", "category": "Veg", "price": 320},
        "Dal Makhani": {"cuisine": "Indian", "category": "Veg", "spicy": null},
        "Chicken Katsu": {"cuisine": "Japanese", "category": "Non-Veg"}
    }"#;

    #[test]
    fn test_from_json_preserves_file_order() {
        let catalog = Catalog::from_json(MENU).unwrap();
        let keys: Vec<&str> = catalog.keys().collect();
        assert_eq!(
            keys,
            vec!["Paneer Butter Masala", "Dal Makhani", "Chicken Katsu"]
        );
    }

    #[test]
    fn test_from_json_preserves_attribute_order() {
        let catalog = Catalog::from_json(MENU).unwrap();
        let paneer = catalog.get("Paneer Butter Masala").unwrap();
        let names: Vec<&str> = paneer.attributes.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["cuisine", "category", "price"]);
    }

    #[test]
    fn test_from_json_stringifies_values() {
        let catalog = Catalog::from_json(MENU).unwrap();
        let paneer = catalog.get("Paneer Butter Masala").unwrap();
        assert_eq!(paneer.attributes["price"], "320");
        let dal = catalog.get("Dal Makhani").unwrap();
        assert_eq!(dal.attributes["spicy"], "");
    }

    #[test]
    fn test_from_json_rejects_non_object_entries() {
        assert!(Catalog::from_json(r#"{"Tea": "hot"}"#).is_err());
        assert!(Catalog::from_json("[1, 2, 3]").is_err());
    }

    #[test]
    fn test_load_missing_file_names_path() {
        let err = Catalog::load(Path::new("/nonexistent/data.json")).unwrap_err();
        assert!(format!("{err:#}").contains("/nonexistent/data.json"));
    }

    #[test]
    fn test_random_pick_seeded_is_deterministic() {
        let catalog = Catalog::from_json(MENU).unwrap();
        let picks = |seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            (0..10)
                .map(|_| catalog.random_pick(&mut rng).unwrap().name.clone())
                .collect::<Vec<_>>()
        };
        assert_eq!(picks(7), picks(7));
    }

    #[test]
    fn test_random_pick_is_member_of_catalog() {
        let catalog = Catalog::from_json(MENU).unwrap();
        let mut rng = rand::thread_rng();
        for _ in 0..50 {
            let item = catalog.random_pick(&mut rng).unwrap();
            assert!(catalog.get(&item.name).is_some());
        }
    }

    #[test]
    fn test_random_pick_empty_catalog() {
        let catalog = Catalog::default();
        assert!(catalog.random_pick(&mut rand::thread_rng()).is_none());
    }

    #[test]
    fn test_prompt_json_contains_every_item() {
        let catalog = Catalog::from_json(MENU).unwrap();
        let json: Value = serde_json::from_str(&catalog.to_prompt_json()).unwrap();
        assert_eq!(json.as_object().unwrap().len(), 3);
        assert_eq!(json["Chicken Katsu"]["cuisine"], "Japanese");
    }
}
