use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt::Debug;

use crate::query::ProfileForm;

/// Ordered mapping from item name to its record. Insertion order is the
/// relevance order returned by the search service.
pub type CandidateSet<R> = IndexMap<String, R>;

/// How the generative service is asked to process the candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RankingStyle {
    /// Reply must be a JSON object shaped like the CandidateSet.
    Structured,
    /// Reply is shown as-is.
    FreeText,
}

/// A fixed-shape record stored in one vector database collection.
pub trait CatalogRecord:
    Clone + Debug + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Collection queried with near-text.
    const COLLECTION: &'static str;
    /// Property whose value names the item.
    const KEY_PROPERTY: &'static str;
    /// Whitelisted attribute properties, excluding the key.
    const PROPERTIES: &'static [&'static str];
    const RANKING: RankingStyle;
    /// Instruction appended to the ranking prompt.
    const INSTRUCTION: &'static str;

    /// Build the record from raw search properties. Missing properties become
    /// empty strings.
    fn from_properties(props: &Map<String, Value>) -> Self;

    /// Text used to illustrate the item, if the variant has one.
    fn description(&self) -> Option<&str> {
        None
    }
}

/// Read a property as a string. Absent or null values give `""`; numbers and
/// booleans are rendered with their JSON text.
pub fn property(props: &Map<String, Value>, name: &str) -> String {
    match props.get(name) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// A dish on the restaurant menu.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DishRecord {
    pub cuisine: String,
    pub category: String,
    pub description: String,
    pub allergy: String,
}

impl CatalogRecord for DishRecord {
    const COLLECTION: &'static str = "FoodRecommend";
    const KEY_PROPERTY: &'static str = "dish";
    const PROPERTIES: &'static [&'static str] = &["cuisine", "category", "description", "allergy"];
    const RANKING: RankingStyle = RankingStyle::Structured;
    const INSTRUCTION: &'static str = "Remove the most irrelevant ones but don't remove many. \
         Respond with a JSON object using the same dish names as keys and the same attributes, \
         ordered from most to least relevant.";

    fn from_properties(props: &Map<String, Value>) -> Self {
        Self {
            cuisine: property(props, "cuisine"),
            category: property(props, "category"),
            description: property(props, "description"),
            allergy: property(props, "allergy"),
        }
    }

    fn description(&self) -> Option<&str> {
        if self.description.trim().is_empty() {
            None
        } else {
            Some(&self.description)
        }
    }
}

/// A stored meal plan.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MealPlanRecord {
    pub goal: String,
    pub diet_type: String,
    pub calories: String,
    pub breakfast: String,
    pub lunch: String,
    pub dinner: String,
}

impl CatalogRecord for MealPlanRecord {
    const COLLECTION: &'static str = "MealRAGi";
    const KEY_PROPERTY: &'static str = "plan_name";
    const PROPERTIES: &'static [&'static str] =
        &["goal", "diet_type", "calories", "breakfast", "lunch", "dinner"];
    const RANKING: RankingStyle = RankingStyle::FreeText;
    const INSTRUCTION: &'static str = "Using the retrieved plans as reference, produce one meal plan \
         for this person in exactly this format:\n\
         Plan: <name>\n\
         Daily calories: <number> kcal\n\
         Breakfast: <meal>\n\
         Lunch: <meal>\n\
         Dinner: <meal>\n\
         Notes: <one or two sentences on how the plan serves the goal>";

    fn from_properties(props: &Map<String, Value>) -> Self {
        Self {
            goal: property(props, "goal"),
            diet_type: property(props, "diet_type"),
            calories: property(props, "calories"),
            breakfast: property(props, "breakfast"),
            lunch: property(props, "lunch"),
            dinner: property(props, "dinner"),
        }
    }
}

/// Output of the ranking step.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum RankedResult<R> {
    Structured(CandidateSet<R>),
    Text(String),
}

/// The first-ranked item.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopPick<R> {
    pub name: String,
    pub record: R,
}

/// A generated illustration, base64 encoded.
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedImage {
    pub mime_type: &'static str,
    pub data_base64: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendStatus {
    Ready,
    RetrievalFailed,
}

/// Everything the presentation layer shows for one Custom query.
#[derive(Debug, Clone, Serialize)]
pub struct Recommendation<R> {
    pub query: String,
    pub status: RecommendStatus,
    /// User-facing apology when retrieval failed.
    pub apology: Option<String>,
    /// Whether `top_pick`/`others` reflect the model's ranking or the raw
    /// retrieval order.
    pub ranked: bool,
    pub top_pick: Option<TopPick<R>>,
    /// "You might also like" entries, in order.
    pub others: CandidateSet<R>,
    /// Free-text answer for variants ranked in free-text mode.
    pub text: Option<String>,
    pub candidates: CandidateSet<R>,
    pub ranking_error: Option<String>,
    pub image: Option<GeneratedImage>,
}

impl<R> Recommendation<R> {
    pub fn retrieval_failed(query: String, apology: String) -> Self {
        Self {
            query,
            status: RecommendStatus::RetrievalFailed,
            apology: Some(apology),
            ranked: false,
            top_pick: None,
            others: CandidateSet::new(),
            text: None,
            candidates: CandidateSet::new(),
            ranking_error: None,
            image: None,
        }
    }
}

/// Top-level actions available from the idle state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Custom,
    AskAi,
    RandomPick,
}

impl Mode {
    pub const ALL: [Mode; 3] = [Mode::Custom, Mode::AskAi, Mode::RandomPick];

    pub fn description(self) -> &'static str {
        match self {
            Mode::Custom => "Items are retrieved from the vector database according to your query and re-ranked by the model",
            Mode::AskAi => "Items are recommended by the model from the whole catalog according to your prompt",
            Mode::RandomPick => "I'm Feeling Lucky: a random item from the catalog",
        }
    }
}

/// Custom query request. Dish deployments send `query`, meal-plan
/// deployments send `form`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecommendRequest {
    pub query: Option<String>,
    pub form: Option<ProfileForm>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AskRequest {
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AskResponse {
    pub answer: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ModeInfo {
    pub mode: Mode,
    pub description: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn props(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_dish_from_properties_defaults_missing_to_empty() {
        let p = props(json!({ "dish": "Dal Makhani", "cuisine": "Indian" }));
        let dish = DishRecord::from_properties(&p);
        assert_eq!(dish.cuisine, "Indian");
        assert_eq!(dish.category, "");
        assert_eq!(dish.description, "");
        assert_eq!(dish.allergy, "");
    }

    #[test]
    fn test_dish_serializes_all_whitelisted_attributes() {
        let value = serde_json::to_value(DishRecord::default()).unwrap();
        let obj = value.as_object().unwrap();
        assert_eq!(obj.len(), DishRecord::PROPERTIES.len());
        for name in DishRecord::PROPERTIES {
            assert_eq!(obj[*name], "");
        }
    }

    #[test]
    fn test_meal_plan_whitelist_has_seven_properties_with_key() {
        assert_eq!(MealPlanRecord::PROPERTIES.len() + 1, 7);
        let value = serde_json::to_value(MealPlanRecord::default()).unwrap();
        assert_eq!(value.as_object().unwrap().len(), 6);
    }

    #[test]
    fn test_property_stringifies_numbers_and_nulls() {
        let p = props(json!({ "calories": 1800, "goal": null }));
        assert_eq!(property(&p, "calories"), "1800");
        assert_eq!(property(&p, "goal"), "");
        assert_eq!(property(&p, "missing"), "");
    }

    #[test]
    fn test_dish_description_blank_is_none() {
        let dish = DishRecord {
            description: "  ".into(),
            ..Default::default()
        };
        assert!(dish.description().is_none());
    }

    #[test]
    fn test_ranked_result_serializes_tagged() {
        let ranked: RankedResult<DishRecord> = RankedResult::Text("hello".into());
        let json = serde_json::to_value(&ranked).unwrap();
        assert_eq!(json, json!({ "kind": "text", "value": "hello" }));
    }

    #[test]
    fn test_mode_serializes_to_snake_case() {
        let json = serde_json::to_value(Mode::AskAi).unwrap();
        assert_eq!(json, "ask_ai");
    }
}
