use serde_json::{Map, Value};

use crate::error::RankingError;
use crate::llm::generate::{Generator, ResponseFormat};
use crate::models::{CandidateSet, CatalogRecord, RankedResult, RankingStyle};

/// Re-rank or synthesize from the retrieved candidates with one call to the
/// generative service.
///
/// Structured replies are validated against the CandidateSet: unknown names
/// are dropped and attributes always come from the retrieved records, so the
/// result is a subset of the candidates in the model's order.
pub async fn rank<R: CatalogRecord>(
    generator: &dyn Generator,
    candidates: &CandidateSet<R>,
    query: &str,
) -> Result<RankedResult<R>, RankingError> {
    let prompt = build_prompt(candidates, query)?;
    let format = match R::RANKING {
        RankingStyle::Structured => ResponseFormat::Json,
        RankingStyle::FreeText => ResponseFormat::Text,
    };

    let response = generator
        .generate(&prompt, format)
        .await
        .map_err(|e| RankingError::Generation(format!("{e:#}")))?;

    match R::RANKING {
        RankingStyle::Structured => parse_structured(&response, candidates).map(RankedResult::Structured),
        RankingStyle::FreeText => {
            if response.trim().is_empty() {
                Err(RankingError::Empty)
            } else {
                Ok(RankedResult::Text(response))
            }
        }
    }
}

pub fn build_prompt<R: CatalogRecord>(
    candidates: &CandidateSet<R>,
    query: &str,
) -> Result<String, RankingError> {
    let data = serde_json::to_string(candidates)?;
    Ok(match R::RANKING {
        RankingStyle::Structured => format!(
            "Rerank the JSON objects in this data: {data}\n\n\
             according to the query: {query}\n\n{}",
            R::INSTRUCTION
        ),
        RankingStyle::FreeText => format!(
            "Here are {} entries retrieved for a person described as: {query}\n\n\
             {data}\n\n{}",
            R::COLLECTION,
            R::INSTRUCTION
        ),
    })
}

/// Validate a structured ranking reply and map it back onto the candidates.
pub fn parse_structured<R: CatalogRecord>(
    content: &str,
    candidates: &CandidateSet<R>,
) -> Result<CandidateSet<R>, RankingError> {
    let json_str = match (content.find('{'), content.rfind('}')) {
        (Some(start), Some(end)) if start < end => &content[start..=end],
        _ => content,
    };

    let object = match serde_json::from_str::<Value>(json_str) {
        Ok(Value::Object(map)) => map,
        Ok(other) => {
            return Err(RankingError::Parse {
                reason: format!("expected an object, got {}", json_type(&other)),
                raw: content.to_string(),
            })
        }
        Err(e) => {
            return Err(RankingError::Parse {
                reason: e.to_string(),
                raw: content.to_string(),
            })
        }
    };

    let mut ranked = select_known(&object, candidates);

    // Some models wrap the answer, e.g. {"dishes": {...}}.
    if ranked.is_empty() && object.len() == 1 {
        if let Some(Value::Object(inner)) = object.values().next() {
            ranked = select_known(inner, candidates);
        }
    }

    if ranked.is_empty() {
        return Err(RankingError::Empty);
    }
    Ok(ranked)
}

fn select_known<R: CatalogRecord>(
    object: &Map<String, Value>,
    candidates: &CandidateSet<R>,
) -> CandidateSet<R> {
    let mut ranked = CandidateSet::with_capacity(object.len());
    for name in object.keys() {
        match candidates.get(name) {
            Some(record) => {
                ranked.insert(name.clone(), record.clone());
            }
            None => tracing::warn!("Ranking returned unknown entry '{name}', discarding"),
        }
    }
    ranked
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DishRecord, MealPlanRecord};

    fn candidates() -> CandidateSet<DishRecord> {
        let mut set = CandidateSet::new();
        for (name, category) in [
            ("Paneer Butter Masala", "Veg"),
            ("Dal Makhani", "Veg"),
            ("Chicken Katsu", "Non-Veg"),
        ] {
            set.insert(
                name.to_string(),
                DishRecord {
                    cuisine: "Indian".into(),
                    category: category.into(),
                    ..Default::default()
                },
            );
        }
        set
    }

    fn keys<R>(set: &CandidateSet<R>) -> Vec<&str> {
        set.keys().map(String::as_str).collect()
    }

    #[test]
    fn test_parse_reordered_subset() {
        let reply = r#"{"Dal Makhani": {}, "Paneer Butter Masala": {}}"#;
        let ranked = parse_structured(reply, &candidates()).unwrap();
        assert_eq!(keys(&ranked), vec!["Dal Makhani", "Paneer Butter Masala"]);
    }

    #[test]
    fn test_parse_keeps_model_order_not_alphabetical() {
        let reply = r#"{"Paneer Butter Masala": {}, "Chicken Katsu": {}, "Dal Makhani": {}}"#;
        let ranked = parse_structured(reply, &candidates()).unwrap();
        assert_eq!(
            keys(&ranked),
            vec!["Paneer Butter Masala", "Chicken Katsu", "Dal Makhani"]
        );
    }

    #[test]
    fn test_parse_uses_candidate_attributes() {
        let reply = r#"{"Dal Makhani": {"category": "Dessert", "cuisine": "French"}}"#;
        let ranked = parse_structured(reply, &candidates()).unwrap();
        assert_eq!(ranked["Dal Makhani"].category, "Veg");
        assert_eq!(ranked["Dal Makhani"].cuisine, "Indian");
    }

    #[test]
    fn test_parse_discards_unknown_names() {
        let reply = r#"{"Sushi Platter": {}, "Chicken Katsu": {}}"#;
        let ranked = parse_structured(reply, &candidates()).unwrap();
        assert_eq!(ranked.len(), 1);
        assert!(ranked.contains_key("Chicken Katsu"));
    }

    #[test]
    fn test_parse_json_in_code_fence() {
        let reply = "```json\n{\"Dal Makhani\": {}}\n```";
        let ranked = parse_structured(reply, &candidates()).unwrap();
        assert_eq!(ranked.len(), 1);
    }

    #[test]
    fn test_parse_unwraps_single_wrapper_key() {
        let reply = r#"{"dishes": {"Dal Makhani": {}, "Chicken Katsu": {}}}"#;
        let ranked = parse_structured(reply, &candidates()).unwrap();
        assert_eq!(keys(&ranked), vec!["Dal Makhani", "Chicken Katsu"]);
    }

    #[test]
    fn test_parse_not_json_is_parse_error() {
        let err = parse_structured("not json", &candidates()).unwrap_err();
        assert!(matches!(err, RankingError::Parse { ref raw, .. } if raw == "not json"));
    }

    #[test]
    fn test_parse_array_is_parse_error() {
        let err = parse_structured(r#"["Dal Makhani"]"#, &candidates()).unwrap_err();
        match err {
            RankingError::Parse { reason, .. } => assert!(reason.contains("array")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_parse_empty_object_is_empty_error() {
        let err = parse_structured("{}", &candidates()).unwrap_err();
        assert!(matches!(err, RankingError::Empty));
    }

    #[test]
    fn test_parse_only_unknown_names_is_empty_error() {
        let err = parse_structured(r#"{"Pizza": {}}"#, &candidates()).unwrap_err();
        assert!(matches!(err, RankingError::Empty));
    }

    #[test]
    fn test_structured_prompt_contains_data_and_query() {
        let prompt = build_prompt(&candidates(), "Veg Indian Dishes").unwrap();
        assert!(prompt.contains("Paneer Butter Masala"));
        assert!(prompt.contains("according to the query: Veg Indian Dishes"));
        assert!(prompt.contains("don't remove many"));
    }

    #[test]
    fn test_free_text_prompt_contains_template() {
        let prompt = build_prompt(&CandidateSet::<MealPlanRecord>::new(), "29 Female").unwrap();
        assert!(prompt.contains("29 Female"));
        assert!(prompt.contains("Daily calories:"));
    }
}
