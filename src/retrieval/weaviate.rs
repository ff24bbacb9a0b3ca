//! Weaviate cloud implementation of the retrieval seam, over REST + GraphQL.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{SearchConnector, SearchObject, SearchSession};
use crate::config::VectorDbConfig;
use crate::error::{QueryError, RetrievalError};

pub struct WeaviateConnector {
    client: reqwest::Client,
    config: VectorDbConfig,
}

impl WeaviateConnector {
    pub fn new(client: reqwest::Client, config: VectorDbConfig) -> Self {
        Self { client, config }
    }
}

#[async_trait]
impl SearchConnector for WeaviateConnector {
    async fn connect(&self) -> Result<Box<dyn SearchSession>, RetrievalError> {
        let base_url = self
            .config
            .cluster_url
            .as_deref()
            .map(normalize_base_url)
            .ok_or_else(|| RetrievalError::Connect("WEAVIATE_CLUSTER_URL not configured".into()))?;

        let session = WeaviateSession {
            client: self.client.clone(),
            base_url,
            api_key: self.config.api_key.clone(),
            hf_api_key: self.config.hf_api_key.clone(),
            open: true,
        };

        let url = format!("{}/v1/.well-known/ready", session.base_url);
        let resp = session
            .authorized(session.client.get(&url))
            .send()
            .await
            .map_err(|e| RetrievalError::Connect(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(RetrievalError::Connect(format!(
                "readiness probe returned {}",
                resp.status()
            )));
        }

        tracing::debug!("Opened Weaviate session");
        Ok(Box::new(session))
    }
}

struct WeaviateSession {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    hf_api_key: Option<String>,
    open: bool,
}

impl WeaviateSession {
    fn authorized(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let mut req = req;
        if let Some(key) = &self.api_key {
            req = req.header("Authorization", format!("Bearer {key}"));
        }
        if let Some(key) = &self.hf_api_key {
            req = req.header("X-HuggingFace-Api-Key", key);
        }
        req
    }
}

#[async_trait]
impl SearchSession for WeaviateSession {
    async fn near_text(
        &mut self,
        collection: &str,
        query: &str,
        properties: &[&str],
        limit: usize,
    ) -> Result<Vec<SearchObject>, QueryError> {
        if !self.open {
            return Err(QueryError::new(collection, "session is closed"));
        }

        let url = format!("{}/v1/graphql", self.base_url);
        let req = GraphQlRequest {
            query: build_near_text_query(collection, query, properties, limit),
        };

        let resp = self
            .authorized(self.client.post(&url))
            .json(&req)
            .send()
            .await
            .map_err(|e| QueryError::new(collection, e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(QueryError::new(collection, format!("{status}: {body}")));
        }

        let body: GraphQlResponse = resp
            .json()
            .await
            .map_err(|e| QueryError::new(collection, format!("malformed response: {e}")))?;

        parse_near_text_response(collection, body)
    }

    async fn close(&mut self) {
        if self.open {
            self.open = false;
            tracing::debug!("Closed Weaviate session");
        }
    }
}

fn normalize_base_url(url: &str) -> String {
    let url = url.trim().trim_end_matches('/');
    if url.starts_with("http://") || url.starts_with("https://") {
        url.to_string()
    } else {
        format!("https://{url}")
    }
}

/// GraphQL `Get` with a `nearText` filter. The query text is embedded as a
/// JSON string literal, which GraphQL accepts verbatim.
fn build_near_text_query(collection: &str, query: &str, properties: &[&str], limit: usize) -> String {
    let concept = serde_json::to_string(query).unwrap_or_else(|_| "\"\"".to_string());
    format!(
        "{{ Get {{ {collection}(nearText: {{concepts: [{concept}]}}, limit: {limit}) {{ {} }} }} }}",
        properties.join(" ")
    )
}

fn parse_near_text_response(
    collection: &str,
    body: GraphQlResponse,
) -> Result<Vec<SearchObject>, QueryError> {
    if let Some(errors) = body.errors.filter(|e| !e.is_empty()) {
        let message = errors
            .into_iter()
            .map(|e| e.message)
            .collect::<Vec<_>>()
            .join("; ");
        return Err(QueryError::new(collection, message));
    }

    let objects = body
        .data
        .and_then(|mut d| d.get.remove(collection))
        .unwrap_or(Value::Null);

    match objects {
        Value::Array(items) => Ok(items
            .into_iter()
            .filter_map(|item| match item {
                Value::Object(properties) => Some(SearchObject { properties }),
                _ => None,
            })
            .collect()),
        Value::Null => Ok(Vec::new()),
        other => Err(QueryError::new(
            collection,
            format!("unexpected result shape: {other}"),
        )),
    }
}

// ─── GraphQL types ───────────────────────────────────────

#[derive(Serialize)]
struct GraphQlRequest {
    query: String,
}

#[derive(Deserialize)]
struct GraphQlResponse {
    data: Option<GraphQlData>,
    errors: Option<Vec<GraphQlError>>,
}

#[derive(Deserialize)]
struct GraphQlData {
    #[serde(rename = "Get", default)]
    get: Map<String, Value>,
}

#[derive(Deserialize)]
struct GraphQlError {
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response(value: Value) -> GraphQlResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_build_query_escapes_text() {
        let q = build_near_text_query("FoodRecommend", "say \"hi\"", &["dish", "cuisine"], 10);
        assert_eq!(
            q,
            r#"{ Get { FoodRecommend(nearText: {concepts: ["say \"hi\""]}, limit: 10) { dish cuisine } } }"#
        );
    }

    #[test]
    fn test_normalize_base_url() {
        assert_eq!(normalize_base_url("demo.weaviate.network/"), "https://demo.weaviate.network");
        assert_eq!(normalize_base_url("http://localhost:8080"), "http://localhost:8080");
    }

    #[test]
    fn test_parse_objects_in_order() {
        let body = response(json!({
            "data": {"Get": {"FoodRecommend": [
                {"dish": "Paneer Butter Masala", "cuisine": "Indian"},
                {"dish": "Dal Makhani", "cuisine": "Indian"}
            ]}}
        }));
        let objects = parse_near_text_response("FoodRecommend", body).unwrap();
        assert_eq!(objects.len(), 2);
        assert_eq!(objects[0].properties["dish"], "Paneer Butter Masala");
    }

    #[test]
    fn test_parse_errors_become_query_error() {
        let body = response(json!({
            "data": {"Get": {"FoodRecommend": null}},
            "errors": [{"message": "vectorizer unavailable"}]
        }));
        let err = parse_near_text_response("FoodRecommend", body).unwrap_err();
        assert!(err.message.contains("vectorizer unavailable"));
    }

    #[test]
    fn test_parse_missing_collection_is_empty() {
        let body = response(json!({ "data": {"Get": {}} }));
        assert!(parse_near_text_response("MealRAGi", body).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_connect_without_cluster_url_fails() {
        let connector = WeaviateConnector::new(reqwest::Client::new(), VectorDbConfig::default());
        let err = connector.connect().await.err().unwrap();
        assert!(matches!(err, RetrievalError::Connect(_)));
    }
}
