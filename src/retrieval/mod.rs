//! Retrieval client: semantic near-text search over a remote collection.
//!
//! A session is opened per call to [`retrieve`] and closed exactly once on
//! every path, before the query result is inspected.

pub mod artifact;
pub mod weaviate;

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::path::Path;

use crate::error::{QueryError, RetrievalError};
use crate::models::{property, CandidateSet, CatalogRecord};

/// Shown to the user when retrieval fails.
pub const APOLOGY: &str =
    "An error occurred. Please try again. Sorry, your tastes are too complex to be catered for by us.";

/// Default number of nearest neighbours requested.
pub const DEFAULT_LIMIT: usize = 10;

/// One matched object with its raw properties.
#[derive(Debug, Clone, Default)]
pub struct SearchObject {
    pub properties: Map<String, Value>,
}

/// Opens sessions against the vector database.
#[async_trait]
pub trait SearchConnector: Send + Sync {
    async fn connect(&self) -> Result<Box<dyn SearchSession>, RetrievalError>;
}

/// An open connection. `close` must be called once the session is done.
#[async_trait]
pub trait SearchSession: Send {
    async fn near_text(
        &mut self,
        collection: &str,
        query: &str,
        properties: &[&str],
        limit: usize,
    ) -> Result<Vec<SearchObject>, QueryError>;

    async fn close(&mut self);
}

#[derive(Debug, Clone, PartialEq)]
pub enum RetrievalOutcome<R> {
    Found(CandidateSet<R>),
    Failed { apology: String },
}

impl<R> RetrievalOutcome<R> {
    pub fn is_failed(&self) -> bool {
        matches!(self, RetrievalOutcome::Failed { .. })
    }
}

/// Properties requested from the collection: the key followed by the
/// attribute whitelist.
pub fn whitelist<R: CatalogRecord>() -> Vec<&'static str> {
    std::iter::once(R::KEY_PROPERTY)
        .chain(R::PROPERTIES.iter().copied())
        .collect()
}

/// Flatten matched objects into a CandidateSet keyed by `R::KEY_PROPERTY`.
/// Objects without a key are skipped; on duplicate keys the earlier, more
/// relevant, hit wins.
pub fn extract_features<R: CatalogRecord>(objects: &[SearchObject]) -> CandidateSet<R> {
    let mut extracted = CandidateSet::with_capacity(objects.len());
    for object in objects {
        let name = property(&object.properties, R::KEY_PROPERTY);
        if name.trim().is_empty() {
            tracing::warn!(
                "Skipping {} object without '{}'",
                R::COLLECTION,
                R::KEY_PROPERTY
            );
            continue;
        }
        extracted
            .entry(name)
            .or_insert_with(|| R::from_properties(&object.properties));
    }
    extracted
}

/// Run one near-text query and extract the candidates.
///
/// Connection or query failures produce [`RetrievalOutcome::Failed`] with the
/// user-facing apology. No retry is attempted. On success the candidates are
/// also written to `artifact`, overwriting the previous run.
pub async fn retrieve<R: CatalogRecord>(
    connector: &dyn SearchConnector,
    query: &str,
    limit: usize,
    artifact: Option<&Path>,
) -> RetrievalOutcome<R> {
    let mut session = match connector.connect().await {
        Ok(session) => session,
        Err(e) => {
            tracing::warn!("Retrieval unavailable: {e}");
            return RetrievalOutcome::Failed {
                apology: APOLOGY.to_string(),
            };
        }
    };

    let properties = whitelist::<R>();
    let result = session
        .near_text(R::COLLECTION, query, &properties, limit)
        .await;
    session.close().await;

    match result {
        Ok(objects) => {
            let candidates = extract_features::<R>(&objects);
            tracing::info!(
                "Retrieved {} candidates from {} for '{query}'",
                candidates.len(),
                R::COLLECTION
            );
            if let Some(path) = artifact {
                if let Err(e) = artifact::write_artifact(path, &candidates) {
                    tracing::warn!("Failed to write retrieval artifact: {e:#}");
                }
            }
            RetrievalOutcome::Found(candidates)
        }
        Err(e) => {
            tracing::warn!("{e}");
            RetrievalOutcome::Failed {
                apology: APOLOGY.to_string(),
            }
        }
    }
}
