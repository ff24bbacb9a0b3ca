use thiserror::Error;

/// The vector database rejected or failed a near-text query.
#[derive(Error, Debug)]
#[error("near-text query on {collection} failed: {message}")]
pub struct QueryError {
    pub collection: String,
    pub message: String,
}

impl QueryError {
    pub fn new(collection: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            message: message.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum RetrievalError {
    #[error("Failed to connect to vector database: {0}")]
    Connect(String),

    #[error(transparent)]
    Query(#[from] QueryError),
}

#[derive(Error, Debug)]
pub enum RankingError {
    #[error("Failed to encode candidates for the ranking prompt: {0}")]
    Prompt(#[from] serde_json::Error),

    #[error("Generative service call failed: {0}")]
    Generation(String),

    #[error("Ranking response is not a JSON object: {reason}")]
    Parse { reason: String, raw: String },

    #[error("Ranking response contained no usable entries")]
    Empty,
}

#[derive(Error, Debug)]
pub enum ImageError {
    #[error("Image request failed: {0}")]
    Request(String),

    #[error("Image service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Image service returned an empty payload")]
    EmptyPayload,

    #[error("Image payload is not a recognised image format")]
    UnknownFormat,
}
