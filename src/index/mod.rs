// Similarity index seam.
// The pipeline only sees `SimilarityIndex`; Pinecone is one implementation of it.

pub mod pinecone;

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::time::Duration;
use thiserror::Error;

use crate::vectorizer::QueryVector;

pub use pinecone::{IndexDescription, IndexStats, PineconeIndex};

/// Errors from talking to the similarity index. Fatal for the request that hit them.
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("Similarity index request timed out after {0:?}")]
    Timeout(Duration),
    #[error("Similarity index rejected the credentials (HTTP {0})")]
    Unauthorized(u16),
    #[error("Similarity index returned HTTP {0}")]
    Status(u16),
    #[error("Failed to reach similarity index: {0}")]
    Transport(String),
    #[error("Malformed similarity index response: {0}")]
    MalformedResponse(String),
    #[error("Similarity index is misconfigured: {0}")]
    Misconfigured(String),
    #[error("Similarity index query was aborted: {0}")]
    Aborted(String),
}

/// One ranked entry returned by the index.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexMatch {
    /// Vector id inside the index.
    pub id: String,
    /// Similarity reported by the index; higher is more similar.
    pub score: f32,
    /// DOI stored in the vector's metadata, if present.
    pub doi: Option<String>,
    /// Full metadata map attached to the vector.
    pub metadata: Map<String, Value>,
}

impl IndexMatch {
    /// Build a match from the metadata map, lifting the `doi` field out of it.
    #[inline]
    pub fn from_metadata(id: String, score: f32, metadata: Map<String, Value>) -> Self {
        let doi = metadata
            .get("doi")
            .and_then(Value::as_str)
            .map(str::to_string);
        Self {
            id,
            score,
            doi,
            metadata,
        }
    }
}

/// Nearest-neighbour lookup over the corpus vectors.
///
/// Implementations return at most `top_k` matches, most similar first. Ordering among
/// equal scores is whatever the index returns.
#[async_trait]
pub trait SimilarityIndex: Send + Sync {
    async fn query(
        &self,
        vector: &QueryVector,
        top_k: usize,
    ) -> Result<Vec<IndexMatch>, IndexError>;

    /// Vector dimension the index was built with, when it reports one.
    #[inline]
    fn dimension(&self) -> Option<usize> {
        None
    }
}
