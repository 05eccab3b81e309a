
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

use super::{IndexError, IndexMatch, SimilarityIndex};
use crate::config::{ConfigError, IndexConfig, data_plane_url};
use crate::vectorizer::QueryVector;

/// Pinecone index client over the REST data plane.
#[derive(Debug, Clone)]
pub struct PineconeIndex {
    data_url: Url,
    index_name: String,
    namespace: Option<String>,
    api_key: String,
    api_version: String,
    timeout: Duration,
    dimension: Option<usize>,
    agent: ureq::Agent,
}

/// What the control plane reports about an index.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct IndexDescription {
    pub name: String,
    pub host: String,
    #[serde(default)]
    pub dimension: Option<usize>,
    #[serde(default)]
    pub metric: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexStats {
    #[serde(default)]
    pub dimension: Option<usize>,
    #[serde(default)]
    pub total_vector_count: u64,
    #[serde(default)]
    pub namespaces: BTreeMap<String, NamespaceStats>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NamespaceStats {
    #[serde(default)]
    pub vector_count: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    vector: Vec<f32>,
    top_k: usize,
    include_metadata: bool,
    include_values: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    namespace: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<RawMatch>,
}

#[derive(Debug, Deserialize)]
struct RawMatch {
    id: String,
    score: f32,
    #[serde(default)]
    metadata: Option<Map<String, Value>>,
}

impl PineconeIndex {
    /// Build a client from configuration.
    ///
    /// When no host is configured the index is looked up by name on the control plane,
    /// which is a blocking network call.
    #[inline]
    pub fn new(config: &IndexConfig) -> Result<Self, IndexError> {
        let api_key = config
            .api_key()
            .map_err(|e| IndexError::Misconfigured(e.to_string()))?;
        let timeout = Duration::from_secs(config.timeout_seconds);
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .build()
            .into();

        let (host, dimension) = match &config.host {
            Some(host) => (host.clone(), None),
            None => {
                let description = describe_index(&agent, config, &api_key, timeout)?;
                info!(
                    "Resolved index '{}' to host {}",
                    description.name, description.host
                );
                (description.host, description.dimension)
            }
        };

        let data_url =
            data_plane_url(&host).map_err(|e| IndexError::Misconfigured(e.to_string()))?;

        Ok(Self {
            data_url,
            index_name: config.index_name.clone(),
            namespace: config.namespace.clone(),
            api_key,
            api_version: config.api_version.clone(),
            timeout,
            dimension,
            agent,
        })
    }

    /// [`PineconeIndex::new`] run off the async executor.
    ///
    /// With a configured host the control plane is never asked, so the dimension is
    /// read from the data plane's stats instead. A stats failure leaves it unknown.
    #[inline]
    pub async fn connect(config: IndexConfig) -> Result<Self, IndexError> {
        tokio::task::spawn_blocking(move || {
            let mut index = Self::new(&config)?;
            if index.dimension.is_none() {
                match index.describe_index_stats() {
                    Ok(stats) => index.dimension = stats.dimension,
                    Err(e) => warn!("Could not read index dimension from stats: {}", e),
                }
            }
            Ok(index)
        })
        .await
        .map_err(|e| IndexError::Aborted(e.to_string()))?
    }

    #[inline]
    pub fn description(&self) -> IndexDescription {
        IndexDescription {
            name: self.index_name.clone(),
            host: self.data_url.to_string(),
            dimension: self.dimension,
            metric: None,
        }
    }

    /// Fetch vector counts and dimension from the data plane.
    #[inline]
    pub fn describe_index_stats(&self) -> Result<IndexStats, IndexError> {
        let response_text = self.post_json("describe_index_stats", "{}")?;
        serde_json::from_str(&response_text)
            .map_err(|e| IndexError::MalformedResponse(format!("index stats: {}", e)))
    }

    /// Blocking nearest-neighbour query.
    #[inline]
    pub fn query_blocking(
        &self,
        vector: &QueryVector,
        top_k: usize,
    ) -> Result<Vec<IndexMatch>, IndexError> {
        debug!(
            "Querying index '{}' for top {} matches ({} active features)",
            self.index_name,
            top_k,
            vector.nnz()
        );

        let request = QueryRequest {
            vector: vector.to_dense(),
            top_k,
            include_metadata: true,
            include_values: false,
            namespace: self.namespace.as_deref(),
        };
        let request_json = serde_json::to_string(&request)
            .map_err(|e| IndexError::MalformedResponse(format!("query request: {}", e)))?;

        let response_text = self.post_json("query", &request_json)?;
        let response: QueryResponse = serde_json::from_str(&response_text)
            .map_err(|e| IndexError::MalformedResponse(format!("query response: {}", e)))?;

        let matches: Vec<IndexMatch> = response
            .matches
            .into_iter()
            .map(|m| IndexMatch::from_metadata(m.id, m.score, m.metadata.unwrap_or_default()))
            .collect();

        debug!("Index returned {} matches", matches.len());
        Ok(matches)
    }

    fn post_json(&self, endpoint: &str, body: &str) -> Result<String, IndexError> {
        let url = self
            .data_url
            .join(endpoint)
            .map_err(|e| IndexError::Misconfigured(format!("Failed to build URL: {}", e)))?;

        self.agent
            .post(url.as_str())
            .header("Api-Key", self.api_key.as_str())
            .header("X-Pinecone-API-Version", self.api_version.as_str())
            .header("Content-Type", "application/json")
            .send(body)
            .and_then(|mut resp| resp.body_mut().read_to_string())
            .map_err(|e| classify_error(e, self.timeout))
    }
}

#[async_trait]
impl SimilarityIndex for PineconeIndex {
    async fn query(
        &self,
        vector: &QueryVector,
        top_k: usize,
    ) -> Result<Vec<IndexMatch>, IndexError> {
        let client = self.clone();
        let vector = vector.clone();
        // Dropping this future abandons the wait; the agent timeout bounds the worker.
        tokio::task::spawn_blocking(move || client.query_blocking(&vector, top_k))
            .await
            .map_err(|e| IndexError::Aborted(e.to_string()))?
    }

    #[inline]
    fn dimension(&self) -> Option<usize> {
        self.dimension
    }
}

fn describe_index(
    agent: &ureq::Agent,
    config: &IndexConfig,
    api_key: &str,
    timeout: Duration,
) -> Result<IndexDescription, IndexError> {
    let url = config
        .control_plane_url()
        .and_then(|base| {
            base.join(&format!("indexes/{}", config.index_name))
                .map_err(|_| ConfigError::InvalidUrl(config.control_plane_url.clone()))
        })
        .map_err(|e| IndexError::Misconfigured(e.to_string()))?;

    debug!("Describing index '{}' at {}", config.index_name, url);

    let response_text = agent
        .get(url.as_str())
        .header("Api-Key", api_key)
        .header("X-Pinecone-API-Version", config.api_version.as_str())
        .call()
        .and_then(|mut resp| resp.body_mut().read_to_string())
        .map_err(|e| match classify_error(e, timeout) {
            IndexError::Status(404) => IndexError::Misconfigured(format!(
                "index '{}' does not exist",
                config.index_name
            )),
            other => other,
        })?;

    serde_json::from_str(&response_text)
        .map_err(|e| IndexError::MalformedResponse(format!("index description: {}", e)))
}

fn classify_error(error: ureq::Error, timeout: Duration) -> IndexError {
    match error {
        ureq::Error::StatusCode(status @ (401 | 403)) => {
            warn!("Index rejected credentials (status {})", status);
            IndexError::Unauthorized(status)
        }
        ureq::Error::StatusCode(status) => {
            warn!("Index request failed with status {}", status);
            IndexError::Status(status)
        }
        ureq::Error::Timeout(_) => {
            warn!("Index request timed out after {:?}", timeout);
            IndexError::Timeout(timeout)
        }
        other => {
            warn!("Transport error talking to index: {}", other);
            IndexError::Transport(other.to_string())
        }
    }
}
