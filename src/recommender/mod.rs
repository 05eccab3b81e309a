// Recommendation pipeline: normalize, encode, query the index, join to metadata.

#[cfg(test)]
mod tests;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{Instrument, debug, info, info_span, warn};
use uuid::Uuid;

use crate::catalog::MetadataStore;
use crate::index::{IndexMatch, SimilarityIndex};
use crate::text::normalize;
use crate::vectorizer::Vectorizer;
use crate::{RecommenderError, Result};

/// What to do when a query normalizes to nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EmptyQueryPolicy {
    /// Send the all-zero vector to the index anyway.
    #[default]
    Query,
    /// Return an empty result without contacting the index.
    NoResults,
}

impl fmt::Display for EmptyQueryPolicy {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            EmptyQueryPolicy::Query => write!(f, "query"),
            EmptyQueryPolicy::NoResults => write!(f, "no-results"),
        }
    }
}

/// A recommended paper, in index rank order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedMatch {
    pub title: String,
    pub journal: String,
    pub doi: String,
    pub score: f32,
}

impl fmt::Display for EnrichedMatch {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} | {} | {}", self.title, self.journal, self.doi)
    }
}

pub struct Recommender {
    vectorizer: Arc<dyn Vectorizer>,
    index: Arc<dyn SimilarityIndex>,
    catalog: Arc<MetadataStore>,
    empty_query: EmptyQueryPolicy,
}

impl Recommender {
    #[inline]
    pub fn new(
        vectorizer: Arc<dyn Vectorizer>,
        index: Arc<dyn SimilarityIndex>,
        catalog: Arc<MetadataStore>,
    ) -> Self {
        Self {
            vectorizer,
            index,
            catalog,
            empty_query: EmptyQueryPolicy::default(),
        }
    }

    #[inline]
    #[must_use]
    pub fn with_empty_query_policy(mut self, policy: EmptyQueryPolicy) -> Self {
        self.empty_query = policy;
        self
    }

    #[inline]
    pub fn catalog(&self) -> &MetadataStore {
        &self.catalog
    }

    /// Fail when the index reports a dimension different from the vectorizer's.
    ///
    /// Feature order cannot be checked this way; only the vector length is.
    #[inline]
    pub fn check_dimensions(&self) -> Result<()> {
        let vectorizer = self.vectorizer.dimension();
        match self.index.dimension() {
            Some(index) if index != vectorizer => {
                Err(RecommenderError::DimensionMismatch { vectorizer, index })
            }
            Some(_) => Ok(()),
            None => {
                debug!("Index does not report a dimension; skipping vector space check");
                Ok(())
            }
        }
    }

    /// Recommend up to `k` papers for a free-text query, most similar first.
    ///
    /// Index failures are returned to the caller and never retried. Matches whose DOI is
    /// absent from the metadata store are dropped without reordering the rest.
    #[inline]
    pub async fn recommend(&self, raw_query: &str, k: usize) -> Result<Vec<EnrichedMatch>> {
        let request_id = Uuid::new_v4();
        let span = info_span!("recommend", %request_id, k);
        self.run(raw_query, k).instrument(span).await
    }

    async fn run(&self, raw_query: &str, k: usize) -> Result<Vec<EnrichedMatch>> {
        if k == 0 {
            debug!("Requested zero recommendations");
            return Ok(Vec::new());
        }

        let normalized = normalize(raw_query);
        debug!("Normalized query: '{}'", normalized);

        if normalized.is_empty() {
            match self.empty_query {
                EmptyQueryPolicy::NoResults => {
                    info!("Query normalized to nothing; returning no results");
                    return Ok(Vec::new());
                }
                EmptyQueryPolicy::Query => {
                    debug!("Query normalized to nothing; querying with the zero vector");
                }
            }
        }

        let vector = self.vectorizer.encode(&normalized);
        let mut matches = self.index.query(&vector, k).await?;

        if matches.len() > k {
            warn!(
                "Index returned {} matches for top_k={}; truncating",
                matches.len(),
                k
            );
            matches.truncate(k);
        }

        let results = self.join(matches);
        info!("Returning {} recommendations", results.len());
        Ok(results)
    }

    /// Enrich matches from the metadata store, keeping index order.
    fn join(&self, matches: Vec<IndexMatch>) -> Vec<EnrichedMatch> {
        matches
            .into_iter()
            .filter_map(|found| {
                let Some(doi) = found.doi.as_deref() else {
                    warn!("Index match '{}' carries no DOI; skipping", found.id);
                    return None;
                };
                let Some(record) = self.catalog.lookup(doi) else {
                    warn!(
                        "No metadata for DOI {} (index match '{}'); skipping",
                        doi, found.id
                    );
                    return None;
                };
                Some(EnrichedMatch {
                    title: record.title.clone(),
                    journal: record.journal.clone(),
                    doi: record.doi.clone(),
                    score: found.score,
                })
            })
            .collect()
    }
}
