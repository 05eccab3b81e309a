// Query encoding against the corpus vector space.
// The fitted artifact is produced elsewhere; this module only loads and applies it.

pub mod tfidf;

use std::path::PathBuf;
use thiserror::Error;

pub use tfidf::{Norm, TfidfVectorizer};

/// Encodes normalized text into the fixed feature space the similarity index was built from.
pub trait Vectorizer: Send + Sync {
    /// Number of features, i.e. the length of every encoded vector.
    fn dimension(&self) -> usize;

    /// Encode `text`. Text with no known terms yields the all-zero vector.
    fn encode(&self, text: &str) -> QueryVector;
}

/// Errors raised while loading a vectorizer artifact. Always fatal at startup.
#[derive(Debug, Error)]
pub enum VectorizerError {
    #[error("Failed to read vectorizer artifact {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse vectorizer artifact {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Vectorizer vocabulary is empty")]
    EmptyVocabulary,
    #[error("Vectorizer has {idf} idf weights for {vocabulary} vocabulary terms")]
    IdfLengthMismatch { vocabulary: usize, idf: usize },
    #[error("Feature index {index} for term '{term}' is out of range (dimension {dimension})")]
    IndexOutOfRange {
        term: String,
        index: u32,
        dimension: usize,
    },
    #[error("Feature index {index} is assigned to more than one term")]
    DuplicateIndex { index: u32 },
    #[error("Idf weight at feature {index} is not finite")]
    NonFiniteIdf { index: usize },
    #[error("Invalid ngram range ({0}, {1})")]
    InvalidNgramRange(usize, usize),
}

/// Sparse vector over the vectorizer's vocabulary.
///
/// `indices` are strictly ascending and `values` is parallel to them.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryVector {
    dimension: usize,
    indices: Vec<u32>,
    values: Vec<f32>,
}

impl QueryVector {
    /// All-zero vector of the given dimension.
    #[inline]
    pub fn zeros(dimension: usize) -> Self {
        Self {
            dimension,
            indices: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Build from `(index, value)` pairs. Pairs are sorted, zero values dropped,
    /// and indices outside `dimension` ignored.
    #[inline]
    pub fn from_pairs(dimension: usize, pairs: impl IntoIterator<Item = (u32, f32)>) -> Self {
        let mut pairs: Vec<(u32, f32)> = pairs
            .into_iter()
            .filter(|(index, value)| (*index as usize) < dimension && *value != 0.0)
            .collect();
        pairs.sort_unstable_by_key(|(index, _)| *index);
        pairs.dedup_by_key(|(index, _)| *index);

        let (indices, values) = pairs.into_iter().unzip();
        Self {
            dimension,
            indices,
            values,
        }
    }

    #[inline]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    #[inline]
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    #[inline]
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// Number of non-zero entries.
    #[inline]
    pub fn nnz(&self) -> usize {
        self.indices.len()
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.values.iter().all(|v| *v == 0.0)
    }

    #[inline]
    pub fn l2_norm(&self) -> f32 {
        self.values.iter().map(|v| v * v).sum::<f32>().sqrt()
    }

    /// Dense representation, as sent to the similarity index.
    #[inline]
    pub fn to_dense(&self) -> Vec<f32> {
        let mut dense = vec![0.0; self.dimension];
        for (index, value) in self.indices.iter().zip(&self.values) {
            dense[*index as usize] = *value;
        }
        dense
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_vector() {
        let vector = QueryVector::zeros(4);
        assert!(vector.is_zero());
        assert_eq!(vector.nnz(), 0);
        assert_eq!(vector.to_dense(), vec![0.0; 4]);
    }

    #[test]
    fn from_pairs_sorts_and_filters() {
        let vector = QueryVector::from_pairs(5, [(3, 0.5), (1, 0.25), (7, 1.0), (2, 0.0)]);
        assert_eq!(vector.indices(), &[1, 3]);
        assert_eq!(vector.values(), &[0.25, 0.5]);
        assert_eq!(vector.to_dense(), vec![0.0, 0.25, 0.0, 0.5, 0.0]);
        assert!(!vector.is_zero());
    }
}
