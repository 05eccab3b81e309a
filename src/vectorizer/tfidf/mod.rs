
use fancy_regex::Regex;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::{debug, info};

use super::{QueryVector, Vectorizer, VectorizerError};

/// Word tokens of two or more characters, the pattern the corpus vocabulary was built with.
static TOKEN_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\w\w+\b").expect("valid regex"));

/// Row normalization applied after weighting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Norm {
    L1,
    L2,
}

/// On-disk JSON export of a fitted TF-IDF model.
#[derive(Debug, Deserialize)]
struct TfidfArtifact {
    vocabulary: HashMap<String, u32>,
    #[serde(default)]
    idf: Vec<f64>,
    #[serde(default = "default_ngram_range")]
    ngram_range: (usize, usize),
    #[serde(default = "default_true")]
    lowercase: bool,
    #[serde(default = "default_true")]
    use_idf: bool,
    #[serde(default)]
    sublinear_tf: bool,
    #[serde(default)]
    binary: bool,
    #[serde(default = "default_norm")]
    norm: Option<Norm>,
}

fn default_ngram_range() -> (usize, usize) {
    (1, 1)
}

fn default_true() -> bool {
    true
}

fn default_norm() -> Option<Norm> {
    Some(Norm::L2)
}

/// A fitted TF-IDF encoder with a fixed vocabulary.
#[derive(Debug, Clone)]
pub struct TfidfVectorizer {
    vocabulary: HashMap<String, u32>,
    idf: Vec<f64>,
    ngram_range: (usize, usize),
    lowercase: bool,
    use_idf: bool,
    sublinear_tf: bool,
    binary: bool,
    norm: Option<Norm>,
}

impl TfidfVectorizer {
    /// Load and validate an artifact from `path`.
    #[inline]
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, VectorizerError> {
        let path = path.as_ref();
        debug!("Loading vectorizer artifact from {}", path.display());

        let content = fs::read_to_string(path).map_err(|source| VectorizerError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let vectorizer = Self::parse(&content, path)?;
        info!(
            "Loaded TF-IDF vectorizer with {} features from {}",
            vectorizer.dimension(),
            path.display()
        );
        Ok(vectorizer)
    }

    /// Parse and validate an artifact held in memory.
    #[inline]
    pub fn from_json_str(json: &str) -> Result<Self, VectorizerError> {
        Self::parse(json, Path::new("<memory>"))
    }

    /// Build a vectorizer with default settings from a vocabulary and idf weights.
    #[inline]
    pub fn from_vocabulary<I, S>(vocabulary: I, idf: Vec<f64>) -> Result<Self, VectorizerError>
    where
        I: IntoIterator<Item = (S, u32)>,
        S: Into<String>,
    {
        Self::from_artifact(TfidfArtifact {
            vocabulary: vocabulary
                .into_iter()
                .map(|(term, index)| (term.into(), index))
                .collect(),
            idf,
            ngram_range: default_ngram_range(),
            lowercase: true,
            use_idf: true,
            sublinear_tf: false,
            binary: false,
            norm: default_norm(),
        })
    }

    fn parse(json: &str, path: &Path) -> Result<Self, VectorizerError> {
        let artifact: TfidfArtifact =
            serde_json::from_str(json).map_err(|source| VectorizerError::Parse {
                path: PathBuf::from(path),
                source,
            })?;
        Self::from_artifact(artifact)
    }

    fn from_artifact(artifact: TfidfArtifact) -> Result<Self, VectorizerError> {
        let dimension = artifact.vocabulary.len();
        if dimension == 0 {
            return Err(VectorizerError::EmptyVocabulary);
        }

        let (min_n, max_n) = artifact.ngram_range;
        if min_n == 0 || min_n > max_n {
            return Err(VectorizerError::InvalidNgramRange(min_n, max_n));
        }

        if artifact.use_idf && artifact.idf.len() != dimension {
            return Err(VectorizerError::IdfLengthMismatch {
                vocabulary: dimension,
                idf: artifact.idf.len(),
            });
        }

        if let Some(index) = artifact.idf.iter().position(|w| !w.is_finite()) {
            return Err(VectorizerError::NonFiniteIdf { index });
        }

        let mut seen = HashSet::with_capacity(dimension);
        for (term, index) in &artifact.vocabulary {
            if *index as usize >= dimension {
                return Err(VectorizerError::IndexOutOfRange {
                    term: term.clone(),
                    index: *index,
                    dimension,
                });
            }
            if !seen.insert(*index) {
                return Err(VectorizerError::DuplicateIndex { index: *index });
            }
        }

        Ok(Self {
            vocabulary: artifact.vocabulary,
            idf: artifact.idf,
            ngram_range: artifact.ngram_range,
            lowercase: artifact.lowercase,
            use_idf: artifact.use_idf,
            sublinear_tf: artifact.sublinear_tf,
            binary: artifact.binary,
            norm: artifact.norm,
        })
    }

    fn term_counts(&self, text: &str) -> BTreeMap<u32, f64> {
        let text = if self.lowercase {
            Cow::Owned(text.to_lowercase())
        } else {
            Cow::Borrowed(text)
        };

        let tokens: Vec<&str> = TOKEN_PATTERN
            .find_iter(&text)
            .flatten()
            .map(|m| m.as_str())
            .collect();

        let mut counts = BTreeMap::new();
        let (min_n, max_n) = self.ngram_range;
        for n in min_n..=max_n {
            for window in tokens.windows(n) {
                let term = window.join(" ");
                if let Some(index) = self.vocabulary.get(&term) {
                    *counts.entry(*index).or_insert(0.0) += 1.0;
                }
            }
        }
        counts
    }

    fn weigh(&self, index: u32, count: f64) -> f64 {
        let mut tf = if self.binary { 1.0 } else { count };
        if self.sublinear_tf {
            tf = 1.0 + tf.ln();
        }
        if self.use_idf {
            tf *= self.idf.get(index as usize).copied().unwrap_or(1.0);
        }
        tf
    }
}

impl Vectorizer for TfidfVectorizer {
    #[inline]
    fn dimension(&self) -> usize {
        self.vocabulary.len()
    }

    fn encode(&self, text: &str) -> QueryVector {
        let weighted: Vec<(u32, f64)> = self
            .term_counts(text)
            .into_iter()
            .map(|(index, count)| (index, self.weigh(index, count)))
            .collect();

        let scale = match self.norm {
            Some(Norm::L2) => weighted.iter().map(|(_, w)| w * w).sum::<f64>().sqrt(),
            Some(Norm::L1) => weighted.iter().map(|(_, w)| w.abs()).sum::<f64>(),
            None => 1.0,
        };
        let scale = if scale > 0.0 { scale } else { 1.0 };

        debug!("Encoded query into {} active features", weighted.len());

        QueryVector::from_pairs(
            self.dimension(),
            weighted
                .into_iter()
                .map(|(index, weight)| (index, (weight / scale) as f32)),
        )
    }
}
