use super::*;
use crate::catalog::PaperRecord;
use crate::index::IndexError;
use crate::vectorizer::{QueryVector, TfidfVectorizer};
use async_trait::async_trait;
use serde_json::{Map, Value, json};
use std::sync::Mutex;

/// Index double that replays a fixed response and records every query.
struct StubIndex {
    matches: Vec<IndexMatch>,
    dimension: Option<usize>,
    fail: bool,
    calls: Mutex<Vec<(QueryVector, usize)>>,
}

impl StubIndex {
    fn returning(dois: &[&str]) -> Self {
        let matches = dois
            .iter()
            .enumerate()
            .map(|(rank, &doi)| {
                index_match(&format!("vec-{rank}"), 0.9 - rank as f32 * 0.1, Some(doi))
            })
            .collect();
        Self {
            matches,
            dimension: None,
            fail: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    fn failing() -> Self {
        Self {
            fail: true,
            ..Self::returning(&[])
        }
    }

    fn calls(&self) -> Vec<(QueryVector, usize)> {
        self.calls.lock().expect("lock poisoned").clone()
    }
}

#[async_trait]
impl SimilarityIndex for StubIndex {
    async fn query(
        &self,
        vector: &QueryVector,
        top_k: usize,
    ) -> std::result::Result<Vec<IndexMatch>, IndexError> {
        self.calls
            .lock()
            .expect("lock poisoned")
            .push((vector.clone(), top_k));
        if self.fail {
            return Err(IndexError::Unauthorized(401));
        }
        Ok(self.matches.clone())
    }

    fn dimension(&self) -> Option<usize> {
        self.dimension
    }
}

fn index_match(id: &str, score: f32, doi: Option<&str>) -> IndexMatch {
    let mut metadata = Map::new();
    if let Some(doi) = doi {
        metadata.insert("doi".to_string(), Value::String(doi.to_string()));
    }
    metadata.insert("year".to_string(), json!(2020));
    IndexMatch::from_metadata(id.to_string(), score, metadata)
}

fn record(doi: &str, title: &str, journal: &str) -> PaperRecord {
    PaperRecord {
        doi: doi.to_string(),
        title: title.to_string(),
        journal: journal.to_string(),
        publication_year: 2020,
        authors: "Doe, Jane".to_string(),
        keywords: String::new(),
        abstract_text: String::new(),
    }
}

fn vectorizer() -> Arc<TfidfVectorizer> {
    Arc::new(
        TfidfVectorizer::from_vocabulary(
            [
                ("chain", 0),
                ("decision", 1),
                ("making", 2),
                ("stress", 3),
                ("supply", 4),
                ("team", 5),
            ],
            vec![1.0; 6],
        )
        .expect("valid vocabulary"),
    )
}

fn catalog() -> Arc<MetadataStore> {
    Arc::new(MetadataStore::from_records([
        record("https://doi.org/10.1/a", "Teams under pressure", "Management Science"),
        record("https://doi.org/10.1/b", "Stress and choice", "Operations Research"),
        record("https://doi.org/10.1/c", "Group decisions", "Production and Operations Management"),
    ]))
}

fn recommender(index: &Arc<StubIndex>) -> Recommender {
    Recommender::new(vectorizer(), Arc::clone(index) as Arc<dyn SimilarityIndex>, catalog())
}

#[tokio::test]
async fn end_to_end_keeps_index_order() {
    let index = Arc::new(StubIndex::returning(&[
        "https://doi.org/10.1/b",
        "https://doi.org/10.1/c",
        "https://doi.org/10.1/a",
    ]));

    let results = recommender(&index)
        .recommend("team decision making under stress", 10)
        .await
        .expect("recommendation succeeds");

    let dois: Vec<&str> = results.iter().map(|r| r.doi.as_str()).collect();
    assert_eq!(
        dois,
        [
            "https://doi.org/10.1/b",
            "https://doi.org/10.1/c",
            "https://doi.org/10.1/a"
        ]
    );
    assert_eq!(results[0].title, "Stress and choice");
    assert_eq!(results[0].journal, "Operations Research");
    assert!((results[0].score - 0.9).abs() < 1e-6);

    let calls = index.calls();
    assert_eq!(calls.len(), 1);
    let (vector, top_k) = &calls[0];
    assert_eq!(*top_k, 10);
    assert_eq!(vector.dimension(), 6);
    assert_eq!(vector.indices(), [1, 2, 3, 5]);
}

#[tokio::test]
async fn missing_metadata_is_skipped_without_reordering() {
    let index = Arc::new(StubIndex::returning(&[
        "https://doi.org/10.1/c",
        "https://doi.org/10.1/unknown",
        "https://doi.org/10.1/a",
    ]));

    let results = recommender(&index)
        .recommend("supply chain", 10)
        .await
        .expect("recommendation succeeds");

    let dois: Vec<&str> = results.iter().map(|r| r.doi.as_str()).collect();
    assert_eq!(dois, ["https://doi.org/10.1/c", "https://doi.org/10.1/a"]);
}

#[tokio::test]
async fn match_without_doi_is_skipped() {
    let index = Arc::new(StubIndex {
        matches: vec![
            index_match("vec-0", 0.8, None),
            index_match("vec-1", 0.7, Some("https://doi.org/10.1/a")),
        ],
        ..StubIndex::returning(&[])
    });

    let results = recommender(&index)
        .recommend("team stress", 5)
        .await
        .expect("recommendation succeeds");

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].doi, "https://doi.org/10.1/a");
}

#[tokio::test]
async fn result_length_never_exceeds_k() {
    let index = Arc::new(StubIndex::returning(&[
        "https://doi.org/10.1/a",
        "https://doi.org/10.1/b",
        "https://doi.org/10.1/c",
    ]));
    let recommender = recommender(&index);

    for k in 0..5 {
        let results = recommender
            .recommend("decision making", k)
            .await
            .expect("recommendation succeeds");
        assert!(results.len() <= k, "k={k} gave {} results", results.len());
    }

    let results = recommender
        .recommend("decision making", 2)
        .await
        .expect("recommendation succeeds");
    let dois: Vec<&str> = results.iter().map(|r| r.doi.as_str()).collect();
    assert_eq!(dois, ["https://doi.org/10.1/a", "https://doi.org/10.1/b"]);
}

#[tokio::test]
async fn zero_k_does_not_query_the_index() {
    let index = Arc::new(StubIndex::returning(&["https://doi.org/10.1/a"]));

    let results = recommender(&index)
        .recommend("team stress", 0)
        .await
        .expect("recommendation succeeds");

    assert!(results.is_empty());
    assert!(index.calls().is_empty());
}

#[tokio::test]
async fn empty_query_sends_zero_vector_by_default() {
    let index = Arc::new(StubIndex::returning(&["https://doi.org/10.1/a"]));

    let results = recommender(&index)
        .recommend("", 10)
        .await
        .expect("empty query does not fail");
    assert_eq!(results.len(), 1);

    let results = recommender(&index)
        .recommend("the and of", 10)
        .await
        .expect("stopword query does not fail");
    assert_eq!(results.len(), 1);

    let calls = index.calls();
    assert_eq!(calls.len(), 2);
    assert!(calls.iter().all(|(vector, _)| vector.is_zero()));
}

#[tokio::test]
async fn no_results_policy_skips_the_index() {
    let index = Arc::new(StubIndex::returning(&["https://doi.org/10.1/a"]));
    let recommender = recommender(&index).with_empty_query_policy(EmptyQueryPolicy::NoResults);

    let results = recommender
        .recommend("--- the of!", 10)
        .await
        .expect("recommendation succeeds");
    assert!(results.is_empty());
    assert!(index.calls().is_empty());

    let results = recommender
        .recommend("team", 10)
        .await
        .expect("recommendation succeeds");
    assert_eq!(results.len(), 1);
    assert_eq!(index.calls().len(), 1);
}

#[tokio::test]
async fn index_failure_is_fatal_for_the_request() {
    let index = Arc::new(StubIndex::failing());

    let result = recommender(&index).recommend("team stress", 10).await;

    assert!(matches!(
        result,
        Err(RecommenderError::Index(IndexError::Unauthorized(401)))
    ));
    assert_eq!(index.calls().len(), 1);
}

#[test]
fn dimension_check() {
    let matching = Arc::new(StubIndex {
        dimension: Some(6),
        ..StubIndex::returning(&[])
    });
    assert!(recommender(&matching).check_dimensions().is_ok());

    let unknown = Arc::new(StubIndex::returning(&[]));
    assert!(recommender(&unknown).check_dimensions().is_ok());

    let mismatched = Arc::new(StubIndex {
        dimension: Some(384),
        ..StubIndex::returning(&[])
    });
    assert!(matches!(
        recommender(&mismatched).check_dimensions(),
        Err(RecommenderError::DimensionMismatch {
            vectorizer: 6,
            index: 384
        })
    ));
}

#[test]
fn empty_query_policy_names() {
    assert_eq!(EmptyQueryPolicy::default(), EmptyQueryPolicy::Query);
    assert_eq!(EmptyQueryPolicy::NoResults.to_string(), "no-results");
    assert_eq!(
        serde_json::to_string(&EmptyQueryPolicy::NoResults).expect("serializes"),
        "\"no-results\""
    );
    let parsed: EmptyQueryPolicy = serde_json::from_str("\"query\"").expect("parses");
    assert_eq!(parsed, EmptyQueryPolicy::Query);
}

#[test]
fn enriched_match_display() {
    let found = EnrichedMatch {
        title: "Teams under pressure".to_string(),
        journal: "Management Science".to_string(),
        doi: "https://doi.org/10.1/a".to_string(),
        score: 0.5,
    };
    assert_eq!(
        found.to_string(),
        "Teams under pressure | Management Science | https://doi.org/10.1/a"
    );
}
