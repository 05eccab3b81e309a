use thiserror::Error;

use crate::index::IndexError;
use crate::vectorizer::VectorizerError;

pub type Result<T> = std::result::Result<T, RecommenderError>;

#[derive(Error, Debug)]
pub enum RecommenderError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Vectorizer error: {0}")]
    Vectorizer(#[from] VectorizerError),

    #[error("Similarity index error: {0}")]
    Index(#[from] IndexError),

    #[error(
        "Vector space mismatch: the vectorizer produces {vectorizer} features but the index holds {index}-dimensional vectors"
    )]
    DimensionMismatch { vectorizer: usize, index: usize },

    #[error("Ingest error: {0}")]
    Ingest(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

pub mod catalog;
pub mod commands;
pub mod config;
pub mod database;
pub mod index;
pub mod ingest;
pub mod recommender;
pub mod text;
pub mod vectorizer;
