use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A cleaned paper row as stored in SQLite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Paper {
    pub id: i64,
    pub doi: String,
    pub title: String,
    pub journal: String,
    pub publication_year: i64,
    pub authors: String,
    pub keywords: String,
    pub abstract_text: String,
    pub ingested_date: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPaper {
    pub doi: String,
    pub title: String,
    pub journal: String,
    pub publication_year: i64,
    pub authors: String,
    pub keywords: String,
    pub abstract_text: String,
}
