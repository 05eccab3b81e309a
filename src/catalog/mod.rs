// In-memory paper metadata keyed by DOI.
// Built once per process and only read afterwards.


use anyhow::{Context, Result};
use futures::TryStreamExt;
use serde::Serialize;
use std::collections::HashMap;
use tracing::{info, warn};

use crate::database::Database;
use crate::database::models::Paper;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaperRecord {
    pub doi: String,
    pub title: String,
    pub journal: String,
    pub publication_year: i64,
    pub authors: String,
    pub keywords: String,
    pub abstract_text: String,
}

impl From<Paper> for PaperRecord {
    #[inline]
    fn from(paper: Paper) -> Self {
        Self {
            doi: paper.doi,
            title: paper.title,
            journal: paper.journal,
            publication_year: paper.publication_year,
            authors: paper.authors,
            keywords: paper.keywords,
            abstract_text: paper.abstract_text,
        }
    }
}

#[derive(Debug, Default)]
pub struct MetadataStore {
    records: HashMap<String, PaperRecord>,
    duplicate_count: usize,
}

impl MetadataStore {
    /// Key records by DOI. When a DOI repeats, the first record in iteration order is kept.
    #[inline]
    pub fn from_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = PaperRecord>,
    {
        let mut store = Self::default();
        for record in records {
            store.push(record);
        }

        if store.duplicate_count > 0 {
            warn!(
                "Paper table holds {} duplicate DOI rows; keeping the first of each",
                store.duplicate_count
            );
        }
        store
    }

    /// Load every stored paper, in table order.
    #[inline]
    pub async fn load(database: &Database) -> Result<Self> {
        let mut store = Self::default();
        let mut rows = database.stream_papers();

        while let Some(paper) = rows
            .try_next()
            .await
            .context("Failed to read paper table")?
        {
            store.push(PaperRecord::from(paper));
        }

        if store.duplicate_count > 0 {
            warn!(
                "Paper table holds {} duplicate DOI rows; keeping the first of each",
                store.duplicate_count
            );
        }
        info!("Loaded {} papers into the metadata store", store.len());
        Ok(store)
    }

    #[inline]
    pub fn lookup(&self, doi: &str) -> Option<&PaperRecord> {
        self.records.get(doi)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Rows dropped because their DOI was already present.
    #[inline]
    pub fn duplicate_count(&self) -> usize {
        self.duplicate_count
    }

    fn push(&mut self, record: PaperRecord) {
        if self.records.contains_key(&record.doi) {
            self.duplicate_count += 1;
            return;
        }
        self.records.insert(record.doi.clone(), record);
    }
}
