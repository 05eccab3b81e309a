// Cleaning rules for one Scopus export row.


use fancy_regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use std::sync::LazyLock;
use thiserror::Error;

use super::pyliteral;
use crate::database::models::NewPaper;

pub const DOI_PREFIX: &str = "https://doi.org/";

static PARENTHETICAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(.*\)").expect("valid regex"));
static COPYRIGHT_NOTICE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r" (Â©|©|Copyright).*").expect("valid regex"));

/// The columns of a Scopus search export that make up a paper record.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScopusRow {
    #[serde(rename = "dc:title", default)]
    pub title: Option<String>,
    #[serde(rename = "dc:description", default)]
    pub description: Option<String>,
    #[serde(rename = "author", default)]
    pub author: Option<String>,
    #[serde(rename = "authkeywords", default)]
    pub keywords: Option<String>,
    #[serde(rename = "prism:publicationName", default)]
    pub publication_name: Option<String>,
    #[serde(rename = "prism:coverDate", default)]
    pub cover_date: Option<String>,
    #[serde(rename = "prism:doi", default)]
    pub doi: Option<String>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CleaningError {
    #[error("missing {0}")]
    MissingField(&'static str),
    #[error("cover date '{0}' does not start with a year")]
    InvalidYear(String),
    #[error("unreadable author list: {0}")]
    InvalidAuthors(String),
}

impl ScopusRow {
    /// Apply every cleaning rule. Rows without a DOI, title or cover year are rejected.
    #[inline]
    pub fn clean(&self) -> Result<NewPaper, CleaningError> {
        let doi = present(&self.doi).ok_or(CleaningError::MissingField("prism:doi"))?;
        let title = present(&self.title).ok_or(CleaningError::MissingField("dc:title"))?;
        let cover_date =
            present(&self.cover_date).ok_or(CleaningError::MissingField("prism:coverDate"))?;

        Ok(NewPaper {
            doi: doi_url(doi),
            title: clean_title(title),
            journal: present(&self.publication_name)
                .map(clean_journal)
                .unwrap_or_default(),
            publication_year: publication_year(cover_date)?,
            authors: present(&self.author)
                .map(extract_names)
                .transpose()?
                .unwrap_or_default(),
            keywords: present(&self.keywords)
                .map(clean_keywords)
                .unwrap_or_default(),
            abstract_text: present(&self.description)
                .map(clean_abstract)
                .unwrap_or_default(),
        })
    }
}

fn present(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|value| !value.trim().is_empty())
}

#[inline]
pub fn clean_title(raw: &str) -> String {
    raw.replace('\u{a0}', " ").replace("&amp;", "&").trim().to_string()
}

#[inline]
pub fn clean_keywords(raw: &str) -> String {
    raw.replace("&amp;", "&").trim().to_string()
}

/// Drop a parenthetical annotation such as a country suffix.
#[inline]
pub fn clean_journal(raw: &str) -> String {
    PARENTHETICAL.replace_all(raw, "").trim().to_string()
}

/// Year from the first four characters of a cover date like `2019-03-01`.
#[inline]
pub fn publication_year(cover_date: &str) -> Result<i64, CleaningError> {
    let year: String = cover_date.trim().chars().take(4).collect();
    year.parse()
        .map_err(|_| CleaningError::InvalidYear(cover_date.to_string()))
}

#[inline]
pub fn doi_url(doi: &str) -> String {
    format!("{DOI_PREFIX}{}", doi.trim())
}

/// Strip non-breaking spaces and the trailing copyright notice.
#[inline]
pub fn clean_abstract(raw: &str) -> String {
    let text = raw.replace('\u{a0}', " ");
    COPYRIGHT_NOTICE.replace_all(&text, "").trim().to_string()
}

/// Format a serialized author list as `Surname, Given; Surname, Given`.
#[inline]
pub fn extract_names(raw: &str) -> Result<String, CleaningError> {
    let parsed =
        pyliteral::parse(raw).map_err(|e| CleaningError::InvalidAuthors(e.to_string()))?;
    let Value::Array(authors) = parsed else {
        return Err(CleaningError::InvalidAuthors(
            "expected a list of authors".to_string(),
        ));
    };

    let names = authors
        .iter()
        .map(|author| {
            let surname = author
                .get("surname")
                .and_then(Value::as_str)
                .ok_or_else(|| CleaningError::InvalidAuthors("author without surname".to_string()))?;
            Ok(match author.get("given-name").and_then(Value::as_str) {
                Some(given) => format!("{surname}, {given}"),
                None => surname.to_string(),
            })
        })
        .collect::<Result<Vec<_>, CleaningError>>()?;

    Ok(names.join("; "))
}
