#[cfg(test)]
mod tests;

use super::models::*;
use anyhow::{Context, Result};
use chrono::Utc;
use futures::stream::BoxStream;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

const PAPER_COLUMNS: &str = "id, doi, title, journal, publication_year, authors, keywords, \
                             abstract_text, ingested_date";

pub struct PaperQueries;

impl PaperQueries {
    #[inline]
    pub async fn create(pool: &SqlitePool, new_paper: &NewPaper) -> Result<Paper> {
        // The connection goes back to the pool before the read-back borrows one.
        let id = {
            let mut conn = pool
                .acquire()
                .await
                .context("Failed to acquire database connection")?;
            Self::insert(&mut conn, new_paper).await?
        };

        Self::get_by_id(pool, id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Failed to retrieve created paper"))
    }

    /// Insert on an existing connection, so callers can batch inside a transaction.
    #[inline]
    pub async fn insert(conn: &mut SqliteConnection, new_paper: &NewPaper) -> Result<i64> {
        let now = Utc::now().naive_utc();
        let id = sqlx::query(
            "INSERT INTO papers (doi, title, journal, publication_year, authors, keywords, abstract_text, ingested_date) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&new_paper.doi)
        .bind(&new_paper.title)
        .bind(&new_paper.journal)
        .bind(new_paper.publication_year)
        .bind(&new_paper.authors)
        .bind(&new_paper.keywords)
        .bind(&new_paper.abstract_text)
        .bind(now)
        .execute(conn)
        .await
        .with_context(|| format!("Failed to insert paper {}", new_paper.doi))?
        .last_insert_rowid();

        Ok(id)
    }

    #[inline]
    pub async fn get_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Paper>> {
        let paper = sqlx::query_as::<_, Paper>(&format!(
            "SELECT {PAPER_COLUMNS} FROM papers WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get paper by id")?;

        Ok(paper)
    }

    /// First paper with the DOI in table order.
    #[inline]
    pub async fn get_by_doi(pool: &SqlitePool, doi: &str) -> Result<Option<Paper>> {
        let paper = sqlx::query_as::<_, Paper>(&format!(
            "SELECT {PAPER_COLUMNS} FROM papers WHERE doi = ? ORDER BY id LIMIT 1"
        ))
        .bind(doi)
        .fetch_optional(pool)
        .await
        .context("Failed to get paper by DOI")?;

        Ok(paper)
    }

    #[inline]
    pub async fn list_all(pool: &SqlitePool) -> Result<Vec<Paper>> {
        let papers = sqlx::query_as::<_, Paper>(&format!(
            "SELECT {PAPER_COLUMNS} FROM papers ORDER BY id"
        ))
        .fetch_all(pool)
        .await
        .context("Failed to list papers")?;

        Ok(papers)
    }

    /// Rows in table order, streamed instead of collected.
    #[inline]
    pub fn stream_all(pool: &SqlitePool) -> BoxStream<'_, Result<Paper, sqlx::Error>> {
        sqlx::query_as::<_, Paper>(
            "SELECT id, doi, title, journal, publication_year, authors, keywords, abstract_text, ingested_date FROM papers ORDER BY id",
        )
        .fetch(pool)
    }

    #[inline]
    pub async fn count(pool: &SqlitePool) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM papers")
            .fetch_one(pool)
            .await
            .context("Failed to count papers")?;

        Ok(count)
    }

    #[inline]
    pub async fn count_distinct_dois(pool: &SqlitePool) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(DISTINCT doi) FROM papers")
            .fetch_one(pool)
            .await
            .context("Failed to count distinct DOIs")?;

        Ok(count)
    }

    #[inline]
    pub async fn clear(conn: &mut SqliteConnection) -> Result<u64> {
        let deleted = sqlx::query("DELETE FROM papers")
            .execute(conn)
            .await
            .context("Failed to clear papers")?
            .rows_affected();

        debug!("Cleared {} papers", deleted);
        Ok(deleted)
    }
}
