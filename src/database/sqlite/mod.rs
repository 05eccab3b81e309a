use anyhow::{Context, Result};
use futures::stream::BoxStream;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::path::Path;
use tracing::{debug, info};

use crate::database::sqlite::models::{NewPaper, Paper};
use crate::database::sqlite::queries::PaperQueries;


pub mod models;
pub mod queries;

pub type DbPool = Pool<Sqlite>;

#[derive(Debug, Clone)]
pub struct Database {
    pool: DbPool,
}

impl Database {
    #[inline]
    pub async fn new<P: AsRef<Path>>(database_path: P) -> Result<Self> {
        let database_path = database_path.as_ref();
        if let Some(parent) = database_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create database directory: {}", parent.display())
            })?;
        }

        let options = SqliteConnectOptions::new()
            .filename(database_path)
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .context("Failed to create database connection pool")?;

        let database = Self { pool };
        database.run_migrations().await?;

        Ok(database)
    }

    #[inline]
    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    #[inline]
    pub async fn run_migrations(&self) -> Result<()> {
        info!("Running database migrations");

        sqlx::migrate!("src/database/sqlite/migrations")
            .run(&self.pool)
            .await
            .context("Failed to run schema migration")?;

        debug!("Database migrations completed successfully");
        Ok(())
    }

    /// Replace or extend the paper table in one transaction.
    #[inline]
    pub async fn store_papers(&self, papers: &[NewPaper], replace: bool) -> Result<usize> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin transaction")?;

        if replace {
            PaperQueries::clear(&mut tx).await?;
        }
        for paper in papers {
            PaperQueries::insert(&mut tx, paper).await?;
        }

        tx.commit().await.context("Failed to commit papers")?;
        debug!("Stored {} papers (replace: {})", papers.len(), replace);
        Ok(papers.len())
    }

    #[inline]
    pub fn stream_papers(&self) -> BoxStream<'_, Result<Paper, sqlx::Error>> {
        PaperQueries::stream_all(&self.pool)
    }

    #[inline]
    pub async fn count_papers(&self) -> Result<i64> {
        PaperQueries::count(&self.pool).await
    }

    #[inline]
    pub async fn count_distinct_dois(&self) -> Result<i64> {
        PaperQueries::count_distinct_dois(&self.pool).await
    }
}
