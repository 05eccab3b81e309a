// Scopus CSV export -> cleaned paper table.

pub mod cleaning;
pub mod pyliteral;


use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{info, warn};

use crate::database::Database;
use crate::database::models::NewPaper;

pub use cleaning::{CleaningError, ScopusRow};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IngestMode {
    /// Clear the paper table before inserting.
    #[default]
    Replace,
    /// Keep existing papers and add the new rows after them.
    Append,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRow {
    /// 1-based line in the CSV file, counting the header.
    pub line: u64,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub rows_read: usize,
    pub inserted: usize,
    pub skipped: Vec<SkippedRow>,
}

/// Rows that survived cleaning, plus the ones that did not.
#[derive(Debug, Default)]
pub struct CleanedRows {
    pub papers: Vec<NewPaper>,
    pub rows_read: usize,
    pub skipped: Vec<SkippedRow>,
}

/// Read and clean a Scopus export. Bad rows are recorded and skipped.
#[inline]
pub fn clean_csv<R: Read>(reader: R) -> Result<CleanedRows> {
    let mut csv_reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let mut cleaned = CleanedRows::default();

    let bar = if console::user_attended_stderr() {
        ProgressBar::new_spinner().with_style(
            ProgressStyle::with_template("{spinner} {pos} rows cleaned {msg}")
                .expect("style template is valid"),
        )
    } else {
        ProgressBar::hidden()
    };

    let headers = csv_reader
        .headers()
        .context("Failed to read CSV header")?
        .clone();

    for result in csv_reader.records() {
        cleaned.rows_read += 1;
        bar.inc(1);

        let outcome = result
            .map_err(|e| {
                let line = e.position().map_or(0, |p| p.line());
                (line, format!("unreadable row: {e}"))
            })
            .and_then(|record| {
                let line = record.position().map_or(0, |p| p.line());
                record
                    .deserialize::<ScopusRow>(Some(&headers))
                    .map_err(|e| format!("unreadable row: {e}"))
                    .and_then(|row| row.clean().map_err(|e| e.to_string()))
                    .map_err(|reason| (line, reason))
            });

        match outcome {
            Ok(paper) => cleaned.papers.push(paper),
            Err((line, reason)) => {
                warn!("Skipping CSV line {}: {}", line, reason);
                bar.set_message(format!("({} skipped)", cleaned.skipped.len() + 1));
                cleaned.skipped.push(SkippedRow { line, reason });
            }
        }
    }

    bar.finish_and_clear();
    Ok(cleaned)
}

/// Clean a Scopus CSV export and store it as the paper table.
#[inline]
pub async fn ingest_csv<P: AsRef<Path>>(
    path: P,
    database: &Database,
    mode: IngestMode,
) -> Result<IngestReport> {
    let path = path.as_ref();
    info!("Ingesting {} ({:?})", path.display(), mode);

    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let cleaned = clean_csv(file)
        .with_context(|| format!("Failed to read CSV export {}", path.display()))?;

    let inserted = database
        .store_papers(&cleaned.papers, mode == IngestMode::Replace)
        .await
        .context("Failed to store cleaned papers")?;

    info!(
        "Ingested {} of {} rows ({} skipped)",
        inserted,
        cleaned.rows_read,
        cleaned.skipped.len()
    );

    Ok(IngestReport {
        rows_read: cleaned.rows_read,
        inserted,
        skipped: cleaned.skipped,
    })
}
