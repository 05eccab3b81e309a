use anyhow::{Context, Result};
use console::style;
use dialoguer::Input;
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info};

use crate::catalog::MetadataStore;
use crate::config::Config;
use crate::database::Database;
use crate::index::PineconeIndex;
use crate::ingest::{IngestMode, ingest_csv};
use crate::recommender::{EnrichedMatch, Recommender};
use crate::vectorizer::{TfidfVectorizer, Vectorizer};

/// Load the shared artifacts and connect to the index.
///
/// Any failure here is a startup failure: a missing vectorizer, an unreadable paper table,
/// an unreachable index or a vector space mismatch.
#[inline]
pub async fn build_recommender(config: &Config) -> Result<Recommender> {
    let vectorizer = TfidfVectorizer::load(config.vectorizer_path())
        .context("Failed to load vectorizer artifact")?;

    let database = Database::new(config.database_path())
        .await
        .context("Failed to open paper database")?;
    let catalog = MetadataStore::load(&database).await?;
    if catalog.is_empty() {
        println!(
            "{}",
            style("⚠ The paper table is empty; run `paper-recommender ingest <CSV>` first.")
                .yellow()
        );
    }

    let index = PineconeIndex::connect(config.index.clone())
        .await
        .context("Failed to connect to the similarity index")?;

    let recommender = Recommender::new(Arc::new(vectorizer), Arc::new(index), Arc::new(catalog))
        .with_empty_query_policy(config.recommend.empty_query);
    recommender.check_dimensions()?;

    Ok(recommender)
}

/// Recommend papers for one query, or prompt for queries until an empty line.
#[inline]
pub async fn recommend(query: Option<String>, top_k: Option<usize>, json: bool) -> Result<()> {
    let config = Config::load().context("Failed to load configuration")?;
    let top_k = config.recommend.resolve_top_k(top_k)?;
    let recommender = build_recommender(&config).await?;

    if let Some(query) = query {
        let matches = recommender.recommend(&query, top_k).await?;
        return print_matches(&matches, json);
    }

    info!("Starting interactive recommendation session");
    loop {
        let query: String = Input::new()
            .with_prompt("Research interest (empty line to quit)")
            .allow_empty(true)
            .interact_text()?;
        if query.trim().is_empty() {
            break;
        }

        match recommender.recommend(&query, top_k).await {
            Ok(matches) => print_matches(&matches, json)?,
            Err(e) => {
                error!("Recommendation failed: {}", e);
                eprintln!("{}", style(format!("✗ {}", e)).red());
            }
        }
    }

    Ok(())
}

fn print_matches(matches: &[EnrichedMatch], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(matches)?);
        return Ok(());
    }

    if matches.is_empty() {
        println!("No matching papers found.");
        return Ok(());
    }

    for (rank, found) in matches.iter().enumerate() {
        println!("{:>2}. {}", rank + 1, found);
    }
    Ok(())
}

/// Clean a Scopus export into the paper table.
#[inline]
pub async fn ingest(csv_path: &Path, append: bool) -> Result<()> {
    let config = Config::load().context("Failed to load configuration")?;
    let database = Database::new(config.database_path())
        .await
        .context("Failed to open paper database")?;

    let mode = if append {
        IngestMode::Append
    } else {
        IngestMode::Replace
    };
    let report = ingest_csv(csv_path, &database, mode).await?;

    println!(
        "{}",
        style(format!(
            "✓ Stored {} of {} rows in {}",
            report.inserted,
            report.rows_read,
            config.database_path().display()
        ))
        .green()
    );
    if !report.skipped.is_empty() {
        println!(
            "{}",
            style(format!("⚠ Skipped {} rows:", report.skipped.len())).yellow()
        );
        for skipped in &report.skipped {
            println!("   line {}: {}", skipped.line, skipped.reason);
        }
    }

    Ok(())
}

/// Show the state of every artifact the pipeline depends on.
#[inline]
pub async fn show_status() -> Result<()> {
    let config = Config::load().unwrap_or_default();

    println!("📊 Paper Recommender Status Report");
    println!("{}", "=".repeat(50));
    println!();

    println!("🧮 Vectorizer:");
    let vectorizer_dimension = match TfidfVectorizer::load(config.vectorizer_path()) {
        Ok(vectorizer) => {
            println!(
                "   ✅ Loaded {} ({} features)",
                config.vectorizer_path().display(),
                vectorizer.dimension()
            );
            Some(vectorizer.dimension())
        }
        Err(e) => {
            println!("   ❌ {}", e);
            None
        }
    };

    println!("🗄️  Paper Database:");
    match Database::new(config.database_path()).await {
        Ok(database) => {
            let papers = database.count_papers().await?;
            let distinct = database.count_distinct_dois().await?;
            println!("   ✅ SQLite: {}", config.database_path().display());
            println!("   📄 Papers: {} ({} distinct DOIs)", papers, distinct);
            if papers > distinct {
                println!(
                    "   ⚠️  {} duplicate DOI rows; the first of each is used",
                    papers - distinct
                );
            }
        }
        Err(e) => {
            println!("   ❌ SQLite: Failed to open - {}", e);
        }
    }

    println!("🔍 Similarity Index:");
    match PineconeIndex::connect(config.index.clone()).await {
        Ok(index) => {
            let description = index.description();
            println!(
                "   ✅ Index '{}' at {}",
                description.name, description.host
            );
            match tokio::task::spawn_blocking(move || index.describe_index_stats()).await? {
                Ok(stats) => {
                    println!("   📦 Vectors: {}", stats.total_vector_count);
                    if let Some(dimension) = stats.dimension {
                        println!("   🔢 Dimension: {}", dimension);
                        if let Some(expected) = vectorizer_dimension.filter(|d| *d != dimension) {
                            println!(
                                "   ⚠️  Vectorizer produces {} features; recommend will refuse to start",
                                expected
                            );
                        }
                    }
                }
                Err(e) => println!("   ⚠️  Connected but stats unavailable - {}", e),
            }
        }
        Err(e) => {
            println!("   ❌ Failed to connect - {}", e);
        }
    }

    println!();
    println!("Config file: {}", config.config_file_path().display());
    Ok(())
}
