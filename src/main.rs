use clap::{Parser, Subcommand};
use paper_recommender::Result;
use paper_recommender::commands::{ingest, recommend, show_status};
use paper_recommender::config::{run_interactive_config, show_config};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "paper-recommender")]
#[command(about = "Recommend academic papers similar to a research interest")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Configure the similarity index and artifact locations
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,
    },
    /// Clean a Scopus CSV export into the paper table
    Ingest {
        /// Path to the exported CSV file
        csv: PathBuf,
        /// Keep existing papers instead of replacing them
        #[arg(long)]
        append: bool,
    },
    /// Recommend papers for a query, or prompt for queries when none is given
    Recommend {
        /// Free-text description of a research interest
        query: Option<String>,
        /// Number of papers to return (defaults to the configured value)
        #[arg(long, short = 'k')]
        top_k: Option<usize>,
        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the state of the vectorizer, paper table and index
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Config { show } => {
            if show {
                show_config()?;
            } else {
                run_interactive_config()?;
            }
        }
        Commands::Ingest { csv, append } => {
            ingest(&csv, append).await?;
        }
        Commands::Recommend { query, top_k, json } => {
            recommend(query, top_k, json).await?;
        }
        Commands::Status => {
            show_status().await?;
        }
    }

    Ok(())
}
