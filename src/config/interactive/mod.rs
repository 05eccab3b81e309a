
use anyhow::{Context, Result};
use console::style;
use dialoguer::{Confirm, Input, Select};
use std::path::PathBuf;

use super::{Config, ConfigError, IndexConfig, data_plane_url};
use crate::index::PineconeIndex;
use crate::recommender::EmptyQueryPolicy;

#[inline]
pub fn run_interactive_config() -> Result<()> {
    eprintln!("{}", style("🔧 Paper Recommender Configuration Setup").bold().cyan());
    eprintln!();

    let mut config = load_existing_config()?;

    eprintln!("{}", style("Similarity Index").bold().yellow());
    eprintln!("Configure the Pinecone index holding the paper abstract vectors.");
    eprintln!();

    configure_index(&mut config.index)?;

    eprintln!();
    eprintln!("{}", style("Artifacts").bold().yellow());
    configure_artifacts(&mut config)?;

    eprintln!();
    eprintln!("{}", style("Testing configuration...").yellow());

    match test_index_connection(&config.index) {
        Ok(description) => eprintln!(
            "{}",
            style(format!(
                "✓ Connected to index '{}' at {}",
                description.name, description.host
            ))
            .green()
        ),
        Err(e) => {
            eprintln!(
                "{}",
                style("⚠ Warning: Could not connect to the index").yellow()
            );
            eprintln!("  {}", style(e).dim());
            eprintln!("You can continue, but recommendations will fail until it is reachable.");
        }
    }

    eprintln!();
    if Confirm::new()
        .with_prompt("Save configuration?")
        .default(true)
        .interact()?
    {
        config.save().context("Failed to save configuration")?;
        eprintln!("{}", style("✓ Configuration saved successfully!").green());
        eprintln!(
            "Configuration saved to: {}",
            style(config.config_file_path().display()).cyan()
        );
    } else {
        eprintln!("Configuration not saved.");
    }

    Ok(())
}

#[inline]
pub fn show_config() -> Result<()> {
    let config = Config::load().context("Failed to load configuration")?;

    eprintln!("{}", style("📋 Current Configuration").bold().cyan());
    eprintln!();

    eprintln!("{}", style("Similarity Index:").bold().yellow());
    eprintln!("  Index: {}", style(&config.index.index_name).cyan());
    match &config.index.host {
        Some(host) => eprintln!("  Host: {}", style(host).cyan()),
        None => eprintln!(
            "  Host: {} via {}",
            style("resolved by name").dim(),
            style(&config.index.control_plane_url).cyan()
        ),
    }
    eprintln!(
        "  Namespace: {}",
        style(config.index.namespace.as_deref().unwrap_or("(default)")).cyan()
    );
    eprintln!("  Timeout: {}s", style(config.index.timeout_seconds).cyan());
    match config.index.api_key() {
        Ok(_) => eprintln!(
            "  API key: {} ({})",
            style("set").green(),
            config.index.api_key_env
        ),
        Err(e) => eprintln!("  API key: {} ({})", style("missing").red(), e),
    }

    eprintln!();
    eprintln!("{}", style("Artifacts:").bold().yellow());
    eprintln!(
        "  Vectorizer: {}",
        style(config.vectorizer_path().display()).cyan()
    );
    eprintln!(
        "  Paper database: {}",
        style(config.database_path().display()).cyan()
    );

    eprintln!();
    eprintln!("{}", style("Recommendations:").bold().yellow());
    eprintln!("  Top-k: {}", style(config.recommend.top_k).cyan());
    eprintln!(
        "  Empty queries: {}",
        style(config.recommend.empty_query).cyan()
    );

    eprintln!();
    eprintln!(
        "Config file: {}",
        style(config.config_file_path().display()).dim()
    );

    Ok(())
}

fn load_existing_config() -> Result<Config> {
    Config::load().map_or_else(
        |_| {
            eprintln!(
                "{}",
                style("No existing configuration found. Using defaults.").yellow()
            );
            Ok(Config::default())
        },
        |config| {
            eprintln!("{}", style("Found existing configuration.").green());
            Ok(config)
        },
    )
}

fn configure_index(index: &mut IndexConfig) -> Result<()> {
    let index_name: String = Input::new()
        .with_prompt("Index name")
        .default(index.index_name.clone())
        .validate_with(|input: &String| -> Result<(), ConfigError> {
            IndexConfig::default().set_index_name(input.clone())
        })
        .interact_text()?;

    let host: String = Input::new()
        .with_prompt("Index host (leave empty to resolve by name)")
        .default(index.host.clone().unwrap_or_default())
        .allow_empty(true)
        .validate_with(|input: &String| -> Result<(), ConfigError> {
            if input.trim().is_empty() {
                Ok(())
            } else {
                data_plane_url(input).map(|_| ())
            }
        })
        .interact_text()?;

    let namespace: String = Input::new()
        .with_prompt("Namespace (leave empty for the default namespace)")
        .default(index.namespace.clone().unwrap_or_default())
        .allow_empty(true)
        .interact_text()?;

    let api_key_env: String = Input::new()
        .with_prompt("Environment variable holding the API key")
        .default(index.api_key_env.clone())
        .interact_text()?;

    let timeout_seconds: u64 = Input::new()
        .with_prompt("Request timeout (seconds)")
        .default(index.timeout_seconds)
        .validate_with(|input: &u64| -> Result<(), &str> {
            if (1..=300).contains(input) {
                Ok(())
            } else {
                Err("Timeout must be between 1 and 300 seconds")
            }
        })
        .interact_text()?;

    index.set_index_name(index_name)?;
    index.set_host(host)?;
    index.set_namespace(namespace);
    index.set_api_key_env(api_key_env)?;
    index.set_timeout_seconds(timeout_seconds)?;

    Ok(())
}

fn configure_artifacts(config: &mut Config) -> Result<()> {
    let vectorizer_path: String = Input::new()
        .with_prompt("Vectorizer artifact (relative to the config directory)")
        .default(config.vectorizer.path.display().to_string())
        .interact_text()?;

    let database: String = Input::new()
        .with_prompt("Paper database (relative to the config directory)")
        .default(config.catalog.database.display().to_string())
        .interact_text()?;

    let top_k: usize = Input::new()
        .with_prompt("Number of recommendations")
        .default(config.recommend.top_k)
        .interact_text()?;

    let policies = [EmptyQueryPolicy::Query, EmptyQueryPolicy::NoResults];
    let default_index = policies
        .iter()
        .position(|p| *p == config.recommend.empty_query)
        .unwrap_or(0);
    let policy_index = Select::new()
        .with_prompt("When a query normalizes to nothing")
        .default(default_index)
        .items(&["query the index anyway", "return no results"])
        .interact()?;

    config.vectorizer.path = PathBuf::from(vectorizer_path);
    config.catalog.database = PathBuf::from(database);
    config.recommend.set_top_k(top_k)?;
    config.recommend.empty_query = policies[policy_index];

    Ok(())
}

fn test_index_connection(index: &IndexConfig) -> Result<crate::index::IndexDescription> {
    let client = PineconeIndex::new(index).context("Failed to connect to the index")?;
    Ok(client.description())
}
