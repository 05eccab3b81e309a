// Configuration management module
// TOML settings for the index connection, artifact locations and recommendation defaults

pub mod interactive;
pub mod settings;

#[cfg(test)]
mod tests;

pub use interactive::{run_interactive_config, show_config};
pub use settings::{
    CatalogConfig, Config, ConfigError, DEFAULT_TOP_K, IndexConfig, RecommendConfig,
    VectorizerConfig, data_plane_url,
};
