
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use url::Url;

use crate::recommender::EmptyQueryPolicy;

pub const APP_DIR_NAME: &str = "paper-recommender";
pub const DEFAULT_TOP_K: usize = 10;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub index: IndexConfig,
    #[serde(default)]
    pub vectorizer: VectorizerConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub recommend: RecommendConfig,
    #[serde(skip)]
    pub base_dir: PathBuf,
}

/// Connection settings for the remote similarity index.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct IndexConfig {
    pub index_name: String,
    /// Data-plane host. Resolved from the control plane by index name when unset.
    pub host: Option<String>,
    pub control_plane_url: String,
    pub namespace: Option<String>,
    /// Inline API key. Prefer `api_key_env`.
    pub api_key: Option<String>,
    pub api_key_env: String,
    pub api_version: String,
    pub timeout_seconds: u64,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            index_name: "beops-papers".to_string(),
            host: None,
            control_plane_url: "https://api.pinecone.io".to_string(),
            namespace: None,
            api_key: None,
            api_key_env: "PINECONE_API_KEY".to_string(),
            api_version: "2024-07".to_string(),
            timeout_seconds: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct VectorizerConfig {
    /// Fitted TF-IDF artifact. Relative paths resolve against the config directory.
    pub path: PathBuf,
}

impl Default for VectorizerConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("tfidf_model.json"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CatalogConfig {
    /// SQLite file holding the cleaned paper table.
    pub database: PathBuf,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            database: PathBuf::from("papers.db"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RecommendConfig {
    pub top_k: usize,
    pub empty_query: EmptyQueryPolicy,
}

impl Default for RecommendConfig {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            empty_query: EmptyQueryPolicy::default(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration directory not found or could not be created")]
    DirectoryError,
    #[error("Invalid index name: '{0}' (must be non-empty lowercase alphanumerics or '-')")]
    InvalidIndexName(String),
    #[error("Invalid URL format: {0}")]
    InvalidUrl(String),
    #[error("Invalid index host: '{0}'")]
    InvalidHost(String),
    #[error("Invalid timeout: {0} (must be between 1 and 300 seconds)")]
    InvalidTimeout(u64),
    #[error("Invalid top-k: {0} (must be between 1 and 1000)")]
    InvalidTopK(usize),
    #[error("Invalid API version: '{0}' (cannot be empty)")]
    InvalidApiVersion(String),
    #[error("Invalid API key environment variable name: '{0}'")]
    InvalidApiKeyEnv(String),
    #[error("Path for {0} cannot be empty")]
    EmptyPath(&'static str),
    #[error("No API key configured: set {0} or index.api_key")]
    MissingApiKey(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parsing error: {0}")]
    TomlParse(#[from] toml::de::Error),
    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

impl Default for Config {
    fn default() -> Self {
        Self {
            index: IndexConfig::default(),
            vectorizer: VectorizerConfig::default(),
            catalog: CatalogConfig::default(),
            recommend: RecommendConfig::default(),
            base_dir: Self::config_dir().unwrap_or_default(),
        }
    }
}

impl Config {
    /// Per-user configuration directory.
    #[inline]
    pub fn config_dir() -> Result<PathBuf, ConfigError> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR_NAME))
            .ok_or(ConfigError::DirectoryError)
    }

    /// Load from the per-user configuration directory.
    #[inline]
    pub fn load() -> Result<Self> {
        let config_dir = Self::config_dir().context("Failed to locate configuration directory")?;
        Self::load_from(config_dir)
    }

    /// Load `config.toml` from `config_dir`, falling back to defaults when it does not exist.
    #[inline]
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_path = config_dir.as_ref().join("config.toml");

        if !config_path.exists() {
            return Ok(Self {
                base_dir: config_dir.as_ref().to_path_buf(),
                ..Self::default()
            });
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        let mut config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", config_path.display()))?;
        config.base_dir = config_dir.as_ref().to_path_buf();

        config
            .validate()
            .with_context(|| "Configuration validation failed")?;

        Ok(config)
    }

    #[inline]
    pub fn save(&self) -> Result<()> {
        self.validate()
            .context("Configuration validation failed before saving")?;

        let config_dir = self.get_base_dir();

        fs::create_dir_all(config_dir).with_context(|| {
            format!(
                "Failed to create config directory: {}",
                config_dir.display()
            )
        })?;

        let config_path = self.config_file_path();
        let content = toml::to_string_pretty(self).context("Failed to serialize config to TOML")?;

        fs::write(&config_path, content)
            .with_context(|| format!("Failed to write config file: {}", config_path.display()))?;

        Ok(())
    }

    /// Get the base directory for the application
    #[inline]
    pub fn get_base_dir(&self) -> &Path {
        &self.base_dir
    }

    #[inline]
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.index.validate()?;

        if self.vectorizer.path.as_os_str().is_empty() {
            return Err(ConfigError::EmptyPath("vectorizer.path"));
        }

        if self.catalog.database.as_os_str().is_empty() {
            return Err(ConfigError::EmptyPath("catalog.database"));
        }

        self.recommend.validate()?;
        Ok(())
    }

    #[inline]
    pub fn config_file_path(&self) -> PathBuf {
        self.get_base_dir().join("config.toml")
    }

    /// Absolute location of the vectorizer artifact.
    #[inline]
    pub fn vectorizer_path(&self) -> PathBuf {
        self.resolve(&self.vectorizer.path)
    }

    /// Absolute location of the SQLite paper database.
    #[inline]
    pub fn database_path(&self) -> PathBuf {
        self.resolve(&self.catalog.database)
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.get_base_dir().join(path)
        }
    }
}

impl IndexConfig {
    #[inline]
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_index_name(&self.index_name)?;

        Url::parse(&self.control_plane_url)
            .map_err(|_| ConfigError::InvalidUrl(self.control_plane_url.clone()))?;

        if let Some(host) = &self.host {
            data_plane_url(host)?;
        }

        if !(1..=300).contains(&self.timeout_seconds) {
            return Err(ConfigError::InvalidTimeout(self.timeout_seconds));
        }

        if self.api_version.trim().is_empty() {
            return Err(ConfigError::InvalidApiVersion(self.api_version.clone()));
        }

        if self.api_key_env.trim().is_empty() || self.api_key_env.contains('=') {
            return Err(ConfigError::InvalidApiKeyEnv(self.api_key_env.clone()));
        }

        Ok(())
    }

    /// API key from the inline setting, or else from the configured environment variable.
    #[inline]
    pub fn api_key(&self) -> Result<String, ConfigError> {
        if let Some(key) = self.api_key.as_deref().filter(|k| !k.trim().is_empty()) {
            return Ok(key.to_string());
        }

        env::var(&self.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingApiKey(self.api_key_env.clone()))
    }

    #[inline]
    pub fn control_plane_url(&self) -> Result<Url, ConfigError> {
        Url::parse(&self.control_plane_url)
            .map_err(|_| ConfigError::InvalidUrl(self.control_plane_url.clone()))
    }

    #[inline]
    pub fn set_index_name(&mut self, index_name: String) -> Result<(), ConfigError> {
        validate_index_name(&index_name)?;
        self.index_name = index_name;
        Ok(())
    }

    /// Set the data-plane host; an empty string clears it.
    #[inline]
    pub fn set_host(&mut self, host: String) -> Result<(), ConfigError> {
        let host = host.trim().to_string();
        if host.is_empty() {
            self.host = None;
            return Ok(());
        }
        data_plane_url(&host)?;
        self.host = Some(host);
        Ok(())
    }

    /// Set the namespace; an empty string selects the default namespace.
    #[inline]
    pub fn set_namespace(&mut self, namespace: String) {
        let namespace = namespace.trim().to_string();
        self.namespace = (!namespace.is_empty()).then_some(namespace);
    }

    #[inline]
    pub fn set_api_key_env(&mut self, name: String) -> Result<(), ConfigError> {
        if name.trim().is_empty() || name.contains('=') {
            return Err(ConfigError::InvalidApiKeyEnv(name));
        }
        self.api_key_env = name;
        Ok(())
    }

    #[inline]
    pub fn set_timeout_seconds(&mut self, timeout_seconds: u64) -> Result<(), ConfigError> {
        if !(1..=300).contains(&timeout_seconds) {
            return Err(ConfigError::InvalidTimeout(timeout_seconds));
        }
        self.timeout_seconds = timeout_seconds;
        Ok(())
    }
}

impl RecommendConfig {
    #[inline]
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=1000).contains(&self.top_k) {
            return Err(ConfigError::InvalidTopK(self.top_k));
        }
        Ok(())
    }

    #[inline]
    pub fn set_top_k(&mut self, top_k: usize) -> Result<(), ConfigError> {
        if !(1..=1000).contains(&top_k) {
            return Err(ConfigError::InvalidTopK(top_k));
        }
        self.top_k = top_k;
        Ok(())
    }

    /// Result count for one run: an explicit request overrides the configured default
    /// and is held to the same bounds.
    #[inline]
    pub fn resolve_top_k(&self, requested: Option<usize>) -> Result<usize, ConfigError> {
        let mut resolved = self.clone();
        if let Some(top_k) = requested {
            resolved.set_top_k(top_k)?;
        }
        Ok(resolved.top_k)
    }
}

/// Base URL of an index data plane. Bare hosts are assumed to be served over HTTPS.
#[inline]
pub fn data_plane_url(host: &str) -> Result<Url, ConfigError> {
    let host = host.trim();
    if host.is_empty() {
        return Err(ConfigError::InvalidHost(host.to_string()));
    }

    let raw = if host.contains("://") {
        host.to_string()
    } else {
        format!("https://{host}")
    };

    let mut url = Url::parse(&raw).map_err(|_| ConfigError::InvalidHost(host.to_string()))?;
    if url.host_str().is_none() {
        return Err(ConfigError::InvalidHost(host.to_string()));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

fn validate_index_name(name: &str) -> Result<(), ConfigError> {
    let valid = !name.is_empty()
        && name.len() <= 45
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
    if valid {
        Ok(())
    } else {
        Err(ConfigError::InvalidIndexName(name.to_string()))
    }
}
