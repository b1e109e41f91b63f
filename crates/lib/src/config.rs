//! # Configuration
//!
//! This module defines the typed configuration for the vector store, the chat
//! provider and the embedding endpoint, and the logic for loading it from a YAML
//! file layered with environment variables.
//!
//! Every optional key has a documented default applied at deserialization time, so
//! a loaded `AppConfig` is complete and validated once.

use crate::{constants, training::TrainingDataType};
use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, env, fs, path::Path};
use tracing::info;

/// A custom error type for configuration issues.
#[derive(Debug)]
pub enum ConfigError {
    /// Indicates an error from the underlying `config` crate.
    General(String),
    /// The configuration file does not exist.
    NotFound(String),
    /// The configuration path exists but is not a regular file.
    NotAFile(String),
    /// The configuration file cannot be read.
    Unreadable(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::General(msg) => write!(f, "Configuration error: {msg}"),
            ConfigError::NotFound(path) => write!(f, "No such configuration file: {path}"),
            ConfigError::NotAFile(path) => write!(f, "Config should be a file: {path}"),
            ConfigError::Unreadable(path) => write!(
                f,
                "Cannot read the config file. Please grant read privileges: {path}"
            ),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::General(err.to_string())
    }
}

/// The chat providers that can be configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    Anthropic,
    BedrockConverse,
    BedrockInvoke,
    #[default]
    Gemini,
    Local,
}

/// Configuration for a single chat provider instance.
///
/// Unset generation parameters fall back to the provider's own defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default)]
    pub provider: ProviderKind,
    /// The model to call. Bedrock requires it; other providers have a default.
    #[serde(default, alias = "model_name", alias = "modelId")]
    pub model: Option<String>,
    /// Falls back to the provider's environment variable when absent.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Overrides the provider's public endpoint.
    #[serde(default)]
    pub api_url: Option<String>,
    #[serde(default)]
    pub temperature: Option<f32>,
    #[serde(default, alias = "maxTokens")]
    pub max_tokens: Option<u32>,
    /// AWS region for Bedrock endpoints.
    #[serde(default)]
    pub region: Option<String>,
}

/// How the vector store keeps its data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClientKind {
    #[default]
    Persistent,
    InMemory,
}

/// Configuration for the dataset-scoped vector store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorStoreConfig {
    /// Directory holding the database file for persistent stores.
    #[serde(default = "default_store_path")]
    pub path: String,
    #[serde(default)]
    pub client: ClientKind,
    /// Neighbours returned per query unless a per-collection value is set.
    #[serde(default)]
    pub n_results: Option<u32>,
    #[serde(default)]
    pub n_results_sql: Option<u32>,
    #[serde(default)]
    pub n_results_ddl: Option<u32>,
    #[serde(default)]
    pub n_results_documentation: Option<u32>,
    /// Free-form metadata recorded alongside every collection.
    #[serde(default)]
    pub collection_metadata: Option<HashMap<String, serde_json::Value>>,
}

fn default_store_path() -> String {
    constants::DEFAULT_STORE_PATH.to_string()
}

impl Default for VectorStoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
            client: ClientKind::default(),
            n_results: None,
            n_results_sql: None,
            n_results_ddl: None,
            n_results_documentation: None,
            collection_metadata: None,
        }
    }
}

impl VectorStoreConfig {
    /// An in-memory store with default settings, mostly useful for tests.
    pub fn in_memory() -> Self {
        Self {
            client: ClientKind::InMemory,
            ..Default::default()
        }
    }

    /// Resolves the number of neighbours to fetch from a collection.
    pub fn n_results_for(&self, data_type: TrainingDataType) -> u32 {
        let specific = match data_type {
            TrainingDataType::Sql => self.n_results_sql,
            TrainingDataType::Ddl => self.n_results_ddl,
            TrainingDataType::Documentation => self.n_results_documentation,
        };
        specific
            .or(self.n_results)
            .unwrap_or(constants::DEFAULT_N_RESULTS)
    }
}

/// Configuration for the text embedding endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    pub api_url: String,
    pub model_name: String,
    #[serde(default)]
    pub api_key: Option<String>,
}

/// The root configuration structure, mapping directly to the YAML file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub vector_store: VectorStoreConfig,
    pub provider: ProviderConfig,
    pub embedding: EmbeddingConfig,
    /// The SQL dialect named in generation prompts.
    #[serde(default)]
    pub dialect: Option<String>,
}

/// Checks that a configuration path exists, is a file and is readable.
pub fn validate_config_path(path: &str) -> Result<(), ConfigError> {
    let p = Path::new(path);
    if !p.exists() {
        return Err(ConfigError::NotFound(path.to_string()));
    }
    if !p.is_file() {
        return Err(ConfigError::NotAFile(path.to_string()));
    }
    if fs::File::open(p).is_err() {
        return Err(ConfigError::Unreadable(path.to_string()));
    }
    Ok(())
}

// Reads the file and expands `${VAR}` references from the environment.
fn read_and_substitute(path: &str) -> Result<String, ConfigError> {
    let content = fs::read_to_string(path)
        .map_err(|e| ConfigError::General(format!("Failed to read config file '{path}': {e}")))?;

    let re = Regex::new(r"\$\{(?P<var>[A-Z0-9_]+)\}")
        .map_err(|e| ConfigError::General(e.to_string()))?;
    let expanded_content = re.replace_all(&content, |caps: &regex::Captures| {
        env::var(&caps["var"]).unwrap_or_default()
    });

    Ok(expanded_content.into_owned())
}

/// Loads the application configuration from a YAML file and environment variables.
///
/// `.env` is loaded first, then `${VAR}` references in the file are expanded, and
/// finally `ANYSQL_`-prefixed variables override nested keys
/// (e.g. `ANYSQL_PROVIDER__API_KEY`).
pub fn load_config(path: &str) -> Result<AppConfig, ConfigError> {
    validate_config_path(path)?;
    dotenvy::dotenv().ok();

    info!("Loading configuration from '{path}'.");
    let content = read_and_substitute(path)?;

    let settings = ConfigBuilder::builder()
        .add_source(File::from_str(&content, FileFormat::Yaml))
        .add_source(
            Environment::with_prefix("ANYSQL")
                .prefix_separator("_")
                .try_parsing(true)
                .separator("__"),
        )
        .build()?;

    Ok(settings.try_deserialize::<AppConfig>()?)
}
