//! # Configuration Tests
//!
//! Environment variables are process-wide, so every test touching them holds
//! `ENV_LOCK`.

mod common;

use anyhow::Result;
use anysql::config::{
    load_config, validate_config_path, ClientKind, ConfigError, ProviderConfig, ProviderKind,
    VectorStoreConfig,
};
use anysql::TrainingDataType;
use common::ENV_LOCK;
use std::io::Write;
use tempfile::NamedTempFile;

fn write_yaml(content: &str) -> Result<NamedTempFile> {
    let mut file = NamedTempFile::new()?;
    file.write_all(content.as_bytes())?;
    file.flush()?;
    Ok(file)
}

fn path_of(file: &NamedTempFile) -> String {
    file.path().to_string_lossy().into_owned()
}

#[test]
fn test_load_config_with_substitution() -> Result<()> {
    let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    std::env::set_var("CONFIG_TEST_EMBED_KEY", "embed-secret");

    let file = write_yaml(
        r#"
vector_store:
  client: in-memory
  n_results: 4
  n_results_sql: 3
provider:
  provider: bedrock_converse
  model: claude-on-bedrock
  max_tokens: 800
  region: eu-west-1
embedding:
  api_url: http://localhost:1234/v1/embeddings
  model_name: embed-small
  api_key: ${CONFIG_TEST_EMBED_KEY}
dialect: PostgreSQL
"#,
    )?;

    let config = load_config(&path_of(&file));
    std::env::remove_var("CONFIG_TEST_EMBED_KEY");
    let config = config?;

    assert_eq!(config.vector_store.client, ClientKind::InMemory);
    assert_eq!(config.vector_store.n_results_for(TrainingDataType::Sql), 3);
    assert_eq!(config.vector_store.n_results_for(TrainingDataType::Ddl), 4);
    assert_eq!(config.provider.provider, ProviderKind::BedrockConverse);
    assert_eq!(config.provider.model.as_deref(), Some("claude-on-bedrock"));
    assert_eq!(config.provider.max_tokens, Some(800));
    assert_eq!(config.provider.region.as_deref(), Some("eu-west-1"));
    assert_eq!(config.embedding.api_key.as_deref(), Some("embed-secret"));
    assert_eq!(config.dialect.as_deref(), Some("PostgreSQL"));
    Ok(())
}

#[test]
fn test_documented_defaults_apply() -> Result<()> {
    let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let file = write_yaml(
        r#"
provider:
  provider: anthropic
embedding:
  api_url: http://localhost:1234/v1/embeddings
  model_name: embed-small
"#,
    )?;

    let config = load_config(&path_of(&file))?;
    assert_eq!(config.vector_store, VectorStoreConfig::default());
    assert_eq!(config.vector_store.path, ".");
    assert_eq!(config.vector_store.client, ClientKind::Persistent);
    for data_type in TrainingDataType::ALL {
        assert_eq!(config.vector_store.n_results_for(data_type), 10);
    }
    assert_eq!(config.provider.model, None);
    assert_eq!(config.dialect, None);
    Ok(())
}

#[test]
fn test_prefixed_environment_overrides_file() -> Result<()> {
    let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    std::env::set_var("ANYSQL_PROVIDER__API_KEY", "from-env");

    let file = write_yaml(
        r#"
provider:
  provider: gemini
  api_key: from-file
embedding:
  api_url: http://localhost:1234/v1/embeddings
  model_name: embed-small
"#,
    )?;

    let config = load_config(&path_of(&file));
    std::env::remove_var("ANYSQL_PROVIDER__API_KEY");
    assert_eq!(config?.provider.api_key.as_deref(), Some("from-env"));
    Ok(())
}

#[test]
fn test_unknown_client_kind_is_rejected() -> Result<()> {
    let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let file = write_yaml(
        r#"
vector_store:
  client: http
provider:
  provider: gemini
embedding:
  api_url: http://localhost:1234/v1/embeddings
  model_name: embed-small
"#,
    )?;

    let err = load_config(&path_of(&file)).unwrap_err();
    assert!(matches!(err, ConfigError::General(_)));
    Ok(())
}

#[test]
fn test_config_path_validation() -> Result<()> {
    let err = validate_config_path("/definitely/not/here.yml").unwrap_err();
    assert!(matches!(err, ConfigError::NotFound(_)));
    assert!(err.to_string().contains("No such configuration file"));

    let dir = tempfile::tempdir()?;
    let err = validate_config_path(&dir.path().to_string_lossy()).unwrap_err();
    assert!(matches!(err, ConfigError::NotAFile(_)));

    let file = write_yaml("provider: {}")?;
    assert!(validate_config_path(&path_of(&file)).is_ok());
    Ok(())
}

#[test]
fn test_provider_config_aliases() -> Result<()> {
    let config: ProviderConfig = serde_json::from_value(serde_json::json!({
        "provider": "bedrock_invoke",
        "modelId": "anthropic.claude-3-haiku",
        "maxTokens": 256
    }))?;
    assert_eq!(config.provider, ProviderKind::BedrockInvoke);
    assert_eq!(config.model.as_deref(), Some("anthropic.claude-3-haiku"));
    assert_eq!(config.max_tokens, Some(256));

    let config: ProviderConfig =
        serde_json::from_value(serde_json::json!({"provider": "local", "model_name": "llama3"}))?;
    assert_eq!(config.model.as_deref(), Some("llama3"));
    Ok(())
}
