use crate::providers::db::storage::StoreError;
use thiserror::Error;

/// Custom error types for prompt submission and provider configuration.
#[derive(Error, Debug)]
pub enum PromptError {
    #[error("Failed to build Reqwest client: {0}")]
    ReqwestClientBuild(reqwest::Error),
    #[error("Failed to send request to AI provider: {0}")]
    AiRequest(reqwest::Error),
    #[error("Failed to deserialize AI provider response: {0}")]
    AiDeserialization(reqwest::Error),
    #[error("{provider} client error occurred: {message}")]
    Provider {
        provider: &'static str,
        message: String,
    },
    #[error("Prompt is empty")]
    EmptyPrompt,
    #[error("{0} returned no text content")]
    EmptyResponse(&'static str),
    #[error("Missing {0}")]
    MissingApiKey(&'static str),
    #[error("Configuration must contain a model identifier for {0}")]
    MissingModel(String),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors raised while turning a question into SQL.
#[derive(Error, Debug)]
pub enum GenerateError {
    #[error(transparent)]
    Prompt(#[from] PromptError),
    #[error("Vector store error: {0}")]
    Store(#[from] StoreError),
    #[error("Generated SQL is not a read-only query: {0}")]
    NotReadOnly(String),
}
