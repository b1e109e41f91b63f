pub mod anthropic;
pub mod bedrock;
pub mod embedding;
pub mod gemini;
pub mod local;

use crate::{
    errors::PromptError,
    types::{GenerationOptions, PromptMessage},
};
use async_trait::async_trait;
use dyn_clone::DynClone;
pub use embedding::{generate_embedding, ApiEmbedding, EmbeddingFunction};
use reqwest::{Client as ReqwestClient, Response};
use serde_json::Value;
use std::fmt::Debug;

/// A trait for interacting with a chat model provider.
///
/// Each provider receives the same role-tagged message list and reshapes it into its
/// own wire format internally; callers only ever see the generated text.
#[async_trait]
pub trait AiProvider: Send + Sync + Debug + DynClone {
    /// The provider name used in logs and errors.
    fn name(&self) -> &'static str;

    fn system_message(&self, message: &str) -> PromptMessage {
        PromptMessage::system(message)
    }

    fn user_message(&self, message: &str) -> PromptMessage {
        PromptMessage::user(message)
    }

    fn assistant_message(&self, message: &str) -> PromptMessage {
        PromptMessage::assistant(message)
    }

    /// Submits an ordered message list and returns the first generated text span.
    async fn submit_prompt(
        &self,
        prompt: &[PromptMessage],
        options: &GenerationOptions,
    ) -> Result<String, PromptError>;

    /// Generates a response from a given system and user prompt.
    async fn generate(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<String, PromptError> {
        let prompt = vec![
            self.system_message(system_prompt),
            self.user_message(user_prompt),
        ];
        self.submit_prompt(&prompt, &GenerationOptions::default())
            .await
    }
}

dyn_clone::clone_trait_object!(AiProvider);

/// Rejects an empty message list before any request is built.
pub(crate) fn ensure_prompt(prompt: &[PromptMessage]) -> Result<(), PromptError> {
    if prompt.is_empty() {
        return Err(PromptError::EmptyPrompt);
    }
    Ok(())
}

pub(crate) fn build_http_client() -> Result<ReqwestClient, PromptError> {
    ReqwestClient::builder()
        .build()
        .map_err(PromptError::ReqwestClientBuild)
}

/// Uses the configured key, or the provider's environment variable when absent.
pub(crate) fn resolve_api_key(configured: Option<&str>, env_var: &str) -> Option<String> {
    configured
        .map(str::to_string)
        .or_else(|| std::env::var(env_var).ok())
        .filter(|key| !key.trim().is_empty())
}

/// Turns a non-success response into a uniform provider error.
///
/// The vendor's own message is used when the body carries one of the common error
/// shapes, otherwise the raw body is kept.
pub(crate) async fn provider_error(provider: &'static str, response: Response) -> PromptError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<Value>(&body)
        .ok()
        .and_then(|v| {
            v.pointer("/error/message")
                .or_else(|| v.get("message"))
                .or_else(|| v.get("Message"))
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| {
            if body.is_empty() {
                status.to_string()
            } else {
                body
            }
        });
    PromptError::Provider { provider, message }
}
