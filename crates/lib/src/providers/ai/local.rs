use crate::{
    config::ProviderConfig,
    errors::PromptError,
    providers::ai::{build_http_client, ensure_prompt, provider_error, AiProvider},
    types::{GenerationOptions, PromptMessage},
};
use async_trait::async_trait;
use reqwest::Client as ReqwestClient;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use tracing::debug;

const DEFAULT_TEMPERATURE: f32 = 0.0;
const DEFAULT_MAX_TOKENS: u32 = 1500;

// --- OpenAI-compatible request and response structures ---

#[derive(Serialize, Debug)]
struct LocalAiRequest<'a> {
    messages: &'a [PromptMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<&'a str>,
    temperature: f32,
    max_tokens: u32,
    stream: bool,
}

#[derive(Deserialize, Debug)]
struct LocalAiResponse {
    choices: Vec<LocalAiChoice>,
}

#[derive(Deserialize, Debug)]
struct LocalAiChoice {
    message: LocalAiMessage,
}

#[derive(Deserialize, Debug)]
struct LocalAiMessage {
    #[serde(default)]
    content: Option<String>,
}

// --- Local Provider implementation ---

/// A provider for interacting with a local or OpenAI-compatible API.
///
/// Messages are passed through unchanged, since the chat completions format already
/// uses `system`/`user`/`assistant` roles.
#[derive(Clone, Debug)]
pub struct LocalAiProvider {
    client: ReqwestClient,
    api_url: String,
    api_key: Option<String>,
    model: Option<String>,
    temperature: f32,
    max_tokens: u32,
}

impl LocalAiProvider {
    /// Creates a new `LocalAiProvider`. The configuration must carry an `api_url`.
    pub fn new(config: &ProviderConfig) -> Result<Self, PromptError> {
        let api_url = config.api_url.clone().ok_or_else(|| {
            PromptError::Validation("api_url must be set for the local provider".to_string())
        })?;
        Ok(Self {
            client: build_http_client()?,
            api_url,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            temperature: config.temperature.unwrap_or(DEFAULT_TEMPERATURE),
            max_tokens: config.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
        })
    }
}

#[async_trait]
impl AiProvider for LocalAiProvider {
    fn name(&self) -> &'static str {
        "Local AI"
    }

    async fn submit_prompt(
        &self,
        prompt: &[PromptMessage],
        options: &GenerationOptions,
    ) -> Result<String, PromptError> {
        ensure_prompt(prompt)?;

        let request_body = LocalAiRequest {
            messages: prompt,
            model: self.model.as_deref(),
            temperature: options.temperature.unwrap_or(self.temperature),
            max_tokens: options.max_tokens.unwrap_or(self.max_tokens),
            stream: false,
        };
        debug!(payload = ?request_body, "--> Sending request to local AI provider");

        let mut request_builder = self.client.post(&self.api_url);

        if let Some(key) = &self.api_key {
            request_builder = request_builder.bearer_auth(key);
        }

        let response = request_builder
            .json(&request_body)
            .send()
            .await
            .map_err(PromptError::AiRequest)?;

        if !response.status().is_success() {
            return Err(provider_error(self.name(), response).await);
        }

        let local_ai_response: LocalAiResponse = response
            .json()
            .await
            .map_err(PromptError::AiDeserialization)?;

        local_ai_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or(PromptError::EmptyResponse(self.name()))
    }
}
