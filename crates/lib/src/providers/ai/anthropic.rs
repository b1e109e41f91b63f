use crate::{
    config::ProviderConfig,
    errors::PromptError,
    providers::ai::{build_http_client, ensure_prompt, provider_error, resolve_api_key, AiProvider},
    types::{approx_token_count, GenerationOptions, PromptMessage, Role},
};
use async_trait::async_trait;
use reqwest::Client as ReqwestClient;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use tracing::{debug, info};

pub const DEFAULT_MODEL: &str = "claude-3-sonnet-20240229";
pub const DEFAULT_API_URL: &str = "https://api.anthropic.com/v1/messages";
pub const API_KEY_ENV: &str = "ANTHROPIC_API_KEY";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const DEFAULT_TEMPERATURE: f32 = 0.2;
const DEFAULT_MAX_TOKENS: u32 = 500;

// --- Anthropic Messages API request and response structures ---

#[derive(Serialize, Debug)]
struct MessagesRequest<'a> {
    model: &'a str,
    messages: Vec<AnthropicMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize, Debug)]
struct AnthropicMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize, Debug)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize, Debug)]
struct ContentBlock {
    #[serde(default)]
    text: Option<String>,
}

// --- Anthropic Provider implementation ---

/// A provider for the Anthropic Messages API.
///
/// Anthropic takes the system prompt as a single top-level field, so system messages
/// are lifted out of the conversation; if several are present the last one wins.
#[derive(Clone, Debug)]
pub struct AnthropicProvider {
    client: ReqwestClient,
    api_url: String,
    api_key: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl AnthropicProvider {
    /// Creates a new `AnthropicProvider` from its configuration.
    ///
    /// Fails when no API key is configured and `ANTHROPIC_API_KEY` is not set.
    pub fn new(config: &ProviderConfig) -> Result<Self, PromptError> {
        let api_key = resolve_api_key(config.api_key.as_deref(), API_KEY_ENV)
            .ok_or(PromptError::MissingApiKey(API_KEY_ENV))?;
        Ok(Self {
            client: build_http_client()?,
            api_url: config
                .api_url
                .clone()
                .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            api_key,
            model: config
                .model
                .clone()
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            temperature: config.temperature.unwrap_or(DEFAULT_TEMPERATURE),
            max_tokens: config.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
        })
    }
}

#[async_trait]
impl AiProvider for AnthropicProvider {
    fn name(&self) -> &'static str {
        "Anthropic"
    }

    async fn submit_prompt(
        &self,
        prompt: &[PromptMessage],
        options: &GenerationOptions,
    ) -> Result<String, PromptError> {
        ensure_prompt(prompt)?;

        info!(
            "Using model {} for {} tokens (approx)",
            self.model,
            approx_token_count(prompt)
        );

        let mut system = None;
        let mut messages = Vec::with_capacity(prompt.len());
        for message in prompt {
            match message.role {
                Role::System => system = Some(message.content.as_str()),
                role => messages.push(AnthropicMessage {
                    role: role.as_str(),
                    content: &message.content,
                }),
            }
        }

        let request_body = MessagesRequest {
            model: &self.model,
            messages,
            system,
            max_tokens: options.max_tokens.unwrap_or(self.max_tokens),
            temperature: options.temperature.unwrap_or(self.temperature),
        };
        debug!(payload = ?request_body, "--> Sending request to Anthropic");

        let response = self
            .client
            .post(&self.api_url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request_body)
            .send()
            .await
            .map_err(PromptError::AiRequest)?;

        if !response.status().is_success() {
            return Err(provider_error(self.name(), response).await);
        }

        let messages_response: MessagesResponse = response
            .json()
            .await
            .map_err(PromptError::AiDeserialization)?;

        messages_response
            .content
            .into_iter()
            .find_map(|block| block.text)
            .ok_or(PromptError::EmptyResponse(self.name()))
    }
}
