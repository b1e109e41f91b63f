//! # Amazon Bedrock Providers
//!
//! Two adapters share the same configuration: `BedrockConverseProvider` speaks the
//! model-agnostic Converse API, while `BedrockInvokeProvider` sends an
//! Anthropic-style body to the legacy `invoke` endpoint. Both authenticate with a
//! Bedrock API key sent as a bearer token.

use crate::{
    config::ProviderConfig,
    errors::PromptError,
    providers::ai::{build_http_client, ensure_prompt, provider_error, resolve_api_key, AiProvider},
    types::{GenerationOptions, PromptMessage, Role},
};
use async_trait::async_trait;
use reqwest::Client as ReqwestClient;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::fmt::Debug;
use tracing::debug;

pub const API_KEY_ENV: &str = "AWS_BEARER_TOKEN_BEDROCK";
pub const REGION_ENV: &str = "AWS_REGION";
const DEFAULT_REGION: &str = "us-east-1";
const DEFAULT_TEMPERATURE: f32 = 0.0;
const DEFAULT_MAX_TOKENS: u32 = 1000;
const INVOKE_ANTHROPIC_VERSION: &str = "bedrock-2023-05-31";
const PROVIDER_NAME: &str = "Bedrock";

/// Connection and generation settings shared by both Bedrock adapters.
#[derive(Clone, Debug)]
struct BedrockSettings {
    client: ReqwestClient,
    endpoint: String,
    api_key: String,
    model_id: String,
    temperature: f32,
    max_tokens: u32,
}

impl BedrockSettings {
    fn from_config(config: &ProviderConfig) -> Result<Self, PromptError> {
        let model_id = config
            .model
            .clone()
            .filter(|m| !m.trim().is_empty())
            .ok_or_else(|| PromptError::MissingModel(PROVIDER_NAME.to_string()))?;
        let api_key = resolve_api_key(config.api_key.as_deref(), API_KEY_ENV)
            .ok_or(PromptError::MissingApiKey(API_KEY_ENV))?;
        let endpoint = match &config.api_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => {
                let region = config
                    .region
                    .clone()
                    .or_else(|| std::env::var(REGION_ENV).ok())
                    .unwrap_or_else(|| DEFAULT_REGION.to_string());
                format!("https://bedrock-runtime.{region}.amazonaws.com")
            }
        };

        Ok(Self {
            client: build_http_client()?,
            endpoint,
            api_key,
            model_id,
            temperature: config.temperature.unwrap_or(DEFAULT_TEMPERATURE),
            max_tokens: config.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
        })
    }

    fn url(&self, action: &str) -> String {
        format!("{}/model/{}/{action}", self.endpoint, self.model_id)
    }

    async fn post<B: Serialize + ?Sized, R: DeserializeOwned>(
        &self,
        action: &str,
        body: &B,
    ) -> Result<R, PromptError> {
        let response = self
            .client
            .post(self.url(action))
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await
            .map_err(PromptError::AiRequest)?;

        if !response.status().is_success() {
            return Err(provider_error(PROVIDER_NAME, response).await);
        }

        response
            .json()
            .await
            .map_err(PromptError::AiDeserialization)
    }
}

// --- Converse API structures ---

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct ConverseRequest<'a> {
    messages: Vec<ConverseMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<Vec<TextBlock<'a>>>,
    inference_config: InferenceConfig,
    additional_model_request_fields: AdditionalModelRequestFields,
}

#[derive(Serialize, Debug)]
struct ConverseMessage<'a> {
    role: &'a str,
    content: Vec<TextBlock<'a>>,
}

#[derive(Serialize, Debug)]
struct TextBlock<'a> {
    text: &'a str,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct InferenceConfig {
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize, Debug)]
struct AdditionalModelRequestFields {
    top_p: u32,
}

#[derive(Deserialize, Debug)]
struct ConverseResponse {
    output: ConverseOutput,
}

#[derive(Deserialize, Debug)]
struct ConverseOutput {
    message: ConverseOutputMessage,
}

#[derive(Deserialize, Debug)]
struct ConverseOutputMessage {
    content: Vec<ResponseBlock>,
}

#[derive(Deserialize, Debug)]
struct ResponseBlock {
    #[serde(default)]
    text: Option<String>,
}

// --- Legacy invoke structures ---

#[derive(Serialize, Debug)]
struct InvokeRequest<'a> {
    anthropic_version: &'a str,
    temperature: f32,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<InvokeMessage<'a>>,
}

#[derive(Serialize, Debug)]
struct InvokeMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize, Debug)]
struct InvokeResponse {
    content: Vec<ResponseBlock>,
}

// --- Provider implementations ---

/// A provider for the Bedrock Converse API.
#[derive(Clone, Debug)]
pub struct BedrockConverseProvider {
    settings: BedrockSettings,
}

impl BedrockConverseProvider {
    /// Creates a new `BedrockConverseProvider`. The configuration must name a model.
    pub fn new(config: &ProviderConfig) -> Result<Self, PromptError> {
        Ok(Self {
            settings: BedrockSettings::from_config(config)?,
        })
    }
}

#[async_trait]
impl AiProvider for BedrockConverseProvider {
    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    async fn submit_prompt(
        &self,
        prompt: &[PromptMessage],
        options: &GenerationOptions,
    ) -> Result<String, PromptError> {
        ensure_prompt(prompt)?;

        let mut system_message = None;
        let mut messages = Vec::with_capacity(prompt.len());
        for message in prompt {
            match message.role {
                Role::System => system_message = Some(message.content.as_str()),
                role => messages.push(ConverseMessage {
                    role: role.as_str(),
                    content: vec![TextBlock {
                        text: &message.content,
                    }],
                }),
            }
        }

        let request_body = ConverseRequest {
            messages,
            system: system_message
                .filter(|s| !s.is_empty())
                .map(|text| vec![TextBlock { text }]),
            inference_config: InferenceConfig {
                temperature: options.temperature.unwrap_or(self.settings.temperature),
                max_tokens: options.max_tokens.unwrap_or(self.settings.max_tokens),
            },
            additional_model_request_fields: AdditionalModelRequestFields { top_p: 1 },
        };
        debug!(model_id = %self.settings.model_id, payload = ?request_body, "--> Sending Converse request to Bedrock");

        let response: ConverseResponse = self.settings.post("converse", &request_body).await?;

        response
            .output
            .message
            .content
            .into_iter()
            .find_map(|block| block.text)
            .ok_or(PromptError::EmptyResponse(PROVIDER_NAME))
    }
}

/// A provider for the legacy Bedrock `invoke` endpoint with Anthropic models.
///
/// The legacy body carries one system string and one user turn, so only the last
/// system message and the last user message of the prompt are sent.
#[derive(Clone, Debug)]
pub struct BedrockInvokeProvider {
    settings: BedrockSettings,
}

impl BedrockInvokeProvider {
    /// Creates a new `BedrockInvokeProvider`. The configuration must name a model.
    pub fn new(config: &ProviderConfig) -> Result<Self, PromptError> {
        Ok(Self {
            settings: BedrockSettings::from_config(config)?,
        })
    }
}

#[async_trait]
impl AiProvider for BedrockInvokeProvider {
    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    async fn submit_prompt(
        &self,
        prompt: &[PromptMessage],
        options: &GenerationOptions,
    ) -> Result<String, PromptError> {
        ensure_prompt(prompt)?;

        let mut system_prompt = "";
        let mut user_query = "";
        for message in prompt {
            match message.role {
                Role::System => system_prompt = message.content.as_str(),
                Role::User => user_query = message.content.as_str(),
                Role::Assistant => {}
            }
        }
        if user_query.trim().is_empty() {
            return Err(PromptError::Validation(
                "the invoke endpoint needs a non-empty user message".to_string(),
            ));
        }

        let request_body = InvokeRequest {
            anthropic_version: INVOKE_ANTHROPIC_VERSION,
            temperature: options.temperature.unwrap_or(self.settings.temperature),
            max_tokens: options.max_tokens.unwrap_or(self.settings.max_tokens),
            system: system_prompt,
            messages: vec![InvokeMessage {
                role: Role::User.as_str(),
                content: user_query,
            }],
        };
        debug!(model_id = %self.settings.model_id, payload = ?request_body, "--> Sending invoke request to Bedrock");

        let response: InvokeResponse = self.settings.post("invoke", &request_body).await?;

        response
            .content
            .into_iter()
            .find_map(|block| block.text)
            .ok_or(PromptError::EmptyResponse(PROVIDER_NAME))
    }
}
