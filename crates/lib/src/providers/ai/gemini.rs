use crate::{
    config::ProviderConfig,
    errors::PromptError,
    providers::ai::{build_http_client, ensure_prompt, provider_error, resolve_api_key, AiProvider},
    types::{GenerationOptions, PromptMessage, Role},
};
use async_trait::async_trait;
use reqwest::Client as ReqwestClient;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use tracing::debug;

pub const DEFAULT_MODEL: &str = "gemini-1.5-pro";
pub const API_KEY_ENV: &str = "GOOGLE_API_KEY";
const DEFAULT_TEMPERATURE: f32 = 0.2;

// --- Gemini-specific request and response structures ---

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<SystemInstruction<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Serialize, Debug)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize, Debug)]
struct SystemInstruction<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize, Debug)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

#[derive(Deserialize, Debug)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize, Debug)]
struct Candidate {
    content: ContentResponse,
}

#[derive(Deserialize, Debug)]
struct ContentResponse {
    #[serde(default)]
    parts: Vec<PartResponse>,
}

#[derive(Deserialize, Debug)]
struct PartResponse {
    #[serde(default)]
    text: Option<String>,
}

// --- Gemini Provider implementation ---

/// A provider for interacting with the Google Gemini API.
#[derive(Clone, Debug)]
pub struct GeminiProvider {
    client: ReqwestClient,
    api_url: String,
    api_key: String,
    temperature: f32,
    max_tokens: Option<u32>,
}

impl GeminiProvider {
    /// Creates a new `GeminiProvider`.
    ///
    /// The endpoint is derived from the model name unless `api_url` is configured.
    pub fn new(config: &ProviderConfig) -> Result<Self, PromptError> {
        let api_key = resolve_api_key(config.api_key.as_deref(), API_KEY_ENV)
            .ok_or(PromptError::MissingApiKey(API_KEY_ENV))?;
        let model = config.model.as_deref().unwrap_or(DEFAULT_MODEL);
        let api_url = config.api_url.clone().unwrap_or_else(|| {
            format!(
                "https://generativelanguage.googleapis.com/v1beta/models/{model}:generateContent"
            )
        });
        Ok(Self {
            client: build_http_client()?,
            api_url,
            api_key,
            temperature: config.temperature.unwrap_or(DEFAULT_TEMPERATURE),
            max_tokens: config.max_tokens,
        })
    }
}

#[async_trait]
impl AiProvider for GeminiProvider {
    fn name(&self) -> &'static str {
        "Gemini"
    }

    /// System messages become the system instruction; assistant turns use the `model` role.
    async fn submit_prompt(
        &self,
        prompt: &[PromptMessage],
        options: &GenerationOptions,
    ) -> Result<String, PromptError> {
        ensure_prompt(prompt)?;

        let mut system_parts = Vec::new();
        let mut contents = Vec::with_capacity(prompt.len());
        for message in prompt {
            let part = Part {
                text: &message.content,
            };
            match message.role {
                Role::System => system_parts.push(part),
                Role::User => contents.push(Content {
                    role: "user",
                    parts: vec![part],
                }),
                Role::Assistant => contents.push(Content {
                    role: "model",
                    parts: vec![part],
                }),
            }
        }

        let request_body = GeminiRequest {
            contents,
            system_instruction: (!system_parts.is_empty()).then_some(SystemInstruction {
                parts: system_parts,
            }),
            generation_config: GenerationConfig {
                temperature: options.temperature.unwrap_or(self.temperature),
                max_output_tokens: options.max_tokens.or(self.max_tokens),
            },
        };
        debug!(payload = ?request_body, "--> Sending request to Gemini");

        let response = self
            .client
            .post(&self.api_url)
            .query(&[("key", &self.api_key)])
            .json(&request_body)
            .send()
            .await
            .map_err(PromptError::AiRequest)?;

        if !response.status().is_success() {
            return Err(provider_error(self.name(), response).await);
        }

        let gemini_response: GeminiResponse = response
            .json()
            .await
            .map_err(PromptError::AiDeserialization)?;

        gemini_response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().find_map(|p| p.text))
            .ok_or(PromptError::EmptyResponse(self.name()))
    }
}
