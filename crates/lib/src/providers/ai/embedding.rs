//! # Embeddings Provider
//!
//! The vector store never picks an embedding model on its own: it is handed an
//! `EmbeddingFunction` at construction. `ApiEmbedding` is the stock implementation,
//! calling either an OpenAI-compatible or a Gemini embeddings endpoint.

use crate::{config::EmbeddingConfig, errors::PromptError, providers::ai::build_http_client};
use async_trait::async_trait;
use dyn_clone::DynClone;
use reqwest::Client as ReqwestClient;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use tracing::debug;

/// A capability turning text into a vector for similarity search.
#[async_trait]
pub trait EmbeddingFunction: Send + Sync + Debug + DynClone {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, PromptError>;
}

dyn_clone::clone_trait_object!(EmbeddingFunction);

// --- OpenAI-compatible request and response structures ---

#[derive(Serialize, Debug)]
struct OpenAIEmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Deserialize, Debug)]
struct OpenAIEmbeddingResponse {
    data: Vec<OpenAIEmbeddingData>,
}

#[derive(Deserialize, Debug)]
struct OpenAIEmbeddingData {
    embedding: Vec<f32>,
}

// --- Gemini-specific request and response structures ---

#[derive(Serialize, Debug)]
struct GeminiEmbeddingRequest<'a> {
    model: String,
    content: GeminiEmbeddingContent<'a>,
}

#[derive(Serialize, Debug)]
struct GeminiEmbeddingContent<'a> {
    parts: Vec<GeminiEmbeddingPart<'a>>,
}

#[derive(Serialize, Debug)]
struct GeminiEmbeddingPart<'a> {
    text: &'a str,
}

#[derive(Deserialize, Debug)]
struct GeminiEmbeddingResponse {
    embedding: GeminiEmbeddingValue,
}

#[derive(Deserialize, Debug)]
struct GeminiEmbeddingValue {
    values: Vec<f32>,
}

/// Generates a vector embedding for a given text input using an external API.
///
/// The payload shape is chosen from the URL: Gemini `:embedContent` endpoints get
/// the `models/...` + `content.parts` form, everything else the OpenAI form.
pub async fn generate_embedding(
    client: &ReqwestClient,
    api_url: &str,
    model: &str,
    input: &str,
    api_key: Option<&str>,
) -> Result<Vec<f32>, PromptError> {
    let mut request_builder = client.post(api_url);
    let is_gemini = api_url.contains(":embedContent");

    if is_gemini {
        let gemini_model_name = if model.starts_with("models/") {
            model.to_string()
        } else {
            format!("models/{model}")
        };

        let request_body = GeminiEmbeddingRequest {
            model: gemini_model_name,
            content: GeminiEmbeddingContent {
                parts: vec![GeminiEmbeddingPart { text: input }],
            },
        };
        debug!(payload = ?request_body, "--> Sending request to Gemini Embeddings API");
        request_builder = request_builder.json(&request_body);
        if let Some(key) = api_key {
            request_builder = request_builder.header("x-goog-api-key", key);
        }
    } else {
        let request_body = OpenAIEmbeddingRequest { model, input };
        debug!(payload = ?request_body, "--> Sending request to OpenAI-compatible Embeddings API");
        request_builder = request_builder.json(&request_body);
        if let Some(key) = api_key {
            request_builder = request_builder.bearer_auth(key);
        }
    }

    let response = request_builder
        .send()
        .await
        .map_err(PromptError::AiRequest)?;

    if !response.status().is_success() {
        let error_text = response.text().await.unwrap_or_default();
        return Err(PromptError::Provider {
            provider: "Embeddings API",
            message: error_text,
        });
    }

    if is_gemini {
        let gemini_response: GeminiEmbeddingResponse = response
            .json()
            .await
            .map_err(PromptError::AiDeserialization)?;
        Ok(gemini_response.embedding.values)
    } else {
        let openai_response: OpenAIEmbeddingResponse = response
            .json()
            .await
            .map_err(PromptError::AiDeserialization)?;

        openai_response
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or(PromptError::EmptyResponse("Embeddings API"))
    }
}

/// An `EmbeddingFunction` backed by a remote embeddings endpoint.
#[derive(Clone, Debug)]
pub struct ApiEmbedding {
    client: ReqwestClient,
    api_url: String,
    model: String,
    api_key: Option<String>,
}

impl ApiEmbedding {
    pub fn new(config: &EmbeddingConfig) -> Result<Self, PromptError> {
        Ok(Self {
            client: build_http_client()?,
            api_url: config.api_url.clone(),
            model: config.model_name.clone(),
            api_key: config.api_key.clone(),
        })
    }
}

#[async_trait]
impl EmbeddingFunction for ApiEmbedding {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, PromptError> {
        generate_embedding(
            &self.client,
            &self.api_url,
            &self.model,
            text,
            self.api_key.as_deref(),
        )
        .await
    }
}
