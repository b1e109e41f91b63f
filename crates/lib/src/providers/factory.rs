//! # AI Provider Factory
//!
//! This module centralizes the creation of chat providers from configuration, so any
//! consumer can turn a `ProviderConfig` into a ready `Box<dyn AiProvider>` without
//! knowing which concrete adapter backs it.

use crate::{
    config::{ProviderConfig, ProviderKind},
    errors::PromptError,
    providers::ai::{
        anthropic::AnthropicProvider,
        bedrock::{BedrockConverseProvider, BedrockInvokeProvider},
        gemini::GeminiProvider,
        local::LocalAiProvider,
        AiProvider,
    },
};
use tracing::info;

/// Creates an AI provider instance for the configured provider kind.
///
/// Configuration problems (missing keys, missing model identifiers) surface here,
/// before any request is made.
pub fn create_provider(config: &ProviderConfig) -> Result<Box<dyn AiProvider>, PromptError> {
    info!(
        "Creating {:?} provider for model {:?}",
        config.provider, config.model
    );

    let provider: Box<dyn AiProvider> = match config.provider {
        ProviderKind::Anthropic => Box::new(AnthropicProvider::new(config)?),
        ProviderKind::BedrockConverse => Box::new(BedrockConverseProvider::new(config)?),
        ProviderKind::BedrockInvoke => Box::new(BedrockInvokeProvider::new(config)?),
        ProviderKind::Gemini => Box::new(GeminiProvider::new(config)?),
        ProviderKind::Local => Box::new(LocalAiProvider::new(config)?),
    };

    Ok(provider)
}
