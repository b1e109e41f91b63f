use crate::{
    constants::{DEFAULT_DIALECT, DEFAULT_MAX_PROMPT_CHARS},
    errors::PromptError,
    extract::ExtractOptions,
    providers::{ai::AiProvider, db::storage::VectorStore},
    training::QuestionSqlDocument,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The author of a prompt message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// One role-tagged entry of a prompt. Order within a prompt is significant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptMessage {
    pub role: Role,
    pub content: String,
}

impl PromptMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Per-call overrides of a provider's configured sampling settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationOptions {
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

/// A rough token estimate: four characters per token.
pub fn approx_token_count(prompt: &[PromptMessage]) -> usize {
    prompt
        .iter()
        .map(|m| m.content.chars().count())
        .sum::<usize>()
        / 4
}

/// Training data retrieved for one question, used to ground the prompt.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelatedTrainingData {
    pub ddl: Vec<String>,
    pub documentation: Vec<String>,
    pub question_sql: Vec<QuestionSqlDocument>,
}

/// Options for a single `generate_sql` call.
#[derive(Debug, Clone, Default)]
pub struct GenerateSqlOptions {
    pub extract: ExtractOptions,
    pub generation: GenerationOptions,
    /// Refuse to return anything but a single `SELECT`/`WITH` statement.
    pub require_read_only: bool,
}

/// Ties a chat model to a vector store: retrieves related training data, builds the
/// prompt, submits it and extracts the SQL.
#[derive(Clone)]
pub struct PromptClient {
    pub(crate) ai_provider: Box<dyn AiProvider>,
    pub(crate) vector_store: Box<dyn VectorStore>,
    pub(crate) dialect: String,
    pub(crate) max_prompt_chars: usize,
}

impl fmt::Debug for PromptClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PromptClient")
            .field("ai_provider", &self.ai_provider.name())
            .field("vector_store", &self.vector_store.name())
            .field("dialect", &self.dialect)
            .field("max_prompt_chars", &self.max_prompt_chars)
            .finish()
    }
}

/// A builder for creating `PromptClient` instances.
#[derive(Default)]
pub struct PromptClientBuilder {
    ai_provider: Option<Box<dyn AiProvider>>,
    vector_store: Option<Box<dyn VectorStore>>,
    dialect: Option<String>,
    max_prompt_chars: Option<usize>,
}

impl PromptClientBuilder {
    /// Creates a new `PromptClientBuilder`.
    ///
    /// # Examples
    ///
    /// ```
    /// use anysql::PromptClientBuilder;
    ///
    /// let builder = PromptClientBuilder::new();
    /// ```
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the chat model used for generation.
    pub fn ai_provider(mut self, ai_provider: Box<dyn AiProvider>) -> Self {
        self.ai_provider = Some(ai_provider);
        self
    }

    /// Sets the store holding the training data.
    pub fn vector_store(mut self, vector_store: Box<dyn VectorStore>) -> Self {
        self.vector_store = Some(vector_store);
        self
    }

    /// Sets the SQL dialect named in the system prompt (defaults to `SQL`).
    pub fn dialect(mut self, dialect: impl Into<String>) -> Self {
        self.dialect = Some(dialect.into());
        self
    }

    /// Caps the characters of DDL and documentation added to the system prompt.
    pub fn max_prompt_chars(mut self, max_prompt_chars: usize) -> Self {
        self.max_prompt_chars = Some(max_prompt_chars);
        self
    }

    /// Builds the `PromptClient`.
    ///
    /// Fails when the AI provider or the vector store has not been set.
    pub fn build(self) -> Result<PromptClient, PromptError> {
        let ai_provider = self.ai_provider.ok_or_else(|| {
            PromptError::Validation("an AI provider is required".to_string())
        })?;
        let vector_store = self.vector_store.ok_or_else(|| {
            PromptError::Validation("a vector store is required".to_string())
        })?;

        Ok(PromptClient {
            ai_provider,
            vector_store,
            dialect: self.dialect.unwrap_or_else(|| DEFAULT_DIALECT.to_string()),
            max_prompt_chars: self.max_prompt_chars.unwrap_or(DEFAULT_MAX_PROMPT_CHARS),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roles_serialize_lowercase() {
        let message = PromptMessage::assistant("SELECT 1");
        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json["role"], "assistant");
        assert_eq!(json["content"], "SELECT 1");
    }

    #[test]
    fn test_approx_token_count_is_chars_over_four() {
        let prompt = vec![PromptMessage::system("abcd"), PromptMessage::user("efghijkl")];
        assert_eq!(approx_token_count(&prompt), 3);
        assert_eq!(approx_token_count(&[]), 0);
    }
}
