use anyhow::Result;
use anysql::config::VectorStoreConfig;
use anysql::errors::PromptError;
use anysql::providers::ai::{AiProvider, EmbeddingFunction};
use anysql::providers::db::sqlite::SqliteVectorStore;
use anysql::types::{GenerationOptions, PromptMessage};
use async_trait::async_trait;
use std::fmt::Debug;
use std::sync::{Arc, Mutex};
use turso::Database;

// --- Test Setup ---

/// A helper struct to manage store creation for each test.
pub struct TestSetup {
    pub db: Database,
    pub store: SqliteVectorStore,
    pub embedder: KeywordEmbedder,
}

impl TestSetup {
    /// Creates a new, isolated in-memory store embedding with the given keywords.
    pub async fn new(keywords: &[&str]) -> Result<Self> {
        Self::with_config(keywords, VectorStoreConfig::in_memory()).await
    }

    pub async fn with_config(keywords: &[&str], config: VectorStoreConfig) -> Result<Self> {
        let db = turso::Builder::new_local(":memory:").build().await?;
        let embedder = KeywordEmbedder::new(keywords);
        let store =
            SqliteVectorStore::with_database(db.clone(), config, Box::new(embedder.clone()))
                .await?;
        Ok(Self {
            db,
            store,
            embedder,
        })
    }

    /// Counts the rows of a collection table, bypassing the store API.
    pub async fn count_rows(&self, table: &str) -> Result<i64> {
        let conn = self.db.connect()?;
        let mut rows = conn
            .query(&format!("SELECT COUNT(*) FROM {table}"), ())
            .await?;
        match rows.next().await? {
            Some(row) => match row.get_value(0)? {
                turso::Value::Integer(n) => Ok(n),
                other => Err(anyhow::anyhow!("unexpected count value: {other:?}")),
            },
            None => Ok(0),
        }
    }
}

// --- Mock Embedding Function ---

/// A deterministic embedder: one dimension per keyword, counting its
/// case-insensitive occurrences, plus a small constant dimension so that text
/// without any keyword still has a direction.
#[derive(Clone, Debug)]
pub struct KeywordEmbedder {
    keywords: Vec<String>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl KeywordEmbedder {
    pub fn new(keywords: &[&str]) -> Self {
        Self {
            keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// The texts embedded so far, in call order.
    pub fn get_calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl EmbeddingFunction for KeywordEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, PromptError> {
        self.calls.lock().unwrap().push(text.to_string());
        let lowered = text.to_lowercase();
        let mut vector: Vec<f32> = self
            .keywords
            .iter()
            .map(|k| lowered.matches(k.as_str()).count() as f32)
            .collect();
        vector.push(0.01);
        Ok(vector)
    }
}

// --- Mock AI Provider ---

#[derive(Clone, Debug)]
pub struct MockAiProvider {
    responses: Arc<Mutex<Vec<(String, String)>>>,
    calls: Arc<Mutex<Vec<(Vec<PromptMessage>, GenerationOptions)>>>,
}

impl MockAiProvider {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(Vec::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Pre-programs a response for a specific prompt.
    /// The key should be a unique substring of the last message of the prompt.
    pub fn add_response(&self, key: &str, response: &str) {
        let mut responses = self.responses.lock().unwrap();
        responses.push((key.to_string(), response.to_string()));
    }

    /// Retrieves the recorded calls for assertion.
    pub fn get_calls(&self) -> Vec<(Vec<PromptMessage>, GenerationOptions)> {
        self.calls.lock().unwrap().clone()
    }
}

impl Default for MockAiProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AiProvider for MockAiProvider {
    fn name(&self) -> &'static str {
        "Mock"
    }

    async fn submit_prompt(
        &self,
        prompt: &[PromptMessage],
        options: &GenerationOptions,
    ) -> Result<String, PromptError> {
        if prompt.is_empty() {
            return Err(PromptError::EmptyPrompt);
        }
        self.calls
            .lock()
            .unwrap()
            .push((prompt.to_vec(), *options));

        let last = prompt.last().map(|m| m.content.as_str()).unwrap_or_default();
        let responses = self.responses.lock().unwrap();
        for (key, response) in responses.iter() {
            if last.contains(key.as_str()) {
                return Ok(response.clone());
            }
        }

        Err(PromptError::Provider {
            provider: "Mock",
            message: format!("No response programmed for prompt. Got: '{last}'"),
        })
    }
}
