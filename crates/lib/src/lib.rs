//! # Natural Language to SQL
//!
//! This crate turns natural-language questions into SQL. Training data (DDL,
//! documentation and question/SQL pairs) is embedded into a dataset-scoped vector
//! store; at question time the related entries are retrieved, assembled into a
//! role-tagged prompt, submitted to a configurable AI provider and the SQL is
//! extracted from the free-form answer.

pub mod config;
pub mod constants;
pub mod errors;
pub mod extract;
pub mod ids;
pub mod prompts;
pub mod providers;
pub mod training;
pub mod types;
pub mod utils;

pub use errors::{GenerateError, PromptError};
pub use extract::{extract_sql, is_sql_valid, ExtractOptions};
pub use ids::deterministic_uuid;
pub use providers::{
    ai::{AiProvider, ApiEmbedding, EmbeddingFunction},
    db::{
        sqlite::SqliteVectorStore,
        storage::{StoreError, VectorStore},
    },
    factory::create_provider,
};
pub use training::{TrainingDataRow, TrainingDataType, TrainingDocument};
pub use types::{
    GenerateSqlOptions, GenerationOptions, PromptClient, PromptClientBuilder, PromptMessage,
    RelatedTrainingData, Role,
};

use prompts::sql::build_system_prompt;
use tracing::{debug, info};
use utils::{format_business_terms, BusinessTerm};

impl PromptClient {
    pub fn ai_provider(&self) -> &dyn AiProvider {
        self.ai_provider.as_ref()
    }

    pub fn vector_store(&self) -> &dyn VectorStore {
        self.vector_store.as_ref()
    }

    /// Retrieves the DDL, documentation and question/SQL pairs nearest to a question.
    pub async fn get_related_training_data(
        &self,
        question: &str,
    ) -> Result<RelatedTrainingData, StoreError> {
        let (question_sql, ddl, documentation) = tokio::try_join!(
            self.vector_store.get_similar_question_sql(question),
            self.vector_store.get_related_ddl(question),
            self.vector_store.get_related_documentation(question),
        )?;
        debug!(
            "Retrieved {} DDL, {} documentation and {} question/SQL entries",
            ddl.len(),
            documentation.len(),
            question_sql.len()
        );
        Ok(RelatedTrainingData {
            ddl,
            documentation,
            question_sql,
        })
    }

    /// Builds the message list for a question.
    ///
    /// The system message carries the dialect rules plus as much related DDL and
    /// documentation as fits the character budget. Each prior question/SQL pair
    /// follows as a user/assistant exchange, and the question itself comes last.
    pub fn get_sql_prompt(
        &self,
        question: &str,
        related: &RelatedTrainingData,
    ) -> Vec<PromptMessage> {
        let system_prompt = build_system_prompt(
            &self.dialect,
            &related.ddl,
            &related.documentation,
            self.max_prompt_chars,
        );

        let mut prompt = vec![self.ai_provider.system_message(&system_prompt)];
        for pair in &related.question_sql {
            prompt.push(self.ai_provider.user_message(&pair.question));
            prompt.push(self.ai_provider.assistant_message(&pair.sql));
        }
        prompt.push(self.ai_provider.user_message(question));
        prompt
    }

    /// Generates SQL answering a question, grounded in the stored training data.
    pub async fn generate_sql(
        &self,
        question: &str,
        options: &GenerateSqlOptions,
    ) -> Result<String, GenerateError> {
        if question.trim().is_empty() {
            return Err(PromptError::Validation("question is empty".to_string()).into());
        }

        info!("Generating SQL with {} for: '{question}'", self.ai_provider.name());
        let related = self.get_related_training_data(question).await?;
        let prompt = self.get_sql_prompt(question, &related);

        let response = self
            .ai_provider
            .submit_prompt(&prompt, &options.generation)
            .await?;
        debug!("<-- Received response from AI provider: {response}");

        let sql = extract_sql(&response, &options.extract);
        if options.require_read_only && !is_sql_valid(&sql) {
            return Err(GenerateError::NotReadOnly(sql));
        }
        Ok(sql)
    }

    /// Stores a training artifact, returning its identifier, or `None` when a
    /// required field was blank.
    pub async fn train(&self, document: TrainingDocument) -> Result<Option<String>, StoreError> {
        self.vector_store.add_document(document).await
    }

    /// Stores each business glossary entry as a documentation artifact.
    pub async fn train_business_terms(
        &self,
        terms: &[BusinessTerm],
        dataset: Option<&str>,
    ) -> Result<Vec<String>, StoreError> {
        let mut ids = Vec::new();
        for line in format_business_terms(terms) {
            if let Some(id) = self.vector_store.add_documentation(&line, dataset).await? {
                ids.push(id);
            }
        }
        info!("Stored {} business terms", ids.len());
        Ok(ids)
    }
}
