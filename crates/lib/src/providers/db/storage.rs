//! # Vector Store Contract
//!
//! Training artifacts live in three collections (`ddl`, `documentation`, `sql`) that
//! share one store, each entry tagged with the dataset it belongs to. The trait keeps
//! the dataset-scoped operations backend-agnostic; `SqliteVectorStore` is the
//! turso-backed implementation.

use crate::{
    errors::PromptError,
    training::{QuestionSqlDocument, TrainingDataRow, TrainingDataType, TrainingDocument},
};
use async_trait::async_trait;
use dyn_clone::DynClone;
use std::fmt::Debug;
use thiserror::Error;
use tracing::warn;

/// Custom error types for vector store operations.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] turso::Error),
    #[error("Embedding error: {0}")]
    Embedding(#[from] PromptError),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A dataset-scoped store of embedded training artifacts.
#[async_trait]
pub trait VectorStore: Send + Sync + DynClone + Debug {
    /// Returns the name of the storage backend.
    fn name(&self) -> &str;

    /// How many neighbours the `get_*` lookups return for a collection.
    fn n_results(&self, data_type: TrainingDataType) -> u32;

    /// Embeds and stores a training artifact, returning its identifier.
    ///
    /// Returns `None` without touching the store when a required field is blank.
    /// Adding the same artifact twice keeps a single entry.
    async fn add_document(&self, document: TrainingDocument) -> Result<Option<String>, StoreError>;

    async fn add_question_sql(
        &self,
        question: &str,
        sql: &str,
        dataset: Option<&str>,
    ) -> Result<Option<String>, StoreError> {
        self.add_document(TrainingDocument::question_sql(question, sql, dataset))
            .await
    }

    async fn add_ddl(&self, ddl: &str, dataset: Option<&str>) -> Result<Option<String>, StoreError> {
        self.add_document(TrainingDocument::ddl(ddl, dataset)).await
    }

    async fn add_documentation(
        &self,
        documentation: &str,
        dataset: Option<&str>,
    ) -> Result<Option<String>, StoreError> {
        self.add_document(TrainingDocument::documentation(documentation, dataset))
            .await
    }

    /// Returns up to `top_k` documents of one collection, nearest first.
    async fn query(
        &self,
        data_type: TrainingDataType,
        question: &str,
        top_k: u32,
    ) -> Result<Vec<TrainingDocument>, StoreError>;

    async fn get_similar_question_sql(
        &self,
        question: &str,
    ) -> Result<Vec<QuestionSqlDocument>, StoreError> {
        let top_k = self.n_results(TrainingDataType::Sql);
        let documents = self.query(TrainingDataType::Sql, question, top_k).await?;
        Ok(documents
            .into_iter()
            .filter_map(|d| match d {
                TrainingDocument::QuestionSql(pair) => Some(pair),
                _ => None,
            })
            .collect())
    }

    async fn get_related_ddl(&self, question: &str) -> Result<Vec<String>, StoreError> {
        let top_k = self.n_results(TrainingDataType::Ddl);
        let documents = self.query(TrainingDataType::Ddl, question, top_k).await?;
        Ok(documents
            .into_iter()
            .filter_map(|d| match d {
                TrainingDocument::Ddl(ddl) => Some(ddl.ddl),
                _ => None,
            })
            .collect())
    }

    async fn get_related_documentation(&self, question: &str) -> Result<Vec<String>, StoreError> {
        let top_k = self.n_results(TrainingDataType::Documentation);
        let documents = self
            .query(TrainingDataType::Documentation, question, top_k)
            .await?;
        Ok(documents
            .into_iter()
            .filter_map(|d| match d {
                TrainingDocument::Documentation(doc) => Some(doc.documentation),
                _ => None,
            })
            .collect())
    }

    /// Lists every entry of a dataset: DDL first, then SQL pairs, then documentation.
    async fn get_training_data(
        &self,
        dataset: Option<&str>,
    ) -> Result<Vec<TrainingDataRow>, StoreError>;

    /// Removes one entry, routed by its identifier suffix.
    ///
    /// Returns `false` when the identifier carries no known suffix.
    async fn remove_training_data(&self, id: &str) -> Result<bool, StoreError>;

    /// Removes every entry of `dataset` from one collection, returning how many went.
    async fn purge_collection(
        &self,
        data_type: TrainingDataType,
        dataset: Option<&str>,
    ) -> Result<usize, StoreError>;

    /// Purges a collection by name. Unknown names are logged and reported as `false`.
    async fn remove_collection(
        &self,
        collection_name: &str,
        dataset: Option<&str>,
    ) -> Result<bool, StoreError> {
        match collection_name.parse::<TrainingDataType>() {
            Ok(data_type) => {
                self.purge_collection(data_type, dataset).await?;
                Ok(true)
            }
            Err(reason) => {
                warn!("Skipping collection removal: {reason}");
                Ok(false)
            }
        }
    }

    /// Purges the named collections (all three when `None`) for one dataset.
    async fn remove_collections(
        &self,
        dataset: Option<&str>,
        collection_names: Option<&[&str]>,
    ) -> Result<(), StoreError> {
        let all: Vec<&str> = TrainingDataType::ALL
            .iter()
            .map(|t| t.collection_name())
            .collect();
        for name in collection_names.unwrap_or(all.as_slice()) {
            self.remove_collection(name, dataset).await?;
        }
        Ok(())
    }
}

dyn_clone::clone_trait_object!(VectorStore);
