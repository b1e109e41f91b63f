use crate::{
    config::{ClientKind, VectorStoreConfig},
    constants::{DEFAULT_DATASET, STORE_DB_FILE},
    providers::{
        ai::EmbeddingFunction,
        db::storage::{StoreError, VectorStore},
    },
    training::{TrainingDataRow, TrainingDataType, TrainingDocument},
};
use async_trait::async_trait;
use std::{
    fmt::{self, Debug},
    fs,
    path::Path,
};
use tracing::{debug, error, info, warn};
use turso::{params, Database, Value as TursoValue};

mod sql;

pub use sql::table_name;

/// A vector store over a local turso database.
///
/// The store holds a `Database` handle and opens a connection per operation. When
/// cloned, it shares the same underlying database, so clones of an in-memory store
/// see the same data.
#[derive(Clone)]
pub struct SqliteVectorStore {
    db: Database,
    embedding_function: Box<dyn EmbeddingFunction>,
    config: VectorStoreConfig,
}

impl SqliteVectorStore {
    /// Opens the store described by `config` and ensures its collections exist.
    ///
    /// A persistent client keeps its data in `anysql.db` under `config.path`, creating
    /// the directory if needed. An in-memory client gets a fresh, isolated database.
    pub async fn new(
        config: VectorStoreConfig,
        embedding_function: Box<dyn EmbeddingFunction>,
    ) -> Result<Self, StoreError> {
        let db_path = match config.client {
            ClientKind::Persistent => {
                let dir = Path::new(&config.path);
                fs::create_dir_all(dir)?;
                dir.join(STORE_DB_FILE).to_string_lossy().into_owned()
            }
            ClientKind::InMemory => ":memory:".to_string(),
        };

        let db = turso::Builder::new_local(&db_path).build().await?;
        info!("Opened vector store database at: {db_path}");
        Self::with_database(db, config, embedding_function).await
    }

    /// Wraps an externally created database, ensuring its collections exist.
    pub async fn with_database(
        db: Database,
        config: VectorStoreConfig,
        embedding_function: Box<dyn EmbeddingFunction>,
    ) -> Result<Self, StoreError> {
        let store = Self {
            db,
            embedding_function,
            config,
        };
        store.initialize_schema().await?;
        store.record_collection_metadata().await?;
        Ok(store)
    }

    /// Ensures every collection table exists. Idempotent.
    pub async fn initialize_schema(&self) -> Result<(), StoreError> {
        for data_type in TrainingDataType::ALL {
            self.ensure_collection(data_type).await?;
        }
        let conn = self.db.connect()?;
        conn.execute(sql::CREATE_COLLECTION_METADATA_TABLE, ())
            .await?;
        Ok(())
    }

    async fn ensure_collection(&self, data_type: TrainingDataType) -> Result<(), StoreError> {
        let conn = self.db.connect()?;
        let statement = sql::create_collection_table(table_name(data_type));
        conn.execute(&statement, ()).await?;
        Ok(())
    }

    async fn record_collection_metadata(&self) -> Result<(), StoreError> {
        let Some(metadata) = &self.config.collection_metadata else {
            return Ok(());
        };
        let metadata_json = serde_json::to_string(metadata)?;
        let conn = self.db.connect()?;
        for data_type in TrainingDataType::ALL {
            let collection = data_type.collection_name();
            conn.execute(sql::DELETE_COLLECTION_METADATA, params![collection])
                .await?;
            conn.execute(
                sql::INSERT_COLLECTION_METADATA,
                params![collection, metadata_json.clone()],
            )
            .await?;
        }
        debug!("Recorded collection metadata: {metadata_json}");
        Ok(())
    }

    /// Reads one collection's entries for a dataset.
    async fn collection_rows(
        &self,
        data_type: TrainingDataType,
        dataset: &str,
    ) -> Result<Vec<TrainingDataRow>, StoreError> {
        let conn = self.db.connect()?;
        let statement = sql::documents_by_dataset(table_name(data_type));
        let mut rows = conn.query(&statement, params![dataset]).await?;
        let mut result = Vec::new();

        while let Some(row) = rows.next().await? {
            let id = match row.get_value(0)? {
                TursoValue::Text(s) => s,
                _ => continue,
            };
            let document = match row.get_value(1)? {
                TursoValue::Text(s) => s,
                _ => continue,
            };
            match TrainingDocument::parse(data_type, &document) {
                Ok(parsed) => result.push(parsed.into_row(id)),
                Err(e) => warn!("Skipping undecodable {data_type} entry {id}: {e}"),
            }
        }
        Ok(result)
    }
}

impl Debug for SqliteVectorStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteVectorStore")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Serialises an embedding the way turso stores `vector32` values: packed
/// little-endian `f32`s.
fn embedding_to_blob(embedding: &[f32]) -> Vec<u8> {
    embedding.iter().flat_map(|f| f.to_le_bytes()).collect()
}

fn vector_literal(embedding: &[f32]) -> String {
    format!(
        "vector32('[{}]')",
        embedding
            .iter()
            .map(|f| f.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    )
}

#[async_trait]
impl VectorStore for SqliteVectorStore {
    fn name(&self) -> &str {
        "SQLite"
    }

    fn n_results(&self, data_type: TrainingDataType) -> u32 {
        self.config.n_results_for(data_type)
    }

    async fn add_document(
        &self,
        document: TrainingDocument,
    ) -> Result<Option<String>, StoreError> {
        let data_type = document.data_type();
        if document.is_blank() {
            warn!("Refusing to store {data_type} training data with empty fields");
            return Ok(None);
        }

        let json = document.to_canonical_json()?;
        let id = document.id()?;
        let embedding = self.embedding_function.embed(&json).await?;

        let conn = self.db.connect()?;
        let inserted = conn
            .execute(
                &sql::insert_document(table_name(data_type)),
                vec![
                    TursoValue::Text(id.clone()),
                    TursoValue::Text(document.dataset().to_string()),
                    TursoValue::Text(json),
                    TursoValue::Blob(embedding_to_blob(&embedding)),
                ],
            )
            .await?;

        if inserted == 0 {
            debug!("Training data {id} already stored");
        } else {
            info!("Stored {data_type} training data: {id}");
        }
        Ok(Some(id))
    }

    async fn query(
        &self,
        data_type: TrainingDataType,
        question: &str,
        top_k: u32,
    ) -> Result<Vec<TrainingDocument>, StoreError> {
        if top_k == 0 {
            return Ok(Vec::new());
        }

        let query_vector = self.embedding_function.embed(question).await?;
        let statement = sql::nearest_documents(
            table_name(data_type),
            &vector_literal(&query_vector),
            top_k,
        );

        info!("Executing vector search on the {data_type} collection.");
        let conn = self.db.connect()?;
        let mut rows = conn.query(&statement, ()).await?;
        let mut documents = Vec::new();

        while let Some(row) = rows.next().await? {
            let json = match row.get_value(0)? {
                TursoValue::Text(s) => s,
                _ => continue,
            };
            match TrainingDocument::parse(data_type, &json) {
                Ok(document) => documents.push(document),
                Err(e) => warn!("Skipping undecodable {data_type} document: {e}"),
            }
        }

        Ok(documents)
    }

    async fn get_training_data(
        &self,
        dataset: Option<&str>,
    ) -> Result<Vec<TrainingDataRow>, StoreError> {
        let dataset = dataset.unwrap_or(DEFAULT_DATASET);
        let mut training_data = Vec::new();

        for data_type in TrainingDataType::ALL {
            match self.collection_rows(data_type, dataset).await {
                Ok(rows) => training_data.extend(rows),
                Err(e) => error!("Failed to list the {data_type} collection: {e}"),
            }
        }

        Ok(training_data)
    }

    async fn remove_training_data(&self, id: &str) -> Result<bool, StoreError> {
        let Some(data_type) = TrainingDataType::from_id(id) else {
            return Ok(false);
        };
        let conn = self.db.connect()?;
        conn.execute(&sql::delete_document(table_name(data_type)), params![id])
            .await?;
        debug!("Removed training data: {id}");
        Ok(true)
    }

    async fn purge_collection(
        &self,
        data_type: TrainingDataType,
        dataset: Option<&str>,
    ) -> Result<usize, StoreError> {
        let dataset = dataset.unwrap_or(DEFAULT_DATASET);
        self.ensure_collection(data_type).await?;

        let conn = self.db.connect()?;
        let mut rows = conn
            .query(&sql::ids_by_dataset(table_name(data_type)), params![dataset])
            .await?;
        let mut ids = Vec::new();
        while let Some(row) = rows.next().await? {
            if let TursoValue::Text(id) = row.get_value(0)? {
                ids.push(id);
            }
        }

        let mut removed = 0;
        for id in &ids {
            if self.remove_training_data(id).await? {
                removed += 1;
            }
        }
        info!("Removed {removed} entries of dataset '{dataset}' from the {data_type} collection");
        Ok(removed)
    }
}
