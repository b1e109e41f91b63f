//! # SQLite Specific SQL Queries
//!
//! This module centralizes the SQL used by the turso-backed vector store. Each
//! collection is its own table with the same four columns, so most statements are
//! templated on the table name.

use crate::training::TrainingDataType;

/// Records the free-form metadata configured for each collection.
pub const CREATE_COLLECTION_METADATA_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS collection_metadata (
        collection TEXT PRIMARY KEY,
        metadata TEXT NOT NULL
    );
";

pub const DELETE_COLLECTION_METADATA: &str =
    "DELETE FROM collection_metadata WHERE collection = ?";

pub const INSERT_COLLECTION_METADATA: &str =
    "INSERT INTO collection_metadata (collection, metadata) VALUES (?, ?)";

/// The table backing a collection.
pub fn table_name(data_type: TrainingDataType) -> &'static str {
    match data_type {
        TrainingDataType::Sql => "training_sql",
        TrainingDataType::Ddl => "training_ddl",
        TrainingDataType::Documentation => "training_documentation",
    }
}

pub fn create_collection_table(table: &str) -> String {
    format!(
        "
        CREATE TABLE IF NOT EXISTS {table} (
            id TEXT PRIMARY KEY,
            dataset TEXT NOT NULL,
            document TEXT NOT NULL,
            embedding BLOB
        );
    "
    )
}

/// Inserts a document; an existing id is left as it is.
pub fn insert_document(table: &str) -> String {
    format!(
        "INSERT INTO {table} (id, dataset, document, embedding) VALUES (?, ?, ?, ?)
         ON CONFLICT(id) DO NOTHING"
    )
}

/// Returns the SQL for a cosine nearest-neighbour lookup.
///
/// Turso's vector functions expect the query vector as a literal within the
/// statement, so `vector_literal` is the already formatted `vector32('[...]')`.
pub fn nearest_documents(table: &str, vector_literal: &str, limit: u32) -> String {
    format!(
        "SELECT document, vector_distance_cos(embedding, {vector_literal}) AS distance
         FROM {table}
         WHERE embedding IS NOT NULL
         ORDER BY distance ASC
         LIMIT {limit};"
    )
}

/// Expects the dataset as its single parameter.
pub fn documents_by_dataset(table: &str) -> String {
    format!("SELECT id, document FROM {table} WHERE dataset = ?")
}

/// Expects the dataset as its single parameter.
pub fn ids_by_dataset(table: &str) -> String {
    format!("SELECT id FROM {table} WHERE dataset = ?")
}

pub fn delete_document(table: &str) -> String {
    format!("DELETE FROM {table} WHERE id = ?")
}
