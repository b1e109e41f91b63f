//! # Vector Store Tests
//!
//! Exercises `SqliteVectorStore` on in-memory turso databases with a keyword
//! embedder, so similarity ordering is predictable.

mod common;

use anyhow::Result;
use anysql::config::{ClientKind, VectorStoreConfig};
use anysql::providers::db::sqlite::table_name;
use anysql::{SqliteVectorStore, TrainingDataType, VectorStore};
use anysql_test_utils::{KeywordEmbedder, TestSetup};
use common::setup_tracing;
use serde_json::json;
use std::collections::HashMap;

const KEYWORDS: &[&str] = &["users", "orders", "products"];
const USERS_DDL: &str = "CREATE TABLE users (id INT, name TEXT)";
const ORDERS_DDL: &str = "CREATE TABLE orders (id INT, total INT)";

#[tokio::test]
async fn test_stored_artifacts_round_trip_through_listing() -> Result<()> {
    setup_tracing();
    let setup = TestSetup::new(KEYWORDS).await?;
    let store = &setup.store;

    let doc_id = store
        .add_documentation("Revenue is in cents.", None)
        .await?
        .expect("documentation should be stored");
    let sql_id = store
        .add_question_sql("How many users?", "SELECT COUNT(*) FROM users", None)
        .await?
        .expect("question/SQL pair should be stored");
    let ddl_id = store
        .add_ddl(USERS_DDL, None)
        .await?
        .expect("DDL should be stored");

    assert!(ddl_id.ends_with("-ddl"));
    assert!(sql_id.ends_with("-sql"));
    assert!(doc_id.ends_with("-doc"));

    let rows = store.get_training_data(None).await?;
    assert_eq!(rows.len(), 3);

    // DDL, then SQL pairs, then documentation.
    assert_eq!(rows[0].id, ddl_id);
    assert_eq!(rows[0].training_data_type, TrainingDataType::Ddl);
    assert_eq!(rows[0].content, USERS_DDL);
    assert_eq!(rows[0].question, None);

    assert_eq!(rows[1].id, sql_id);
    assert_eq!(rows[1].training_data_type, TrainingDataType::Sql);
    assert_eq!(rows[1].question.as_deref(), Some("How many users?"));
    assert_eq!(rows[1].content, "SELECT COUNT(*) FROM users");

    assert_eq!(rows[2].id, doc_id);
    assert_eq!(rows[2].training_data_type, TrainingDataType::Documentation);
    assert_eq!(rows[2].content, "Revenue is in cents.");

    assert!(rows.iter().all(|r| r.dataset == "default"));
    Ok(())
}

#[tokio::test]
async fn test_adding_the_same_artifact_twice_keeps_one_entry() -> Result<()> {
    let setup = TestSetup::new(KEYWORDS).await?;

    let first = setup.store.add_ddl(USERS_DDL, None).await?;
    let second = setup.store.add_ddl(USERS_DDL, None).await?;

    assert_eq!(first, second);
    assert_eq!(
        setup
            .count_rows(table_name(TrainingDataType::Ddl))
            .await?,
        1
    );
    Ok(())
}

#[tokio::test]
async fn test_dataset_partitions_ids_and_listings() -> Result<()> {
    let setup = TestSetup::new(KEYWORDS).await?;
    let store = &setup.store;

    let default_id = store.add_ddl(USERS_DDL, Some("default")).await?;
    let other_id = store.add_ddl(USERS_DDL, Some("other")).await?;
    assert_ne!(default_id, other_id);

    let other_rows = store.get_training_data(Some("other")).await?;
    assert_eq!(other_rows.len(), 1);
    assert_eq!(Some(other_rows[0].id.clone()), other_id);
    assert_eq!(other_rows[0].dataset, "other");

    assert!(store.get_training_data(Some("missing")).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_blank_inputs_produce_no_id_and_no_mutation() -> Result<()> {
    let setup = TestSetup::new(KEYWORDS).await?;
    let store = &setup.store;

    assert_eq!(store.add_ddl("   ", None).await?, None);
    assert_eq!(store.add_documentation("", None).await?, None);
    assert_eq!(store.add_question_sql("", "SELECT 1", None).await?, None);
    assert_eq!(store.add_question_sql("Count users", "\n\t", None).await?, None);

    assert!(setup.embedder.get_calls().is_empty());
    for data_type in TrainingDataType::ALL {
        assert_eq!(setup.count_rows(table_name(data_type)).await?, 0);
    }
    Ok(())
}

#[tokio::test]
async fn test_remove_training_data_routes_by_suffix() -> Result<()> {
    let setup = TestSetup::new(KEYWORDS).await?;
    let store = &setup.store;

    let sql_id = store
        .add_question_sql("How many orders?", "SELECT COUNT(*) FROM orders", None)
        .await?
        .expect("pair should be stored");
    let doc_id = store
        .add_documentation("Orders are never deleted.", None)
        .await?
        .expect("documentation should be stored");

    assert!(store.remove_training_data(&sql_id).await?);
    assert!(!store.remove_training_data("no-known-suffix").await?);

    let rows = store.get_training_data(None).await?;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, doc_id);
    Ok(())
}

#[tokio::test]
async fn test_purge_only_touches_the_matching_dataset() -> Result<()> {
    setup_tracing();
    let setup = TestSetup::new(KEYWORDS).await?;
    let store = &setup.store;

    for dataset in ["default", "other"] {
        store.add_ddl(USERS_DDL, Some(dataset)).await?;
        store.add_documentation("Revenue is in cents.", Some(dataset)).await?;
        store
            .add_question_sql("How many users?", "SELECT COUNT(*) FROM users", Some(dataset))
            .await?;
    }

    store.remove_collections(Some("other"), None).await?;

    assert!(store.get_training_data(Some("other")).await?.is_empty());
    assert_eq!(store.get_training_data(Some("default")).await?.len(), 3);
    Ok(())
}

#[tokio::test]
async fn test_purge_selected_collections_and_skip_unknown_names() -> Result<()> {
    let setup = TestSetup::new(KEYWORDS).await?;
    let store = &setup.store;

    store.add_ddl(USERS_DDL, None).await?;
    store.add_documentation("Revenue is in cents.", None).await?;

    store
        .remove_collections(None, Some(&["ddl", "embeddings"][..]))
        .await?;
    assert!(!store.remove_collection("embeddings", None).await?);

    let rows = store.get_training_data(None).await?;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].training_data_type, TrainingDataType::Documentation);

    let removed = store
        .purge_collection(TrainingDataType::Documentation, None)
        .await?;
    assert_eq!(removed, 1);
    assert!(store.get_training_data(None).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_undecodable_rows_do_not_hide_the_rest_of_the_dataset() -> Result<()> {
    setup_tracing();
    let setup = TestSetup::new(KEYWORDS).await?;
    let store = &setup.store;

    store.add_ddl(USERS_DDL, None).await?;
    store
        .add_question_sql("How many users?", "SELECT COUNT(*) FROM users", None)
        .await?;
    store.add_documentation("Revenue is in cents.", None).await?;

    let conn = setup.db.connect()?;
    conn.execute(
        &format!(
            "INSERT INTO {} (id, dataset, document) VALUES (?, ?, ?)",
            table_name(TrainingDataType::Ddl)
        ),
        turso::params!["broken-ddl", "default", "not json"],
    )
    .await?;
    assert_eq!(setup.count_rows("training_ddl").await?, 2);

    let rows = store.get_training_data(None).await?;
    let types: Vec<TrainingDataType> = rows.iter().map(|r| r.training_data_type).collect();
    assert_eq!(
        types,
        vec![
            TrainingDataType::Ddl,
            TrainingDataType::Sql,
            TrainingDataType::Documentation
        ]
    );
    assert_eq!(rows[0].content, USERS_DDL);
    assert!(rows.iter().all(|r| r.id != "broken-ddl"));
    Ok(())
}

#[tokio::test]
async fn test_related_ddl_is_ordered_by_similarity() -> Result<()> {
    let setup = TestSetup::new(KEYWORDS).await?;
    let store = &setup.store;

    store.add_ddl(USERS_DDL, None).await?;
    store.add_ddl(ORDERS_DDL, None).await?;

    let related = store.get_related_ddl("How many orders were placed?").await?;
    assert_eq!(related, vec![ORDERS_DDL.to_string(), USERS_DDL.to_string()]);

    let related = store.get_related_ddl("Which users signed up?").await?;
    assert_eq!(related[0], USERS_DDL);
    Ok(())
}

#[tokio::test]
async fn test_similar_pairs_and_documentation_are_parsed_back() -> Result<()> {
    let setup = TestSetup::new(KEYWORDS).await?;
    let store = &setup.store;

    store
        .add_question_sql("How many products?", "SELECT COUNT(*) FROM products", Some("shop"))
        .await?;
    store
        .add_documentation("Products are soft-deleted.", Some("shop"))
        .await?;

    let pairs = store.get_similar_question_sql("List products").await?;
    assert_eq!(pairs.len(), 1);
    assert_eq!(pairs[0].question, "How many products?");
    assert_eq!(pairs[0].sql, "SELECT COUNT(*) FROM products");
    assert_eq!(pairs[0].dataset, "shop");

    let docs = store.get_related_documentation("products").await?;
    assert_eq!(docs, vec!["Products are soft-deleted.".to_string()]);
    Ok(())
}

#[tokio::test]
async fn test_n_results_limits_each_collection() -> Result<()> {
    let config = VectorStoreConfig {
        n_results: Some(5),
        n_results_ddl: Some(1),
        ..VectorStoreConfig::in_memory()
    };
    let setup = TestSetup::with_config(KEYWORDS, config).await?;
    let store = &setup.store;

    store.add_ddl(USERS_DDL, None).await?;
    store.add_ddl(ORDERS_DDL, None).await?;

    assert_eq!(store.n_results(TrainingDataType::Ddl), 1);
    assert_eq!(store.n_results(TrainingDataType::Sql), 5);
    assert_eq!(store.get_related_ddl("orders").await?, vec![ORDERS_DDL.to_string()]);
    assert!(store
        .query(TrainingDataType::Ddl, "orders", 0)
        .await?
        .is_empty());
    Ok(())
}

#[tokio::test]
async fn test_collection_metadata_is_recorded() -> Result<()> {
    let metadata = HashMap::from([("hnsw:space".to_string(), json!("cosine"))]);
    let config = VectorStoreConfig {
        collection_metadata: Some(metadata),
        ..VectorStoreConfig::in_memory()
    };
    let setup = TestSetup::with_config(KEYWORDS, config).await?;

    let conn = setup.db.connect()?;
    let mut rows = conn
        .query(
            "SELECT metadata FROM collection_metadata WHERE collection = ?",
            turso::params!["ddl"],
        )
        .await?;
    let row = rows.next().await?.expect("metadata row should exist");
    match row.get_value(0)? {
        turso::Value::Text(text) => {
            let value: serde_json::Value = serde_json::from_str(&text)?;
            assert_eq!(value, json!({"hnsw:space": "cosine"}));
        }
        other => panic!("unexpected metadata value: {other:?}"),
    }
    Ok(())
}

#[tokio::test]
async fn test_persistent_store_creates_its_database_file() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("nested");
    let config = VectorStoreConfig {
        path: path.to_string_lossy().into_owned(),
        client: ClientKind::Persistent,
        ..Default::default()
    };

    let store = SqliteVectorStore::new(config, Box::new(KeywordEmbedder::new(KEYWORDS))).await?;
    store.add_ddl(USERS_DDL, None).await?;

    assert!(path.join("anysql.db").exists());
    assert_eq!(store.get_training_data(None).await?.len(), 1);
    Ok(())
}
