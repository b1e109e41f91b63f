//! # Identifier Tests
//!
//! Expected values were computed independently from the documented scheme:
//! uuid5(nil, hex(sha256(utf8(content)))).

use anysql::ids::{canonical_json, deterministic_uuid, training_id};
use anysql::training::{TrainingDataType, TrainingDocument};
use std::collections::HashSet;

#[test]
fn test_deterministic_uuid_known_values() {
    assert_eq!(
        deterministic_uuid("hello"),
        "0945717e-8d14-5f14-957f-0fb0ea1d56af"
    );
    assert_eq!(deterministic_uuid(""), "c56b9ed4-24fd-5c96-9c08-97ed2b2fa6cf");
}

#[test]
fn test_bytes_and_strings_hash_alike() {
    assert_eq!(
        deterministic_uuid(b"hello".as_slice()),
        deterministic_uuid("hello")
    );
    assert_eq!(
        deterministic_uuid(String::from("hello")),
        deterministic_uuid("hello")
    );
}

#[test]
fn test_repeated_calls_are_stable() {
    let first = deterministic_uuid("SELECT * FROM users");
    for _ in 0..10 {
        assert_eq!(deterministic_uuid("SELECT * FROM users"), first);
    }
    assert_eq!(first.len(), 36);
}

#[test]
fn test_near_duplicates_get_distinct_ids() {
    let base = "SELECT name FROM customers WHERE id = 1";
    let mut corpus = vec![base.to_string()];
    for (i, _) in base.char_indices() {
        let mut variant = base.to_string();
        variant.replace_range(i..i + 1, "#");
        corpus.push(variant);
    }
    corpus.push(format!("{base} "));
    corpus.push(base.to_lowercase());

    let ids: HashSet<String> = corpus.iter().map(deterministic_uuid).collect();
    let unique_inputs: HashSet<&String> = corpus.iter().collect();
    assert_eq!(ids.len(), unique_inputs.len());
}

#[test]
fn test_canonical_json_layout() {
    let document = TrainingDocument::question_sql(
        "How many users?",
        "SELECT COUNT(*) FROM users",
        None,
    );
    assert_eq!(
        document.to_canonical_json().unwrap(),
        r#"{"dataset": "default", "question": "How many users?", "sql": "SELECT COUNT(*) FROM users"}"#
    );
    assert_eq!(
        canonical_json(&vec!["a", "b"]).unwrap(),
        r#"["a", "b"]"#
    );
}

#[test]
fn test_canonical_json_keeps_non_ascii_text() {
    let document = TrainingDocument::documentation("税率は10%です\n\"quoted\"", Some("其他"));
    let json = document.to_canonical_json().unwrap();
    assert_eq!(
        json,
        r#"{"dataset": "其他", "documentation": "税率は10%です\n\"quoted\""}"#
    );
    assert_eq!(
        document.id().unwrap(),
        "2fcc98b6-82f6-5244-95fe-ac3b60b6be19-doc"
    );
}

#[test]
fn test_training_ids_carry_type_suffixes() {
    let ddl = TrainingDocument::ddl("CREATE TABLE t (id INT)", None);
    assert_eq!(
        ddl.id().unwrap(),
        "e76a1546-26ba-586e-90af-ee6e0e72076e-ddl"
    );

    let pair = TrainingDocument::question_sql(
        "How many users?",
        "SELECT COUNT(*) FROM users",
        Some("default"),
    );
    assert_eq!(
        pair.id().unwrap(),
        "718e1c74-8e6b-5e09-931b-5d5678ff787a-sql"
    );

    let doc = TrainingDocument::documentation("Revenue is in cents.", None);
    assert_eq!(
        doc.id().unwrap(),
        "c6abc9f4-cb06-55d4-bdaa-bfb9c118841d-doc"
    );

    assert_eq!(training_id("{}", "ddl"), format!("{}-ddl", deterministic_uuid("{}")));
}

#[test]
fn test_dataset_changes_the_id() {
    let default = TrainingDocument::ddl("CREATE TABLE t (id INT)", Some("default"));
    let other = TrainingDocument::ddl("CREATE TABLE t (id INT)", Some("other"));
    assert_ne!(default.id().unwrap(), other.id().unwrap());
}

#[test]
fn test_type_is_recovered_from_id_suffix() {
    assert_eq!(
        TrainingDataType::from_id("e76a1546-26ba-586e-90af-ee6e0e72076e-ddl"),
        Some(TrainingDataType::Ddl)
    );
    assert_eq!(
        TrainingDataType::from_id("c6abc9f4-cb06-55d4-bdaa-bfb9c118841d-doc"),
        Some(TrainingDataType::Documentation)
    );
    assert_eq!(
        TrainingDataType::from_id("718e1c74-8e6b-5e09-931b-5d5678ff787a-sql"),
        Some(TrainingDataType::Sql)
    );
    assert_eq!(TrainingDataType::from_id("not-a-training-id"), None);
}
