//! Tests for result table persistence.

use super::*;
use crate::param::{Configuration, ParamValue};
use crate::result::BestResult;

fn sample_table() -> ResultTable {
    let mut table = ResultTable::new();
    table.record(
        "berlin52",
        "genetic",
        BestResult::new(
            7544.365_901_904_087,
            Configuration::new()
                .with("-pop", 187)
                .with("-mut", 0.318_273_645_1)
                .with("-elite", 12),
        ),
    );
    table.record(
        "berlin52",
        "annealing",
        BestResult::new(
            7680.0,
            Configuration::new()
                .with("-temp", 52_311.78)
                .with("-cooling", 0.9987),
        ),
    );
    table.record(
        "eil51",
        "aco",
        BestResult::new(
            429.53,
            Configuration::new()
                .with("-ants", 140)
                .with("-alpha", 1.2)
                .with("-beta", 4.7)
                .with("-iters", 500),
        ),
    );
    table
}

#[test]
fn test_round_trip() {
    let table = sample_table();
    let document = ResultStore::serialize(&table).unwrap();
    let reloaded = ResultStore::deserialize(&document).unwrap();
    assert_eq!(reloaded, table);
}

#[test]
fn test_round_trip_with_legacy_key() {
    let table = sample_table();
    let legacy = ResultStore::serialize(&table)
        .unwrap()
        .replace("shortest_distance", "shortestDistance");
    assert!(!legacy.contains("shortest_distance"));

    let reloaded = ResultStore::deserialize(&legacy).unwrap();
    assert_eq!(reloaded, table);
}

#[test]
fn test_writes_canonical_keys() {
    let document = ResultStore::serialize(&sample_table()).unwrap();
    let value: serde_json::Value = serde_json::from_str(&document).unwrap();
    let entry = &value["eil51"]["aco"];
    assert_eq!(entry["shortest_distance"], serde_json::json!(429.53));
    assert_eq!(entry["params"]["-iters"], serde_json::json!(500));
}

#[test]
fn test_equality_ignores_key_order() {
    let a = ResultStore::deserialize(
        r#"{"p": {"x": {"shortest_distance": 1.5, "params": {"-a": 1, "-b": 2.5}}},
            "q": {"x": {"shortest_distance": 2.0, "params": {}}}}"#,
    )
    .unwrap();
    let b = ResultStore::deserialize(
        r#"{"q": {"x": {"params": {}, "shortest_distance": 2.0}},
            "p": {"x": {"params": {"-b": 2.5, "-a": 1}, "shortestDistance": 1.5}}}"#,
    )
    .unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_integer_scores_load_as_reals() {
    let table = ResultStore::deserialize(
        r#"{"st70": {"genetic": {"shortest_distance": 675, "params": {"-pop": 200}}}}"#,
    )
    .unwrap();
    assert_eq!(table.score("st70", "genetic"), Some(675.0));
    assert_eq!(
        table.get("st70", "genetic").unwrap().configuration.get("-pop"),
        Some(ParamValue::Int(200))
    );
}

#[test]
fn test_missing_score_is_malformed() {
    let err = ResultStore::deserialize(r#"{"st70": {"genetic": {"params": {"-pop": 200}}}}"#)
        .unwrap_err();
    assert!(matches!(err, StoreError::Malformed(_)));
}

#[test]
fn test_missing_params_is_malformed() {
    let err = ResultStore::deserialize(r#"{"st70": {"genetic": {"shortest_distance": 1.0}}}"#)
        .unwrap_err();
    assert!(matches!(err, StoreError::Malformed(_)));
}

#[test]
fn test_negative_score_is_malformed() {
    let err = ResultStore::deserialize(
        r#"{"st70": {"genetic": {"shortest_distance": -3.0, "params": {}}}}"#,
    )
    .unwrap_err();
    assert!(matches!(err, StoreError::Malformed(_)));
}

#[test]
fn test_save_and_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("best_hyperparameters.json");
    let table = sample_table();

    ResultStore::save(&table, &path).unwrap();
    assert!(!path.with_extension("json.tmp").exists());
    assert_eq!(ResultStore::load(&path).unwrap(), table);
}

#[test]
fn test_load_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = ResultStore::load(dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, StoreError::Io(_)));
}
