//! Index-maintenance invariants through `GraphEngine`: back-fill on
//! `create_index`, incremental maintenance on update/delete, and the
//! `find_by_name` behavior change an index causes (`spec.md` §3 invariant 1,
//! §4.A, §4.B).

use graphdb::config::Config;
use graphdb::engine::GraphEngine;
use graphdb::value::Value;
use std::collections::HashMap;

fn engine() -> (tempfile::TempDir, GraphEngine) {
    let dir = tempfile::tempdir().unwrap();
    let config = Config {
        storage_dir: dir.path().to_string_lossy().into_owned(),
        ..Config::default()
    };
    let mut engine = GraphEngine::open(&config).unwrap();
    engine.create_database("people").unwrap();
    engine.use_database("people").unwrap();
    (dir, engine)
}

fn attrs(pairs: &[(&str, Value)]) -> HashMap<String, Value> {
    pairs.iter().cloned().map(|(k, v)| (k.to_string(), v)).collect()
}

#[test]
fn create_index_back_fills_and_then_stays_consistent() {
    let (_dir, mut engine) = engine();
    let a = engine.add_node(attrs(&[("age", Value::Int(30))])).unwrap();
    let b = engine.add_node(attrs(&[("age", Value::Int(30))])).unwrap();
    let c = engine.add_node(attrs(&[("age", Value::Int(25))])).unwrap();

    engine.create_index("age").unwrap();
    let hits = engine.query("WHERE age = 30", false, true).unwrap();
    let ids: Vec<_> = hits.into_iter().map(|(id, _)| id).collect();
    assert_eq!(ids.len(), 2);
    assert!(ids.contains(&a) && ids.contains(&b) && !ids.contains(&c));
}

#[test]
fn creating_the_same_index_twice_fails() {
    let (_dir, mut engine) = engine();
    engine.create_index("age").unwrap();
    assert!(engine.create_index("age").is_err());
}

#[test]
fn update_moves_a_vertex_between_index_keys() {
    let (_dir, mut engine) = engine();
    engine.create_index("age").unwrap();
    let a = engine.add_node(attrs(&[("age", Value::Int(30))])).unwrap();

    engine
        .update_node(a, attrs(&[("age", Value::Int(31))]))
        .unwrap();

    let at_30 = engine.query("WHERE age = 30", false, true).unwrap();
    let at_31 = engine.query("WHERE age = 31", false, true).unwrap();
    assert!(at_30.is_empty());
    assert_eq!(at_31.len(), 1);
    assert_eq!(at_31[0].0, a);
}

#[test]
fn delete_node_removes_it_from_every_index_entry() {
    let (_dir, mut engine) = engine();
    engine.create_index("age").unwrap();
    let a = engine.add_node(attrs(&[("age", Value::Int(30))])).unwrap();
    engine.delete_node(a).unwrap();

    let hits = engine.query("WHERE age = 30", false, true).unwrap();
    assert!(hits.is_empty());
}

#[test]
fn drop_index_then_find_by_name_falls_back_to_substring_scan() {
    let (_dir, mut engine) = engine();
    engine.create_index("name").unwrap();
    engine.add_node(attrs(&[("name", Value::String("Alice".into()))])).unwrap();
    engine.add_node(attrs(&[("name", Value::String("Malice".into()))])).unwrap();

    // indexed lookup is exact
    assert_eq!(engine.find_by_name("Alice").unwrap().len(), 1);

    engine.drop_index("name").unwrap();
    // unindexed lookup is a case-insensitive substring scan
    assert_eq!(engine.find_by_name("lic").unwrap().len(), 2);
}

#[test]
fn dropping_an_index_that_does_not_exist_fails() {
    let (_dir, mut engine) = engine();
    assert!(engine.drop_index("age").is_err());
}
