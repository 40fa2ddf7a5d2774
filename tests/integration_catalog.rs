//! The database catalog lifecycle through `GraphEngine` (`spec.md` §4.E,
//! §8 concrete scenario 6): create/rename/delete, and backup/restore/
//! export/import round trips.

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
    let engine = GraphEngine::open(&config).unwrap();
    (dir, engine)
}

fn attrs(pairs: &[(&str, Value)]) -> HashMap<String, Value> {
    pairs.iter().cloned().map(|(k, v)| (k.to_string(), v)).collect()
}

#[test]
fn create_duplicate_database_fails() {
    let (_dir, mut engine) = engine();
    engine.create_database("x").unwrap();
    assert!(engine.create_database("x").is_err());
}

#[test]
fn rename_retargets_the_active_selection() {
    let (_dir, mut engine) = engine();
    engine.create_database("x").unwrap();
    engine.use_database("x").unwrap();
    engine.add_node(attrs(&[("name", Value::String("A".into()))])).unwrap();

    engine.rename_database("x", "y").unwrap();
    assert_eq!(engine.current_database_name(), Some("y"));
    // the renamed database is still usable and keeps its data
    assert_eq!(engine.list_all_nodes().unwrap().len(), 1);
}

#[test]
fn deleting_the_active_database_clears_the_selection() {
    let (_dir, mut engine) = engine();
    engine.create_database("x").unwrap();
    engine.use_database("x").unwrap();
    engine.delete_database("x").unwrap();

    assert!(engine.current_database_name().is_none());
    assert!(engine.add_node(HashMap::new()).is_err());
}

#[test]
fn backup_then_restore_round_trips_to_the_post_backup_state() {
    let (_dir, mut engine) = engine();
    engine.create_database("x").unwrap();
    engine.use_database("x").unwrap();
    let id = engine.add_node(attrs(&[("name", Value::String("Alice".into()))])).unwrap();

    engine.backup_database("x", "x_bak").unwrap();
    engine.add_node(attrs(&[("name", Value::String("Bob".into()))])).unwrap();
    assert_eq!(engine.list_all_nodes().unwrap().len(), 2);

    engine.restore_database("x", "x_bak").unwrap();
    assert_eq!(engine.list_all_nodes().unwrap().len(), 1);
    assert!(!engine.get_value(id).unwrap().is_empty());
}

#[test]
fn export_then_import_overwrite_replaces_target_contents() {
    let (_dir, mut engine) = engine();
    engine.create_database("source").unwrap();
    engine.use_database("source").unwrap();
    engine.add_node(attrs(&[("name", Value::String("Alice".into()))])).unwrap();
    engine.export_database("source", "source_export").unwrap();

    engine.create_database("target").unwrap();
    engine.use_database("target").unwrap();
    engine.add_node(attrs(&[("name", Value::String("Bob".into()))])).unwrap();

    engine.import_database("target", "source_export", false).unwrap();
    let nodes = engine.list_all_nodes().unwrap();
    assert_eq!(nodes.len(), 1);
    assert!(nodes.values().any(|v| v.get("name") == Some(&Value::String("Alice".into()))));
}

#[test]
fn import_merge_combines_vertices_and_links_existing_edges() {
    let (_dir, mut engine) = engine();
    engine.create_database("source").unwrap();
    engine.use_database("source").unwrap();
    engine.add_node(attrs(&[("name", Value::String("Alice".into()))])).unwrap();
    engine.export_database("source", "source_export").unwrap();

    engine.create_database("target").unwrap();
    engine.use_database("target").unwrap();
    engine.add_node(attrs(&[("name", Value::String("Bob".into()))])).unwrap();

    engine.import_database("target", "source_export", true).unwrap();
    assert_eq!(engine.list_all_nodes().unwrap().len(), 2);
}

#[test]
fn import_merge_skips_edges_whose_target_does_not_exist_without_creating_phantom_vertices() {
    let (dir, mut engine) = engine();
    engine.create_database("target").unwrap();
    engine.use_database("target").unwrap();
    let bob = engine.add_node(attrs(&[("name", Value::String("Bob".into()))])).unwrap();

    // Hand-craft an import file whose only node's only edge points at a
    // UUID that is not itself a node in the import — kk.py's merge-import
    // silently drops such an edge rather than creating a vertex for it.
    let dangling_target = uuid::Uuid::new_v4();
    let payload = serde_json::json!({
        bob.to_string(): {
            "value": { "name": "Bob" },
            "edges": { dangling_target.to_string(): { "label": "knows", "weight": 1.0 } }
        }
    });
    std::fs::write(
        dir.path().join("dangling_import_nodes.json"),
        serde_json::to_vec_pretty(&payload).unwrap(),
    )
    .unwrap();

    engine.import_database("target", "dangling_import", true).unwrap();

    let nodes = engine.list_all_nodes().unwrap();
    assert_eq!(nodes.len(), 1, "no phantom vertex should be created for the dangling edge target");
    assert!(engine.get_edges(bob).unwrap().is_empty(), "an edge to a nonexistent target must be dropped, not linked");
}

#[test]
fn operations_on_an_unknown_database_fail() {
    let (_dir, mut engine) = engine();
    assert!(engine.use_database("nope").is_err());
    assert!(engine.delete_database("nope").is_err());
    assert!(engine.rename_database("nope", "other").is_err());
}
