//! The single-writer snapshot-stack transaction mechanism through
//! `GraphEngine` (`spec.md` §4.C, §8 concrete scenario 4): `begin`/
//! `rollback`/`commit`/`stop` semantics, including the documented
//! last-write-undo behavior (not group-atomic commit).

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
fn begin_add_rollback_undoes_the_addition() {
    let (_dir, mut engine) = engine();
    engine.begin().unwrap();
    let id = engine.add_node(attrs(&[("name", Value::String("D".into()))])).unwrap();
    engine.rollback().unwrap();

    assert!(engine.get_value(id).unwrap().is_empty());
    // rollback with nothing left to undo is a no-op, not an error.
    engine.rollback().unwrap();
    engine.stop().unwrap();
}

#[test]
fn begin_twice_is_rejected() {
    let (_dir, mut engine) = engine();
    engine.begin().unwrap();
    assert!(engine.begin().is_err());
}

#[test]
fn transaction_commands_outside_an_open_transaction_fail() {
    let (_dir, mut engine) = engine();
    assert!(engine.commit().is_err());
    assert!(engine.rollback().is_err());
    assert!(engine.stop().is_err());
}

#[test]
fn commit_discards_only_the_most_recent_snapshot_and_leaves_tx_open() {
    // Three mutations push three pre-image snapshots: [empty, {A}, {A,B}].
    // `commit` pops the top one ({A,B}, the pre-image for adding C) without
    // touching live state, so adding C can no longer be undone on its own.
    // The next `rollback` then pops the snapshot *under* it ({A}, the
    // pre-image for adding B) and restores it — undoing both the add-B and
    // add-C mutations in one step, since commit already discarded the
    // snapshot that would have stopped at just undoing C. This is the
    // last-write-undo behavior `spec.md` §4.C documents: there is no
    // atomic group commit, so "commit the last change" plus "roll back the
    // one before it" can undo more than one mutation.
    let (_dir, mut engine) = engine();
    engine.begin().unwrap();
    let a = engine.add_node(attrs(&[("name", Value::String("A".into()))])).unwrap();
    let b = engine.add_node(attrs(&[("name", Value::String("B".into()))])).unwrap();
    let c = engine.add_node(attrs(&[("name", Value::String("C".into()))])).unwrap();

    engine.commit().unwrap();
    engine.rollback().unwrap();

    assert!(!engine.get_value(a).unwrap().is_empty());
    assert!(engine.get_value(b).unwrap().is_empty());
    assert!(engine.get_value(c).unwrap().is_empty());
}

#[test]
fn stop_clears_the_stack_and_closes_the_transaction() {
    let (_dir, mut engine) = engine();
    engine.begin().unwrap();
    engine.add_node(attrs(&[("name", Value::String("D".into()))])).unwrap();
    engine.stop().unwrap();

    assert!(engine.rollback().is_err());
    assert!(engine.commit().is_err());
}

#[test]
fn mutations_outside_a_transaction_are_not_snapshotted() {
    let (_dir, mut engine) = engine();
    let id = engine.add_node(attrs(&[("name", Value::String("A".into()))])).unwrap();
    // no transaction is open, so there is nothing to roll back
    assert!(engine.rollback().is_err());
    assert!(!engine.get_value(id).unwrap().is_empty());
}
