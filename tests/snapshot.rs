#![cfg(feature = "snapshot")]

use std::fs;

use ruledeck::registry::{Registry, SnapshotError, SnapshotRegistry, StoreError};
use ruledeck::{Outcome, Record, RuleEngine};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn seeded(path: &std::path::Path) -> RuleEngine<SnapshotRegistry> {
    let engine = RuleEngine::new(SnapshotRegistry::open(path).unwrap());
    engine.create_rule("age > 30").unwrap();
    engine.create_rule("department = 'Sales'").unwrap();
    engine.combine_rules(&["rule1", "rule2"], "AND").unwrap();
    engine
}

// ---------------------------------------------------------------------------
// Persistence
// ---------------------------------------------------------------------------

#[test]
fn missing_file_opens_empty() {
    let dir = tempfile::tempdir().unwrap();
    let registry = SnapshotRegistry::open(dir.path().join("rules.rdck")).unwrap();
    assert!(registry.is_empty());
    assert_eq!(registry.next_identifier(), "rule1");
}

#[test]
fn rules_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rules.rdck");
    drop(seeded(&path));

    let engine = RuleEngine::new(SnapshotRegistry::open(&path).unwrap());
    assert_eq!(engine.rule_count(), 3);

    let record = Record::new().set("age", 40_i64).set("department", "Sales");
    assert_eq!(
        engine.evaluate_rule("rule3", &record).unwrap(),
        Outcome::EvaluationResult(true)
    );
    assert_eq!(
        engine.create_rule("age > 30").unwrap(),
        Outcome::DuplicateOf("rule1".into())
    );
    assert_eq!(
        engine.create_rule("age < 18").unwrap(),
        Outcome::Created("rule4".into())
    );
}

#[test]
fn clear_is_persisted() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rules.rdck");
    seeded(&path).clear_rules().unwrap();

    let registry = SnapshotRegistry::open(&path).unwrap();
    assert!(registry.is_empty());
    assert_eq!(registry.next_identifier(), "rule1");
}

#[test]
fn no_temp_file_left_behind() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rules.rdck");
    drop(seeded(&path));

    let names: Vec<_> = fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .collect();
    assert_eq!(names, ["rules.rdck"]);
}

// ---------------------------------------------------------------------------
// Corruption
// ---------------------------------------------------------------------------

#[test]
fn flipped_byte_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rules.rdck");
    drop(seeded(&path));

    let mut bytes = fs::read(&path).unwrap();
    let last = bytes.len() - 1;
    bytes[last] ^= 0x01;
    fs::write(&path, &bytes).unwrap();

    assert!(matches!(
        SnapshotRegistry::open(&path),
        Err(StoreError::Snapshot(SnapshotError::ChecksumMismatch))
    ));
}

#[test]
fn truncated_file_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rules.rdck");
    drop(seeded(&path));

    let bytes = fs::read(&path).unwrap();
    fs::write(&path, &bytes[..bytes.len() / 2]).unwrap();

    assert!(matches!(
        SnapshotRegistry::open(&path),
        Err(StoreError::Snapshot(SnapshotError::LengthMismatch { .. }))
    ));
}

#[test]
fn foreign_file_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rules.rdck");
    fs::write(&path, b"this is not a rule snapshot, just some text").unwrap();

    assert!(matches!(
        SnapshotRegistry::open(&path),
        Err(StoreError::Snapshot(SnapshotError::BadMagic))
    ));
}
