// tests/init_tests.rs
// Workspace bootstrap is idempotent.

use std::fs;

use vigil_core::commands::ensure_initialized;

#[test]
fn init_creates_the_tree_once_and_only_once() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("workspace");

    let first = ensure_initialized(&root).unwrap();
    assert!(first.created.contains(&"config.toml".to_string()));
    assert!(root.join("feeds/agent-ideas").is_dir());
    assert!(root.join("registry/problems.yaml").is_file());
    assert!(root.join("logbook/actions.jsonl").is_file());

    let second = ensure_initialized(&root).unwrap();
    assert!(second.created.is_empty(), "second init must create nothing");
    assert!(second.existed.contains(&"config.toml".to_string()));
}

#[test]
fn seeded_logbook_carries_the_init_event() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("workspace");
    ensure_initialized(&root).unwrap();
    let log = fs::read_to_string(root.join("logbook/actions.jsonl")).unwrap();
    assert!(log.contains("system_init"));
}

#[test]
fn seeded_config_parses_back_into_core_config() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("workspace");
    ensure_initialized(&root).unwrap();
    let cfg = vigil_core::config::CoreConfig::load(&root).unwrap();
    assert_eq!(cfg.system.name, "vigil");
    assert!(cfg.pipeline.cursor_path.ends_with("state/last-run"));
    assert_eq!(cfg.pipeline.grace_hours, 25);
    assert!(!cfg.services.sync_enabled);
}
