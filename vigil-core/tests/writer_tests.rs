// tests/writer_tests.rs
// Proposal artifact: append-only, whole-batch, empty batch is a no-op.

use chrono::Utc;
use std::fs;

use vigil_core::records::{Category, Effort, IdeaRecord, Priority};
use vigil_core::services::{Proposal, ProposalWriter};

fn proposal(title: &str, pain: Option<&str>) -> Proposal {
    Proposal {
        idea: IdeaRecord {
            ts: "2026-08-01T08:00:00Z".into(),
            pattern: "scratchpad handoff".into(),
            category: Category::Memory,
            insight: "persist the working set between sessions".into(),
            source: "rss".into(),
        },
        pain_id: pain.map(|p| p.to_string()),
        pain_summary: "context evaporates".into(),
        title: title.into(),
        body: "Write the working set to disk at session end.".into(),
        effort: Effort::Low,
        priority: Priority::P2,
    }
}

#[test]
fn empty_batch_leaves_the_artifact_byte_for_byte_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pending.md");
    fs::write(&path, "## Earlier section\n\nkept as-is\n").unwrap();
    let before = fs::read(&path).unwrap();

    let writer = ProposalWriter::new(&path);
    let written = writer.append_batch(&[], Utc::now()).unwrap();

    assert_eq!(written, 0);
    assert_eq!(fs::read(&path).unwrap(), before);
}

#[test]
fn empty_batch_does_not_create_a_missing_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pending.md");
    let writer = ProposalWriter::new(&path);
    writer.append_batch(&[], Utc::now()).unwrap();
    assert!(!path.exists());
}

#[test]
fn batch_appends_one_dated_section_after_existing_content() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pending.md");
    fs::write(&path, "## Earlier section\n\nolder proposal\n").unwrap();

    let writer = ProposalWriter::new(&path);
    let batch = [proposal("First", Some("KE-001")), proposal("Second", None)];
    let written = writer.append_batch(&batch, Utc::now()).unwrap();
    assert_eq!(written, 2);

    let text = fs::read_to_string(&path).unwrap();
    assert!(text.starts_with("## Earlier section"), "prior content moved");
    assert!(text.contains("## Matched proposals —"));
    let first = text.find("### First").unwrap();
    let second = text.find("### Second").unwrap();
    assert!(first < second, "batch order must be preserved");
    assert!(text.contains("**Closes**: KE-001 — context evaporates"));
    // The un-matched-id entry has no Closes line in its block.
    let second_block = &text[second..];
    assert!(!second_block.contains("**Closes**"));
}

#[test]
fn missing_artifact_is_created_with_the_section() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("deep").join("pending.md");
    let writer = ProposalWriter::new(&path);
    writer.append_batch(&[proposal("Only", None)], Utc::now()).unwrap();
    let text = fs::read_to_string(&path).unwrap();
    assert!(text.starts_with("## Matched proposals —"));
    assert!(text.contains("### Only"));
    assert!(text.contains("**Priority**: P2 | **Effort**: low"));
}
