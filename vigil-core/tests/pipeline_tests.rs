// tests/pipeline_tests.rs
// End-to-end pipeline runs against a temp workspace with a scripted
// reasoning service. Covers cursor gating, partial-failure tolerance,
// the no-problems fast path and run idempotency.

use chrono::{Duration, Utc};
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fs;
use std::path::Path;

use vigil_core::commands::Commands;
use vigil_core::records::parse_ts;
use vigil_core::services::Reasoner;

// ----------------------- Test stubs -----------------------

struct Scripted {
    calls: Cell<usize>,
    replies: RefCell<VecDeque<Option<String>>>,
}

impl Scripted {
    fn new(replies: Vec<Option<String>>) -> Self {
        Self {
            calls: Cell::new(0),
            replies: RefCell::new(replies.into()),
        }
    }

    fn calls(&self) -> usize {
        self.calls.get()
    }
}

impl Reasoner for Scripted {
    fn complete(&self, _system: &str, _user: &str) -> Option<String> {
        self.calls.set(self.calls.get() + 1);
        self.replies.borrow_mut().pop_front().unwrap_or(None)
    }
}

fn match_reply(pain_id: &str, title: &str) -> Option<String> {
    Some(format!(
        r#"{{"match": true, "pain_id": "{pain_id}", "pain_summary": "it hurts",
            "proposal_title": "{title}", "proposal": "Do the thing.",
            "effort": "low", "priority": "P2"}}"#
    ))
}

fn no_match_reply() -> Option<String> {
    Some(r#"{"match": false}"#.to_string())
}

// ----------------------- Workspace helpers -----------------------

fn write_ideas(root: &Path, hours_ago: &[i64]) {
    let lines: Vec<String> = hours_ago
        .iter()
        .enumerate()
        .map(|(i, h)| {
            format!(
                r#"{{"ts":"{}","pattern":"idea-{i}","category":"memory","insight":"insight {i}","source":"rss"}}"#,
                (Utc::now() - Duration::hours(*h)).to_rfc3339()
            )
        })
        .collect();
    fs::write(
        root.join("feeds/agent-ideas/ideas.jsonl"),
        lines.join("\n") + "\n",
    )
    .unwrap();
}

fn write_open_problem(root: &Path) {
    fs::write(
        root.join("registry/problems.yaml"),
        "- id: KE-001\n  problem: context lost between sessions\n  status: open\n  priority: P1\n",
    )
    .unwrap();
}

fn set_cursor(root: &Path, at: chrono::DateTime<Utc>) {
    fs::write(root.join("state/last-run"), at.to_rfc3339()).unwrap();
}

fn cursor_on_disk(root: &Path) -> Option<chrono::DateTime<Utc>> {
    let text = fs::read_to_string(root.join("state/last-run")).ok()?;
    parse_ts(text.trim())
}

// ----------------------- Tests ----------------------------

#[test]
fn cursor_gates_which_records_reach_the_reasoner() {
    let dir = tempfile::tempdir().unwrap();
    let commands = Commands::open(dir.path()).unwrap();
    write_open_problem(dir.path());
    // One record an hour before the cursor, one after.
    write_ideas(dir.path(), &[2, 0]);
    set_cursor(dir.path(), Utc::now() - Duration::hours(1));

    let reasoner = Scripted::new(vec![no_match_reply()]);
    let report = commands.run_pipeline(&reasoner).unwrap();

    assert_eq!(report.examined, 1, "only the post-cursor record is new");
    assert_eq!(reasoner.calls(), 1);
    assert_eq!(report.written, 0);
}

#[test]
fn one_failed_call_does_not_drop_other_matches_and_cursor_advances() {
    let dir = tempfile::tempdir().unwrap();
    let commands = Commands::open(dir.path()).unwrap();
    write_open_problem(dir.path());
    write_ideas(dir.path(), &[3, 2, 1]);
    let before = Utc::now();

    // Middle call times out (None); first and last match.
    let reasoner = Scripted::new(vec![
        match_reply("KE-001", "First fix"),
        None,
        match_reply("KE-001", "Third fix"),
    ]);
    let report = commands.run_pipeline(&reasoner).unwrap();

    assert_eq!(report.examined, 3);
    assert_eq!(report.matched, 2);
    assert_eq!(report.written, 2);

    let artifact = fs::read_to_string(dir.path().join("out/pending-proposals.md")).unwrap();
    assert!(artifact.contains("### First fix"));
    assert!(artifact.contains("### Third fix"));

    let advanced = cursor_on_disk(dir.path()).expect("cursor persisted");
    assert!(advanced >= before, "cursor must advance after the run");
}

#[test]
fn no_active_problems_skips_the_reasoner_and_still_advances() {
    let dir = tempfile::tempdir().unwrap();
    let commands = Commands::open(dir.path()).unwrap();
    // Seeded registry template holds no entries.
    write_ideas(dir.path(), &[1]);

    let reasoner = Scripted::new(vec![match_reply("KE-001", "never used")]);
    let report = commands.run_pipeline(&reasoner).unwrap();

    assert_eq!(report.examined, 1);
    assert_eq!(reasoner.calls(), 0, "no problems → no service invocations");
    assert_eq!(report.written, 0);
    assert!(!dir.path().join("out/pending-proposals.md").exists());
    assert!(cursor_on_disk(dir.path()).is_some());
}

#[test]
fn declined_and_unparseable_replies_never_produce_proposals() {
    let dir = tempfile::tempdir().unwrap();
    let commands = Commands::open(dir.path()).unwrap();
    write_open_problem(dir.path());
    write_ideas(dir.path(), &[2, 1]);

    let reasoner = Scripted::new(vec![
        no_match_reply(),
        Some("sounds plausible to me".to_string()),
    ]);
    let report = commands.run_pipeline(&reasoner).unwrap();

    assert_eq!(report.examined, 2);
    assert_eq!(report.written, 0);
    assert!(!dir.path().join("out/pending-proposals.md").exists());
}

#[test]
fn second_run_with_no_new_records_is_a_no_op() {
    let dir = tempfile::tempdir().unwrap();
    let commands = Commands::open(dir.path()).unwrap();
    write_open_problem(dir.path());
    write_ideas(dir.path(), &[1]);

    let first = Scripted::new(vec![match_reply("KE-001", "Persist summaries")]);
    let report = commands.run_pipeline(&first).unwrap();
    assert_eq!(report.written, 1);

    let artifact_path = dir.path().join("out/pending-proposals.md");
    let after_first = fs::read(&artifact_path).unwrap();

    let second = Scripted::new(vec![match_reply("KE-001", "duplicate")]);
    let report = commands.run_pipeline(&second).unwrap();

    assert_eq!(report.examined, 0);
    assert_eq!(report.written, 0);
    assert_eq!(second.calls(), 0, "nothing new → no service invocations");
    assert_eq!(
        fs::read(&artifact_path).unwrap(),
        after_first,
        "artifact must be untouched by the idle run"
    );

    let log = fs::read_to_string(dir.path().join("logbook/actions.jsonl")).unwrap();
    assert!(log.contains("run_completed"));
    assert!(log.contains("proposals_written"));
    assert!(log.contains("run_noop"));
}

#[test]
fn artifact_write_failure_leaves_the_cursor_unadvanced() {
    let dir = tempfile::tempdir().unwrap();
    let commands = Commands::open(dir.path()).unwrap();
    write_open_problem(dir.path());
    write_ideas(dir.path(), &[1]);

    // Replace the artifact's parent directory with a plain file so the
    // batch write cannot possibly succeed.
    fs::remove_dir_all(dir.path().join("out")).unwrap();
    fs::write(dir.path().join("out"), b"not a directory").unwrap();

    let reasoner = Scripted::new(vec![match_reply("KE-001", "Doomed")]);
    let err = commands.run_pipeline(&reasoner);

    assert!(err.is_err(), "artifact I/O failure must fail the run");
    assert!(
        cursor_on_disk(dir.path()).is_none(),
        "cursor must not advance past unwritten work"
    );
}
