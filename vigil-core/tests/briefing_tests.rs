// tests/briefing_tests.rs
// Briefing composition and the ranked feed reports.

use chrono::{Duration, Utc};
use std::fs;
use std::path::Path;

use vigil_core::commands::Commands;
use vigil_core::services::BriefingMode;

fn ts(hours_ago: i64) -> String {
    (Utc::now() - Duration::hours(hours_ago)).to_rfc3339()
}

fn seed_feeds(root: &Path) {
    let signals = [
        format!(
            r#"{{"ts":"{}","topic":"eval-harnesses","signal":"rising fast","source":"rss","direction":"rising","relevant":true}}"#,
            ts(4)
        ),
        format!(
            r#"{{"ts":"{}","topic":"agent-memory","signal":"brand new","source":"rss","direction":"new","relevant":true}}"#,
            ts(3)
        ),
        format!(
            r#"{{"ts":"{}","topic":"prompt-tuning","signal":"fading","source":"rss","direction":"declining","relevant":false}}"#,
            ts(2)
        ),
    ];
    fs::write(
        root.join("feeds/market-intel/signals.jsonl"),
        signals.join("\n") + "\n",
    )
    .unwrap();

    let ideas = [
        format!(
            r#"{{"ts":"{}","pattern":"meta-note","category":"meta","insight":"write less","source":"rss"}}"#,
            ts(6)
        ),
        format!(
            r#"{{"ts":"{}","pattern":"session-cache","category":"memory","insight":"persist working sets","source":"rss"}}"#,
            ts(5)
        ),
    ];
    fs::write(
        root.join("feeds/agent-ideas/ideas.jsonl"),
        ideas.join("\n") + "\n",
    )
    .unwrap();

    let project = [
        format!(
            r#"{{"ts":"{}","urgency":"week","impact":"steady","trend":"slow burn","idea":"plan it","source":"rss"}}"#,
            ts(7)
        ),
        format!(
            r#"{{"ts":"{}","urgency":"now","impact":"ship blocker","trend":"hot","idea":"fix the gate","source":"rss"}}"#,
            ts(1)
        ),
    ];
    fs::write(
        root.join("feeds/project-intel/signals.jsonl"),
        project.join("\n") + "\n",
    )
    .unwrap();
}

#[test]
fn briefing_orders_new_before_rising_and_ends_with_context() {
    let dir = tempfile::tempdir().unwrap();
    let commands = Commands::open(dir.path()).unwrap();
    seed_feeds(dir.path());

    let text = commands.briefing(BriefingMode::Full);
    let new_at = text.find("agent-memory").unwrap();
    let rising_at = text.find("eval-harnesses").unwrap();
    assert!(new_at < rising_at, "new signals lead the market section");

    assert!(text.contains("⚡ URGENT:"));
    assert!(text.contains("fix the gate"));
    assert!(text.contains("\nContext: "));
    assert!(text.contains("Insights available: "));
    assert!(text.contains("Project urgent: fix the gate"));
    // memory outranks meta in the idea section
    let memory_at = text.find("session-cache").unwrap();
    let meta_at = text.find("meta-note").unwrap();
    assert!(memory_at < meta_at);
}

#[test]
fn short_mode_is_a_subset_sized_briefing() {
    let dir = tempfile::tempdir().unwrap();
    let commands = Commands::open(dir.path()).unwrap();
    seed_feeds(dir.path());

    let full = commands.briefing(BriefingMode::Full);
    let short = commands.briefing(BriefingMode::Short);
    assert!(short.len() <= full.len());
    // Declining entries appear only in the full briefing.
    assert!(full.contains("prompt-tuning"));
    assert!(!short.contains("prompt-tuning"));
}

#[test]
fn briefing_mutates_nothing_and_reruns_identically_shaped() {
    let dir = tempfile::tempdir().unwrap();
    let commands = Commands::open(dir.path()).unwrap();
    seed_feeds(dir.path());

    let feed = dir.path().join("feeds/market-intel/signals.jsonl");
    let before = fs::read(&feed).unwrap();
    let first = commands.briefing(BriefingMode::Short);
    let second = commands.briefing(BriefingMode::Short);
    assert_eq!(fs::read(&feed).unwrap(), before);
    // Identical except for the composed-at stamp in the heading.
    assert_eq!(
        first.lines().skip(1).collect::<Vec<_>>(),
        second.lines().skip(1).collect::<Vec<_>>()
    );
    assert!(!dir.path().join("out/pending-proposals.md").exists());
}

#[test]
fn empty_feeds_compose_a_placeholder_briefing() {
    let dir = tempfile::tempdir().unwrap();
    let commands = Commands::open(dir.path()).unwrap();
    let text = commands.briefing(BriefingMode::Full);
    assert!(text.contains("no market signals yet"));
}

#[test]
fn market_report_ranks_by_direction_and_flags_relevance() {
    let dir = tempfile::tempdir().unwrap();
    let commands = Commands::open(dir.path()).unwrap();
    seed_feeds(dir.path());

    let report = commands.market_signals(3, 15);
    let new_at = report.find("★ **agent-memory** ✓").unwrap();
    let rising_at = report.find("↑ **eval-harnesses** ✓").unwrap();
    let declining_at = report.find("↓ **prompt-tuning**").unwrap();
    assert!(new_at < rising_at && rising_at < declining_at);
}

#[test]
fn project_report_honors_the_urgency_filter() {
    let dir = tempfile::tempdir().unwrap();
    let commands = Commands::open(dir.path()).unwrap();
    seed_feeds(dir.path());

    let all = commands.project_signals(7, None);
    assert!(all.contains("fix the gate") && all.contains("plan it"));
    let urgent_at = all.find("ship blocker").unwrap();
    let weekly_at = all.find("steady").unwrap();
    assert!(urgent_at < weekly_at, "now outranks week");

    let only_now = commands.project_signals(7, vigil_core::records::Urgency::parse("now"));
    assert!(only_now.contains("fix the gate"));
    assert!(!only_now.contains("plan it"));
}
