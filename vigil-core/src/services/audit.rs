// src/services/audit.rs
//! Append-only JSONL action log for run telemetry.
//!
//! Best-effort by construction: the log exists to explain what a run did,
//! so a failed append must never take the run down with it. Callers pass
//! the log path explicitly; no hidden global state.

use chrono::Utc;
use serde::Serialize;
use serde_json::{Value, json};
use std::fs;
use std::io::Write;
use std::path::Path;

/// Record one action event (lightweight telemetry).
///
/// `agent` is the logical component ("pipeline", "sync"), `action` a short
/// verb label, `severity` one of "low" | "medium" | "high" for triage.
pub fn record_action(log: &Path, agent: &str, action: &str, details: &Value, severity: &str) {
    let entry = json!({
        "timestamp": Utc::now().to_rfc3339(),
        "event": "action",
        "agent": agent,
        "action": action,
        "severity": severity,
        "details": details,
    });
    append_jsonl(log, &entry);
}

/// Append a single JSON value as a line. Creates parent directories if
/// missing; ignores write errors to avoid crashing the caller.
pub fn append_jsonl<S: Serialize>(path: &Path, val: &S) {
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }
    if let Ok(mut f) = fs::OpenOptions::new().create(true).append(true).open(path) {
        if let Ok(line) = serde_json::to_string(val) {
            let _ = writeln!(f, "{line}");
        }
    }
}
