// vigil-core/src/commands/init.rs

use anyhow::{Context, Result};
use chrono::Utc;
use once_cell::sync::OnceCell;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::utils::fsx::write_atomic;

#[derive(Debug, Clone)]
pub struct InitReport {
    pub root: PathBuf,
    pub created: Vec<String>,
    pub existed: Vec<String>,
}

// ---------- single global init gate ----------

static INIT: OnceCell<InitReport> = OnceCell::new();

/// Idempotent global initializer for the default root. Safe to call often.
pub fn ensure_initialized_once() -> Result<&'static InitReport> {
    INIT.get_or_try_init(|| ensure_initialized(&vigil_root()))
}

/// Resolve the workspace root. Allow override via VIGIL_ROOT (tests, venvs).
pub fn vigil_root() -> PathBuf {
    std::env::var_os("VIGIL_ROOT")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(".vigil"))
}

/// Ensure the workspace tree under `root` exists (idempotent).
pub fn ensure_initialized(root: &Path) -> Result<InitReport> {
    let mut created = Vec::new();
    let mut existed = Vec::new();

    // Directories
    ensure_dir(root, "", &mut created, &mut existed)?;
    ensure_dir(root, "feeds", &mut created, &mut existed)?;
    ensure_dir(&root.join("feeds"), "market-intel", &mut created, &mut existed)?;
    ensure_dir(&root.join("feeds"), "agent-ideas", &mut created, &mut existed)?;
    ensure_dir(&root.join("feeds"), "project-intel", &mut created, &mut existed)?;
    ensure_dir(root, "registry", &mut created, &mut existed)?;
    ensure_dir(root, "state", &mut created, &mut existed)?;
    ensure_dir(root, "out", &mut created, &mut existed)?;
    ensure_dir(root, "logbook", &mut created, &mut existed)?;

    // Config
    ensure_file(
        root,
        "config.toml",
        Some(DEFAULT_CONFIG_TOML),
        &mut created,
        &mut existed,
    )?;

    // Problem registry template (external tooling owns the entries)
    ensure_file(
        &root.join("registry"),
        "problems.yaml",
        Some(DEFAULT_PROBLEMS_YAML),
        &mut created,
        &mut existed,
    )?;

    // Logbook (per-stream JSONL)
    initialize_logbook_files(root, &mut created, &mut existed)?;

    Ok(InitReport {
        root: root.to_path_buf(),
        created,
        existed,
    })
}

fn ensure_dir(
    base: &Path,
    rel: &str,
    created: &mut Vec<String>,
    existed: &mut Vec<String>,
) -> Result<()> {
    let p = if rel.is_empty() {
        base.to_path_buf()
    } else {
        base.join(rel)
    };
    if p.exists() {
        existed.push(if rel.is_empty() {
            ".".to_string()
        } else {
            rel.to_string()
        });
        return Ok(());
    }
    fs::create_dir_all(&p).with_context(|| format!("create_dir_all({:?})", p))?;
    created.push(if rel.is_empty() {
        ".".to_string()
    } else {
        rel.to_string()
    });
    Ok(())
}

fn ensure_file(
    base: &Path,
    rel_file: &str,
    content_if_absent: Option<&str>,
    created: &mut Vec<String>,
    existed: &mut Vec<String>,
) -> Result<()> {
    let p = base.join(rel_file);
    if p.exists() {
        existed.push(rel_file.to_string());
        return Ok(());
    }
    if let Some(text) = content_if_absent {
        write_atomic(&p, text.as_bytes())?;
    } else {
        write_atomic(&p, b"")?;
    }
    created.push(rel_file.to_string());
    Ok(())
}

fn ensure_seeded_jsonl(
    dir: &Path,
    file: &str,
    init_line: &str,
    created: &mut Vec<String>,
    existed: &mut Vec<String>,
) -> Result<()> {
    let p = dir.join(file);
    if !p.exists() {
        ensure_file(dir, file, Some(&(init_line.to_string() + "\n")), created, existed)?;
        return Ok(());
    }
    existed.push(file.to_string());
    // If exists but empty, seed it
    if fs::metadata(&p)?.len() == 0 {
        let mut f = OpenOptions::new().append(true).open(&p)?;
        f.write_all(init_line.as_bytes())?;
        f.write_all(b"\n")?;
    }
    Ok(())
}

fn initialize_logbook_files(
    root: &Path,
    created: &mut Vec<String>,
    existed: &mut Vec<String>,
) -> Result<()> {
    let ts = Utc::now().to_rfc3339();
    let init_event = format!(
        r#"{{"timestamp":"{}","event":"system_init","agent":"system","data":{{"version":"0.1.0"}}}}"#,
        ts
    );
    let log_dir = root.join("logbook");
    ensure_seeded_jsonl(&log_dir, "actions.jsonl", &init_event, created, existed)?;
    Ok(())
}

// ---------- defaults ----------

const DEFAULT_CONFIG_TOML: &str = r#"[system]
name = "vigil"
version = "0.1.0"

[feeds]
dir = "feeds"
market_file = "feeds/market-intel/signals.jsonl"
ideas_file = "feeds/agent-ideas/ideas.jsonl"
project_file = "feeds/project-intel/signals.jsonl"

[registry]
path = "registry/problems.yaml"

[pipeline]
cursor_path = "state/last-run"
artifact_path = "out/pending-proposals.md"
window_days = 7
max_records = 200
grace_hours = 25

[reasoner]
api_url = "https://api.anthropic.com/v1/messages"
model = "claude-haiku-4-5-20251001"
max_tokens = 600
timeout_secs = 20
api_key_env = "ANTHROPIC_API_KEY"

[briefing]
market_days = 3
market_limit = 30
idea_days = 7
idea_limit = 10
project_days = 7
project_limit = 20

[logbook]
actions = "logbook/actions.jsonl"

[services]
audit_enabled = true
sync_enabled = false
"#;

const DEFAULT_PROBLEMS_YAML: &str = r#"# Known-problem registry. Entries are owned by external tooling; the
# pipeline only reads problems with status open or monitoring.
#
# - id: KE-001
#   problem: one-line description of what hurts
#   status: open          # open | monitoring | resolved
#   priority: P2          # P1 | P2 | P3
[]
"#;
