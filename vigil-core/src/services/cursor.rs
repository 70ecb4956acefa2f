// src/services/cursor.rs
//! Run cursor: the persisted boundary between already-processed and new
//! records.
//!
//! The cursor is an explicit, path-injected value: read at the start of a
//! run, advanced exactly once at the end, after all other work for the run
//! has been attempted. A crash mid-run leaves it untouched, so the next run
//! reprocesses whatever was in flight (at-least-once, never lost work).

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use std::fs;
use std::path::PathBuf;

use crate::records::parse_ts;
use crate::utils::fsx::write_atomic;

#[derive(Debug, Clone)]
pub struct RunCursor {
    path: PathBuf,
    grace: Duration,
}

impl RunCursor {
    pub fn new(path: impl Into<PathBuf>, grace_hours: i64) -> Self {
        Self {
            path: path.into(),
            grace: Duration::hours(grace_hours),
        }
    }

    /// The instant of the last completed run. Absent or corrupt state
    /// defaults to now minus the grace period, so a fresh deployment does
    /// not reprocess the entire feed history.
    pub fn last_run(&self) -> DateTime<Utc> {
        self.persisted().unwrap_or_else(|| Utc::now() - self.grace)
    }

    /// Persist the end-of-run instant. Monotonic: never moves the cursor
    /// backward, even if the wall clock drifted below the stored value.
    pub fn advance(&self) -> Result<DateTime<Utc>> {
        let now = Utc::now();
        let target = match self.persisted() {
            Some(prev) if prev > now => prev,
            _ => now,
        };
        write_atomic(&self.path, target.to_rfc3339().as_bytes())?;
        Ok(target)
    }

    fn persisted(&self) -> Option<DateTime<Utc>> {
        let text = fs::read_to_string(&self.path).ok()?;
        parse_ts(text.trim())
    }
}
