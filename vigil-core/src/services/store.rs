// src/services/store.rs
//! Record store reader: bounded, time-windowed slices of a line-delimited
//! feed file.
//!
//! The read policy is deliberately asymmetric: keep the newest qualifying
//! records, silently drop the oldest and anything malformed. Feed files grow
//! without bound; this is what keeps every read cheap regardless of history.

use chrono::{Duration, Utc};
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};

use crate::records::FeedRecord;

/// Reader over one append-only feed file. Never writes.
#[derive(Debug, Clone)]
pub struct FeedStore {
    path: PathBuf,
}

impl FeedStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Records from the last `days` days, at most `limit` of them.
    ///
    /// Lines that fail to parse or carry an invalid timestamp are skipped.
    /// When more than `limit` records qualify, the earliest-in-window ones
    /// are dropped; feed files are chronological by append, so the tail of
    /// the file wins. A missing feed file yields an empty vec.
    pub fn load_recent<T>(&self, days: i64, limit: usize) -> Vec<T>
    where
        T: DeserializeOwned + FeedRecord,
    {
        let Ok(text) = fs::read_to_string(&self.path) else {
            return Vec::new();
        };
        let cutoff = Utc::now() - Duration::days(days);
        let mut records: Vec<T> = Vec::new();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let Ok(record) = serde_json::from_str::<T>(line) else {
                continue;
            };
            let Some(ts) = record.timestamp() else {
                continue;
            };
            if ts >= cutoff {
                records.push(record);
            }
        }
        if records.len() > limit {
            records.drain(..records.len() - limit);
        }
        records
    }
}

/// Lexically-latest file in `dir` matching `prefix`/`suffix`, if any.
/// Used for `weekly-*.md` digests and `freq-*.json` snapshots, whose names
/// embed a sortable date.
pub fn latest_matching(dir: &Path, prefix: &str, suffix: &str) -> Option<PathBuf> {
    let entries = fs::read_dir(dir).ok()?;
    let mut paths: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with(prefix) && n.ends_with(suffix))
        })
        .collect();
    paths.sort();
    paths.pop()
}
