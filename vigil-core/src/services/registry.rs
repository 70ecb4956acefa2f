// src/services/registry.rs
//! Open-problem registry reader.
//!
//! The registry is a YAML list owned by external tooling; the core only ever
//! reads it, and only cares about problems still worth matching against
//! (status open or monitoring). A malformed or missing registry degrades to
//! "no active problems": a benign no-op run, not a failure.

use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

use crate::records::Priority;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProblemStatus {
    Open,
    Monitoring,
    Resolved,
    #[serde(other)]
    Unknown,
}

impl Default for ProblemStatus {
    fn default() -> Self {
        ProblemStatus::Unknown
    }
}

/// One known problem, as recorded by external tooling.
#[derive(Debug, Clone, Deserialize)]
pub struct Problem {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub problem: String,
    #[serde(default)]
    pub status: ProblemStatus,
    #[serde(default)]
    pub priority: Priority,
}

impl Problem {
    pub fn is_active(&self) -> bool {
        matches!(self.status, ProblemStatus::Open | ProblemStatus::Monitoring)
    }

    pub fn status_str(&self) -> &'static str {
        match self.status {
            ProblemStatus::Open => "open",
            ProblemStatus::Monitoring => "monitoring",
            ProblemStatus::Resolved => "resolved",
            ProblemStatus::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProblemRegistry {
    path: PathBuf,
}

impl ProblemRegistry {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Problems eligible for matching. Missing file or parse failure → empty.
    pub fn load_active(&self) -> Vec<Problem> {
        let Ok(text) = fs::read_to_string(&self.path) else {
            return Vec::new();
        };
        match serde_yaml::from_str::<Vec<Problem>>(&text) {
            Ok(problems) => problems.into_iter().filter(Problem::is_active).collect(),
            Err(err) => {
                tracing::warn!("problem registry unreadable, treating as empty: {err}");
                Vec::new()
            }
        }
    }
}
