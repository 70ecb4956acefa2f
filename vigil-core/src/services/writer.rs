// src/services/writer.rs
//! Proposal writer: appends one dated section per run to the proposal
//! artifact.
//!
//! The artifact is append-only from the core's perspective; prior content is
//! never rewritten. The merged document goes through a temp-file rename, so
//! an I/O failure leaves either the old file or the complete new one; a
//! partially-written section cannot be observed.

use anyhow::Result;
use chrono::{DateTime, Utc};
use std::fs;
use std::path::{Path, PathBuf};

use crate::services::synthesizer::Proposal;
use crate::utils::fsx::write_atomic;

#[derive(Debug, Clone)]
pub struct ProposalWriter {
    path: PathBuf,
}

impl ProposalWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append the run's accepted proposals as a single dated section, in the
    /// order produced. An empty batch leaves the artifact byte-for-byte
    /// untouched, with no empty section headers. Returns the number written.
    pub fn append_batch(&self, proposals: &[Proposal], now: DateTime<Utc>) -> Result<usize> {
        if proposals.is_empty() {
            return Ok(0);
        }

        let mut lines = vec![format!(
            "\n## Matched proposals — {}\n",
            now.format("%Y-%m-%d %H:%M")
        )];
        for p in proposals {
            lines.push(format!("### {}", p.title));
            lines.push(format!(
                "**Priority**: {} | **Effort**: {}",
                p.priority.as_str(),
                p.effort.as_str()
            ));
            if let Some(pain_id) = &p.pain_id {
                lines.push(format!("**Closes**: {} — {}", pain_id, p.pain_summary));
            }
            lines.push(format!(
                "**Idea**: *{}* ({})",
                p.idea.pattern,
                p.idea.category.as_str()
            ));
            lines.push(format!("> {}", p.idea.insight));
            lines.push(String::new());
            lines.push(format!("**Proposal**: {}", p.body));
            lines.push(String::new());
            lines.push("---".to_string());
            lines.push(String::new());
        }
        let block = lines.join("\n");

        let merged = match fs::read_to_string(&self.path) {
            Ok(current) => format!("{}\n{}", current.trim_end(), block),
            Err(_) => block.trim_start().to_string(),
        };
        write_atomic(&self.path, merged.as_bytes())?;
        Ok(proposals.len())
    }
}
