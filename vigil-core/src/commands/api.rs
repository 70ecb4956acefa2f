// src/commands/api.rs
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Value, json};
use std::path::PathBuf;
use uuid::Uuid;

use crate::commands::init::ensure_initialized;
use crate::config::CoreConfig;
use crate::records::{FeedRecord, IdeaRecord, ProjectRecord, SignalRecord, Urgency};
use crate::services::audit::record_action;
use crate::services::briefing::{BriefingComposer, BriefingMode};
use crate::services::cursor::RunCursor;
use crate::services::ranker::{CATEGORY_RANKS, DIRECTION_RANKS, URGENCY_RANKS, sort_ranked};
use crate::services::reasoner::Reasoner;
use crate::services::registry::ProblemRegistry;
use crate::services::store::{FeedStore, latest_matching};
use crate::services::sync::WorkspaceSync;
use crate::services::synthesizer::{MatchSynthesizer, Proposal};
use crate::services::writer::ProposalWriter;

/// High-level entry points over one workspace root. Every service gets its
/// paths from the loaded config, nothing global, so tests point a Commands
/// at a temp root and fake the reasoner.
pub struct Commands {
    root: PathBuf,
    config: CoreConfig,
    market: FeedStore,
    ideas: FeedStore,
    project: FeedStore,
    registry: ProblemRegistry,
    writer: ProposalWriter,
}

/// What one pipeline run did, for operators and the logbook.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: String,
    /// Records newer than the cursor that the run looked at.
    pub examined: usize,
    pub matched: usize,
    pub written: usize,
    pub since: DateTime<Utc>,
}

impl Commands {
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        ensure_initialized(&root)?;
        let config = CoreConfig::load(&root)?;
        let market = FeedStore::new(config.feeds.market_file.clone());
        let ideas = FeedStore::new(config.feeds.ideas_file.clone());
        let project = FeedStore::new(config.feeds.project_file.clone());
        let registry = ProblemRegistry::new(config.registry.path.clone());
        let writer = ProposalWriter::new(config.pipeline.artifact_path.clone());
        Ok(Self {
            root,
            config,
            market,
            ideas,
            project,
            registry,
            writer,
        })
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    // ------------------------------------------------------------------
    // Pipeline
    // ------------------------------------------------------------------

    /// One idempotent match-and-synthesize run.
    ///
    /// The cursor narrows the feed slice to records newer than the last
    /// completed run; each of those is matched against the active problem
    /// set through `reasoner`; accepted matches are appended to the
    /// proposal artifact as one batch. The cursor advances only after all
    /// of that has been attempted; a failure writing the artifact leaves
    /// it where it was, so the next run retries the same records.
    pub fn run_pipeline(&self, reasoner: &dyn Reasoner) -> Result<RunReport> {
        let run_id = Uuid::new_v4().to_string();
        let cursor = RunCursor::new(
            self.config.pipeline.cursor_path.clone(),
            self.config.pipeline.grace_hours,
        );
        let since = cursor.last_run();

        let window: Vec<IdeaRecord> = self.ideas.load_recent(
            self.config.pipeline.window_days,
            self.config.pipeline.max_records,
        );
        let fresh: Vec<IdeaRecord> = window
            .into_iter()
            .filter(|r| r.timestamp().is_some_and(|ts| ts > since))
            .collect();

        if fresh.is_empty() {
            tracing::info!("no new ideas since {since}; skipping");
            self.audit(
                "pipeline",
                "run_noop",
                &json!({"run_id": run_id, "since": since.to_rfc3339()}),
                "low",
            );
            cursor.advance()?;
            return Ok(RunReport {
                run_id,
                examined: 0,
                matched: 0,
                written: 0,
                since,
            });
        }

        let problems = self.registry.load_active();
        if problems.is_empty() {
            tracing::info!("no active problems in the registry; nothing to match");
            self.audit(
                "pipeline",
                "run_no_active_problems",
                &json!({"run_id": run_id, "examined": fresh.len()}),
                "low",
            );
            cursor.advance()?;
            return Ok(RunReport {
                run_id,
                examined: fresh.len(),
                matched: 0,
                written: 0,
                since,
            });
        }

        tracing::info!(
            "matching {} ideas against {} active problems",
            fresh.len(),
            problems.len()
        );
        let synthesizer = MatchSynthesizer::new(reasoner, &problems);
        let mut proposals: Vec<Proposal> = Vec::new();
        for idea in &fresh {
            match synthesizer.match_idea(idea) {
                Some(p) => {
                    tracing::info!(
                        "✓ {} → {} [{}]",
                        idea.pattern,
                        p.pain_id.as_deref().unwrap_or("-"),
                        p.priority.as_str()
                    );
                    proposals.push(p);
                }
                None => tracing::debug!("· {} — no match", idea.pattern),
            }
        }

        let matched = proposals.len();
        let written = self.writer.append_batch(&proposals, Utc::now())?;
        if written > 0 {
            self.audit(
                "pipeline",
                "proposals_written",
                &json!({"run_id": run_id, "count": written, "artifact": self.writer.path().display().to_string()}),
                "low",
            );
            if self.config.services.sync_enabled {
                let sync = WorkspaceSync::new(&self.root);
                if let Err(err) = sync.push(&format!("vigil: {written} matched proposals")) {
                    tracing::warn!("workspace sync failed (local writes kept): {err:#}");
                    self.audit(
                        "sync",
                        "push_failed",
                        &json!({"run_id": run_id, "error": err.to_string()}),
                        "medium",
                    );
                }
            }
        }

        cursor.advance()?;
        self.audit(
            "pipeline",
            "run_completed",
            &json!({
                "run_id": run_id,
                "examined": fresh.len(),
                "matched": matched,
                "written": written,
            }),
            "low",
        );
        Ok(RunReport {
            run_id,
            examined: fresh.len(),
            matched,
            written,
            since,
        })
    }

    // ------------------------------------------------------------------
    // Briefing + feed reports (read-only)
    // ------------------------------------------------------------------

    pub fn briefing(&self, mode: BriefingMode) -> String {
        BriefingComposer::new(
            self.market.clone(),
            self.ideas.clone(),
            self.project.clone(),
            self.config.briefing.clone(),
        )
        .compose(mode)
    }

    /// Market signals of the last `days` days, ranked by direction.
    pub fn market_signals(&self, days: i64, limit: usize) -> String {
        let records: Vec<SignalRecord> = self.market.load_recent(days, limit);
        if records.is_empty() {
            return format!("No market signals in the last {days} days.");
        }
        let relevant = records.iter().filter(|r| r.relevant).count();
        let mut ranked: Vec<&SignalRecord> = records.iter().collect();
        sort_ranked(&mut ranked, &DIRECTION_RANKS, |r| r.direction.as_str());

        let mut lines = vec![format!(
            "## Market signals — {} over {} days ({} relevant)\n",
            records.len(),
            days,
            relevant
        )];
        for r in ranked {
            let tick = if r.relevant { " ✓" } else { "" };
            lines.push(format!(
                "{} **{}**{}  ({})",
                r.direction.icon(),
                r.topic,
                tick,
                r.source
            ));
            lines.push(format!("   {}", r.signal));
            if let Some(action) = &r.action {
                lines.push(format!("   → {action}"));
            }
        }
        lines.join("\n")
    }

    /// Agent ideas of the last `days` days, ranked by category.
    pub fn idea_report(&self, days: i64, limit: usize) -> String {
        let records: Vec<IdeaRecord> = self.ideas.load_recent(days, limit);
        if records.is_empty() {
            return format!("No agent ideas in the last {days} days.");
        }
        let mut ranked: Vec<&IdeaRecord> = records.iter().collect();
        sort_ranked(&mut ranked, &CATEGORY_RANKS, |r| r.category.as_str());

        let mut lines = vec![format!("## Agent ideas — {} over {} days\n", records.len(), days)];
        for r in ranked {
            lines.push(format!("**{}** *({})*", r.pattern, r.category.as_str()));
            lines.push(format!("   {}", r.insight));
            lines.push(format!("   Source: {}", r.source));
            lines.push(String::new());
        }
        lines.join("\n")
    }

    /// Project signals of the last `days` days, ranked by urgency, with an
    /// optional urgency filter.
    pub fn project_signals(&self, days: i64, urgency: Option<Urgency>) -> String {
        let records: Vec<ProjectRecord> = self.project.load_recent(days, 30);
        if records.is_empty() {
            return "No project signals yet. They will appear after the next collector run."
                .to_string();
        }
        let mut selected: Vec<&ProjectRecord> = records
            .iter()
            .filter(|r| urgency.is_none_or(|u| r.urgency == u))
            .collect();
        sort_ranked(&mut selected, &URGENCY_RANKS, |r| r.urgency.as_str());

        let mut lines = vec![format!(
            "## Project signals — {} over {} days\n",
            selected.len(),
            days
        )];
        for r in selected {
            lines.push(format!(
                "{} [{}] {}",
                r.urgency.icon(),
                r.urgency.as_str(),
                r.impact
            ));
            lines.push(format!("   Trend: {}", r.trend));
            lines.push(format!("   Idea: {}", r.idea));
            lines.push(format!("   Source: {}", r.source));
            lines.push(String::new());
        }
        lines.join("\n")
    }

    /// Contents of the latest weekly digest in a feed directory.
    pub fn weekly_digest(&self, feed: &str) -> String {
        let dir = self.config.feeds.dir.join(feed);
        if !dir.exists() {
            return format!("Feed '{feed}' not found.");
        }
        let Some(path) = latest_matching(&dir, "weekly-", ".md") else {
            return format!("No weekly digests in {feed} yet.");
        };
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("digest")
            .to_string();
        match std::fs::read_to_string(&path) {
            Ok(text) => format!("## {name}\n\n{text}"),
            Err(_) => format!("No weekly digests in {feed} yet."),
        }
    }

    fn audit(&self, agent: &str, action: &str, details: &Value, severity: &str) {
        if !self.config.services.audit_enabled {
            return;
        }
        record_action(&self.config.logbook.actions, agent, action, details, severity);
    }
}
