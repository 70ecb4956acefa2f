// src/services/briefing.rs
//! Briefing composer: one bounded document merging the ranked,
//! time-windowed views of every feed.
//!
//! Purely read/format: no state is touched, so composing twice is always
//! safe. Short mode halves the per-section entry budget; the trailing
//! context block is a compact machine-readable summary for whatever system
//! injects the briefing downstream.

use chrono::Utc;
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;

use crate::config::BriefingConfig;
use crate::records::{Direction, IdeaRecord, ProjectRecord, SignalRecord, Urgency};
use crate::services::ranker::{CATEGORY_RANKS, sort_ranked};
use crate::services::store::{FeedStore, latest_matching};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BriefingMode {
    Short,
    Full,
}

/// Latest `freq-*.json` snapshot in the market feed directory, produced by
/// the weekly frequency analysis of an external collector.
#[derive(Debug, Clone, Deserialize)]
struct FreqSnapshot {
    #[serde(default)]
    rising: Vec<FreqTerm>,
}

#[derive(Debug, Clone, Deserialize)]
struct FreqTerm {
    #[serde(default)]
    term: String,
    #[serde(default)]
    label: String,
}

pub struct BriefingComposer {
    market: FeedStore,
    ideas: FeedStore,
    project: FeedStore,
    market_dir: Option<PathBuf>,
    cfg: BriefingConfig,
}

impl BriefingComposer {
    pub fn new(market: FeedStore, ideas: FeedStore, project: FeedStore, cfg: BriefingConfig) -> Self {
        let market_dir = market.path().parent().map(|p| p.to_path_buf());
        Self {
            market,
            ideas,
            project,
            market_dir,
            cfg,
        }
    }

    pub fn compose(&self, mode: BriefingMode) -> String {
        let short = mode == BriefingMode::Short;
        let market: Vec<SignalRecord> = self
            .market
            .load_recent(self.cfg.market_days, self.cfg.market_limit);
        let ideas: Vec<IdeaRecord> = self.ideas.load_recent(self.cfg.idea_days, self.cfg.idea_limit);
        let project: Vec<ProjectRecord> = self
            .project
            .load_recent(self.cfg.project_days, self.cfg.project_limit);

        let now = Utc::now();
        let mut lines = vec![format!("# Briefing — {}\n", now.format("%d %b %Y, %H:%M"))];

        self.market_section(&mut lines, &market, short);
        self.project_section(&mut lines, &project, short);
        self.idea_section(&mut lines, &ideas, short);
        if !short {
            self.freq_section(&mut lines);
        }
        self.context_trailer(&mut lines, &market, &ideas, &project);

        lines.join("\n")
    }

    fn market_section(&self, lines: &mut Vec<String>, market: &[SignalRecord], short: bool) {
        let relevant: Vec<&SignalRecord> = market.iter().filter(|s| s.relevant).collect();
        lines.push(format!(
            "## 📡 Market — {} signals, {} relevant\n",
            market.len(),
            relevant.len()
        ));
        if market.is_empty() {
            lines.push("(no market signals yet — the collector has not run)".to_string());
            return;
        }

        let limit = if short { 3 } else { 6 };
        let mut shown: HashSet<&str> = HashSet::new();

        let fresh: Vec<&&SignalRecord> = relevant
            .iter()
            .filter(|s| s.direction == Direction::New)
            .collect();
        if !fresh.is_empty() {
            lines.push("★ NEW:".to_string());
            for s in fresh.iter().take(2) {
                if shown.insert(s.topic.as_str()) {
                    lines.push(format!("  {}: {}", s.topic, clip(&s.signal, 90)));
                }
            }
        }

        let rising: Vec<&&SignalRecord> = relevant
            .iter()
            .filter(|s| s.direction == Direction::Rising)
            .collect();
        if !rising.is_empty() {
            lines.push("↑ RISING:".to_string());
            for s in rising.iter().take(limit) {
                if shown.insert(s.topic.as_str()) {
                    lines.push(format!("  {}: {}", s.topic, clip(&s.signal, 90)));
                }
            }
        }

        if !short {
            let declining: Vec<&SignalRecord> = market
                .iter()
                .filter(|s| s.direction == Direction::Declining)
                .collect();
            if !declining.is_empty() {
                lines.push("↓ Losing weight:".to_string());
                for s in declining.iter().take(2) {
                    lines.push(format!("  {}: {}", s.topic, clip(&s.signal, 70)));
                }
            }
        }
    }

    fn project_section(&self, lines: &mut Vec<String>, project: &[ProjectRecord], short: bool) {
        if project.is_empty() {
            return;
        }
        lines.push(format!("\n## 🏗 Project — {} signals\n", project.len()));

        let urgent: Vec<&ProjectRecord> = project
            .iter()
            .filter(|s| s.urgency == Urgency::Now)
            .collect();
        if !urgent.is_empty() {
            lines.push("⚡ URGENT:".to_string());
            for s in urgent.iter().take(2) {
                lines.push(format!("  {}", clip(&s.impact, 90)));
                lines.push(format!("  → {}", clip(&s.idea, 80)));
            }
        }
        if !short {
            let weekly: Vec<&ProjectRecord> = project
                .iter()
                .filter(|s| s.urgency == Urgency::Week)
                .collect();
            for s in weekly.iter().take(3) {
                lines.push(format!("  📡 {}", clip(&s.trend, 90)));
            }
            let strategic: Vec<&ProjectRecord> = project
                .iter()
                .filter(|s| s.urgency == Urgency::Month)
                .collect();
            for s in strategic.iter().take(4) {
                lines.push(format!("  🔭 {}", clip(&s.trend, 85)));
            }
        }
    }

    fn idea_section(&self, lines: &mut Vec<String>, ideas: &[IdeaRecord], short: bool) {
        if ideas.is_empty() {
            return;
        }
        let mut ranked: Vec<&IdeaRecord> = ideas.iter().collect();
        sort_ranked(&mut ranked, &CATEGORY_RANKS, |i| i.category.as_str());

        lines.push(format!("\n## 💡 Agent — {} insights\n", ideas.len()));
        let budget = if short { 3 } else { 6 };
        let mut current_category = "";
        let mut shown = 0usize;
        let mut in_category = 0usize;
        for idea in ranked {
            if shown >= budget {
                break;
            }
            let cat = idea.category.as_str();
            if cat != current_category {
                current_category = cat;
                in_category = 0;
                lines.push(format!("  [{cat}]"));
            }
            if in_category >= 2 {
                continue;
            }
            lines.push(format!("  **{}**: {}", idea.pattern, clip(&idea.insight, 100)));
            shown += 1;
            in_category += 1;
        }
    }

    fn freq_section(&self, lines: &mut Vec<String>) {
        let Some(dir) = &self.market_dir else {
            return;
        };
        let Some(path) = latest_matching(dir, "freq-", ".json") else {
            return;
        };
        let Ok(text) = fs::read_to_string(&path) else {
            return;
        };
        let Ok(snapshot) = serde_json::from_str::<FreqSnapshot>(&text) else {
            return;
        };
        if snapshot.rising.is_empty() {
            return;
        }
        lines.push("\n📈 Terms of the week:".to_string());
        for t in snapshot.rising.iter().take(6) {
            lines.push(format!("  {:<28} {}", t.term, t.label));
        }
    }

    fn context_trailer(
        &self,
        lines: &mut Vec<String>,
        market: &[SignalRecord],
        ideas: &[IdeaRecord],
        project: &[ProjectRecord],
    ) {
        if !market.is_empty() {
            let mut seen = HashSet::new();
            let topics: Vec<&str> = market
                .iter()
                .filter(|s| s.relevant && !s.topic.is_empty())
                .map(|s| s.topic.as_str())
                .filter(|t| seen.insert(*t))
                .take(5)
                .collect();
            lines.push(format!("\nContext: {}", topics.join(", ")));
            if !ideas.is_empty() {
                let patterns: Vec<&str> = ideas
                    .iter()
                    .take(3)
                    .map(|i| i.pattern.as_str())
                    .filter(|p| !p.is_empty())
                    .collect();
                lines.push(format!("Insights available: {}", patterns.join(", ")));
            }
        }
        let urgent: Vec<&str> = project
            .iter()
            .filter(|s| s.urgency == Urgency::Now && !s.idea.is_empty())
            .map(|s| s.idea.as_str())
            .take(2)
            .collect();
        if !urgent.is_empty() {
            lines.push(format!("Project urgent: {}", urgent.join(" | ")));
        }
    }
}

/// Truncate on a char boundary; feeds carry arbitrary UTF-8.
fn clip(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        s.chars().take(max_chars).collect()
    }
}
