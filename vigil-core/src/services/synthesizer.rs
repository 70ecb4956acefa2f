// src/services/synthesizer.rs
//! Match synthesizer: pairs one fresh idea record with the active problem
//! set and asks the reasoning service whether the idea concretely closes one
//! of the problems.
//!
//! Acceptance hangs entirely on the service's self-reported `match` boolean.
//! The instruction text tells it to decline unless the connection is real,
//! and we take that verbatim: an explicit trust boundary, not a validation
//! gap to be patched here. Per-record failures produce nothing and never
//! abort the batch.

use serde::Deserialize;

use crate::records::{Effort, IdeaRecord, Priority};
use crate::services::reasoner::{Reasoner, decode_fenced_json};
use crate::services::registry::Problem;

/// Fixed instruction contract for the reasoning service. The reply must be a
/// single JSON object; anything else is discarded by the decoder.
const INSTRUCTION: &str = r#"You are the workspace architect for an autonomous agent.

Your task: compare one idea from the feed against the agent's known open
problems and, when one genuinely applies, produce a concrete implementation
proposal.

Reply with exactly one JSON object:
{
  "match": true/false,
  "pain_id": "the problem id, or null",
  "pain_summary": "one sentence - what hurts",
  "proposal_title": "proposal name (3-5 words)",
  "proposal": "2-4 sentences - what to do concretely and the expected result",
  "effort": "low|medium|high",
  "priority": "P1|P2|P3"
}

Set match=true only if the idea REALLY closes the problem. Do not force a
connection."#;

/// Parsed service reply. Every field is defaulted so a sloppy reply still
/// decodes; the `match` gate below is what decides acceptance.
#[derive(Debug, Clone, Deserialize)]
pub struct MatchVerdict {
    #[serde(rename = "match", default)]
    pub matched: bool,
    #[serde(default)]
    pub pain_id: Option<String>,
    #[serde(default)]
    pub pain_summary: String,
    #[serde(default)]
    pub proposal_title: String,
    #[serde(default)]
    pub proposal: String,
    #[serde(default)]
    pub effort: Effort,
    #[serde(default)]
    pub priority: Priority,
}

/// An accepted match, ready for the proposal writer. Append-only once
/// created; nothing mutates a proposal after synthesis.
#[derive(Debug, Clone)]
pub struct Proposal {
    pub idea: IdeaRecord,
    pub pain_id: Option<String>,
    pub pain_summary: String,
    pub title: String,
    pub body: String,
    pub effort: Effort,
    pub priority: Priority,
}

pub struct MatchSynthesizer<'a> {
    reasoner: &'a dyn Reasoner,
    problems: &'a [Problem],
}

impl<'a> MatchSynthesizer<'a> {
    pub fn new(reasoner: &'a dyn Reasoner, problems: &'a [Problem]) -> Self {
        Self { reasoner, problems }
    }

    /// One idea in, at most one proposal out. Timeout, network failure,
    /// empty reply, undecodable reply and `match=false` all yield `None`.
    pub fn match_idea(&self, idea: &IdeaRecord) -> Option<Proposal> {
        let prompt = self.render_prompt(idea);
        let raw = self.reasoner.complete(INSTRUCTION, &prompt)?;
        let verdict: MatchVerdict = decode_fenced_json(&raw)?;
        if !verdict.matched {
            return None;
        }
        let title = if verdict.proposal_title.is_empty() {
            idea.pattern.clone()
        } else {
            verdict.proposal_title
        };
        Some(Proposal {
            idea: idea.clone(),
            pain_id: verdict.pain_id.filter(|id| !id.is_empty()),
            pain_summary: verdict.pain_summary,
            title,
            body: verdict.proposal,
            effort: verdict.effort,
            priority: verdict.priority,
        })
    }

    fn render_prompt(&self, idea: &IdeaRecord) -> String {
        let problems = self
            .problems
            .iter()
            .map(|p| {
                format!(
                    "- {}: {} [status={}, priority={}]",
                    p.id,
                    p.problem,
                    p.status_str(),
                    p.priority.as_str()
                )
            })
            .collect::<Vec<_>>()
            .join("\n");
        format!(
            "Idea from the feed:\n\
             Pattern: {}\n\
             Insight: {}\n\
             Category: {}\n\
             Source: {}\n\n\
             Known open problems:\n{}\n\n\
             Is there a match? If so, generate a proposal.",
            idea.pattern,
            idea.insight,
            idea.category.as_str(),
            idea.source,
            problems
        )
    }
}
