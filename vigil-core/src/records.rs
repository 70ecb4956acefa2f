// src/records.rs
//! Typed feed records plus the timestamp contract every feed shares.
//!
//! Validation happens here, at the read boundary: collectors write loosely
//! shaped JSON lines, so every field is defensively defaulted and unknown
//! categorical values land on an explicit `Unknown` variant instead of
//! failing the whole line. A record whose timestamp does not parse is
//! dropped by the store, never surfaced to consumers.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Parse a feed timestamp. Accepts RFC 3339; collectors on some hosts write
/// naive local ISO stamps, which are treated as UTC.
pub fn parse_ts(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Anything read out of a line-delimited feed file.
pub trait FeedRecord {
    fn ts_raw(&self) -> &str;

    fn timestamp(&self) -> Option<DateTime<Utc>> {
        parse_ts(self.ts_raw())
    }
}

// -------------------------------------------------------------------------
// Categorical fields
// -------------------------------------------------------------------------

/// Market-signal trajectory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    New,
    Rising,
    Maturing,
    Declining,
    #[serde(other)]
    Unknown,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::New => "new",
            Direction::Rising => "rising",
            Direction::Maturing => "maturing",
            Direction::Declining => "declining",
            Direction::Unknown => "unknown",
        }
    }

    /// Glyph used by briefings and feed reports.
    pub fn icon(&self) -> &'static str {
        match self {
            Direction::New => "★",
            Direction::Rising => "↑",
            Direction::Maturing => "→",
            Direction::Declining => "↓",
            Direction::Unknown => "·",
        }
    }
}

impl Default for Direction {
    fn default() -> Self {
        Direction::Unknown
    }
}

/// Idea-record taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Memory,
    Coordination,
    Autonomy,
    Tools,
    Cost,
    Reasoning,
    Meta,
    #[serde(other)]
    Unknown,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Memory => "memory",
            Category::Coordination => "coordination",
            Category::Autonomy => "autonomy",
            Category::Tools => "tools",
            Category::Cost => "cost",
            Category::Reasoning => "reasoning",
            Category::Meta => "meta",
            Category::Unknown => "unknown",
        }
    }
}

impl Default for Category {
    fn default() -> Self {
        Category::Unknown
    }
}

/// Project-signal horizon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Now,
    Week,
    Month,
    #[serde(other)]
    Unknown,
}

impl Urgency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Urgency::Now => "now",
            Urgency::Week => "week",
            Urgency::Month => "month",
            Urgency::Unknown => "unknown",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Urgency::Now => "⚡",
            Urgency::Week => "📡",
            Urgency::Month => "🔭",
            Urgency::Unknown => "·",
        }
    }

    /// Lenient parse for CLI filters; `None` for anything unrecognized.
    pub fn parse(raw: &str) -> Option<Urgency> {
        match raw {
            "now" => Some(Urgency::Now),
            "week" => Some(Urgency::Week),
            "month" => Some(Urgency::Month),
            _ => None,
        }
    }
}

impl Default for Urgency {
    fn default() -> Self {
        Urgency::Unknown
    }
}

/// Problem/proposal priority. Unrecognized values fall back to P3; the
/// registry and the reasoning service are both outside our control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Priority {
    P1,
    P2,
    #[serde(other)]
    P3,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::P1 => "P1",
            Priority::P2 => "P2",
            Priority::P3 => "P3",
        }
    }
}

impl Default for Priority {
    fn default() -> Self {
        Priority::P3
    }
}

/// Implementation effort as estimated by the reasoning service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Effort {
    Low,
    Medium,
    High,
    #[serde(other)]
    Unspecified,
}

impl Effort {
    pub fn as_str(&self) -> &'static str {
        match self {
            Effort::Low => "low",
            Effort::Medium => "medium",
            Effort::High => "high",
            Effort::Unspecified => "?",
        }
    }
}

impl Default for Effort {
    fn default() -> Self {
        Effort::Unspecified
    }
}

// -------------------------------------------------------------------------
// Records
// -------------------------------------------------------------------------

/// One market-intel observation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalRecord {
    #[serde(default)]
    pub ts: String,
    #[serde(default)]
    pub topic: String,
    #[serde(default)]
    pub signal: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub direction: Direction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(default)]
    pub relevant: bool,
}

impl FeedRecord for SignalRecord {
    fn ts_raw(&self) -> &str {
        &self.ts
    }
}

/// One agent-improvement idea distilled by a collector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdeaRecord {
    #[serde(default)]
    pub ts: String,
    #[serde(default)]
    pub pattern: String,
    #[serde(default)]
    pub category: Category,
    #[serde(default)]
    pub insight: String,
    #[serde(default)]
    pub source: String,
}

impl FeedRecord for IdeaRecord {
    fn ts_raw(&self) -> &str {
        &self.ts
    }
}

/// One project-intel signal: a trend, its impact, and the suggested move.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectRecord {
    #[serde(default)]
    pub ts: String,
    #[serde(default)]
    pub urgency: Urgency,
    #[serde(default)]
    pub impact: String,
    #[serde(default)]
    pub trend: String,
    #[serde(default)]
    pub idea: String,
    #[serde(default)]
    pub source: String,
}

impl FeedRecord for ProjectRecord {
    fn ts_raw(&self) -> &str {
        &self.ts
    }
}
