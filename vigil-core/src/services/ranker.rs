// src/services/ranker.rs
//! Priority ranking over feed records.
//!
//! Every taxonomy lives here as a named, versioned rank table; consumers
//! never inline their own orderings. Sorting is stable, so records sharing a
//! rank keep their chronological (arrival) order. No randomness, no
//! secondary tie-break.

/// Rank assigned to values a table does not know about. Always sorts last.
pub const UNRANKED: u8 = 9;

/// Explicit mapping from a categorical field value to an integer rank.
#[derive(Debug)]
pub struct RankTable {
    pub name: &'static str,
    entries: &'static [(&'static str, u8)],
}

impl RankTable {
    pub const fn new(name: &'static str, entries: &'static [(&'static str, u8)]) -> Self {
        Self { name, entries }
    }

    pub fn rank(&self, value: &str) -> u8 {
        self.entries
            .iter()
            .find(|(v, _)| *v == value)
            .map(|(_, r)| *r)
            .unwrap_or(UNRANKED)
    }
}

pub static DIRECTION_RANKS: RankTable = RankTable::new(
    "direction/v1",
    &[("new", 0), ("rising", 1), ("maturing", 2), ("declining", 3)],
);

pub static CATEGORY_RANKS: RankTable = RankTable::new(
    "category/v1",
    &[
        ("memory", 0),
        ("coordination", 1),
        ("autonomy", 2),
        ("tools", 3),
        ("cost", 4),
        ("reasoning", 5),
        ("meta", 6),
    ],
);

pub static URGENCY_RANKS: RankTable = RankTable::new(
    "urgency/v1",
    &[("now", 0), ("week", 1), ("month", 2)],
);

/// Stable ascending sort by table rank; `key` extracts the categorical value.
pub fn sort_ranked<T, F>(records: &mut [T], table: &RankTable, key: F)
where
    F: Fn(&T) -> &str,
{
    records.sort_by(|a, b| table.rank(key(a)).cmp(&table.rank(key(b))));
}
