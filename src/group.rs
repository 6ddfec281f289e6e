//! Category-grouped view of ranked results.
//!
//! Ranked matches are regrouped by category (categories in order of first
//! appearance, rank order inside each group). Keyboard highlight and click
//! targets both address the flattened concatenation of these groups, so the
//! flat index space is derived from the groups and nothing else.

use crate::pages::SearchRecord;
use crate::rank::ScoredMatch;

/// One entry of the view: an owned copy of a ranked record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultEntry {
    pub record: SearchRecord,
    pub score: u32,
}

/// Results sharing a category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultGroup {
    pub category: String,
    /// Flat index of the first entry in this group.
    pub start: usize,
    pub entries: Vec<ResultEntry>,
}

impl ResultGroup {
    /// Entries paired with their flat index.
    pub fn indexed(&self) -> impl Iterator<Item = (usize, &ResultEntry)> {
        self.entries
            .iter()
            .enumerate()
            .map(move |(offset, entry)| (self.start + offset, entry))
    }
}

/// Grouped results plus the flat index space over them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultView {
    groups: Vec<ResultGroup>,
    len: usize,
}

impl ResultView {
    /// Group ranked matches by category.
    pub fn from_matches(matches: &[ScoredMatch<'_>]) -> Self {
        let mut groups: Vec<ResultGroup> = Vec::new();
        for m in matches {
            let entry = ResultEntry {
                record: m.record.clone(),
                score: m.score,
            };
            match groups.iter().position(|g| g.category == m.record.category) {
                Some(i) => groups[i].entries.push(entry),
                None => groups.push(ResultGroup {
                    category: m.record.category.clone(),
                    start: 0,
                    entries: vec![entry],
                }),
            }
        }

        let mut start = 0;
        for group in &mut groups {
            group.start = start;
            start += group.entries.len();
        }

        Self { groups, len: start }
    }

    pub fn groups(&self) -> &[ResultGroup] {
        &self.groups
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Entry at a flat index.
    pub fn get(&self, index: usize) -> Option<&ResultEntry> {
        self.groups
            .iter()
            .find(|g| index >= g.start && index < g.start + g.entries.len())
            .map(|g| &g.entries[index - g.start])
    }

    /// All entries in flat order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &ResultEntry)> {
        self.groups.iter().flat_map(|g| g.indexed())
    }
}
