//! Token-overlap ranking over the page index.
//!
//! Pure and deterministic: the same query over the same records always
//! yields the same ordered output. All matching is case-insensitive
//! substring containment; there is no stemming, Unicode normalization or
//! typo tolerance.

use serde::{Deserialize, Serialize};

use crate::pages::SearchRecord;

/// Maximum number of records returned for any query.
pub const MAX_RESULTS: usize = 12;

/// Per-field score contributions.
///
/// The defaults are fixed product constants with no derivation behind them;
/// they can be overridden from the `[weights]` config section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    /// Whole query equals the title.
    pub exact_title: u32,
    /// Title starts with the whole query.
    pub title_prefix: u32,
    /// Title contains the whole query.
    pub title_contains: u32,
    /// Per token found in the title.
    pub token_title: u32,
    /// Per token found in any tag.
    pub token_tag: u32,
    /// Whole query found in the category.
    pub category_contains: u32,
    /// Per token found in the category.
    pub token_category: u32,
    /// Per token found in the description.
    pub token_description: u32,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            exact_title: 100,
            title_prefix: 50,
            title_contains: 30,
            token_title: 20,
            token_tag: 15,
            category_contains: 15,
            token_category: 10,
            token_description: 5,
        }
    }
}

/// A query normalized once for scoring against many records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedQuery {
    /// Lowercased and trimmed.
    pub normalized: String,
    /// Whitespace-separated pieces of `normalized`.
    pub tokens: Vec<String>,
}

impl ParsedQuery {
    /// Returns `None` for an empty or whitespace-only query.
    pub fn parse(query: &str) -> Option<Self> {
        let normalized = query.to_lowercase().trim().to_string();
        if normalized.is_empty() {
            return None;
        }
        let tokens = normalized.split_whitespace().map(str::to_string).collect();
        Some(Self { normalized, tokens })
    }
}

/// A record paired with its score for one query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoredMatch<'a> {
    pub record: &'a SearchRecord,
    /// Position of the record in the source slice.
    pub position: usize,
    pub score: u32,
}

/// Scores and orders records with a fixed set of weights.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ranker {
    weights: ScoreWeights,
}

impl Ranker {
    pub fn new(weights: ScoreWeights) -> Self {
        Self { weights }
    }

    /// Score a single record. Zero means "not a match".
    ///
    /// Sums saturate at `u32::MAX`, so oversized configured weights cap
    /// the score instead of overflowing.
    pub fn score(&self, query: &ParsedQuery, record: &SearchRecord) -> u32 {
        let w = &self.weights;
        let q = query.normalized.as_str();
        let title = record.title.to_lowercase();
        let category = record.category.to_lowercase();
        let description = record
            .description
            .as_deref()
            .map(str::to_lowercase)
            .unwrap_or_default();
        let tags: Vec<String> = record.tags.iter().map(|t| t.to_lowercase()).collect();

        let mut score = 0u32;

        if title == q {
            score = score.saturating_add(w.exact_title);
        } else if title.starts_with(q) {
            score = score.saturating_add(w.title_prefix);
        } else if title.contains(q) {
            score = score.saturating_add(w.title_contains);
        }

        for token in &query.tokens {
            let token = token.as_str();
            if title.contains(token) {
                score = score.saturating_add(w.token_title);
            }
            if category.contains(token) {
                score = score.saturating_add(w.token_category);
            }
            if description.contains(token) {
                score = score.saturating_add(w.token_description);
            }
            if tags.iter().any(|t| t.contains(token)) {
                score = score.saturating_add(w.token_tag);
            }
        }

        if category.contains(q) {
            score = score.saturating_add(w.category_contains);
        }

        score
    }

    /// Rank `records` against `query`, keeping scores.
    ///
    /// Records scoring zero are dropped, the rest are ordered by descending
    /// score with ties kept in source order, and at most [`MAX_RESULTS`]
    /// are returned. An empty or blank query yields nothing.
    pub fn rank_scored<'a>(
        &self,
        query: &str,
        records: &'a [SearchRecord],
    ) -> Vec<ScoredMatch<'a>> {
        let Some(parsed) = ParsedQuery::parse(query) else {
            return Vec::new();
        };

        let mut matches: Vec<ScoredMatch<'a>> = records
            .iter()
            .enumerate()
            .filter_map(|(position, record)| {
                let score = self.score(&parsed, record);
                (score > 0).then_some(ScoredMatch {
                    record,
                    position,
                    score,
                })
            })
            .collect();

        // `sort_by` is stable, so source order breaks ties.
        matches.sort_by(|a, b| b.score.cmp(&a.score));
        matches.truncate(MAX_RESULTS);
        matches
    }

    /// Rank `records` against `query`, returning only the records.
    pub fn rank<'a>(&self, query: &str, records: &'a [SearchRecord]) -> Vec<&'a SearchRecord> {
        self.rank_scored(query, records)
            .into_iter()
            .map(|m| m.record)
            .collect()
    }
}

/// Rank with the default weights.
pub fn rank<'a>(query: &str, records: &'a [SearchRecord]) -> Vec<&'a SearchRecord> {
    Ranker::default().rank(query, records)
}
