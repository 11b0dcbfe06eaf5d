//! Textual relevance between a query and a candidate's names.
//!
//! Tiers are coarse on purpose: exact and prefix matches must always beat
//! loose word overlap, so flagship titles outrank vaguely related entries.

use super::tokenize::{MIN_WORD_LENGTH, match_key, words};
use crate::types::GameCandidate;

pub const EXACT_MATCH: f64 = 100.0;
pub const PREFIX_MATCH: f64 = 80.0;
pub const WORD_MATCH: f64 = 70.0;
pub const SUBSTRING_MATCH: f64 = 60.0;
pub const ALTERNATE_NAME_MATCH: f64 = 50.0;
const OVERLAP_BASE: f64 = 40.0;
const OVERLAP_SPAN: f64 = 20.0;

/// Scores how well `name` (or one of its alternates) matches `query`.
///
/// Returns a value in `0.0..=100.0`. The first matching tier wins:
/// - 100: exact match
/// - 80: name starts with the query
/// - 70: query is one whole word of the name
/// - 60: name contains the query
/// - 40-60: fraction of query words (3+ chars) found among the name's words
/// - 50: an alternate name contains the query
/// - 0: no match
pub fn calculate_relevance(name: &str, alternate_names: &[String], query: &str) -> f64 {
    let query = match_key(query);
    if query.is_empty() {
        return 0.0;
    }
    let name = match_key(name);

    if name == query {
        return EXACT_MATCH;
    }
    if name.starts_with(&query) {
        return PREFIX_MATCH;
    }
    if words(&name).any(|word| word == query) {
        return WORD_MATCH;
    }
    if name.contains(&query) {
        return SUBSTRING_MATCH;
    }

    let overlap = word_overlap(&name, &query);
    if overlap > 0.0 {
        return OVERLAP_BASE + overlap * OVERLAP_SPAN;
    }

    if alternate_names
        .iter()
        .any(|alt| match_key(alt).contains(&query))
    {
        return ALTERNATE_NAME_MATCH;
    }

    0.0
}

/// Fraction of the query's significant words that appear among the name's words.
///
/// A query word matches a name word when either contains the other; short
/// name words ("of", "3") only count in the name-contains-query direction.
fn word_overlap(name: &str, query: &str) -> f64 {
    let query_words: Vec<&str> = words(query)
        .filter(|w| w.len() >= MIN_WORD_LENGTH)
        .collect();
    if query_words.is_empty() {
        return 0.0;
    }

    let name_words: Vec<&str> = words(name).collect();
    let matched = query_words
        .iter()
        .filter(|qw| {
            name_words.iter().any(|nw| {
                nw.contains(**qw) || (nw.len() >= MIN_WORD_LENGTH && qw.contains(*nw))
            })
        })
        .count();

    matched as f64 / query_words.len() as f64
}

/// Best relevance of a candidate across all query variants.
pub fn candidate_relevance(game: &GameCandidate, queries: &[String]) -> f64 {
    queries
        .iter()
        .map(|query| calculate_relevance(&game.name, &game.alternate_names, query))
        .fold(0.0, f64::max)
}
