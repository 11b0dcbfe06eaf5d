//! Flagship detection and the franchise boost.
//!
//! The boost is deliberately large: a flagship of the searched franchise must
//! reach the top of the list whatever the generic relevance and quality
//! scores say about it.

use super::table::{FlagshipEntry, Franchise};
use crate::search::tokenize::{contains_words, match_key};
use crate::types::GameCandidate;

/// Base boost for any flagship match.
pub const FLAGSHIP_BASE: f64 = 100.0;
/// Extra boost for flagships released before 2000.
pub const CLASSIC_BONUS: f64 = 25.0;
const CLASSIC_CUTOFF_YEAR: i32 = 2000;

/// How a candidate name matched an acceptable flagship name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum MatchKind {
    /// The flagship name contains the candidate name.
    Contained,
    /// The candidate name contains the flagship name.
    Contains,
    Exact,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FlagshipBoost {
    pub score: f64,
    pub reason: Option<String>,
}

impl FlagshipBoost {
    const NONE: Self = Self {
        score: 0.0,
        reason: None,
    };
}

/// Finds the flagship entry a candidate name refers to.
///
/// Precedence: exact match, then the candidate containing an acceptable name
/// (longest name wins, so "Super Mario Bros. 3" is not mistaken for
/// "Super Mario Bros."), then an acceptable name containing the candidate
/// name ("Halo" names "Halo: Combat Evolved"). Both containment checks work
/// on whole words, so "Halo" never matches inside "Halogen". Remaining ties go
/// to table order.
pub fn match_flagship<'a>(franchise: &'a Franchise, name: &str) -> Option<&'a FlagshipEntry> {
    let key = match_key(name);
    if key.is_empty() {
        return None;
    }

    let mut best: Option<(MatchKind, usize, &FlagshipEntry)> = None;
    for entry in &franchise.flagships {
        for accepted in &entry.name_keys {
            let kind = if *accepted == key {
                MatchKind::Exact
            } else if contains_words(&key, accepted) {
                MatchKind::Contains
            } else if contains_words(accepted, &key) {
                MatchKind::Contained
            } else {
                continue;
            };

            // Contained matches ignore length so the earliest entry wins.
            let length = if kind == MatchKind::Contained { 0 } else { accepted.len() };
            let candidate = (kind, length, entry);
            best = match best {
                Some(current) if (current.0, current.1) >= (kind, length) => Some(current),
                _ => Some(candidate),
            };
        }
    }

    best.map(|(_, _, entry)| entry)
}

/// Computes the flagship boost for a candidate against the detected franchise.
pub fn flagship_boost(game: &GameCandidate, franchise: Option<&Franchise>) -> FlagshipBoost {
    let Some(franchise) = franchise else {
        return FlagshipBoost::NONE;
    };
    let Some(entry) = match_flagship(franchise, &game.name) else {
        return FlagshipBoost::NONE;
    };

    let mut score = FLAGSHIP_BASE + entry.tag.bonus();
    let year = game.release_year().or(entry.year);
    let classic = year.is_some_and(|y| y < CLASSIC_CUTOFF_YEAR);
    if classic {
        score += CLASSIC_BONUS;
    }

    tracing::trace!(
        "Flagship match '{}' -> '{}' ({}), boost {}",
        game.name,
        entry.canonical_name(),
        entry.tag,
        score
    );

    FlagshipBoost {
        score,
        reason: Some(format!(
            "{} flagship ({}{}): +{:.0}",
            franchise.name,
            entry.tag,
            if classic { ", classic" } else { "" },
            score
        )),
    }
}
