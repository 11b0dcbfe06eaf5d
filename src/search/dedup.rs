//! Merging candidate lists from several retrieval calls.

use crate::types::{GameCandidate, GameKey};
use ahash::{AHashMap, AHashSet};

/// Merges lists into one set keyed by [`GameCandidate::key`].
///
/// Order follows first appearance. When the same game appears twice, a
/// locally stored copy replaces an external one; otherwise the first copy wins.
pub fn merge<I>(lists: I) -> Vec<GameCandidate>
where
    I: IntoIterator<Item = Vec<GameCandidate>>,
{
    let mut positions: AHashMap<GameKey, usize> = AHashMap::new();
    let mut merged: Vec<GameCandidate> = Vec::new();

    for candidate in lists.into_iter().flatten() {
        let key = candidate.key();
        match positions.get(&key) {
            Some(&index) => {
                if candidate.is_stored() && !merged[index].is_stored() {
                    merged[index] = candidate;
                }
            }
            None => {
                positions.insert(key, merged.len());
                merged.push(candidate);
            }
        }
    }

    merged
}

/// Merges `extra` and keeps only games whose keys are not in `existing`.
pub fn retain_new(existing: &AHashSet<GameKey>, extra: Vec<GameCandidate>) -> Vec<GameCandidate> {
    merge([extra])
        .into_iter()
        .filter(|candidate| !existing.contains(&candidate.key()))
        .collect()
}
