//! Query variant generation.

use super::tokenize::{match_key, normalize_name, words};
use crate::franchise::FranchiseTable;
use std::sync::Arc;

/// Produces the query strings to attempt for one raw query.
///
/// The pipeline always searches the original query first, whatever this returns.
pub trait QueryVariantGenerator: Send + Sync {
    fn variants(&self, query: &str) -> Vec<String>;
}

/// Uses only the original query.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoVariants;

impl QueryVariantGenerator for NoVariants {
    fn variants(&self, query: &str) -> Vec<String> {
        vec![query.to_string()]
    }
}

const ROMAN: [&str; 10] = ["i", "ii", "iii", "iv", "v", "vi", "vii", "viii", "ix", "x"];

/// Expands abbreviations, folds diacritics and swaps trailing numerals.
#[derive(Debug, Clone)]
pub struct AbbreviationExpander {
    table: Arc<FranchiseTable>,
    max_variants: usize,
}

impl AbbreviationExpander {
    pub const fn new(table: Arc<FranchiseTable>, max_variants: usize) -> Self {
        Self {
            table,
            max_variants,
        }
    }

    /// Whole-query short forms expand anywhere. Inside a longer query only a
    /// leading short form followed by an entry number expands ("gta 5"), so
    /// "mario kart ds" or "re volt" stay as typed.
    fn expand_abbreviations(&self, key: &str) -> Option<String> {
        if let Some(long) = self.table.abbreviation(key) {
            return Some(long.to_string());
        }

        let (head, tail) = key.split_once(' ')?;
        let long = self.table.abbreviation(head)?;
        words(tail)
            .all(is_numeral)
            .then(|| format!("{} {}", long, tail))
    }
}

fn is_numeral(word: &str) -> bool {
    word.parse::<u32>().is_ok() || ROMAN.contains(&word)
}

/// Swaps a trailing numeral between roman and arabic form (1-10).
fn swap_trailing_numeral(key: &str) -> Option<String> {
    let (head, last) = match key.rsplit_once(' ') {
        Some((head, last)) => (head, last),
        None => return None,
    };

    let swapped = if let Ok(n) = last.parse::<usize>() {
        ROMAN.get(n.checked_sub(1)?)?.to_string()
    } else {
        let index = ROMAN.iter().position(|r| *r == last)?;
        (index + 1).to_string()
    };
    Some(format!("{} {}", head, swapped))
}

impl QueryVariantGenerator for AbbreviationExpander {
    fn variants(&self, query: &str) -> Vec<String> {
        let original = normalize_name(query);
        if original.is_empty() {
            return Vec::new();
        }
        let key = match_key(query);

        let mut candidates = vec![original];
        let expanded = self.expand_abbreviations(&key);
        if let Some(expanded) = &expanded {
            candidates.push(expanded.clone());
        }
        candidates.push(key.clone());
        for base in std::iter::once(&key).chain(expanded.as_ref()) {
            if let Some(swapped) = swap_trailing_numeral(base) {
                candidates.push(swapped);
            }
        }

        let mut variants: Vec<String> = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            if !candidate.is_empty() && !variants.contains(&candidate) {
                variants.push(candidate);
            }
        }
        variants.truncate(self.max_variants.max(1));
        variants
    }
}
