//! Text normalization shared by matching, dedup and franchise lookup.

/// Minimum length for a query word to take part in word-overlap scoring.
pub(crate) const MIN_WORD_LENGTH: usize = 3;

/// Lowercases and collapses whitespace. This is the dedup fallback key.
pub fn normalize_name(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Folds a string into a punctuation-free comparison key.
///
/// Diacritics are transliterated (`Pokémon` → `pokemon`), apostrophes are
/// dropped (`Majora's` → `majoras`), every other non-alphanumeric run becomes
/// a single space.
pub fn match_key(text: &str) -> String {
    let folded = deunicode::deunicode(text).to_lowercase();
    let mut key = String::with_capacity(folded.len());
    let mut pending_space = false;

    for ch in folded.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_space && !key.is_empty() {
                key.push(' ');
            }
            pending_space = false;
            key.push(ch);
        } else if ch != '\'' {
            pending_space = true;
        }
    }

    key
}

/// Splits a normalized string into whitespace-delimited words.
pub fn words(text: &str) -> impl Iterator<Item = &str> {
    text.split_whitespace()
}

/// Returns true when `needle` occurs in `haystack` on word boundaries.
///
/// Both inputs are expected to be [`match_key`] output, so a word boundary is
/// simply the string edge or a space.
pub fn contains_words(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return false;
    }

    haystack.match_indices(needle).any(|(start, _)| {
        let end = start + needle.len();
        let before_ok = start == 0 || haystack.as_bytes()[start - 1] == b' ';
        let after_ok = end == haystack.len() || haystack.as_bytes()[end] == b' ';
        before_ok && after_ok
    })
}

/// Escapes a string for embedding in a double-quoted provider query.
pub(crate) fn escape_quoted(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}
