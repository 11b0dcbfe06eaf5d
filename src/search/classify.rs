//! Content classification: fan-made, micro-content and low-signal bundle detection.

use crate::franchise::{Franchise, FranchiseTable};
use crate::types::{Category, GameCandidate};
use regex::Regex;
use std::fmt;
use std::sync::{Arc, LazyLock};

/// Fan / homebrew / ROM-hack markers in developer or publisher names.
static FAN_COMPANY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(fan[\s-]?(made|game|project|translation)s?|fans|fangame|homebrew|rom[\s-]?hack(s|ers?)?|hack(s|ers?)?|unofficial|community[\s-]?(made|project))\b",
    )
    .unwrap()
});

/// Explicit fan-work markers in a title.
static FAN_TITLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(rom[\s-]?hack|fan[\s-]?(game|made)|fangame|hack\s+of)\b").unwrap()
});

/// Card / episode releases for the Game Boy Advance e-Reader.
///
/// A bare `-e` suffix only counts after the card series words; "WALL-E" is a game.
static E_READER: LazyLock<[Regex; 4]> = LazyLock::new(|| {
    [
        Regex::new(r"(?i)\be[\s-]?reader\b").unwrap(),
        Regex::new(r"(?i)\be[\s-]?cards?\b").unwrap(),
        Regex::new(r"(?i)[[:alnum:]]-e\+").unwrap(),
        Regex::new(r"(?i)\b(battle|slide|puzzle|pinball|construction|level|card)-e\b").unwrap(),
    ]
});

static BUNDLE_TERM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(collection|anthology|compilation|bundle|double pack|triple pack)\b")
        .unwrap()
});

static EDITION_TERM: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\bedition\b").unwrap());

/// Why a candidate is not allowed in results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisallowReason {
    /// Developer or publisher carries a fan-work marker.
    FanCompany(String),
    FanTitle,
    FanCategory,
    EReader,
    LowSignalBundle,
    Season,
}

impl fmt::Display for DisallowReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FanCompany(company) => write!(f, "fan-made ({})", company),
            Self::FanTitle => f.write_str("fan-made title"),
            Self::FanCategory => f.write_str("mod / fan content category"),
            Self::EReader => f.write_str("e-Reader micro-content"),
            Self::LowSignalBundle => f.write_str("low-signal bundle"),
            Self::Season => f.write_str("season / content update"),
        }
    }
}

/// Outcome of classifying one candidate. All rules are evaluated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    pub reasons: Vec<DisallowReason>,
}

impl Classification {
    pub fn is_disallowed(&self) -> bool {
        !self.reasons.is_empty()
    }
}

/// Separates official content from fan works and micro-content, and detects
/// which franchise a query targets.
#[derive(Debug, Clone)]
pub struct ContentClassifier {
    franchises: Arc<FranchiseTable>,
}

impl ContentClassifier {
    pub const fn new(franchises: Arc<FranchiseTable>) -> Self {
        Self { franchises }
    }

    pub fn classify(&self, game: &GameCandidate) -> Classification {
        let mut reasons = Vec::new();

        for company in [&game.developer, &game.publisher].into_iter().flatten() {
            if FAN_COMPANY.is_match(company) {
                reasons.push(DisallowReason::FanCompany(company.clone()));
                break;
            }
        }

        if FAN_TITLE.is_match(&game.name) {
            reasons.push(DisallowReason::FanTitle);
        }

        if game.category == Category::Mod {
            reasons.push(DisallowReason::FanCategory);
        }

        if E_READER.iter().any(|re| re.is_match(&game.name)) {
            reasons.push(DisallowReason::EReader);
        }

        if game.category == Category::Bundle
            && BUNDLE_TERM.is_match(&game.name)
            && !EDITION_TERM.is_match(&game.name)
            && !game.quality.is_strong()
        {
            reasons.push(DisallowReason::LowSignalBundle);
        }

        if game.category == Category::Season {
            reasons.push(DisallowReason::Season);
        }

        Classification { reasons }
    }

    /// Detects the franchise a free-text query targets. First table match wins.
    pub fn detect_franchise(&self, query: &str) -> Option<&Franchise> {
        self.franchises.find_by_query(query)
    }
}

/// Drops disallowed candidates.
pub fn content_filter(
    classifier: &ContentClassifier,
    candidates: Vec<GameCandidate>,
) -> Vec<GameCandidate> {
    candidates
        .into_iter()
        .filter(|game| {
            let classification = classifier.classify(game);
            if classification.is_disallowed() {
                let reasons: Vec<String> = classification
                    .reasons
                    .iter()
                    .map(ToString::to_string)
                    .collect();
                tracing::trace!("Filtered '{}': {}", game.name, reasons.join(", "));
                false
            } else {
                true
            }
        })
        .collect()
}
