//! Core data model: the normalized candidate, its identity key and the
//! per-request score breakdown.

use crate::search::tokenize::normalize_name;
use chrono::{DateTime, Datelike};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Structural category reported by the data source. Filters read it, nothing rewrites it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    #[default]
    MainGame,
    Bundle,
    Season,
    Mod,
    StandaloneExpansion,
    Other,
}

impl Category {
    /// Maps the provider's numeric category code.
    pub const fn from_code(code: Option<u8>) -> Self {
        match code {
            None | Some(0 | 8 | 9 | 10 | 11) => Self::MainGame,
            Some(3 | 13) => Self::Bundle,
            Some(7 | 14) => Self::Season,
            Some(5 | 12) => Self::Mod,
            Some(4) => Self::StandaloneExpansion,
            Some(_) => Self::Other,
        }
    }

    /// Inverse of [`Category::from_code`], picking the canonical code.
    pub const fn code(self) -> u8 {
        match self {
            Self::MainGame => 0,
            Self::Bundle => 3,
            Self::Season => 7,
            Self::Mod => 5,
            Self::StandaloneExpansion => 4,
            Self::Other => 1,
        }
    }

    /// Whether the entry is a full game for franchise-importance purposes.
    pub const fn is_full_game(self) -> bool {
        matches!(self, Self::MainGame | Self::StandaloneExpansion)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::MainGame => "main game",
            Self::Bundle => "bundle",
            Self::Season => "season",
            Self::Mod => "mod",
            Self::StandaloneExpansion => "standalone expansion",
            Self::Other => "other",
        };
        f.write_str(s)
    }
}

/// Where a candidate was retrieved from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    Local,
    External,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Platform {
    pub name: String,
}

impl Platform {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Raw popularity and reception metrics.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct QualitySignals {
    /// Critical rating on a 0-100 scale.
    pub rating: Option<f64>,
    pub rating_count: u32,
    pub follows: u32,
    pub hypes: u32,
}

impl QualitySignals {
    pub fn rating_or_zero(&self) -> f64 {
        self.rating.filter(|r| r.is_finite()).unwrap_or(0.0)
    }

    /// Rating above 70 with more than 50 ratings, or more than 1000 followers.
    pub fn is_strong(&self) -> bool {
        (self.rating_or_zero() > 70.0 && self.rating_count > 50) || self.follows > 1000
    }
}

/// Identity used for deduplication.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GameKey {
    External(u64),
    Name(String),
}

impl fmt::Display for GameKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::External(id) => write!(f, "ext:{}", id),
            Self::Name(name) => write!(f, "name:{}", name),
        }
    }
}

/// The single normalized shape every retrieval source adapts into.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameCandidate {
    pub external_id: Option<u64>,
    /// Present when the record already exists in the local store.
    pub local_id: Option<i64>,
    pub name: String,
    pub normalized_name: String,
    pub alternate_names: Vec<String>,
    pub summary: Option<String>,
    pub category: Category,
    /// Unix seconds.
    pub release_date: Option<i64>,
    pub genres: Vec<String>,
    pub platforms: Vec<Platform>,
    pub developer: Option<String>,
    pub publisher: Option<String>,
    pub franchise: Option<String>,
    pub related_ids: Vec<u64>,
    pub cover_url: Option<String>,
    pub quality: QualitySignals,
    pub source: Source,
}

impl GameCandidate {
    /// Creates a bare candidate with the given name; adapters fill in the rest.
    pub fn new(name: impl Into<String>, source: Source) -> Self {
        let name = name.into();
        Self {
            normalized_name: normalize_name(&name),
            name,
            external_id: None,
            local_id: None,
            alternate_names: Vec::new(),
            summary: None,
            category: Category::MainGame,
            release_date: None,
            genres: Vec::new(),
            platforms: Vec::new(),
            developer: None,
            publisher: None,
            franchise: None,
            related_ids: Vec::new(),
            cover_url: None,
            quality: QualitySignals::default(),
            source,
        }
    }

    pub fn key(&self) -> GameKey {
        match self.external_id {
            Some(id) => GameKey::External(id),
            None => GameKey::Name(self.normalized_name.clone()),
        }
    }

    pub fn is_stored(&self) -> bool {
        self.local_id.is_some()
    }

    pub fn release_year(&self) -> Option<i32> {
        self.release_date
            .and_then(|ts| DateTime::from_timestamp(ts, 0))
            .map(|dt| dt.year())
    }

    /// Free-text description longer than 10 characters.
    pub fn has_description(&self) -> bool {
        self.summary
            .as_deref()
            .is_some_and(|s| s.trim().chars().count() > 10)
    }
}

/// Per-request computed scores. Never persisted.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ScoreBreakdown {
    pub relevance: f64,
    pub rating: f64,
    pub likes: f64,
    pub buzz: f64,
    pub franchise_importance: f64,
    /// Weighted sum of the five sub-scores.
    pub weighted: f64,
    pub flagship_boost: f64,
    pub platform_boost: f64,
    pub platform_class_bonus: f64,
    pub recency_boost: f64,
    pub description_bonus: f64,
    pub composite: f64,
    pub explanations: Vec<String>,
}

impl ScoreBreakdown {
    pub(crate) fn explain(&mut self, reason: impl Into<String>) {
        self.explanations.push(reason.into());
    }
}

/// A candidate with its final scores, as returned by a search.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedGame {
    pub game: GameCandidate,
    pub scores: ScoreBreakdown,
}

/// Caller options for a single search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SearchOptions {
    pub include_external_source: bool,
    pub limit: usize,
    pub apply_content_filter: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            include_external_source: true,
            limit: 20,
            apply_content_filter: true,
        }
    }
}
