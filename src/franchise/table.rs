//! Versioned franchise data asset and its lookup interface.

use crate::error::DataError;
use crate::search::tokenize::{contains_words, match_key};
use ahash::AHashSet;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;

/// The data asset compiled into the binary.
const EMBEDDED_FRANCHISES: &str = include_str!("../../data/franchises.toml");

/// Highest data format version this build understands.
pub const SUPPORTED_VERSION: u32 = 1;

/// Why a flagship entry matters to its franchise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignificanceTag {
    Originator,
    Peak,
    Innovation,
    Cultural,
    Technical,
    Modern,
}

impl SignificanceTag {
    /// Bonus added on top of the base flagship boost.
    pub const fn bonus(self) -> f64 {
        match self {
            Self::Originator => 50.0,
            Self::Cultural => 45.0,
            Self::Peak => 40.0,
            Self::Innovation => 35.0,
            Self::Technical => 30.0,
            Self::Modern => 20.0,
        }
    }
}

impl fmt::Display for SignificanceTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Originator => "originator",
            Self::Peak => "peak",
            Self::Innovation => "innovation",
            Self::Cultural => "cultural",
            Self::Technical => "technical",
            Self::Modern => "modern",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FlagshipEntry {
    /// Acceptable display names, canonical first.
    pub names: Vec<String>,
    pub tag: SignificanceTag,
    pub year: Option<i32>,
    #[serde(default)]
    pub platforms: Vec<String>,
    #[serde(skip)]
    pub(crate) name_keys: Vec<String>,
}

impl FlagshipEntry {
    pub fn canonical_name(&self) -> &str {
        self.names.first().map_or("", String::as_str)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Franchise {
    pub id: String,
    pub name: String,
    /// Query patterns, checked in order.
    pub patterns: Vec<String>,
    /// Extra queries for paired releases (red/blue style).
    #[serde(default)]
    pub sister_patterns: Vec<String>,
    /// Lowercase platform-name fragment → extra platform points.
    #[serde(default)]
    pub platform_affinity: BTreeMap<String, u32>,
    #[serde(default)]
    pub flagships: Vec<FlagshipEntry>,
    #[serde(skip)]
    pub(crate) pattern_keys: Vec<String>,
    #[serde(skip)]
    pub(crate) name_key: String,
}

impl Franchise {
    pub fn has_sisters(&self) -> bool {
        !self.sister_patterns.is_empty()
    }

    /// Affinity points for one platform name: the best matching fragment.
    pub fn platform_affinity_for(&self, platform: &str) -> u32 {
        let platform = platform.to_lowercase();
        self.platform_affinity
            .iter()
            .filter(|(fragment, _)| platform.contains(fragment.as_str()))
            .map(|(_, points)| *points)
            .max()
            .unwrap_or(0)
    }

    /// Normalized franchise display name.
    pub fn name_key(&self) -> &str {
        &self.name_key
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawTable {
    version: u32,
    #[serde(default)]
    abbreviations: BTreeMap<String, String>,
    #[serde(default, rename = "franchise")]
    franchises: Vec<Franchise>,
}

/// Ordered franchise table. Constructed once at startup and shared by reference.
#[derive(Debug, Clone)]
pub struct FranchiseTable {
    version: u32,
    franchises: Vec<Franchise>,
    abbreviations: BTreeMap<String, String>,
}

impl FranchiseTable {
    /// Parses the data asset compiled into the binary.
    pub fn embedded() -> Result<Self, DataError> {
        Self::from_toml(EMBEDDED_FRANCHISES)
    }

    /// Parses and validates a franchise data document.
    pub fn from_toml(content: &str) -> Result<Self, DataError> {
        let raw: RawTable = toml::from_str(content)?;
        if raw.version == 0 || raw.version > SUPPORTED_VERSION {
            return Err(DataError::Version(raw.version));
        }

        let mut seen = AHashSet::new();
        let mut franchises = raw.franchises;
        for franchise in &mut franchises {
            if !seen.insert(franchise.id.clone()) {
                return Err(DataError::Invalid {
                    franchise: franchise.id.clone(),
                    reason: "duplicate franchise id".to_string(),
                });
            }
            franchise.pattern_keys = franchise
                .patterns
                .iter()
                .map(|p| match_key(p))
                .filter(|k| !k.is_empty())
                .collect();
            if franchise.pattern_keys.is_empty() {
                return Err(DataError::Invalid {
                    franchise: franchise.id.clone(),
                    reason: "no usable patterns".to_string(),
                });
            }
            franchise.name_key = match_key(&franchise.name);

            for flagship in &mut franchise.flagships {
                flagship.name_keys = flagship
                    .names
                    .iter()
                    .map(|n| match_key(n))
                    .filter(|k| !k.is_empty())
                    .collect();
                if flagship.name_keys.is_empty() {
                    return Err(DataError::Invalid {
                        franchise: franchise.id.clone(),
                        reason: "flagship entry without names".to_string(),
                    });
                }
            }
        }

        let abbreviations = raw
            .abbreviations
            .into_iter()
            .map(|(short, long)| (match_key(&short), long))
            .collect();

        tracing::debug!(
            "Loaded franchise table v{} ({} franchises)",
            raw.version,
            franchises.len()
        );

        Ok(Self {
            version: raw.version,
            franchises,
            abbreviations,
        })
    }

    pub const fn version(&self) -> u32 {
        self.version
    }

    /// Franchises in precedence order.
    pub fn franchises(&self) -> &[Franchise] {
        &self.franchises
    }

    pub fn get(&self, id: &str) -> Option<&Franchise> {
        self.franchises.iter().find(|f| f.id == id)
    }

    /// First franchise (in table order) with a pattern occurring in the query.
    ///
    /// Patterns must sit on word boundaries, so "mario" does not match "marionette".
    pub fn find_by_query(&self, query: &str) -> Option<&Franchise> {
        let key = match_key(query);
        if key.is_empty() {
            return None;
        }
        self.franchises.iter().find(|franchise| {
            franchise
                .pattern_keys
                .iter()
                .any(|pattern| contains_words(&key, pattern))
        })
    }

    /// Expansion for a short form, keyed by its normalized spelling.
    pub fn abbreviation(&self, short: &str) -> Option<&str> {
        self.abbreviations.get(short).map(String::as_str)
    }
}
