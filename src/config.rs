//! Search configuration loaded from TOML.
//!
//! Every field has a default, so an empty file (or no file at all) yields a
//! working configuration without an external source.

use crate::error::ConfigError;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "GAME_SEARCH_CONFIG";

#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct SearchConfig {
    /// JSON record list backing the bundled in-memory catalog.
    pub catalog_path: Option<PathBuf>,
    pub provider: ProviderConfig,
    pub cache: CacheConfig,
    pub ranking: RankingConfig,
    pub weights: ScoringWeights,
    pub import: ImportConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProviderConfig {
    /// Proxy endpoint for the external metadata provider. `None` disables it.
    pub base_url: Option<String>,
    pub timeout_ms: u64,
    /// Simultaneous external calls allowed per pipeline.
    pub max_concurrent: usize,
    pub user_agent: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_ms: 3000,
            max_concurrent: 3,
            user_agent: concat!("game-search/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl ProviderConfig {
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CacheConfig {
    /// Entries per cache tier.
    pub capacity: usize,
    pub external_ttl_secs: u64,
    pub ranked_ttl_secs: u64,
    pub sweep_interval_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: 256,
            external_ttl_secs: 600,
            ranked_ttl_secs: 120,
            sweep_interval_secs: 60,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RankingConfig {
    /// Minimum relevance for a specific-title query.
    pub title_relevance_threshold: f64,
    /// Minimum relevance for a franchise query. Lower than the title threshold.
    pub franchise_relevance_threshold: f64,
    /// Each retrieval call asks for `limit * overfetch_factor` records.
    pub overfetch_factor: usize,
    /// Upper bound on records requested per retrieval call.
    pub max_fetch: usize,
    pub max_variants: usize,
    /// Candidates kept after the fuzzy re-rank, before full scoring.
    pub rerank_window: usize,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            title_relevance_threshold: 40.0,
            franchise_relevance_threshold: 30.0,
            overfetch_factor: 3,
            max_fetch: 50,
            max_variants: 4,
            rerank_window: 100,
        }
    }
}

impl RankingConfig {
    /// Records to request from each source for a caller limit.
    pub fn fetch_limit(&self, limit: usize) -> usize {
        limit
            .saturating_mul(self.overfetch_factor.max(1))
            .clamp(1, self.max_fetch.max(1))
    }
}

/// Weight percentages for the five sub-scores. They need not sum to 100.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScoringWeights {
    pub name_match: f64,
    pub rating: f64,
    pub likes: f64,
    pub buzz: f64,
    pub franchise_importance: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            name_match: 40.0,
            rating: 20.0,
            likes: 15.0,
            buzz: 10.0,
            franchise_importance: 15.0,
        }
    }
}

impl ScoringWeights {
    pub fn total(&self) -> f64 {
        self.name_match + self.rating + self.likes + self.buzz + self.franchise_importance
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("weights.name_match", self.name_match),
            ("weights.rating", self.rating),
            ("weights.likes", self.likes),
            ("weights.buzz", self.buzz),
            ("weights.franchise_importance", self.franchise_importance),
        ];
        for (key, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Invalid {
                    key,
                    reason: format!("must be a finite, non-negative number (got {})", value),
                });
            }
        }
        if self.total() <= 0.0 {
            return Err(ConfigError::Invalid {
                key: "weights",
                reason: "at least one weight must be positive".to_string(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImportConfig {
    pub queue_capacity: usize,
    /// Requests drained per worker cycle.
    pub batch_size: usize,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 256,
            batch_size: 16,
        }
    }
}

impl SearchConfig {
    /// Parses and validates a TOML document.
    pub fn from_toml(content: &str, origin: &Path) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: origin.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Loads a config file from an explicit path.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content, path)
    }

    /// Resolves the config location and loads it.
    ///
    /// Lookup order: `explicit` → `$GAME_SEARCH_CONFIG` → `<config dir>/game-search/config.toml`
    /// → defaults. Only an explicitly named file is required to exist.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        if let Some(path) = std::env::var_os(CONFIG_ENV_VAR) {
            return Self::from_file(Path::new(&path));
        }

        if let Some(path) = default_config_path()
            && path.exists()
        {
            tracing::debug!("Loading config from {}", path.display());
            return Self::from_file(&path);
        }

        tracing::debug!("No config file found, using defaults");
        let config = Self::default();
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.weights.validate()?;

        if self.provider.max_concurrent == 0 {
            return Err(ConfigError::Invalid {
                key: "provider.max_concurrent",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.provider.timeout_ms == 0 {
            return Err(ConfigError::Invalid {
                key: "provider.timeout_ms",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.cache.capacity == 0 {
            return Err(ConfigError::Invalid {
                key: "cache.capacity",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.import.queue_capacity == 0 || self.import.batch_size == 0 {
            return Err(ConfigError::Invalid {
                key: "import",
                reason: "queue_capacity and batch_size must be at least 1".to_string(),
            });
        }

        let ranking = &self.ranking;
        for (key, value) in [
            (
                "ranking.title_relevance_threshold",
                ranking.title_relevance_threshold,
            ),
            (
                "ranking.franchise_relevance_threshold",
                ranking.franchise_relevance_threshold,
            ),
        ] {
            if !(0.0..=100.0).contains(&value) {
                return Err(ConfigError::Invalid {
                    key,
                    reason: format!("must be within 0..=100 (got {})", value),
                });
            }
        }
        if ranking.franchise_relevance_threshold > ranking.title_relevance_threshold {
            return Err(ConfigError::Invalid {
                key: "ranking.franchise_relevance_threshold",
                reason: "must not exceed title_relevance_threshold".to_string(),
            });
        }
        if ranking.max_variants == 0 {
            return Err(ConfigError::Invalid {
                key: "ranking.max_variants",
                reason: "must be at least 1 (the original query)".to_string(),
            });
        }

        Ok(())
    }
}

/// `<config dir>/game-search/config.toml`, if the platform has a config dir.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("game-search").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::{check, let_assert};
    use rstest::rstest;

    #[test]
    fn test_defaults_are_valid() {
        let config = SearchConfig::default();
        check!(config.validate().is_ok());
        check!(config.weights.total() == 100.0);
        check!(config.provider.base_url.is_none());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = SearchConfig::from_toml(
            r#"
            [provider]
            base_url = "https://proxy.example/igdb"

            [weights]
            name_match = 60
            "#,
            Path::new("inline.toml"),
        )
        .unwrap();

        check!(config.provider.base_url.as_deref() == Some("https://proxy.example/igdb"));
        check!(config.provider.timeout_ms == 3000);
        check!(config.weights.name_match == 60.0);
        check!(config.weights.rating == 20.0);
        check!(config.weights.total() == 120.0);
    }

    #[test]
    fn test_unknown_key_rejected() {
        let result = SearchConfig::from_toml("[cache]\nsize = 3\n", Path::new("bad.toml"));
        let_assert!(Err(ConfigError::Parse { .. }) = result);
    }

    #[rstest]
    #[case("[weights]\nrating = -1\n", "weights.rating")]
    #[case(
        "[weights]\nname_match = 0\nrating = 0\nlikes = 0\nbuzz = 0\nfranchise_importance = 0\n",
        "weights"
    )]
    #[case("[provider]\nmax_concurrent = 0\n", "provider.max_concurrent")]
    #[case(
        "[ranking]\nfranchise_relevance_threshold = 90\n",
        "ranking.franchise_relevance_threshold"
    )]
    #[case("[ranking]\nmax_variants = 0\n", "ranking.max_variants")]
    fn test_invalid_values(#[case] toml: &str, #[case] expected_key: &str) {
        let result = SearchConfig::from_toml(toml, Path::new("bad.toml"));
        let_assert!(Err(ConfigError::Invalid { key, .. }) = result);
        check!(key == expected_key);
    }

    #[rstest]
    #[case(10, 30)]
    #[case(20, 50)]
    #[case(0, 1)]
    fn test_fetch_limit(#[case] limit: usize, #[case] expected: usize) {
        check!(RankingConfig::default().fetch_limit(limit) == expected);
    }
}
