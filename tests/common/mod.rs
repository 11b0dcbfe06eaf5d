//! Shared fixtures for integration tests.
//!
//! # Available Fixtures
//!
//! - `mario_catalog`: flagships, a spin-off, a ROM hack, an e-Reader card and a season pass
//! - `pokemon_catalog`: the paired Red/Blue releases plus a fan game
//!
//! Providers: [`StaticProvider`] answers from a fixed list by substring,
//! [`EchoProvider`] returns its whole list for any query, [`FailingProvider`]
//! always errors and [`SlowProvider`] sleeps far past any sensible timeout. [`CountingCatalog`] wraps a catalog and counts lookups.

#![allow(dead_code)]

use async_trait::async_trait;
use game_search::catalog::{Catalog, CatalogQuery, CatalogRecord, InMemoryCatalog};
use game_search::config::SearchConfig;
use game_search::error::{CatalogError, ProviderError};
use game_search::provider::{ExternalGame, MetadataProvider};
use game_search::search::SearchPipeline;
use game_search::search::tokenize::match_key;
use rstest::fixture;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

pub const REFERENCE_YEAR: i32 = 2025;

pub fn record(name: &str, igdb_id: u64) -> CatalogRecord {
    CatalogRecord {
        name: name.to_string(),
        igdb_id: Some(igdb_id),
        ..CatalogRecord::default()
    }
}

/// A well-known, well-rated release.
pub fn acclaimed(name: &str, igdb_id: u64, date: &str, platform: &str) -> CatalogRecord {
    CatalogRecord {
        release_date: Some(date.to_string()),
        platforms: vec![platform.to_string()],
        summary: Some(format!("{} is a platform game.", name)),
        total_rating: Some(92.0),
        rating_count: 1500,
        follows: 5000,
        ..record(name, igdb_id)
    }
}

#[fixture]
pub fn mario_catalog() -> Vec<CatalogRecord> {
    vec![
        CatalogRecord {
            total_rating: Some(60.0),
            rating_count: 20,
            follows: 50,
            release_date: Some("2007-05-29".to_string()),
            platforms: vec!["Wii".to_string()],
            ..record("Mario Party 8", 1)
        },
        acclaimed(
            "Super Mario Bros.",
            2,
            "1985-09-13",
            "Nintendo Entertainment System",
        ),
        CatalogRecord {
            developer: Some("RomHack Studios".to_string()),
            ..record("Mario Remix Deluxe", 3)
        },
        acclaimed("Super Mario 64", 4, "1996-06-23", "Nintendo 64"),
        record("Super Mario Advance 4 e-Reader Level Card", 5),
        CatalogRecord {
            category: Some(7),
            ..record("Super Mario Maker Season Pass", 6)
        },
        acclaimed(
            "Super Mario Odyssey",
            7,
            "2017-10-27",
            "Nintendo Switch",
        ),
    ]
}

#[fixture]
pub fn pokemon_catalog() -> Vec<CatalogRecord> {
    vec![
        CatalogRecord {
            release_date: Some("1996-02-27".to_string()),
            platforms: vec!["Game Boy".to_string()],
            total_rating: Some(89.0),
            rating_count: 900,
            follows: 250_000,
            ..record("Pokemon Red", 20)
        },
        CatalogRecord {
            release_date: Some("1996-02-27".to_string()),
            platforms: vec!["Game Boy".to_string()],
            total_rating: Some(87.0),
            rating_count: 800,
            follows: 120_000,
            ..record("Pokemon Blue", 21)
        },
        CatalogRecord {
            developer: Some("Pokemon Fan Game Team".to_string()),
            ..record("Pokemon Red Redux", 22)
        },
    ]
}

/// Pipeline over an in-memory catalog with a pinned reference year.
pub fn pipeline_with(
    records: Vec<CatalogRecord>,
    provider: Option<Arc<dyn MetadataProvider>>,
    config: SearchConfig,
) -> SearchPipeline {
    game_search::tracing::init();
    let mut builder = SearchPipeline::builder()
        .catalog(Arc::new(InMemoryCatalog::from_records(records)))
        .config(config)
        .reference_year(REFERENCE_YEAR);
    if let Some(provider) = provider {
        builder = builder.provider(provider);
    }
    builder.build().unwrap()
}

pub fn pipeline(records: Vec<CatalogRecord>) -> SearchPipeline {
    pipeline_with(records, None, SearchConfig::default())
}

/// Answers every query with the games whose folded name contains it.
#[derive(Debug, Default)]
pub struct StaticProvider {
    pub games: Vec<ExternalGame>,
    pub calls: AtomicUsize,
}

impl StaticProvider {
    pub fn new(games: Vec<ExternalGame>) -> Self {
        Self {
            games,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MetadataProvider for StaticProvider {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<ExternalGame>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let key = match_key(query);
        Ok(self
            .games
            .iter()
            .filter(|g| match_key(&g.name).contains(&key))
            .take(limit)
            .cloned()
            .collect())
    }

    async fn get_by_id(&self, id: u64) -> Result<Option<ExternalGame>, ProviderError> {
        Ok(self.games.iter().find(|g| g.id == id).cloned())
    }
}

/// Answers every query with all of its games, whatever was asked.
#[derive(Debug, Default)]
pub struct EchoProvider {
    pub games: Vec<ExternalGame>,
}

impl EchoProvider {
    pub fn new(games: Vec<ExternalGame>) -> Self {
        Self { games }
    }
}

#[async_trait]
impl MetadataProvider for EchoProvider {
    async fn search(&self, _query: &str, limit: usize) -> Result<Vec<ExternalGame>, ProviderError> {
        Ok(self.games.iter().take(limit).cloned().collect())
    }

    async fn get_by_id(&self, id: u64) -> Result<Option<ExternalGame>, ProviderError> {
        Ok(self.games.iter().find(|g| g.id == id).cloned())
    }
}

#[derive(Debug, Default)]
pub struct FailingProvider;

#[async_trait]
impl MetadataProvider for FailingProvider {
    async fn search(&self, _query: &str, _limit: usize) -> Result<Vec<ExternalGame>, ProviderError> {
        Err(ProviderError::Status {
            status: 503,
            body: "service unavailable".to_string(),
        })
    }

    async fn get_by_id(&self, _id: u64) -> Result<Option<ExternalGame>, ProviderError> {
        Err(ProviderError::Status {
            status: 503,
            body: "service unavailable".to_string(),
        })
    }
}

/// Sleeps for a minute before answering.
#[derive(Debug, Default)]
pub struct SlowProvider {
    pub games: Vec<ExternalGame>,
}

#[async_trait]
impl MetadataProvider for SlowProvider {
    async fn search(&self, _query: &str, _limit: usize) -> Result<Vec<ExternalGame>, ProviderError> {
        tokio::time::sleep(Duration::from_secs(60)).await;
        Ok(self.games.clone())
    }

    async fn get_by_id(&self, _id: u64) -> Result<Option<ExternalGame>, ProviderError> {
        tokio::time::sleep(Duration::from_secs(60)).await;
        Ok(None)
    }
}

/// Counts `search` calls on the wrapped catalog.
pub struct CountingCatalog {
    pub inner: InMemoryCatalog,
    pub searches: AtomicUsize,
}

impl CountingCatalog {
    pub fn new(records: Vec<CatalogRecord>) -> Self {
        Self {
            inner: InMemoryCatalog::from_records(records),
            searches: AtomicUsize::new(0),
        }
    }

    pub fn searches(&self) -> usize {
        self.searches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Catalog for CountingCatalog {
    async fn search(&self, query: &CatalogQuery) -> Result<Vec<CatalogRecord>, CatalogError> {
        self.searches.fetch_add(1, Ordering::SeqCst);
        self.inner.search(query).await
    }

    async fn get_by_external_id(&self, id: u64) -> Result<Option<CatalogRecord>, CatalogError> {
        self.inner.get_by_external_id(id).await
    }

    async fn insert(&self, record: CatalogRecord) -> Result<i64, CatalogError> {
        self.inner.insert(record).await
    }
}

/// Names of the results, in rank order.
pub fn names(results: &[game_search::RankedGame]) -> Vec<&str> {
    results.iter().map(|r| r.game.name.as_str()).collect()
}
