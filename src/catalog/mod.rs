//! The persistent catalog contract consumed by the pipeline.

pub mod memory;
pub mod record;

pub use memory::InMemoryCatalog;
pub use record::CatalogRecord;

use crate::error::CatalogError;
use async_trait::async_trait;

/// A lookup against the local store.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CatalogQuery {
    /// Case-insensitive substring matched against the game name.
    pub text: String,
    pub genres: Vec<String>,
    pub platforms: Vec<String>,
    pub min_rating: Option<f64>,
    pub release_year: Option<i32>,
    pub limit: usize,
}

impl CatalogQuery {
    pub fn text(text: impl Into<String>, limit: usize) -> Self {
        Self {
            text: text.into(),
            limit,
            ..Self::default()
        }
    }
}

/// The local game store.
#[async_trait]
pub trait Catalog: Send + Sync {
    async fn search(&self, query: &CatalogQuery) -> Result<Vec<CatalogRecord>, CatalogError>;

    async fn get_by_external_id(&self, id: u64) -> Result<Option<CatalogRecord>, CatalogError>;

    /// Stores a record and returns its assigned local id.
    async fn insert(&self, record: CatalogRecord) -> Result<i64, CatalogError>;
}
