//! In-memory catalog, optionally seeded from a JSON file.

use super::{Catalog, CatalogQuery, CatalogRecord};
use crate::error::CatalogError;
use crate::search::tokenize::match_key;
use async_trait::async_trait;
use std::path::Path;
use std::sync::RwLock;

#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    records: RwLock<Vec<CatalogRecord>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a catalog from records, assigning ids to any that lack one.
    pub fn from_records(records: Vec<CatalogRecord>) -> Self {
        let mut next_id = records.iter().map(|r| r.id).max().unwrap_or(0);
        let records = records
            .into_iter()
            .map(|mut record| {
                if record.id <= 0 {
                    next_id += 1;
                    record.id = next_id;
                }
                record
            })
            .collect();
        Self {
            records: RwLock::new(records),
        }
    }

    /// Loads a JSON array of records.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let records: Vec<CatalogRecord> =
            serde_json::from_str(&content).map_err(|source| CatalogError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        tracing::info!("Loaded {} catalog records from {}", records.len(), path.display());
        Ok(Self::from_records(records))
    }

    pub fn len(&self) -> usize {
        self.records.read().map_or(0, |records| records.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn poisoned() -> CatalogError {
        CatalogError::Unavailable("catalog lock poisoned".to_string())
    }
}

fn matches(record: &CatalogRecord, query: &CatalogQuery, text_key: &str) -> bool {
    if !text_key.is_empty() && !match_key(&record.name).contains(text_key) {
        return false;
    }
    let contains_any = |values: &[String], wanted: &[String]| {
        wanted.is_empty()
            || wanted.iter().any(|w| {
                let w = w.to_lowercase();
                values.iter().any(|v| v.to_lowercase().contains(&w))
            })
    };
    if !contains_any(&record.genres, &query.genres)
        || !contains_any(&record.platforms, &query.platforms)
    {
        return false;
    }
    if let Some(min) = query.min_rating
        && record.total_rating.is_none_or(|rating| rating < min)
    {
        return false;
    }
    if let Some(year) = query.release_year
        && record.release_year() != Some(year)
    {
        return false;
    }
    true
}

#[async_trait]
impl Catalog for InMemoryCatalog {
    async fn search(&self, query: &CatalogQuery) -> Result<Vec<CatalogRecord>, CatalogError> {
        let text_key = match_key(&query.text);
        let records = self.records.read().map_err(|_| Self::poisoned())?;
        Ok(records
            .iter()
            .filter(|record| matches(record, query, &text_key))
            .take(query.limit)
            .cloned()
            .collect())
    }

    async fn get_by_external_id(&self, id: u64) -> Result<Option<CatalogRecord>, CatalogError> {
        let records = self.records.read().map_err(|_| Self::poisoned())?;
        Ok(records.iter().find(|r| r.igdb_id == Some(id)).cloned())
    }

    async fn insert(&self, mut record: CatalogRecord) -> Result<i64, CatalogError> {
        let mut records = self.records.write().map_err(|_| Self::poisoned())?;
        let id = records.iter().map(|r| r.id).max().unwrap_or(0) + 1;
        record.id = id;
        tracing::debug!("Inserted '{}' as #{}", record.name, id);
        records.push(record);
        Ok(id)
    }
}
