//! Fetching candidates from the local catalog and the external provider.
//!
//! Every call absorbs its own failures: an error or timeout is logged and
//! yields an empty list, never aborting the request.

use crate::cache::{SearchCache, external_key};
use crate::catalog::{Catalog, CatalogQuery};
use crate::error::ProviderError;
use crate::provider::MetadataProvider;
use crate::types::GameCandidate;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

pub struct CandidateRetriever {
    catalog: Arc<dyn Catalog>,
    provider: Option<Arc<dyn MetadataProvider>>,
    cache: Arc<SearchCache>,
    /// Caps simultaneous external calls.
    permits: Arc<Semaphore>,
    timeout: Duration,
}

impl std::fmt::Debug for CandidateRetriever {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CandidateRetriever")
            .field("has_provider", &self.provider.is_some())
            .field("available_permits", &self.permits.available_permits())
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl CandidateRetriever {
    pub fn new(
        catalog: Arc<dyn Catalog>,
        provider: Option<Arc<dyn MetadataProvider>>,
        cache: Arc<SearchCache>,
        max_concurrent: usize,
        timeout: Duration,
    ) -> Self {
        Self {
            catalog,
            provider,
            cache,
            permits: Arc::new(Semaphore::new(max_concurrent.max(1))),
            timeout,
        }
    }

    pub const fn has_provider(&self) -> bool {
        self.provider.is_some()
    }

    /// Substring lookup against the local store.
    pub async fn retrieve_local(&self, query: &str, limit: usize) -> Vec<GameCandidate> {
        match self.catalog.search(&CatalogQuery::text(query, limit)).await {
            Ok(records) => records.into_iter().map(GameCandidate::from).collect(),
            Err(e) => {
                tracing::warn!("Local retrieval failed for '{}': {}", query, e);
                Vec::new()
            }
        }
    }

    /// Provider lookup, bounded by the timeout and the concurrency cap.
    pub async fn retrieve_external(&self, query: &str, limit: usize) -> Vec<GameCandidate> {
        let Some(provider) = &self.provider else {
            return Vec::new();
        };

        let key = external_key(query, limit);
        if let Some(cached) = self.cache.external.get(&key) {
            tracing::debug!("External cache hit for '{}'", query);
            return cached;
        }

        let Ok(_permit) = self.permits.acquire().await else {
            return Vec::new();
        };

        let result = match tokio::time::timeout(self.timeout, provider.search(query, limit)).await {
            Ok(result) => result,
            Err(_) => Err(ProviderError::Timeout(self.timeout.as_millis() as u64)),
        };

        match result {
            Ok(games) => {
                let candidates: Vec<GameCandidate> =
                    games.into_iter().map(GameCandidate::from).collect();
                self.cache.external.insert(key, candidates.clone());
                candidates
            }
            Err(e) => {
                tracing::warn!("External retrieval failed for '{}': {}", query, e);
                Vec::new()
            }
        }
    }

    /// Runs the local and (optionally) external lookups for one query concurrently.
    pub async fn retrieve(
        &self,
        query: &str,
        limit: usize,
        include_external: bool,
    ) -> Vec<Vec<GameCandidate>> {
        if include_external && self.has_provider() {
            let (local, external) = tokio::join!(
                self.retrieve_local(query, limit),
                self.retrieve_external(query, limit)
            );
            vec![local, external]
        } else {
            vec![self.retrieve_local(query, limit).await]
        }
    }

    /// Runs lookups one query at a time, so external calls never overlap.
    pub async fn retrieve_sequential(
        &self,
        queries: &[String],
        limit: usize,
        include_external: bool,
    ) -> Vec<Vec<GameCandidate>> {
        let mut lists = Vec::with_capacity(queries.len() * 2);
        for query in queries {
            lists.push(self.retrieve_local(query, limit).await);
            if include_external {
                lists.push(self.retrieve_external(query, limit).await);
            }
        }
        lists
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CatalogRecord, InMemoryCatalog};
    use crate::provider::ExternalGame;
    use assert2::check;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct SlowProvider;

    #[async_trait]
    impl MetadataProvider for SlowProvider {
        async fn search(&self, _: &str, _: usize) -> Result<Vec<ExternalGame>, ProviderError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(vec![ExternalGame::new(1, "Too Late")])
        }

        async fn get_by_id(&self, _: u64) -> Result<Option<ExternalGame>, ProviderError> {
            Ok(None)
        }
    }

    #[derive(Default)]
    struct CountingProvider {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl MetadataProvider for CountingProvider {
        async fn search(&self, query: &str, _: usize) -> Result<Vec<ExternalGame>, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![ExternalGame::new(7, query)])
        }

        async fn get_by_id(&self, _: u64) -> Result<Option<ExternalGame>, ProviderError> {
            Ok(None)
        }
    }

    fn catalog() -> Arc<dyn Catalog> {
        Arc::new(InMemoryCatalog::from_records(vec![CatalogRecord {
            name: "Halo".to_string(),
            ..CatalogRecord::default()
        }]))
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_yields_empty_external() {
        let retriever = CandidateRetriever::new(
            catalog(),
            Some(Arc::new(SlowProvider)),
            Arc::new(SearchCache::default()),
            3,
            Duration::from_secs(3),
        );

        let lists = retriever.retrieve("halo", 10, true).await;
        check!(lists.len() == 2);
        check!(lists[0].len() == 1);
        check!(lists[1].is_empty());
    }

    #[tokio::test]
    async fn test_external_results_are_cached() {
        let provider = Arc::new(CountingProvider::default());
        let retriever = CandidateRetriever::new(
            catalog(),
            Some(provider.clone()),
            Arc::new(SearchCache::default()),
            3,
            Duration::from_secs(3),
        );

        let first = retriever.retrieve_external("halo", 10).await;
        let second = retriever.retrieve_external("Halo", 10).await;
        check!(first == second);
        check!(provider.calls.load(Ordering::SeqCst) == 1);
    }

    #[tokio::test]
    async fn test_external_skipped_when_excluded() {
        let provider = Arc::new(CountingProvider::default());
        let retriever = CandidateRetriever::new(
            catalog(),
            Some(provider.clone()),
            Arc::new(SearchCache::default()),
            3,
            Duration::from_secs(3),
        );

        let lists = retriever.retrieve("halo", 10, false).await;
        check!(lists.len() == 1);
        check!(provider.calls.load(Ordering::SeqCst) == 0);
    }
}
