//! The end-to-end search: variants, retrieval, filtering, scoring, ordering.
//!
//! Each stage is a function from one candidate set to the next. Nothing is
//! kept between requests except what the shared caches hold.

use super::classify::{ContentClassifier, content_filter};
use super::dedup::{merge, retain_new};
use super::filter::{Relevant, category_filter, fuzzy_rerank, relevance_filter};
use super::quality::WeightSource;
use super::rank::{ScoringContext, final_sort, score};
use super::retrieve::CandidateRetriever;
use super::tokenize::normalize_name;
use super::variants::{AbbreviationExpander, QueryVariantGenerator};
use crate::cache::{SearchCache, ranked_key};
use crate::catalog::{Catalog, InMemoryCatalog};
use crate::config::{RankingConfig, SearchConfig};
use crate::error::DataError;
use crate::franchise::{Franchise, FranchiseTable};
use crate::provider::MetadataProvider;
use crate::types::{GameCandidate, GameKey, RankedGame, SearchOptions};
use crate::worker::{ImportQueue, ImportRequest};
use ahash::AHashSet;
use chrono::Datelike;
use std::fmt;
use std::sync::Arc;

/// Pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchStage {
    Retrieved,
    Deduplicated,
    ContentFiltered,
    CategoryFiltered,
    RelevanceFiltered,
    FuzzyReranked,
    SisterBackfilled,
    PriorityBoosted,
    FinalSorted,
}

impl fmt::Display for SearchStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Retrieved => "retrieved",
            Self::Deduplicated => "deduplicated",
            Self::ContentFiltered => "content filtered",
            Self::CategoryFiltered => "category filtered",
            Self::RelevanceFiltered => "relevance filtered",
            Self::FuzzyReranked => "fuzzy reranked",
            Self::SisterBackfilled => "sister backfilled",
            Self::PriorityBoosted => "priority boosted",
            Self::FinalSorted => "final sorted",
        };
        f.write_str(s)
    }
}

/// Ranked results plus the candidate count after each stage.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SearchReport {
    pub results: Vec<RankedGame>,
    pub stages: Vec<(SearchStage, usize)>,
    /// Served from the ranked-result cache; `stages` is empty.
    pub cached: bool,
}

impl SearchReport {
    pub fn count(&self, stage: SearchStage) -> Option<usize> {
        self.stages
            .iter()
            .find(|(s, _)| *s == stage)
            .map(|(_, count)| *count)
    }

    fn record(&mut self, stage: SearchStage, count: usize) {
        tracing::debug!("{}: {}", stage, count);
        self.stages.push((stage, count));
    }
}

pub struct SearchPipeline {
    retriever: CandidateRetriever,
    classifier: ContentClassifier,
    variants: Arc<dyn QueryVariantGenerator>,
    weights: Arc<dyn WeightSource>,
    cache: Arc<SearchCache>,
    import_queue: Option<ImportQueue>,
    ranking: RankingConfig,
    reference_year: Option<i32>,
}

impl fmt::Debug for SearchPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchPipeline")
            .field("retriever", &self.retriever)
            .field("ranking", &self.ranking)
            .field("has_import_queue", &self.import_queue.is_some())
            .finish_non_exhaustive()
    }
}

impl SearchPipeline {
    pub fn builder() -> SearchPipelineBuilder {
        SearchPipelineBuilder::default()
    }

    /// Ranked results for `query`. Never fails; collaborator errors degrade the result.
    pub async fn search(&self, query: &str, options: SearchOptions) -> Vec<RankedGame> {
        self.search_with_report(query, options).await.results
    }

    /// Like [`SearchPipeline::search`], also reporting per-stage candidate counts.
    pub async fn search_with_report(&self, query: &str, options: SearchOptions) -> SearchReport {
        let mut report = SearchReport::default();
        if query.trim().is_empty() || options.limit == 0 {
            return report;
        }

        let weights = self.weights.weights();
        let cache_key = ranked_key(query, &options, &weights);
        if let Some(results) = self.cache.ranked.get(&cache_key) {
            tracing::debug!("Ranked cache hit for '{}'", query);
            report.results = results;
            report.cached = true;
            return report;
        }

        tracing::info!("Searching for '{}' (limit {})", query, options.limit);
        let queries = self.query_variants(query);
        let franchise = queries
            .iter()
            .find_map(|q| self.classifier.detect_franchise(q));
        if let Some(franchise) = franchise {
            tracing::debug!("Query targets franchise '{}'", franchise.name);
        }
        let include_external = options.include_external_source;
        let fetch_limit = self.ranking.fetch_limit(options.limit);

        let lists: Vec<Vec<GameCandidate>> = futures::future::join_all(
            queries
                .iter()
                .map(|q| self.retriever.retrieve(q, fetch_limit, include_external)),
        )
        .await
        .into_iter()
        .flatten()
        .collect();
        report.record(SearchStage::Retrieved, lists.iter().map(Vec::len).sum());

        let candidates = merge(lists);
        report.record(SearchStage::Deduplicated, candidates.len());

        let candidates = self.apply_content_filter(candidates, options.apply_content_filter);
        report.record(SearchStage::ContentFiltered, candidates.len());

        let candidates = category_filter(candidates);
        report.record(SearchStage::CategoryFiltered, candidates.len());

        let relevant = relevance_filter(candidates, &queries, franchise, &self.ranking);
        report.record(SearchStage::RelevanceFiltered, relevant.len());

        let mut relevant = fuzzy_rerank(relevant, self.ranking.rerank_window);
        report.record(SearchStage::FuzzyReranked, relevant.len());

        if let Some(franchise) = franchise
            && relevant.len() < options.limit
            && franchise.has_sisters()
        {
            let extra = self
                .sister_backfill(franchise, &relevant, &queries, fetch_limit, options)
                .await;
            relevant.extend(extra);
        }
        report.record(SearchStage::SisterBackfilled, relevant.len());

        let ctx = ScoringContext {
            franchise,
            weights,
            reference_year: self
                .reference_year
                .unwrap_or_else(|| chrono::Utc::now().year()),
        };
        let ranked: Vec<RankedGame> = relevant.into_iter().map(|r| score(r, &ctx)).collect();
        report.record(SearchStage::PriorityBoosted, ranked.len());

        let results = final_sort(ranked, options.limit);
        report.record(SearchStage::FinalSorted, results.len());

        self.queue_imports(&results);
        self.cache.ranked.insert(cache_key, results.clone());

        tracing::info!("Search for '{}' returned {} results", query, results.len());
        report.results = results;
        report
    }

    /// The original query first, then generated variants, deduplicated and capped.
    fn query_variants(&self, query: &str) -> Vec<String> {
        let original = normalize_name(query);
        let mut queries = vec![original];
        for variant in self.variants.variants(query) {
            let variant = normalize_name(&variant);
            if !variant.is_empty() && !queries.contains(&variant) {
                queries.push(variant);
            }
        }
        queries.truncate(self.ranking.max_variants.max(1));
        queries
    }

    fn apply_content_filter(
        &self,
        candidates: Vec<GameCandidate>,
        enabled: bool,
    ) -> Vec<GameCandidate> {
        if enabled {
            content_filter(&self.classifier, candidates)
        } else {
            candidates
        }
    }

    /// Sequential lookups for a franchise's paired releases. Only new games are returned.
    async fn sister_backfill(
        &self,
        franchise: &Franchise,
        present: &[Relevant],
        queries: &[String],
        fetch_limit: usize,
        options: SearchOptions,
    ) -> Vec<Relevant> {
        tracing::debug!(
            "Backfilling {} sister queries for '{}'",
            franchise.sister_patterns.len(),
            franchise.name
        );
        let lists = self
            .retriever
            .retrieve_sequential(
                &franchise.sister_patterns,
                fetch_limit,
                options.include_external_source,
            )
            .await;

        let existing: AHashSet<GameKey> = present.iter().map(|r| r.game.key()).collect();
        let extra = retain_new(&existing, lists.into_iter().flatten().collect());
        let extra = self.apply_content_filter(extra, options.apply_content_filter);
        let extra = category_filter(extra);
        relevance_filter(extra, queries, Some(franchise), &self.ranking)
    }

    /// Queues results that exist only in the external source. Failures are logged only.
    fn queue_imports(&self, results: &[RankedGame]) {
        let Some(queue) = &self.import_queue else {
            return;
        };
        for ranked in results {
            let game = &ranked.game;
            if game.is_stored() || game.external_id.is_none() {
                continue;
            }
            if let Err(e) = queue.enqueue(ImportRequest::new(game.clone())) {
                tracing::warn!("Could not queue '{}' for import: {}", game.name, e);
            }
        }
    }
}

/// Assembles a [`SearchPipeline`]. Everything but the catalog has a default.
#[derive(Default)]
pub struct SearchPipelineBuilder {
    catalog: Option<Arc<dyn Catalog>>,
    provider: Option<Arc<dyn MetadataProvider>>,
    config: SearchConfig,
    cache: Option<Arc<SearchCache>>,
    import_queue: Option<ImportQueue>,
    weights: Option<Arc<dyn WeightSource>>,
    franchises: Option<Arc<FranchiseTable>>,
    variants: Option<Arc<dyn QueryVariantGenerator>>,
    reference_year: Option<i32>,
}

impl SearchPipelineBuilder {
    pub fn catalog(mut self, catalog: Arc<dyn Catalog>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    pub fn provider(mut self, provider: Arc<dyn MetadataProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn config(mut self, config: SearchConfig) -> Self {
        self.config = config;
        self
    }

    pub fn cache(mut self, cache: Arc<SearchCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn import_queue(mut self, queue: ImportQueue) -> Self {
        self.import_queue = Some(queue);
        self
    }

    /// Overrides the weights from config, e.g. with [`SharedWeights`](super::quality::SharedWeights).
    pub fn weights(mut self, weights: Arc<dyn WeightSource>) -> Self {
        self.weights = Some(weights);
        self
    }

    pub fn franchises(mut self, table: Arc<FranchiseTable>) -> Self {
        self.franchises = Some(table);
        self
    }

    pub fn variants(mut self, generator: Arc<dyn QueryVariantGenerator>) -> Self {
        self.variants = Some(generator);
        self
    }

    /// Pins the year recency is measured against. Defaults to the current year.
    pub const fn reference_year(mut self, year: i32) -> Self {
        self.reference_year = Some(year);
        self
    }

    pub fn build(self) -> Result<SearchPipeline, DataError> {
        let franchises = match self.franchises {
            Some(table) => table,
            None => Arc::new(FranchiseTable::embedded()?),
        };
        let config = self.config;
        let cache = self
            .cache
            .unwrap_or_else(|| Arc::new(SearchCache::new(&config.cache)));
        let catalog = self
            .catalog
            .unwrap_or_else(|| Arc::new(InMemoryCatalog::new()) as Arc<dyn Catalog>);
        let variants = self.variants.unwrap_or_else(|| {
            Arc::new(AbbreviationExpander::new(
                franchises.clone(),
                config.ranking.max_variants,
            )) as Arc<dyn QueryVariantGenerator>
        });
        let weights = self
            .weights
            .unwrap_or_else(|| Arc::new(config.weights) as Arc<dyn WeightSource>);

        Ok(SearchPipeline {
            retriever: CandidateRetriever::new(
                catalog,
                self.provider,
                cache.clone(),
                config.provider.max_concurrent,
                config.provider.timeout(),
            ),
            classifier: ContentClassifier::new(franchises),
            variants,
            weights,
            cache,
            import_queue: self.import_queue,
            ranking: config.ranking,
            reference_year: self.reference_year,
        })
    }
}
