use anyhow::Context;
use game_search::cache::SearchCache;
use game_search::catalog::{Catalog, InMemoryCatalog};
use game_search::config::SearchConfig;
use game_search::franchise::FranchiseTable;
use game_search::provider::{MetadataProvider, ProxyProvider};
use game_search::search::SearchPipeline;
use game_search::server::GameSearchServer;
use game_search::worker::{ImportQueue, spawn_cache_sweeper, spawn_import_worker};
use rmcp::{ServiceExt, transport::stdio};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr; stdout carries the MCP protocol
    game_search::tracing::init();

    tracing::info!("Starting game-search MCP server");

    let config = SearchConfig::load(None).context("Failed to load configuration")?;
    let franchises =
        Arc::new(FranchiseTable::embedded().context("Failed to load franchise data")?);

    let catalog: Arc<dyn Catalog> = match &config.catalog_path {
        Some(path) => Arc::new(
            InMemoryCatalog::load(path)
                .with_context(|| format!("Failed to load catalog from {}", path.display()))?,
        ),
        None => Arc::new(InMemoryCatalog::new()),
    };

    let provider: Option<Arc<dyn MetadataProvider>> = if config.provider.base_url.is_some() {
        let provider =
            ProxyProvider::from_config(&config.provider).context("Failed to build provider")?;
        Some(Arc::new(provider))
    } else {
        tracing::info!("No provider endpoint configured; searching the local catalog only");
        None
    };

    let token = CancellationToken::new();
    let cache = Arc::new(SearchCache::new(&config.cache));
    let (queue, receiver) = ImportQueue::channel(config.import.queue_capacity);

    let importer = spawn_import_worker(
        catalog.clone(),
        receiver,
        config.import.batch_size,
        token.clone(),
    );
    let sweeper = spawn_cache_sweeper(
        cache.clone(),
        Duration::from_secs(config.cache.sweep_interval_secs),
        token.clone(),
    );

    let mut builder = SearchPipeline::builder()
        .catalog(catalog)
        .cache(cache)
        .import_queue(queue)
        .franchises(franchises.clone())
        .config(config);
    if let Some(provider) = provider {
        builder = builder.provider(provider);
    }
    let pipeline = Arc::new(builder.build().context("Failed to build search pipeline")?);

    let server = GameSearchServer::new(pipeline, franchises);
    let service = server.serve(stdio()).await.inspect_err(|e| {
        tracing::error!("Error serving MCP server: {:?}", e);
    })?;

    service.waiting().await?;

    token.cancel();
    let _ = tokio::join!(importer, sweeper);
    tracing::info!("game-search stopped");

    Ok(())
}
