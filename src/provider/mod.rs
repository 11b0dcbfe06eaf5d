//! The external game-metadata provider contract.

pub mod igdb;
pub mod proxy;

pub use igdb::ExternalGame;
pub use proxy::ProxyProvider;

use crate::error::ProviderError;
use async_trait::async_trait;

/// Remote metadata source. Implementations do not retry; callers bound them with a timeout.
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<ExternalGame>, ProviderError>;

    async fn get_by_id(&self, id: u64) -> Result<Option<ExternalGame>, ProviderError>;
}
