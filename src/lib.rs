pub mod cache;
pub mod catalog;
pub mod config;
pub mod error;
pub mod franchise;
pub mod provider;
pub mod search;
pub mod server;
pub mod tools;
pub mod tracing;
pub mod types;
pub mod worker;

pub use catalog::{Catalog, CatalogQuery, CatalogRecord, InMemoryCatalog};
pub use config::SearchConfig;
pub use franchise::FranchiseTable;
pub use provider::{MetadataProvider, ProxyProvider};
pub use search::{SearchPipeline, SearchReport, SearchStage};
pub use server::GameSearchServer;
pub use types::{GameCandidate, RankedGame, ScoreBreakdown, SearchOptions};
