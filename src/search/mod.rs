//! Game search pipeline: retrieval, filtering, scoring and ranking.
//!
//! [`SearchPipeline`] wires the stages together; each stage lives in its own
//! module and is usable on its own.

pub mod classify;
pub mod dedup;
pub mod filter;
pub mod pipeline;
pub mod platform;
pub mod quality;
pub mod rank;
pub mod retrieve;
pub mod scoring;
pub mod tokenize;
pub mod variants;

pub use classify::{Classification, ContentClassifier, DisallowReason};
pub use pipeline::{SearchPipeline, SearchPipelineBuilder, SearchReport, SearchStage};
pub use platform::PlatformClass;
pub use quality::{SharedWeights, SubScores, WeightSource};
pub use retrieve::CandidateRetriever;
pub use variants::{AbbreviationExpander, NoVariants, QueryVariantGenerator};
