//! Franchise data: detection patterns, flagship entries and platform affinity.

pub mod flagship;
pub mod table;

pub use flagship::{FlagshipBoost, flagship_boost, match_flagship};
pub use table::{FlagshipEntry, Franchise, FranchiseTable, SignificanceTag};
