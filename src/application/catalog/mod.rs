//! Path catalog.
//!
//! Holds the configured static cycles and the dynamic cycles generated from
//! the token graph, and produces the ranked candidate list for each scan.

pub mod graph;
mod paths;
pub mod ranking;

pub use graph::{enumerate_cycles, CycleBounds};
pub use paths::{CatalogSettings, PathCatalog, ScanMode};
pub use ranking::{rank, score, top_k_per_group, RankedPath, RankingWeights};
