//! Multi-indexer torrent search: query variants, per-source adapters,
//! concurrent aggregation and two-tier ranking.

pub mod adapters;
mod aggregator;
pub mod heuristics;
pub mod quality;
pub mod query;
mod types;

pub use aggregator::{MultiSearcher, SearchOutcome};
pub use types::*;
