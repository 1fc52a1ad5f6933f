//! streamscale-metrics — the stats aggregation boundary.
//!
//! The engine consumes per-component aggregated metrics, refreshed by
//! the host at the top of each pass. Collection internals live outside
//! this workspace; this crate only defines the contract and a static
//! in-memory provider.

pub mod stats;

pub use stats::{ComponentStats, StaticStats, StatsError, StatsProvider, StatsResult};
