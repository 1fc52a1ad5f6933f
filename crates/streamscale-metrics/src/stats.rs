//! Per-component stats types and the provider contract.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for stats fetches.
pub type StatsResult<T> = Result<T, StatsError>;

/// Errors from the stats backend. All of these are transient: a caller
/// logs them and proceeds with structural ranking only for the pass.
#[derive(Debug, Error)]
pub enum StatsError {
    #[error("stats backend unavailable: {0}")]
    Unavailable(String),

    #[error("no stats recorded for topology: {0}")]
    UnknownTopology(String),
}

/// Aggregated recent metrics for one component.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ComponentStats {
    /// Tuples processed per second across all executors.
    pub throughput: f64,
    /// Execute rate (calls per second).
    pub execute_rate: f64,
    /// Emit rate (tuples emitted per second).
    pub emit_rate: f64,
}

impl ComponentStats {
    pub fn new(throughput: f64, execute_rate: f64, emit_rate: f64) -> Self {
        Self {
            throughput,
            execute_rate,
            emit_rate,
        }
    }

    /// Scalar load pressure used by the ranking strategy.
    pub fn load(&self) -> f64 {
        self.throughput + self.execute_rate
    }
}

/// Supplies per-component metrics keyed by component name.
pub trait StatsProvider {
    fn component_stats(&self, topology_id: &str) -> StatsResult<HashMap<String, ComponentStats>>;
}

/// Fixed in-memory stats, set by the host (or a test) before a pass.
#[derive(Debug, Default)]
pub struct StaticStats {
    per_topology: HashMap<String, HashMap<String, ComponentStats>>,
}

impl StaticStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(
        &mut self,
        topology_id: impl Into<String>,
        component: impl Into<String>,
        stats: ComponentStats,
    ) {
        self.per_topology
            .entry(topology_id.into())
            .or_default()
            .insert(component.into(), stats);
    }
}

impl StatsProvider for StaticStats {
    fn component_stats(&self, topology_id: &str) -> StatsResult<HashMap<String, ComponentStats>> {
        self.per_topology
            .get(topology_id)
            .cloned()
            .ok_or_else(|| StatsError::UnknownTopology(topology_id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_combines_throughput_and_execute_rate() {
        let stats = ComponentStats::new(100.0, 20.0, 80.0);
        assert_eq!(stats.load(), 120.0);
    }

    #[test]
    fn static_stats_round_trip() {
        let mut provider = StaticStats::new();
        provider.set("t-1", "split", ComponentStats::new(50.0, 10.0, 40.0));

        let stats = provider.component_stats("t-1").unwrap();
        assert_eq!(stats["split"].throughput, 50.0);
    }

    #[test]
    fn missing_topology_is_an_error() {
        let provider = StaticStats::new();
        assert!(matches!(
            provider.component_stats("t-x"),
            Err(StatsError::UnknownTopology(_))
        ));
    }
}
