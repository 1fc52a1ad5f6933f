//! streamscale-graph — the per-topology component graph.
//!
//! Each scheduling pass builds a fresh directed graph of processing
//! stages from the topology's stream subscriptions. The graph is built
//! immutably in two phases (declare all components, then wire edges) so
//! the ranking code never sees a partially-built graph.
//!
//! System-internal components (names prefixed with `__`) and self-loops
//! are filtered out before construction. Centrality traversal tracks a
//! visited set, so user-level cycles cannot loop it.

pub mod graph;
pub mod query;

pub use graph::{Component, ComponentGraph, ComponentSpec};
pub use query::{GraphQuery, StaticGraphs};
