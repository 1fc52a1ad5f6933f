//! The topology graph query boundary.

use std::collections::HashMap;

use crate::graph::{ComponentGraph, ComponentSpec};

/// Optional metadata service returning a topology's component graph.
///
/// Fetch failures are transient: callers log them and rank on load
/// alone for that pass.
pub trait GraphQuery {
    fn component_graph(&self, topology_id: &str) -> anyhow::Result<ComponentGraph>;
}

/// In-memory graph source keyed by topology id.
#[derive(Debug, Default)]
pub struct StaticGraphs {
    specs: HashMap<String, Vec<ComponentSpec>>,
}

impl StaticGraphs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, topology_id: impl Into<String>, specs: Vec<ComponentSpec>) {
        self.specs.insert(topology_id.into(), specs);
    }
}

impl GraphQuery for StaticGraphs {
    fn component_graph(&self, topology_id: &str) -> anyhow::Result<ComponentGraph> {
        match self.specs.get(topology_id) {
            Some(specs) => Ok(ComponentGraph::build(specs)),
            None => anyhow::bail!("no graph metadata for topology {topology_id}"),
        }
    }
}
