//! Component graph construction and centrality.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use serde::{Deserialize, Serialize};

/// Name prefix of host-internal components excluded from the graph.
const SYSTEM_PREFIX: &str = "__";

/// Declared inputs of one processing stage, as reported by the topology
/// metadata. A source component (spout) simply declares no inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentSpec {
    pub name: String,
    /// Names of the components this stage subscribes to.
    pub inputs: Vec<String>,
}

impl ComponentSpec {
    pub fn new(name: impl Into<String>, inputs: Vec<&str>) -> Self {
        Self {
            name: name.into(),
            inputs: inputs.into_iter().map(str::to_string).collect(),
        }
    }
}

/// A named processing stage with its graph edges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    pub name: String,
    pub parents: BTreeSet<String>,
    pub children: BTreeSet<String>,
}

impl Component {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            parents: BTreeSet::new(),
            children: BTreeSet::new(),
        }
    }

    /// Number of direct neighbors (distinct parents plus children).
    pub fn degree(&self) -> usize {
        self.parents.union(&self.children).count()
    }
}

/// Directed graph of a topology's user components.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComponentGraph {
    components: BTreeMap<String, Component>,
}

impl ComponentGraph {
    /// Build the graph from per-component input declarations.
    ///
    /// Phase one declares every user component; phase two wires the
    /// parent/child edges. System components and self-subscriptions
    /// never enter the graph.
    pub fn build(specs: &[ComponentSpec]) -> Self {
        let mut components: BTreeMap<String, Component> = BTreeMap::new();

        for spec in specs {
            if is_system(&spec.name) {
                continue;
            }
            components
                .entry(spec.name.clone())
                .or_insert_with(|| Component::new(&spec.name));
            for input in &spec.inputs {
                if is_system(input) || *input == spec.name {
                    continue;
                }
                components
                    .entry(input.clone())
                    .or_insert_with(|| Component::new(input));
            }
        }

        for spec in specs {
            if is_system(&spec.name) {
                continue;
            }
            for input in &spec.inputs {
                if is_system(input) || *input == spec.name {
                    continue;
                }
                if let Some(child) = components.get_mut(&spec.name) {
                    child.parents.insert(input.clone());
                }
                if let Some(parent) = components.get_mut(input) {
                    parent.children.insert(spec.name.clone());
                }
            }
        }

        Self { components }
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn component(&self, name: &str) -> Option<&Component> {
        self.components.get(name)
    }

    /// Components in name order.
    pub fn components(&self) -> impl Iterator<Item = &Component> {
        self.components.values()
    }

    /// Structural centrality: how many distinct components are reachable
    /// from `name` following parent and child edges in either direction.
    ///
    /// Traversal is breadth-first over a visited set, so cyclic
    /// subscriptions between user components terminate.
    pub fn centrality(&self, name: &str) -> usize {
        let Some(start) = self.components.get(name) else {
            return 0;
        };

        let mut visited: BTreeSet<&str> = BTreeSet::new();
        visited.insert(start.name.as_str());
        let mut queue: VecDeque<&Component> = VecDeque::new();
        queue.push_back(start);

        while let Some(comp) = queue.pop_front() {
            for neighbor in comp.parents.iter().chain(comp.children.iter()) {
                if visited.insert(neighbor.as_str())
                    && let Some(next) = self.components.get(neighbor)
                {
                    queue.push_back(next);
                }
            }
        }

        // Reachable components, excluding the start itself.
        visited.len() - 1
    }
}

fn is_system(name: &str) -> bool {
    name.starts_with(SYSTEM_PREFIX)
}
