//! Process-wide scheduling state carried across passes.
//!
//! The engine must remember what it committed last time: the stored
//! assignment gates migration readiness, the node-set snapshots detect
//! newly joined machines, and the per-topology signal/balanced flags
//! drive the scale-out state machine. `update_info` must run before
//! any read in the same pass; passes are serialized by the host, so no
//! internal locking is needed here.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use tracing::{debug, info};

use streamscale_cluster::{Cluster, Executor, NodeId, Topology, TopologyId, WorkerSlot};
use streamscale_signal::ScaleSignal;

/// Per-topology slice of the global state.
#[derive(Debug, Clone, Default)]
pub struct TopologyState {
    /// Last committed executor→slot snapshot; `None` until the first
    /// `store_state` after creation (or after a global clear).
    assignment: Option<HashMap<Executor, WorkerSlot>>,
    /// Node set recorded when the assignment was last stored.
    nodes_at_store: BTreeSet<NodeId>,
    /// Node set from the current `update_info`.
    known_nodes: BTreeSet<NodeId>,
    /// Node set from the previous `update_info`.
    prev_nodes: BTreeSet<NodeId>,
    /// Scaling operation currently in flight for this topology.
    pub rebalance_signal: ScaleSignal,
    /// Set once the migration phase has committed, to stop repeated
    /// reassignment.
    pub balanced: bool,
}

/// Long-lived store of every topology's scheduling state.
///
/// Created once at process start and handed by reference into each
/// pass; cleared only when a pass observes zero topologies.
#[derive(Debug, Default)]
pub struct GlobalState {
    topologies: HashMap<TopologyId, TopologyState>,
}

impl GlobalState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Refresh node-set snapshots from the live cluster. Call at the
    /// top of every pass, before any other read.
    pub fn update_info(&mut self, cluster: &Cluster, topologies: &[Topology]) {
        let current = cluster.node_ids();
        for topo in topologies {
            let entry = self.topologies.entry(topo.id.clone()).or_default();
            entry.prev_nodes = std::mem::replace(&mut entry.known_nodes, current.clone());
        }
        debug!(
            topologies = topologies.len(),
            nodes = current.len(),
            "global state refreshed"
        );
    }

    /// Persist the committed assignment of every topology.
    pub fn store_state(&mut self, cluster: &Cluster, topologies: &[Topology]) {
        for topo in topologies {
            let entry = self.topologies.entry(topo.id.clone()).or_default();
            entry.assignment = Some(
                cluster
                    .assignment(&topo.id)
                    .cloned()
                    .unwrap_or_default(),
            );
            entry.nodes_at_store = cluster.node_ids();
        }
    }

    /// Nodes present in the current snapshot but absent from the one
    /// taken at the previous `update_info`.
    pub fn new_nodes(&self, topology_id: &str) -> BTreeSet<NodeId> {
        match self.topologies.get(topology_id) {
            Some(entry) => entry.known_nodes.difference(&entry.prev_nodes).cloned().collect(),
            None => BTreeSet::new(),
        }
    }

    /// Nodes that joined since the assignment was last stored. The
    /// migration phase weights resized components toward these.
    pub fn joined_since_store(&self, topology_id: &str) -> BTreeSet<NodeId> {
        match self.topologies.get(topology_id) {
            Some(entry) => entry
                .known_nodes
                .difference(&entry.nodes_at_store)
                .cloned()
                .collect(),
            None => BTreeSet::new(),
        }
    }

    /// Whether no assignment has ever been stored for the topology.
    /// Used as a readiness gate before any scale-out phase.
    pub fn state_empty(&self, topology_id: &str) -> bool {
        self.topologies
            .get(topology_id)
            .is_none_or(|entry| entry.assignment.is_none())
    }

    /// Components whose executor count grew past the stored snapshot.
    pub fn grown_components(&self, topology: &Topology) -> BTreeSet<String> {
        let stored = match self
            .topologies
            .get(&topology.id)
            .and_then(|e| e.assignment.as_ref())
        {
            Some(assignment) => assignment,
            None => return BTreeSet::new(),
        };

        let mut stored_counts: BTreeMap<&str, usize> = BTreeMap::new();
        for exec in stored.keys() {
            *stored_counts.entry(exec.component.as_str()).or_default() += 1;
        }

        topology
            .component_names()
            .into_iter()
            .filter(|name| {
                topology.parallelism_of(name)
                    > stored_counts.get(name.as_str()).copied().unwrap_or(0)
            })
            .collect()
    }

    pub fn signal(&self, topology_id: &str) -> ScaleSignal {
        self.topologies
            .get(topology_id)
            .map(|e| e.rebalance_signal)
            .unwrap_or_default()
    }

    pub fn set_signal(&mut self, topology_id: &str, signal: ScaleSignal) {
        self.topologies
            .entry(topology_id.to_string())
            .or_default()
            .rebalance_signal = signal;
    }

    pub fn balanced(&self, topology_id: &str) -> bool {
        self.topologies
            .get(topology_id)
            .is_some_and(|e| e.balanced)
    }

    pub fn set_balanced(&mut self, topology_id: &str, balanced: bool) {
        self.topologies
            .entry(topology_id.to_string())
            .or_default()
            .balanced = balanced;
    }

    /// Drop every entry. Fired only when a pass sees zero topologies.
    pub fn clear(&mut self) {
        if !self.topologies.is_empty() {
            info!(entries = self.topologies.len(), "clearing global state");
        }
        self.topologies.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use streamscale_cluster::{Supervisor, TopologyStatus};

    fn cluster(node_ids: &[&str]) -> Cluster {
        Cluster::new(
            node_ids
                .iter()
                .map(|id| Supervisor::new(*id, format!("host-{id}"), vec![6700]))
                .collect(),
        )
    }

    fn topology() -> Topology {
        Topology::new(
            "t-1",
            "wc",
            TopologyStatus::Active,
            vec![Executor::new(1, 1, "spout"), Executor::new(2, 2, "split")],
        )
    }

    #[test]
    fn new_nodes_is_the_set_difference_across_updates() {
        let mut state = GlobalState::new();
        let topo = topology();

        state.update_info(&cluster(&["a", "b"]), std::slice::from_ref(&topo));
        state.update_info(&cluster(&["a", "b", "c"]), std::slice::from_ref(&topo));
        assert_eq!(state.new_nodes("t-1"), BTreeSet::from(["c".to_string()]));

        // A repeat with the same inventory reports nothing new.
        state.update_info(&cluster(&["a", "b", "c"]), std::slice::from_ref(&topo));
        assert!(state.new_nodes("t-1").is_empty());
    }

    #[test]
    fn joined_since_store_persists_across_updates() {
        let mut state = GlobalState::new();
        let topo = topology();
        let small = cluster(&["a", "b"]);

        state.update_info(&small, std::slice::from_ref(&topo));
        state.store_state(&small, std::slice::from_ref(&topo));

        let grown = cluster(&["a", "b", "c"]);
        state.update_info(&grown, std::slice::from_ref(&topo));
        state.update_info(&grown, std::slice::from_ref(&topo));

        assert!(state.new_nodes("t-1").is_empty());
        assert_eq!(
            state.joined_since_store("t-1"),
            BTreeSet::from(["c".to_string()])
        );
    }

    #[test]
    fn state_empty_until_first_store() {
        let mut state = GlobalState::new();
        let topo = topology();
        let cluster = cluster(&["a"]);

        assert!(state.state_empty("t-1"));
        state.update_info(&cluster, std::slice::from_ref(&topo));
        assert!(state.state_empty("t-1"));

        state.store_state(&cluster, std::slice::from_ref(&topo));
        assert!(!state.state_empty("t-1"));
    }

    #[test]
    fn clear_resets_everything() {
        let mut state = GlobalState::new();
        let topo = topology();
        let cluster = cluster(&["a"]);
        state.update_info(&cluster, std::slice::from_ref(&topo));
        state.store_state(&cluster, std::slice::from_ref(&topo));
        state.set_signal("t-1", ScaleSignal::ScaleOut);
        state.set_balanced("t-1", true);

        state.clear();

        assert!(state.state_empty("t-1"));
        assert_eq!(state.signal("t-1"), ScaleSignal::None);
        assert!(!state.balanced("t-1"));
    }

    #[test]
    fn grown_components_compare_against_stored_counts() {
        let mut state = GlobalState::new();
        let mut cluster = cluster(&["a"]);
        let before = topology();
        state.update_info(&cluster, std::slice::from_ref(&before));
        cluster
            .assign(
                &WorkerSlot::new("a", 6700),
                "t-1",
                &[Executor::new(1, 1, "spout"), Executor::new(2, 2, "split")],
            )
            .unwrap();
        state.store_state(&cluster, std::slice::from_ref(&before));

        // split grew from 1 to 2 executors; spout is unchanged.
        let after = Topology::new(
            "t-1",
            "wc",
            TopologyStatus::Rebalancing,
            vec![
                Executor::new(1, 1, "spout"),
                Executor::new(2, 2, "split"),
                Executor::new(3, 3, "split"),
            ],
        );

        assert_eq!(
            state.grown_components(&after),
            BTreeSet::from(["split".to_string()])
        );
        assert!(state.grown_components(&before).is_empty());
    }

    #[test]
    fn signal_defaults_to_none_for_unknown_topologies() {
        let state = GlobalState::new();
        assert_eq!(state.signal("nope"), ScaleSignal::None);
        assert!(!state.balanced("nope"));
    }
}
