//! Per-pass node views.
//!
//! A `NodeView` is the read-only snapshot of one machine as seen by a
//! single scaling decision: its assignable slots and the topology's
//! executors currently placed on them. Views are built fresh at the
//! start of a decision and never outlive the pass.

use std::collections::BTreeMap;

use streamscale_cluster::{Cluster, Executor, NodeId, Topology, WorkerSlot};

/// One machine's slots and hosted executors for a single topology.
#[derive(Debug, Clone)]
pub struct NodeView {
    pub node_id: NodeId,
    pub hostname: String,
    pub slots: Vec<WorkerSlot>,
    /// This topology's executors on this node, sorted.
    pub executors: Vec<Executor>,
    pub slot_executors: BTreeMap<WorkerSlot, Vec<Executor>>,
}

impl NodeView {
    /// Whether the node hosts any of the topology's executors.
    pub fn is_occupied(&self) -> bool {
        !self.executors.is_empty()
    }
}

/// Build a view of every supervisor for the given topology.
pub fn build_node_views(cluster: &Cluster, topology: &Topology) -> BTreeMap<NodeId, NodeView> {
    let mut views = BTreeMap::new();
    for (node_id, sup) in cluster.supervisors() {
        let slots = cluster.assignable_slots(node_id);
        let mut slot_executors = BTreeMap::new();
        let mut executors = Vec::new();
        for slot in &slots {
            let execs = cluster.executors_on_slot(&topology.id, slot);
            executors.extend(execs.iter().cloned());
            slot_executors.insert(slot.clone(), execs);
        }
        executors.sort();
        views.insert(
            node_id.clone(),
            NodeView {
                node_id: node_id.clone(),
                hostname: sup.host.clone(),
                slots,
                executors,
                slot_executors,
            },
        );
    }
    views
}
