//! Scale-in: evacuate the lowest-ranked nodes and repack.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use tracing::{debug, warn};

use streamscale_cluster::{Cluster, Executor, NodeId, Topology, WorkerSlot};
use streamscale_graph::ComponentGraph;
use streamscale_metrics::ComponentStats;

use crate::ranking::{RankWeights, rank_nodes_for_removal};
use crate::view::{NodeView, build_node_views};

/// Result of a scale-in decision.
///
/// `assignments` maps every slot whose contents change to its new
/// executor list: slots on evacuated nodes map to an empty list,
/// receiving slots to their full new contents. The caller must free
/// exactly these slots before re-assigning the non-empty entries.
#[derive(Debug, Clone, Default)]
pub struct ScaleInPlan {
    /// Nodes selected for removal, best candidate first.
    pub evacuated: Vec<NodeId>,
    pub assignments: BTreeMap<WorkerSlot, Vec<Executor>>,
}

impl ScaleInPlan {
    /// A plan that changes nothing; the orchestrator commits no-ops
    /// without touching the cluster.
    pub fn is_noop(&self) -> bool {
        self.assignments.is_empty()
    }

    /// The slots the caller must free, in order.
    pub fn freed_slots(&self) -> Vec<WorkerSlot> {
        self.assignments.keys().cloned().collect()
    }
}

/// Select up to `remove_count` machines to evacuate and repack their
/// executors (plus any already-unassigned ones) onto the rest.
///
/// At least one node always survives to receive the repacked work. The
/// repacking rule is greedy round-robin by node: no node receives a
/// second executor of a component before every other eligible node has
/// received one.
pub fn plan_scale_in(
    topology: &Topology,
    cluster: &Cluster,
    graph: &ComponentGraph,
    stats: Option<&HashMap<String, ComponentStats>>,
    weights: &RankWeights,
    remove_count: usize,
) -> ScaleInPlan {
    let views = build_node_views(cluster, topology);
    let ranked = rank_nodes_for_removal(&views, graph, stats, weights);

    let target_count = remove_count.min(ranked.len().saturating_sub(1));
    let evacuated: Vec<NodeId> = ranked
        .iter()
        .take(target_count)
        .map(|(id, _)| id.clone())
        .collect();
    let evacuated_set: BTreeSet<&NodeId> = evacuated.iter().collect();
    for id in &evacuated {
        debug!(
            topology = %topology.id,
            node = %id,
            host = %views[id].hostname,
            "node selected for evacuation"
        );
    }

    // Executors marked for relocation: everything on the evacuation
    // targets plus whatever is already unassigned.
    let mut displaced: Vec<Executor> = evacuated
        .iter()
        .flat_map(|id| views[id].executors.iter().cloned())
        .collect();
    displaced.extend(cluster.unassigned_executors(topology));
    displaced.sort();
    displaced.dedup();

    if displaced.is_empty() {
        debug!(topology = %topology.id, "scale-in found nothing to relocate");
        return ScaleInPlan {
            evacuated,
            assignments: BTreeMap::new(),
        };
    }

    // Surviving nodes that still have somewhere to put executors. Slots
    // held by other topologies are off limits.
    let receivers: Vec<&NodeView> = views
        .values()
        .filter(|v| !evacuated_set.contains(&v.node_id))
        .filter(|v| !eligible_slots(v, cluster, topology).is_empty())
        .collect();

    if receivers.is_empty() {
        warn!(topology = %topology.id, "no remaining capacity for scale-in repacking");
        return ScaleInPlan {
            evacuated,
            assignments: BTreeMap::new(),
        };
    }

    // Group by component so consecutive executors of one component land
    // on distinct nodes until the receiver list wraps.
    let mut by_component: BTreeMap<String, Vec<Executor>> = BTreeMap::new();
    for exec in displaced {
        by_component.entry(exec.component.clone()).or_default().push(exec);
    }

    let mut added: BTreeMap<WorkerSlot, Vec<Executor>> = BTreeMap::new();
    let mut cursor = 0usize;
    for execs in by_component.values() {
        for exec in execs {
            let node = receivers[cursor % receivers.len()];
            cursor += 1;
            let slot = pick_slot(node, cluster, topology, &added);
            added.entry(slot).or_default().push(exec.clone());
        }
    }

    let mut assignments: BTreeMap<WorkerSlot, Vec<Executor>> = BTreeMap::new();
    for (slot, extra) in added {
        let mut contents = cluster.executors_on_slot(&topology.id, &slot);
        contents.extend(extra);
        contents.sort();
        assignments.insert(slot, contents);
    }
    // Evacuated slots are freed and left explicitly empty.
    for id in &evacuated {
        for (slot, execs) in &views[id].slot_executors {
            if !execs.is_empty() {
                assignments.insert(slot.clone(), Vec::new());
            }
        }
    }

    debug!(
        topology = %topology.id,
        evacuated = evacuated.len(),
        changed_slots = assignments.len(),
        "scale-in plan computed"
    );
    ScaleInPlan {
        evacuated,
        assignments,
    }
}

/// Slots on a node that can receive executors of this topology.
fn eligible_slots(view: &NodeView, cluster: &Cluster, topology: &Topology) -> Vec<WorkerSlot> {
    view.slots
        .iter()
        .filter(|slot| {
            !cluster.is_occupied(slot)
                || !cluster.executors_on_slot(&topology.id, slot).is_empty()
        })
        .cloned()
        .collect()
}

/// Least-loaded eligible slot on the node, counting pending additions.
fn pick_slot(
    view: &NodeView,
    cluster: &Cluster,
    topology: &Topology,
    added: &BTreeMap<WorkerSlot, Vec<Executor>>,
) -> WorkerSlot {
    let slots = eligible_slots(view, cluster, topology);
    slots
        .into_iter()
        .min_by_key(|slot| {
            let existing = cluster.executors_on_slot(&topology.id, slot).len();
            let pending = added.get(slot).map_or(0, Vec::len);
            (existing + pending, slot.clone())
        })
        .unwrap_or_else(|| WorkerSlot::new(view.node_id.clone(), 0))
}
