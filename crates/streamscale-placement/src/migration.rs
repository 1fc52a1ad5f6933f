//! Migration placement after a parallelism increase.
//!
//! Runs only once the barrier condition holds: every executor of the
//! topology is simultaneously unassigned, so there is no mixed old/new
//! placement to preserve. The plan spans old and newly joined nodes and
//! weights the resized components toward the fresh capacity.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use streamscale_cluster::{Cluster, Executor, NodeId, Topology, WorkerSlot};

/// Compute the full executor→slot assignment for a rebalancing
/// topology.
///
/// `new_nodes` are the machines absent from the last stored pass;
/// `grown` names the components whose executor count increased.
/// Grown components fill new-node slots first (round-robin by slot),
/// everything else fills old-node slots first; each side spills into
/// the other once its pool wraps past capacity.
///
/// Returns an empty map when no slot is available — safe to call every
/// pass until capacity appears.
pub fn plan_migration(
    topology: &Topology,
    cluster: &Cluster,
    new_nodes: &BTreeSet<NodeId>,
    grown: &BTreeSet<String>,
) -> BTreeMap<WorkerSlot, Vec<Executor>> {
    let mut new_slots = Vec::new();
    let mut old_slots = Vec::new();
    for slot in cluster.all_slots() {
        // The barrier guarantees this topology holds nothing, but other
        // topologies may still own slots.
        if cluster.is_occupied(&slot) {
            continue;
        }
        if new_nodes.contains(&slot.node_id) {
            new_slots.push(slot);
        } else {
            old_slots.push(slot);
        }
    }

    if new_slots.is_empty() && old_slots.is_empty() {
        debug!(topology = %topology.id, "no free slots for migration");
        return BTreeMap::new();
    }

    let mut executors = topology.executors.clone();
    executors.sort();

    let mut plan: BTreeMap<WorkerSlot, Vec<Executor>> = BTreeMap::new();
    let mut new_cursor = 0usize;
    let mut old_cursor = 0usize;
    for exec in executors {
        let prefer_new = grown.contains(&exec.component);
        let slot = if prefer_new {
            next_slot(&new_slots, &mut new_cursor).or_else(|| next_slot(&old_slots, &mut old_cursor))
        } else {
            next_slot(&old_slots, &mut old_cursor).or_else(|| next_slot(&new_slots, &mut new_cursor))
        };
        // One pool is non-empty, so a slot always resolves.
        if let Some(slot) = slot {
            plan.entry(slot).or_default().push(exec);
        }
    }

    debug!(
        topology = %topology.id,
        slots = plan.len(),
        new_node_slots = new_slots.len(),
        "migration plan computed"
    );
    plan
}

/// Round-robin pick from a slot pool; `None` when the pool is empty.
fn next_slot(pool: &[WorkerSlot], cursor: &mut usize) -> Option<WorkerSlot> {
    if pool.is_empty() {
        return None;
    }
    let slot = pool[*cursor % pool.len()].clone();
    *cursor += 1;
    Some(slot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use streamscale_cluster::{Supervisor, TopologyStatus};

    fn cluster() -> Cluster {
        Cluster::new(vec![
            Supervisor::new("old-a", "host-a", vec![6700, 6701]),
            Supervisor::new("old-b", "host-b", vec![6700]),
            Supervisor::new("new-c", "host-c", vec![6700, 6701]),
        ])
    }

    fn topology(execs: Vec<Executor>) -> Topology {
        Topology::new("t-1", "wc", TopologyStatus::Rebalancing, execs)
    }

    fn new_nodes() -> BTreeSet<NodeId> {
        BTreeSet::from(["new-c".to_string()])
    }

    #[test]
    fn grown_components_prefer_new_nodes() {
        let topo = topology(vec![
            Executor::new(1, 1, "split"),
            Executor::new(2, 2, "split"),
            Executor::new(3, 3, "spout"),
        ]);
        let grown = BTreeSet::from(["split".to_string()]);

        let plan = plan_migration(&topo, &cluster(), &new_nodes(), &grown);

        let on_new: Vec<&Executor> = plan
            .iter()
            .filter(|(slot, _)| slot.node_id == "new-c")
            .flat_map(|(_, e)| e)
            .collect();
        assert_eq!(on_new.len(), 2);
        assert!(on_new.iter().all(|e| e.component == "split"));

        let on_old: Vec<&Executor> = plan
            .iter()
            .filter(|(slot, _)| slot.node_id != "new-c")
            .flat_map(|(_, e)| e)
            .collect();
        assert_eq!(on_old.len(), 1);
        assert_eq!(on_old[0].component, "spout");
    }

    #[test]
    fn covers_every_executor_exactly_once() {
        let execs: Vec<Executor> = (0..7).map(|n| Executor::new(n, n, "split")).collect();
        let topo = topology(execs.clone());
        let grown = BTreeSet::from(["split".to_string()]);

        let plan = plan_migration(&topo, &cluster(), &new_nodes(), &grown);

        let mut placed: Vec<Executor> = plan.values().flatten().cloned().collect();
        placed.sort();
        assert_eq!(placed, execs);
    }

    #[test]
    fn preferred_pool_wraps_round_robin() {
        // 5 grown executors over 2 new-node slots: the pool cycles and
        // takes all of them, 3 on one slot and 2 on the other.
        let execs: Vec<Executor> = (0..5).map(|n| Executor::new(n, n, "split")).collect();
        let topo = topology(execs);
        let grown = BTreeSet::from(["split".to_string()]);

        let plan = plan_migration(&topo, &cluster(), &new_nodes(), &grown);

        let new_count: usize = plan
            .iter()
            .filter(|(slot, _)| slot.node_id == "new-c")
            .map(|(_, e)| e.len())
            .sum();
        assert_eq!(new_count, 5);
    }

    #[test]
    fn skips_slots_owned_by_other_topologies() {
        let mut cluster = cluster();
        cluster
            .assign(&WorkerSlot::new("old-a", 6700), "t-other", &[Executor::new(9, 9, "x")])
            .unwrap();
        let topo = topology(vec![Executor::new(1, 1, "spout")]);

        let plan = plan_migration(&topo, &cluster, &new_nodes(), &BTreeSet::new());

        assert!(!plan.contains_key(&WorkerSlot::new("old-a", 6700)));
        assert_eq!(plan.values().flatten().count(), 1);
    }

    #[test]
    fn empty_when_no_capacity() {
        let mut cluster = Cluster::new(vec![Supervisor::new("old-a", "host-a", vec![6700])]);
        cluster
            .assign(&WorkerSlot::new("old-a", 6700), "t-other", &[Executor::new(9, 9, "x")])
            .unwrap();
        let topo = topology(vec![Executor::new(1, 1, "spout")]);

        let plan = plan_migration(&topo, &cluster, &BTreeSet::new(), &BTreeSet::new());
        assert!(plan.is_empty());
    }
}
