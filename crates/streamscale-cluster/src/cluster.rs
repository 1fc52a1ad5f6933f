//! The per-pass cluster snapshot and its mutation surface.
//!
//! A `Cluster` is constructed by the host orchestrator at the start of a
//! scheduling pass from live inventory: the supervisor list and the
//! current executor→slot assignment of every topology. The engine reads
//! it to build its decision inputs and commits decisions back through
//! `free_slots` / `assign`.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use tracing::debug;

use crate::error::{ClusterError, ClusterResult};
use crate::types::{Executor, NodeId, Supervisor, Topology, TopologyId, WorkerSlot};

/// Cluster inventory plus the live assignment, mutable within one pass.
#[derive(Debug, Clone, Default)]
pub struct Cluster {
    supervisors: BTreeMap<NodeId, Supervisor>,
    /// topology id → executor → slot.
    assignments: HashMap<TopologyId, HashMap<Executor, WorkerSlot>>,
}

impl Cluster {
    pub fn new(supervisors: Vec<Supervisor>) -> Self {
        Self {
            supervisors: supervisors.into_iter().map(|s| (s.id.clone(), s)).collect(),
            assignments: HashMap::new(),
        }
    }

    pub fn supervisors(&self) -> &BTreeMap<NodeId, Supervisor> {
        &self.supervisors
    }

    /// Node ids present in the current inventory, sorted.
    pub fn node_ids(&self) -> BTreeSet<NodeId> {
        self.supervisors.keys().cloned().collect()
    }

    /// Hostname of a supervisor, if known.
    pub fn host(&self, node_id: &str) -> Option<&str> {
        self.supervisors.get(node_id).map(|s| s.host.as_str())
    }

    /// Slots a supervisor can place workers on.
    pub fn assignable_slots(&self, node_id: &str) -> Vec<WorkerSlot> {
        match self.supervisors.get(node_id) {
            Some(sup) => sup
                .ports
                .iter()
                .map(|&port| WorkerSlot::new(sup.id.clone(), port))
                .collect(),
            None => Vec::new(),
        }
    }

    /// Every assignable slot in the cluster, sorted.
    pub fn all_slots(&self) -> Vec<WorkerSlot> {
        let mut slots: Vec<WorkerSlot> = self
            .supervisors
            .values()
            .flat_map(|sup| {
                sup.ports
                    .iter()
                    .map(|&port| WorkerSlot::new(sup.id.clone(), port))
            })
            .collect();
        slots.sort();
        slots
    }

    /// Current executor→slot assignment for a topology.
    pub fn assignment(&self, topology_id: &str) -> Option<&HashMap<Executor, WorkerSlot>> {
        self.assignments.get(topology_id)
    }

    /// Whether any executor of any topology currently occupies the slot.
    pub fn is_occupied(&self, slot: &WorkerSlot) -> bool {
        self.assignments
            .values()
            .any(|map| map.values().any(|s| s == slot))
    }

    /// Executors of a topology placed on the given slot, sorted.
    pub fn executors_on_slot(&self, topology_id: &str, slot: &WorkerSlot) -> Vec<Executor> {
        let mut execs: Vec<Executor> = self
            .assignments
            .get(topology_id)
            .map(|map| {
                map.iter()
                    .filter(|(_, s)| *s == slot)
                    .map(|(e, _)| e.clone())
                    .collect()
            })
            .unwrap_or_default();
        execs.sort();
        execs
    }

    /// Executors of a topology that currently have no slot, sorted.
    pub fn unassigned_executors(&self, topology: &Topology) -> Vec<Executor> {
        let assigned = self.assignments.get(&topology.id);
        let mut unassigned: Vec<Executor> = topology
            .executors
            .iter()
            .filter(|e| assigned.is_none_or(|map| !map.contains_key(*e)))
            .cloned()
            .collect();
        unassigned.sort();
        unassigned
    }

    /// Assignable slots with no executor on them, sorted.
    pub fn free_slot_list(&self) -> Vec<WorkerSlot> {
        self.all_slots()
            .into_iter()
            .filter(|s| !self.is_occupied(s))
            .collect()
    }

    /// Release the given slots: every executor mapped to one of them,
    /// across all topologies, becomes unassigned.
    pub fn free_slots(&mut self, slots: &[WorkerSlot]) {
        let freeing: BTreeSet<&WorkerSlot> = slots.iter().collect();
        for map in self.assignments.values_mut() {
            map.retain(|_, slot| !freeing.contains(slot));
        }
        debug!(count = slots.len(), "freed slots");
    }

    /// Place executors of a topology on a slot.
    ///
    /// The slot must be assignable and empty; stale slot state must never
    /// be double-assigned, so callers free first.
    pub fn assign(
        &mut self,
        slot: &WorkerSlot,
        topology_id: &str,
        executors: &[Executor],
    ) -> ClusterResult<()> {
        let sup = self
            .supervisors
            .get(&slot.node_id)
            .ok_or_else(|| ClusterError::UnknownSupervisor(slot.node_id.clone()))?;
        if !sup.ports.contains(&slot.port) {
            return Err(ClusterError::SlotNotAssignable { slot: slot.clone() });
        }
        if self.is_occupied(slot) {
            return Err(ClusterError::SlotOccupied { slot: slot.clone() });
        }

        let map = self.assignments.entry(topology_id.to_string()).or_default();
        for exec in executors {
            map.insert(exec.clone(), slot.clone());
        }
        debug!(%slot, topology = topology_id, executors = executors.len(), "assigned slot");
        Ok(())
    }

    /// Current assignment of a topology grouped by hostname, sorted.
    ///
    /// Diagnostic view logged by the scheduling loop after each topology.
    pub fn assignments_by_host(&self, topology_id: &str) -> BTreeMap<String, Vec<Executor>> {
        let mut by_host: BTreeMap<String, Vec<Executor>> = BTreeMap::new();
        if let Some(map) = self.assignments.get(topology_id) {
            for (exec, slot) in map {
                let host = self
                    .host(&slot.node_id)
                    .unwrap_or(slot.node_id.as_str())
                    .to_string();
                by_host.entry(host).or_default().push(exec.clone());
            }
        }
        for execs in by_host.values_mut() {
            execs.sort();
        }
        by_host
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TopologyStatus;

    fn two_node_cluster() -> Cluster {
        Cluster::new(vec![
            Supervisor::new("sup-a", "host-a", vec![6700, 6701]),
            Supervisor::new("sup-b", "host-b", vec![6700]),
        ])
    }

    fn topology(execs: Vec<Executor>) -> Topology {
        Topology::new("t-1", "wordcount", TopologyStatus::Active, execs)
    }

    #[test]
    fn all_slots_enumerates_every_port() {
        let cluster = two_node_cluster();
        let slots = cluster.all_slots();
        assert_eq!(slots.len(), 3);
        assert_eq!(slots[0], WorkerSlot::new("sup-a", 6700));
        assert_eq!(slots[2], WorkerSlot::new("sup-b", 6700));
    }

    #[test]
    fn assign_and_query_round_trip() {
        let mut cluster = two_node_cluster();
        let slot = WorkerSlot::new("sup-a", 6700);
        let exec = Executor::new(1, 2, "spout");

        cluster.assign(&slot, "t-1", &[exec.clone()]).unwrap();

        assert!(cluster.is_occupied(&slot));
        assert_eq!(cluster.executors_on_slot("t-1", &slot), vec![exec.clone()]);
        assert_eq!(cluster.assignment("t-1").unwrap().get(&exec), Some(&slot));
    }

    #[test]
    fn assign_rejects_occupied_slot() {
        let mut cluster = two_node_cluster();
        let slot = WorkerSlot::new("sup-a", 6700);
        cluster
            .assign(&slot, "t-1", &[Executor::new(1, 2, "spout")])
            .unwrap();

        let err = cluster
            .assign(&slot, "t-1", &[Executor::new(3, 4, "split")])
            .unwrap_err();
        assert!(matches!(err, ClusterError::SlotOccupied { .. }));
    }

    #[test]
    fn assign_rejects_unknown_supervisor_and_port() {
        let mut cluster = two_node_cluster();

        let err = cluster
            .assign(&WorkerSlot::new("sup-x", 6700), "t-1", &[])
            .unwrap_err();
        assert!(matches!(err, ClusterError::UnknownSupervisor(_)));

        let err = cluster
            .assign(&WorkerSlot::new("sup-b", 9999), "t-1", &[])
            .unwrap_err();
        assert!(matches!(err, ClusterError::SlotNotAssignable { .. }));
    }

    #[test]
    fn free_slots_unassigns_their_executors() {
        let mut cluster = two_node_cluster();
        let slot_a = WorkerSlot::new("sup-a", 6700);
        let slot_b = WorkerSlot::new("sup-b", 6700);
        let exec_a = Executor::new(1, 2, "spout");
        let exec_b = Executor::new(3, 4, "split");
        cluster.assign(&slot_a, "t-1", &[exec_a.clone()]).unwrap();
        cluster.assign(&slot_b, "t-1", &[exec_b.clone()]).unwrap();

        cluster.free_slots(std::slice::from_ref(&slot_a));

        let topo = topology(vec![exec_a.clone(), exec_b]);
        assert_eq!(cluster.unassigned_executors(&topo), vec![exec_a]);
        assert!(!cluster.is_occupied(&slot_a));
        assert!(cluster.is_occupied(&slot_b));
    }

    #[test]
    fn unassigned_executors_when_nothing_assigned() {
        let cluster = two_node_cluster();
        let topo = topology(vec![Executor::new(1, 2, "spout"), Executor::new(3, 4, "split")]);
        assert_eq!(cluster.unassigned_executors(&topo).len(), 2);
    }

    #[test]
    fn free_slot_list_excludes_occupied() {
        let mut cluster = two_node_cluster();
        cluster
            .assign(&WorkerSlot::new("sup-a", 6700), "t-1", &[Executor::new(1, 2, "spout")])
            .unwrap();

        let free = cluster.free_slot_list();
        assert_eq!(free.len(), 2);
        assert!(!free.contains(&WorkerSlot::new("sup-a", 6700)));
    }

    #[test]
    fn assignments_by_host_groups_and_sorts() {
        let mut cluster = two_node_cluster();
        let e1 = Executor::new(3, 4, "split");
        let e2 = Executor::new(1, 2, "spout");
        cluster
            .assign(&WorkerSlot::new("sup-a", 6700), "t-1", &[e1.clone()])
            .unwrap();
        cluster
            .assign(&WorkerSlot::new("sup-a", 6701), "t-1", &[e2.clone()])
            .unwrap();

        let by_host = cluster.assignments_by_host("t-1");
        assert_eq!(by_host.len(), 1);
        assert_eq!(by_host["host-a"], vec![e2, e1]);
    }
}
