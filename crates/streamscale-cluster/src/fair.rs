//! The baseline fair-placement scheduler boundary.
//!
//! The elasticity engine treats fair placement as an opaque external
//! capability: whenever no scaling signal is active it hands the
//! topology's unassigned executors to a [`FairScheduler`]. A failure
//! here is fatal for the pass — there is no valid assignment to commit.

use tracing::{debug, info};

use crate::cluster::Cluster;
use crate::types::Topology;

/// Baseline fair-placement scheduler invoked when no scaling is active.
pub trait FairScheduler {
    /// Place the topology's unassigned executors onto free slots.
    fn schedule(&self, topology: &Topology, cluster: &mut Cluster) -> anyhow::Result<()>;
}

/// Round-robin fair scheduler: spreads unassigned executors across free
/// slots in slot order, one executor per slot per round.
#[derive(Debug, Clone, Copy, Default)]
pub struct EvenScheduler;

impl FairScheduler for EvenScheduler {
    fn schedule(&self, topology: &Topology, cluster: &mut Cluster) -> anyhow::Result<()> {
        let unassigned = cluster.unassigned_executors(topology);
        if unassigned.is_empty() {
            debug!(topology = %topology.id, "nothing to schedule");
            return Ok(());
        }

        let free = cluster.free_slot_list();
        if free.is_empty() {
            anyhow::bail!(
                "no free slots for {} unassigned executors of {}",
                unassigned.len(),
                topology.id
            );
        }

        // Deal executors round-robin over the free slots, then commit one
        // assign per slot.
        let mut per_slot: Vec<Vec<_>> = vec![Vec::new(); free.len()];
        for (i, exec) in unassigned.into_iter().enumerate() {
            per_slot[i % free.len()].push(exec);
        }

        for (slot, execs) in free.iter().zip(per_slot) {
            if execs.is_empty() {
                continue;
            }
            cluster.assign(slot, &topology.id, &execs)?;
        }

        info!(topology = %topology.id, "even scheduling complete");
        Ok(())
    }
}
