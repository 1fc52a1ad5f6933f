//! The scheduling loop — the top-level elasticity state machine.

use std::collections::HashMap;

use tracing::{info, warn};

use streamscale_cluster::{Cluster, FairScheduler, ParallelismControl, Topology};
use streamscale_graph::{ComponentGraph, GraphQuery};
use streamscale_metrics::{ComponentStats, StatsProvider};
use streamscale_placement::{plan_migration, plan_parallelism_increase, plan_scale_in};
use streamscale_signal::{ScaleSignal, SignalMailbox};

use crate::config::SchedulerConfig;
use crate::error::{ScheduleError, ScheduleResult};
use crate::global_state::GlobalState;

/// External collaborators a pass needs, resolved by the host before
/// invocation.
pub struct PassContext<'a> {
    pub mailbox: &'a SignalMailbox,
    pub stats: &'a dyn StatsProvider,
    pub graphs: &'a dyn GraphQuery,
    pub fair: &'a dyn FairScheduler,
    pub control: &'a dyn ParallelismControl,
}

/// The elasticity decision engine.
///
/// Owns the long-lived [`GlobalState`]; the host invokes
/// [`run_pass`](Self::run_pass) once per scheduling pass, sequentially.
pub struct ElasticScheduler {
    config: SchedulerConfig,
    state: GlobalState,
}

impl ElasticScheduler {
    pub fn new(config: SchedulerConfig) -> Self {
        Self {
            config,
            state: GlobalState::new(),
        }
    }

    pub fn state(&self) -> &GlobalState {
        &self.state
    }

    /// Run one scheduling pass over every topology.
    ///
    /// Dispatch per topology, in iteration order:
    /// - scale-out when the operator just signalled it, or one is
    ///   already in flight and the host reports `REBALANCING`
    /// - scale-in when the operator just signalled it
    /// - otherwise the fair fallback places the unassigned executors
    ///
    /// A fallback or commit failure aborts the pass; the engine is
    /// idempotent, so the next periodic pass retries from live state.
    pub fn run_pass(
        &mut self,
        topologies: &[Topology],
        cluster: &mut Cluster,
        ctx: &PassContext<'_>,
    ) -> ScheduleResult<()> {
        info!(topologies = topologies.len(), "rerunning elasticity scheduler");
        self.state.update_info(cluster, topologies);

        for topo in topologies {
            info!(topology = %topo.id, name = %topo.name, status = ?topo.status, "processing topology");
            let signal = ctx.mailbox.take();
            let stored = self.state.signal(&topo.id);

            if signal == ScaleSignal::ScaleOut
                || (stored == ScaleSignal::ScaleOut && topo.status.is_rebalancing())
            {
                self.scale_out(topo, cluster, ctx)?;
                self.state.set_signal(&topo.id, ScaleSignal::ScaleOut);
            } else if signal == ScaleSignal::ScaleIn {
                self.scale_in(topo, cluster, ctx)?;
            } else {
                let unassigned = cluster.unassigned_executors(topo);
                info!(
                    topology = %topo.id,
                    unassigned = unassigned.len(),
                    "no scaling active, running fair scheduler"
                );
                ctx.fair
                    .schedule(topo, cluster)
                    .map_err(|source| ScheduleError::Fallback {
                        topology: topo.id.clone(),
                        source,
                    })?;
                self.state.store_state(cluster, topologies);
                self.state.set_balanced(&topo.id, false);
            }

            info!(
                topology = %topo.id,
                assignment = ?cluster.assignments_by_host(&topo.id),
                "current assignment"
            );
        }

        if topologies.is_empty() {
            self.state.clear();
        }
        Ok(())
    }

    /// Scale-in: evacuate the lowest-ranked machines and repack.
    fn scale_in(
        &mut self,
        topo: &Topology,
        cluster: &mut Cluster,
        ctx: &PassContext<'_>,
    ) -> ScheduleResult<()> {
        info!(topology = %topo.id, "scaling in");
        let graph = self.fetch_graph(topo, ctx);
        let stats = self.fetch_stats(topo, ctx);

        let plan = plan_scale_in(
            topo,
            cluster,
            &graph,
            stats.as_ref(),
            &self.config.weights,
            self.config.scale_in_node_count,
        );

        if plan.is_noop() {
            info!(topology = %topo.id, "scale-in produced no changes");
        } else {
            // All frees strictly precede all assigns: stale slot state
            // must never be double-assigned.
            cluster.free_slots(&plan.freed_slots());
            for (slot, execs) in &plan.assignments {
                if execs.is_empty() {
                    continue;
                }
                cluster.assign(slot, &topo.id, execs)?;
                info!(topology = %topo.id, %slot, executors = execs.len(), "assigned");
            }
            info!(
                topology = %topo.id,
                evacuated = ?plan.evacuated,
                "scale-in committed"
            );
        }

        self.state.set_signal(&topo.id, ScaleSignal::ScaleIn);
        Ok(())
    }

    /// Scale-out: parallelism expansion while the explicit rebalance
    /// request is active, migration once the host is rebalancing and
    /// the all-unassigned barrier holds.
    fn scale_out(
        &mut self,
        topo: &Topology,
        cluster: &mut Cluster,
        ctx: &PassContext<'_>,
    ) -> ScheduleResult<()> {
        if ctx.mailbox.rebalance_active() {
            if self.state.state_empty(&topo.id) {
                return Ok(());
            }
            let new_nodes = self.state.new_nodes(&topo.id);
            if new_nodes.is_empty() {
                return Ok(());
            }

            info!(topology = %topo.id, new_nodes = ?new_nodes, "increasing parallelism");
            let budget: usize = new_nodes
                .iter()
                .map(|id| cluster.assignable_slots(id).len())
                .sum();
            let graph = self.fetch_graph(topo, ctx);
            let stats = self.fetch_stats(topo, ctx);
            let plan =
                plan_parallelism_increase(topo, &graph, stats.as_ref(), &self.config.weights, budget);
            if !plan.is_empty() {
                ctx.control
                    .change_parallelism(&topo.id, &plan)
                    .map_err(|source| ScheduleError::Parallelism {
                        topology: topo.id.clone(),
                        source,
                    })?;
            }
        } else if topo.status.is_rebalancing() && !self.state.balanced(&topo.id) {
            let unassigned = cluster.unassigned_executors(topo);
            info!(
                topology = %topo.id,
                unassigned = unassigned.len(),
                total = topo.executors.len(),
                "rebalancing"
            );
            // Barrier: act only when every executor is simultaneously
            // unassigned, so no partial old/new placement is touched.
            if unassigned.len() == topo.executors.len() {
                if !self.state.state_empty(&topo.id) {
                    info!(topology = %topo.id, "making migration assignments");
                    let new_nodes = self.state.joined_since_store(&topo.id);
                    let grown = self.state.grown_components(topo);
                    let plan = plan_migration(topo, cluster, &new_nodes, &grown);
                    for (slot, execs) in &plan {
                        cluster.assign(slot, &topo.id, execs)?;
                        info!(topology = %topo.id, %slot, executors = execs.len(), "assigned");
                    }
                }
                self.state.set_balanced(&topo.id, true);
            }
        }
        Ok(())
    }

    /// Graph metadata, or an empty graph on a transient fetch failure.
    fn fetch_graph(&self, topo: &Topology, ctx: &PassContext<'_>) -> ComponentGraph {
        match ctx.graphs.component_graph(&topo.id) {
            Ok(graph) => graph,
            Err(e) => {
                warn!(topology = %topo.id, error = %e, "graph fetch failed, ranking without structure");
                ComponentGraph::default()
            }
        }
    }

    /// Component stats, or `None` on a transient fetch failure.
    fn fetch_stats(
        &self,
        topo: &Topology,
        ctx: &PassContext<'_>,
    ) -> Option<HashMap<String, ComponentStats>> {
        match ctx.stats.component_stats(&topo.id) {
            Ok(stats) => Some(stats),
            Err(e) => {
                warn!(topology = %topo.id, error = %e, "stats fetch failed, ranking on structure only");
                None
            }
        }
    }
}
