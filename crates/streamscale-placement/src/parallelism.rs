//! Parallelism sizing for scale-out.
//!
//! Given freshly joined machines, decide how much extra parallelism
//! each component should get. The budget is the slot capacity of the
//! new machines; components split it proportionally to their
//! centrality/load rank score, so bottleneck stages grow fastest.
//!
//! The output maps component → new total parallelism. Applying it is a
//! request to the topology-management plane; no executors are placed
//! here.

use std::collections::{BTreeMap, HashMap};

use tracing::debug;

use streamscale_cluster::Topology;
use streamscale_graph::ComponentGraph;
use streamscale_metrics::ComponentStats;

use crate::ranking::{RankWeights, rank_components};

/// Compute the component → new parallelism mapping.
///
/// `new_slot_budget` is the number of assignable slots on the newly
/// joined nodes. Each component gains the ceiling of its proportional
/// share (at least one executor while any budget exists); when every
/// score is zero the budget spreads evenly.
pub fn plan_parallelism_increase(
    topology: &Topology,
    graph: &ComponentGraph,
    stats: Option<&HashMap<String, ComponentStats>>,
    weights: &RankWeights,
    new_slot_budget: usize,
) -> BTreeMap<String, u32> {
    let ranked = rank_components(topology, graph, stats, weights);
    if ranked.is_empty() || new_slot_budget == 0 {
        return BTreeMap::new();
    }

    let total_score: f64 = ranked.iter().map(|(_, s)| s).sum();
    let budget = new_slot_budget as f64;
    let even_share = (budget / ranked.len() as f64).ceil() as u32;

    let mut plan = BTreeMap::new();
    for (name, score) in &ranked {
        let extra = if total_score > 0.0 {
            ((budget * score / total_score).ceil() as u32).max(1)
        } else {
            even_share.max(1)
        };
        let current = topology.parallelism_of(name) as u32;
        plan.insert(name.clone(), current + extra);
        debug!(
            topology = %topology.id,
            component = %name,
            score,
            from = current,
            to = current + extra,
            "parallelism increase planned"
        );
    }
    plan
}
