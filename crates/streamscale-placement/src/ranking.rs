//! Centrality/load ranking over components and nodes.
//!
//! The score combines structural centrality (how much of the topology a
//! component can reach through its stream relationships) with observed
//! load. Components ranking highest are expansion candidates; nodes
//! whose hosted components rank lowest are removal candidates.

use std::collections::{BTreeMap, HashMap};

use serde::Deserialize;

use streamscale_cluster::{NodeId, Topology};
use streamscale_graph::ComponentGraph;
use streamscale_metrics::ComponentStats;

use crate::view::NodeView;

/// Weights for the two score components.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct RankWeights {
    pub centrality: f64,
    pub load: f64,
}

impl Default for RankWeights {
    fn default() -> Self {
        Self {
            centrality: 1.0,
            load: 1.0,
        }
    }
}

/// Score one component. With no stats for the pass the load term is
/// zero and the ranking is structural only.
pub fn component_score(
    name: &str,
    graph: &ComponentGraph,
    stats: Option<&HashMap<String, ComponentStats>>,
    weights: &RankWeights,
) -> f64 {
    let centrality = graph.centrality(name) as f64;
    let load = stats
        .and_then(|m| m.get(name))
        .map(|s| s.load())
        .unwrap_or(0.0);
    weights.centrality * centrality + weights.load * load
}

/// Total order over the topology's components, best expansion candidate
/// first. Ties break lexicographically on the component name.
pub fn rank_components(
    topology: &Topology,
    graph: &ComponentGraph,
    stats: Option<&HashMap<String, ComponentStats>>,
    weights: &RankWeights,
) -> Vec<(String, f64)> {
    let mut ranked: Vec<(String, f64)> = topology
        .component_names()
        .into_iter()
        .map(|name| {
            let score = component_score(&name, graph, stats, weights);
            (name, score)
        })
        .collect();
    ranked.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });
    ranked
}

/// Total order over nodes, best removal candidate first.
///
/// A node's evacuation priority is the summed score of the components
/// its executors run: hosting only low-centrality, low-load work makes
/// it cheap to evacuate. Ties break lexicographically on the node id.
pub fn rank_nodes_for_removal(
    views: &BTreeMap<NodeId, NodeView>,
    graph: &ComponentGraph,
    stats: Option<&HashMap<String, ComponentStats>>,
    weights: &RankWeights,
) -> Vec<(NodeId, f64)> {
    let mut ranked: Vec<(NodeId, f64)> = views
        .values()
        .map(|view| {
            let score: f64 = view
                .executors
                .iter()
                .map(|e| component_score(&e.component, graph, stats, weights))
                .sum();
            (view.node_id.clone(), score)
        })
        .collect();
    ranked.sort_by(|a, b| {
        a.1.partial_cmp(&b.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::build_node_views;
    use streamscale_cluster::{Cluster, Executor, Supervisor, TopologyStatus, WorkerSlot};
    use streamscale_graph::ComponentSpec;

    fn linear_graph() -> ComponentGraph {
        ComponentGraph::build(&[
            ComponentSpec::new("spout", vec![]),
            ComponentSpec::new("split", vec!["spout"]),
            ComponentSpec::new("count", vec!["split"]),
        ])
    }

    fn topology() -> Topology {
        Topology::new(
            "t-1",
            "wc",
            TopologyStatus::Active,
            vec![
                Executor::new(1, 1, "spout"),
                Executor::new(2, 2, "split"),
                Executor::new(3, 3, "count"),
            ],
        )
    }

    #[test]
    fn load_breaks_structural_ties() {
        let graph = linear_graph();
        let mut stats = HashMap::new();
        stats.insert("split".to_string(), ComponentStats::new(100.0, 20.0, 90.0));
        stats.insert("count".to_string(), ComponentStats::new(5.0, 1.0, 0.0));

        let ranked = rank_components(&topology(), &graph, Some(&stats), &RankWeights::default());

        assert_eq!(ranked[0].0, "split");
        assert!(ranked[0].1 > ranked[1].1);
    }

    #[test]
    fn missing_stats_fall_back_to_centrality() {
        let graph = linear_graph();
        let ranked = rank_components(&topology(), &graph, None, &RankWeights::default());

        // All three have centrality 2; order is lexicographic.
        assert_eq!(ranked[0].0, "count");
        assert_eq!(ranked[1].0, "split");
        assert_eq!(ranked[2].0, "spout");
        assert_eq!(ranked[0].1, ranked[2].1);
    }

    #[test]
    fn lightest_node_ranks_first_for_removal() {
        let mut cluster = Cluster::new(vec![
            Supervisor::new("sup-a", "host-a", vec![6700]),
            Supervisor::new("sup-b", "host-b", vec![6700]),
            Supervisor::new("sup-c", "host-c", vec![6700]),
        ]);
        let topo = topology();
        // split+count on sup-a, spout on sup-b, sup-c empty.
        cluster
            .assign(
                &WorkerSlot::new("sup-a", 6700),
                "t-1",
                &[Executor::new(2, 2, "split"), Executor::new(3, 3, "count")],
            )
            .unwrap();
        cluster
            .assign(&WorkerSlot::new("sup-b", 6700), "t-1", &[Executor::new(1, 1, "spout")])
            .unwrap();

        let views = build_node_views(&cluster, &topo);
        let ranked = rank_nodes_for_removal(&views, &linear_graph(), None, &RankWeights::default());

        assert_eq!(ranked[0].0, "sup-c"); // Empty node is the cheapest.
        assert_eq!(ranked[1].0, "sup-b");
        assert_eq!(ranked[2].0, "sup-a");
    }

    #[test]
    fn node_ties_break_on_node_id() {
        let cluster = Cluster::new(vec![
            Supervisor::new("sup-b", "host-b", vec![6700]),
            Supervisor::new("sup-a", "host-a", vec![6700]),
        ]);
        let views = build_node_views(&cluster, &topology());
        let ranked = rank_nodes_for_removal(&views, &linear_graph(), None, &RankWeights::default());

        assert_eq!(ranked[0].0, "sup-a");
        assert_eq!(ranked[1].0, "sup-b");
    }
}
