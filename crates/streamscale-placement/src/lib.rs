//! streamscale-placement — strategies that turn a scaling decision into
//! a concrete node/slot assignment.
//!
//! Three strategies, all pure functions over per-pass snapshots:
//!
//! - **Ranking** scores components (for expansion) and nodes (for
//!   removal) from structural centrality plus observed load
//! - **Scale-in** selects evacuation targets and repacks their
//!   executors onto the surviving nodes
//! - **Scale-out** sizes the per-component parallelism increase and,
//!   once the migration barrier holds, computes the full reassignment
//!   across old and newly joined nodes
//!
//! Determinism matters: all ties break on lexicographic identity so
//! repeated invocations of the same pass produce the same plan.

pub mod migration;
pub mod parallelism;
pub mod ranking;
pub mod scale_in;
pub mod view;

pub use migration::plan_migration;
pub use parallelism::plan_parallelism_increase;
pub use ranking::{RankWeights, component_score, rank_components, rank_nodes_for_removal};
pub use scale_in::{ScaleInPlan, plan_scale_in};
pub use view::{NodeView, build_node_views};
