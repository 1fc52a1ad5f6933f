//! streamscale-cluster — the cluster/topology inventory model.
//!
//! This crate holds the boundary types the elasticity engine consumes:
//! topologies with their executors, supervisor nodes with worker slots,
//! and the mutable per-pass `Cluster` snapshot with its free/assign
//! operations. It also defines the two opaque external capabilities the
//! engine delegates to:
//!
//! - [`FairScheduler`] — the baseline fair-placement fallback, with
//!   [`EvenScheduler`] as the round-robin default
//! - [`ParallelismControl`] — the asynchronous component→parallelism
//!   change request accepted by the topology-management plane
//!
//! The engine never assumes atomicity across multiple `assign` calls:
//! for a given pass all frees must precede all assigns.

pub mod cluster;
pub mod control;
pub mod error;
pub mod fair;
pub mod types;

pub use cluster::Cluster;
pub use control::{ParallelismControl, RecordingControl};
pub use error::{ClusterError, ClusterResult};
pub use fair::{EvenScheduler, FairScheduler};
pub use types::*;
