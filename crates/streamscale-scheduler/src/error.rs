//! Scheduler error types.

use thiserror::Error;

use streamscale_cluster::ClusterError;

/// Result type alias for scheduling passes.
pub type ScheduleResult<T> = Result<T, ScheduleError>;

/// Fatal errors for a scheduling pass. Transient inventory problems
/// (stats or graph fetches) are logged and absorbed instead.
#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("cluster mutation failed: {0}")]
    Cluster(#[from] ClusterError),

    #[error("fallback scheduler failed for topology {topology}: {source}")]
    Fallback {
        topology: String,
        source: anyhow::Error,
    },

    #[error("parallelism change rejected for topology {topology}: {source}")]
    Parallelism {
        topology: String,
        source: anyhow::Error,
    },
}
