//! Error types for cluster assignment operations.

use thiserror::Error;

use crate::types::{NodeId, WorkerSlot};

/// Result type alias for cluster operations.
pub type ClusterResult<T> = Result<T, ClusterError>;

/// Errors that can occur while mutating the cluster assignment.
#[derive(Debug, Error)]
pub enum ClusterError {
    #[error("unknown supervisor: {0}")]
    UnknownSupervisor(NodeId),

    #[error("slot {slot} is not assignable on its supervisor")]
    SlotNotAssignable { slot: WorkerSlot },

    #[error("slot {slot} is already occupied; free it before reassigning")]
    SlotOccupied { slot: WorkerSlot },
}
