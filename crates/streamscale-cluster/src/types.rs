//! Domain types for the cluster inventory.
//!
//! These mirror what the host orchestrator hands the engine at the start
//! of every scheduling pass: topologies (with status and executor set)
//! and supervisor nodes (with assignable worker slots).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Unique identifier for a running topology.
pub type TopologyId = String;

/// Unique identifier for a supervisor node (machine).
pub type NodeId = String;

/// A unit of parallel work belonging to one component.
///
/// Identity is the task-id range plus the owning component name;
/// executors are immutable within a pass.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Executor {
    pub start_task: u32,
    pub end_task: u32,
    /// Name of the component this executor runs.
    pub component: String,
}

impl Executor {
    pub fn new(start_task: u32, end_task: u32, component: impl Into<String>) -> Self {
        Self {
            start_task,
            end_task,
            component: component.into(),
        }
    }
}

impl fmt::Display for Executor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}-{}]@{}", self.start_task, self.end_task, self.component)
    }
}

/// A placement unit on a node capable of holding executors.
///
/// Identity is `(node_id, port)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WorkerSlot {
    pub node_id: NodeId,
    pub port: u16,
}

impl WorkerSlot {
    pub fn new(node_id: impl Into<String>, port: u16) -> Self {
        Self {
            node_id: node_id.into(),
            port,
        }
    }
}

impl fmt::Display for WorkerSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.node_id, self.port)
    }
}

/// A worker machine as reported by the host inventory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Supervisor {
    pub id: NodeId,
    pub host: String,
    /// Ports the supervisor can place workers on.
    pub ports: Vec<u16>,
}

impl Supervisor {
    pub fn new(id: impl Into<String>, host: impl Into<String>, ports: Vec<u16>) -> Self {
        Self {
            id: id.into(),
            host: host.into(),
            ports,
        }
    }
}

/// Host-level lifecycle status of a topology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TopologyStatus {
    Active,
    /// Executors are being relocated by the host.
    Rebalancing,
    Inactive,
    Killed,
}

impl TopologyStatus {
    pub fn is_rebalancing(self) -> bool {
        self == TopologyStatus::Rebalancing
    }
}

impl FromStr for TopologyStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ACTIVE" => Ok(TopologyStatus::Active),
            "REBALANCING" => Ok(TopologyStatus::Rebalancing),
            "INACTIVE" => Ok(TopologyStatus::Inactive),
            "KILLED" => Ok(TopologyStatus::Killed),
            _ => Err(UnknownStatus(s.to_string())),
        }
    }
}

/// A status string the host reported that we do not recognize.
///
/// Callers log it and treat the topology as not rebalancing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown topology status: {0}")]
pub struct UnknownStatus(pub String);

/// A running dataflow graph of components connected by streams.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Topology {
    pub id: TopologyId,
    pub name: String,
    pub status: TopologyStatus,
    /// The full executor set, including executors not yet placed.
    pub executors: Vec<Executor>,
}

impl Topology {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        status: TopologyStatus,
        executors: Vec<Executor>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            status,
            executors,
        }
    }

    /// Current parallelism of a component: how many executors run it.
    pub fn parallelism_of(&self, component: &str) -> usize {
        self.executors
            .iter()
            .filter(|e| e.component == component)
            .count()
    }

    /// Distinct component names across the executor set, sorted.
    pub fn component_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .executors
            .iter()
            .map(|e| e.component.clone())
            .collect();
        names.sort();
        names.dedup();
        names
    }
}
