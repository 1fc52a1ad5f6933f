//! streamscale-scheduler — the elasticity decision engine.
//!
//! Invoked once per scheduling pass by the host orchestrator with the
//! full topology set and a cluster snapshot. For each topology the
//! engine interprets the pending operator signal and the host status,
//! then either scales out (parallelism increase, later migration),
//! scales in (node evacuation and repacking), or falls back to the
//! baseline fair scheduler.
//!
//! # Architecture
//!
//! ```text
//! ElasticScheduler::run_pass
//!   ├── SignalMailbox (non-blocking signal read)
//!   ├── GlobalState (prior assignment, signals, node snapshots)
//!   ├── GraphQuery + StatsProvider (ranking inputs, transient)
//!   ├── streamscale-placement (scale-in / parallelism / migration plans)
//!   └── Cluster (free + assign commits), FairScheduler fallback
//! ```
//!
//! Passes are serialized by the host; the engine is idempotent given
//! the same inputs, so a failed pass is simply retried by the next
//! periodic invocation.

pub mod config;
pub mod error;
pub mod global_state;
pub mod scheduler;

pub use config::SchedulerConfig;
pub use error::{ScheduleError, ScheduleResult};
pub use global_state::{GlobalState, TopologyState};
pub use scheduler::{ElasticScheduler, PassContext};
