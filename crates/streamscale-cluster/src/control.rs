//! The parallelism-change boundary.

use std::collections::BTreeMap;

/// Topology-management interface that accepts parallelism changes.
///
/// The request is asynchronous: new executors appear as unassigned only
/// on a subsequent scheduling pass.
pub trait ParallelismControl {
    /// Request that each listed component run at the given parallelism.
    fn change_parallelism(
        &self,
        topology_id: &str,
        parallelism: &BTreeMap<String, u32>,
    ) -> anyhow::Result<()>;
}

/// Control backend that records requests without acting on them.
///
/// Useful as a host-side stub and in tests; real deployments plug in
/// their topology-management client.
#[derive(Debug, Default)]
pub struct RecordingControl {
    requests: std::sync::Mutex<Vec<(String, BTreeMap<String, u32>)>>,
}

impl RecordingControl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests received so far, in order.
    pub fn requests(&self) -> Vec<(String, BTreeMap<String, u32>)> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

impl ParallelismControl for RecordingControl {
    fn change_parallelism(
        &self,
        topology_id: &str,
        parallelism: &BTreeMap<String, u32>,
    ) -> anyhow::Result<()> {
        let mut requests = self
            .requests
            .lock()
            .map_err(|_| anyhow::anyhow!("control recorder poisoned"))?;
        requests.push((topology_id.to_string(), parallelism.clone()));
        Ok(())
    }
}
