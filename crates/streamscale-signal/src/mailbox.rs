//! Single-slot, overwrite-on-send signal mailbox.

use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

/// Inbound control signal for a scheduling pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScaleSignal {
    #[default]
    None,
    ScaleOut,
    ScaleIn,
}

#[derive(Debug, Default)]
struct MailboxState {
    pending: ScaleSignal,
    rebalance_active: bool,
}

/// Capacity-one mailbox shared between the listener and the scheduling
/// loop. Writes overwrite; reads never block.
#[derive(Debug, Clone, Default)]
pub struct SignalMailbox {
    inner: Arc<Mutex<MailboxState>>,
}

impl SignalMailbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deposit a signal, replacing whatever was pending.
    pub fn post(&self, signal: ScaleSignal) {
        if let Ok(mut state) = self.inner.lock() {
            state.pending = signal;
        }
    }

    /// Consume the pending signal; `None` when nothing is pending.
    pub fn take(&self) -> ScaleSignal {
        match self.inner.lock() {
            Ok(mut state) => std::mem::take(&mut state.pending),
            Err(_) => ScaleSignal::None,
        }
    }

    /// Flip the explicit rebalance-request flag.
    pub fn set_rebalance(&self, active: bool) {
        if let Ok(mut state) = self.inner.lock() {
            state.rebalance_active = active;
        }
    }

    /// Whether an explicit rebalance request is currently active.
    pub fn rebalance_active(&self) -> bool {
        self.inner.lock().map(|s| s.rebalance_active).unwrap_or(false)
    }
}
