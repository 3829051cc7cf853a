//! Busy arbiter serializing every user-initiated controller operation.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::OperationKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BusyState {
    #[default]
    Idle,
    Busy(OperationKind),
}

#[derive(Debug, Clone, Default)]
pub struct BusyArbiter {
    state: Arc<Mutex<BusyState>>,
}

impl BusyArbiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves `Idle -> Busy(kind)`; returns the operation holding the arbiter otherwise.
    pub fn try_acquire(&self, kind: OperationKind) -> Result<BusyGuard, OperationKind> {
        let mut state = self.lock();
        match *state {
            BusyState::Busy(holder) => Err(holder),
            BusyState::Idle => {
                *state = BusyState::Busy(kind);
                tracing::debug!(operation = kind.as_str(), "busy arbiter acquired");
                Ok(BusyGuard {
                    state: Arc::clone(&self.state),
                    kind,
                })
            }
        }
    }

    pub fn state(&self) -> BusyState {
        *self.lock()
    }

    pub fn is_busy(&self) -> bool {
        matches!(self.state(), BusyState::Busy(_))
    }

    fn lock(&self) -> MutexGuard<'_, BusyState> {
        // The critical section only swaps a Copy value, so a poisoned lock still holds valid state.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Releases the arbiter when dropped, on every exit path.
#[derive(Debug)]
pub struct BusyGuard {
    state: Arc<Mutex<BusyState>>,
    kind: OperationKind,
}

impl BusyGuard {
    pub fn kind(&self) -> OperationKind {
        self.kind
    }
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        let mut state = self
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *state = BusyState::Idle;
        tracing::debug!(operation = self.kind.as_str(), "busy arbiter released");
    }
}
