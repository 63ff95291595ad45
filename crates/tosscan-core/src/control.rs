//! Cooperative cancellation of batch analysis.
//!
//! A batch checks its token between links; setting it lets the link in flight
//! finish and reports the rest as cancelled. [`BatchControl`] tracks the
//! tokens of batches running at the same time so one request can stop all
//! of them.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

/// Shared abort flag. Clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// Registry of running batches, each with its own token.
#[derive(Debug, Default)]
pub struct BatchControl {
    next_id: AtomicU64,
    batches: RwLock<HashMap<u64, CancelToken>>,
}

impl BatchControl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new batch. It stays registered until the guard drops.
    pub fn register(&self) -> BatchGuard<'_> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let token = CancelToken::new();
        self.batches
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, token.clone());
        BatchGuard {
            control: self,
            id,
            token,
        }
    }

    /// Cancel every running batch. Returns how many were signalled.
    pub fn cancel_all(&self) -> usize {
        let batches = self.batches.read().unwrap_or_else(PoisonError::into_inner);
        for token in batches.values() {
            token.cancel();
        }
        batches.len()
    }

    pub fn running(&self) -> usize {
        self.batches
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn unregister(&self, id: u64) {
        self.batches
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id);
    }
}

/// Registration of one running batch; unregisters on drop.
#[derive(Debug)]
pub struct BatchGuard<'a> {
    control: &'a BatchControl,
    id: u64,
    token: CancelToken,
}

impl BatchGuard<'_> {
    pub fn token(&self) -> &CancelToken {
        &self.token
    }
}

impl Drop for BatchGuard<'_> {
    fn drop(&mut self) {
        self.control.unregister(self.id);
    }
}
