//! Bounded free-list of reusable guard locks.

use std::sync::{
    Arc, Mutex, OnceLock, PoisonError, RwLock,
    atomic::{AtomicUsize, Ordering},
};

use crate::constants::DEFAULT_POOL_CAPACITY;

/// Counters describing a pool's traffic.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Locks ever created by this pool.
    pub created: usize,
    /// Locks currently handed out to live guards.
    pub active: usize,
    /// Locks waiting in the free-list.
    pub idle: usize,
}

/// Recycler for the locks behind [`super::Guard`].
///
/// Only clean locks are kept: a lock that was poisoned by a panicking
/// closure is discarded instead of returned to the free-list.
#[derive(Debug)]
pub struct GuardPool {
    idle: Mutex<Vec<RwLock<()>>>,
    capacity: usize,
    created: AtomicUsize,
    active: AtomicUsize,
}

impl GuardPool {
    /// Creates a pool holding at most [`DEFAULT_POOL_CAPACITY`] idle locks.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_POOL_CAPACITY)
    }

    /// Creates a pool holding at most `capacity` idle locks.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            idle: Mutex::new(Vec::new()),
            capacity,
            created: AtomicUsize::new(0),
            active: AtomicUsize::new(0),
        }
    }

    /// The process-wide pool used when no pool is configured.
    pub fn shared() -> Arc<GuardPool> {
        static SHARED: OnceLock<Arc<GuardPool>> = OnceLock::new();
        Arc::clone(SHARED.get_or_init(|| Arc::new(GuardPool::new())))
    }

    /// Maximum number of idle locks retained.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Snapshot of the pool counters.
    pub fn stats(&self) -> PoolStats {
        let idle = self.idle.lock().unwrap_or_else(PoisonError::into_inner).len();
        PoolStats {
            created: self.created.load(Ordering::Relaxed),
            active: self.active.load(Ordering::Relaxed),
            idle,
        }
    }

    /// Zeroes the traffic counters without touching the free-list.
    #[cfg(any(test, feature = "testing"))]
    pub fn reset_stats(&self) {
        self.created.store(0, Ordering::Relaxed);
        self.active.store(0, Ordering::Relaxed);
    }

    pub(crate) fn take(&self) -> RwLock<()> {
        self.active.fetch_add(1, Ordering::Relaxed);
        let reused = self
            .idle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop();
        match reused {
            Some(lock) => lock,
            None => {
                let created = self.created.fetch_add(1, Ordering::Relaxed) + 1;
                tracing::trace!(created, "guard pool empty, creating lock");
                RwLock::new(())
            }
        }
    }

    pub(crate) fn recycle(&self, lock: RwLock<()>) {
        self.active.fetch_sub(1, Ordering::Relaxed);
        if lock.is_poisoned() {
            tracing::debug!("discarding poisoned guard lock");
            return;
        }
        let mut idle = self.idle.lock().unwrap_or_else(PoisonError::into_inner);
        if idle.len() < self.capacity {
            idle.push(lock);
        }
    }
}

impl Default for GuardPool {
    fn default() -> Self {
        Self::new()
    }
}
