//! Reader/writer guard protecting model caches.
//!
//! Every model owns or shares exactly one [`Guard`]. A top-level model takes
//! a fresh guard from a [`GuardPool`]; sub-models built while extracting a
//! nested field share their parent's guard, so one connected document tree
//! is synchronized as if it were a single flat structure.
//!
//! The guard is never re-entered. Closures passed to [`Guard::read`] and
//! [`Guard::write`] must only touch cache storage and must not call back into
//! any model of the same tree.

use std::{
    fmt,
    sync::{Arc, PoisonError, RwLock},
};

pub mod pool;

pub use pool::{GuardPool, PoolStats};

/// Scoped shared/exclusive access primitive.
///
/// Many readers may run concurrently. A writer waits for in-flight readers,
/// then excludes all readers and writers until its closure returns.
pub struct Guard {
    lock: RwLock<()>,
    pool: Arc<GuardPool>,
}

impl Guard {
    /// Takes a guard from `pool`, creating one if the pool has none idle.
    ///
    /// The underlying lock returns to the pool when the last [`Arc`] to the
    /// guard is dropped.
    pub fn acquire(pool: &Arc<GuardPool>) -> Arc<Self> {
        Arc::new(Self {
            lock: pool.take(),
            pool: Arc::clone(pool),
        })
    }

    /// Runs `f` with shared access.
    pub fn read<T>(&self, f: impl FnOnce() -> T) -> T {
        let _shared = self.lock.read().unwrap_or_else(PoisonError::into_inner);
        f()
    }

    /// Runs `f` with exclusive access.
    pub fn write<T>(&self, f: impl FnOnce() -> T) -> T {
        let _exclusive = self.lock.write().unwrap_or_else(PoisonError::into_inner);
        f()
    }

    /// The pool this guard returns to.
    pub fn pool(&self) -> &Arc<GuardPool> {
        &self.pool
    }
}

impl Drop for Guard {
    fn drop(&mut self) {
        // Nobody can hold the lock here: read/write borrow the guard.
        let lock = std::mem::take(&mut self.lock);
        self.pool.recycle(lock);
    }
}

impl fmt::Debug for Guard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Guard")
            .field("poisoned", &self.lock.is_poisoned())
            .finish()
    }
}
