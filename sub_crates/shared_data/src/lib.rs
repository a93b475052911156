//! A simplified wrapper for Arc<RwLock<T>>.
//!
//! Used for state that both the UI thread and the job thread touch,
//! e.g. the cube view that a LUT-loading job replaces the points of.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

pub struct Shared<T>(Arc<RwLock<T>>);

impl<T> Shared<T> {
    #[inline(always)]
    pub fn new(inner: T) -> Shared<T> {
        Shared(Arc::new(RwLock::new(inner)))
    }

    /// Get a read-only lock on the data.
    ///
    /// Will block until the lock is acquired.  Will panic on errors.
    #[inline(always)]
    pub fn lock(&self) -> RwLockReadGuard<T> {
        self.0.read().unwrap()
    }

    /// Get a mutable lock on the data.
    ///
    /// Will block until the lock is acquired.  Will panic on errors.
    #[inline(always)]
    pub fn lock_mut(&self) -> RwLockWriteGuard<T> {
        self.0.write().unwrap()
    }

    /// Creates a clone of the shared data reference.
    ///
    /// This is actually identical to calling `.clone()`, but this name
    /// makes it clearer at the call site that the underlying data isn't
    /// being cloned, only the reference.
    #[inline(always)]
    pub fn clone_ref(&self) -> Shared<T> {
        self.clone()
    }
}

impl<T> Clone for Shared<T> {
    #[inline(always)]
    fn clone(&self) -> Shared<T> {
        Shared(self.0.clone())
    }
}

// Lock poisoning already turns into a panic in `lock()`/`lock_mut()`.
impl<T> std::panic::UnwindSafe for Shared<T> {}
impl<T> std::panic::RefUnwindSafe for Shared<T> {}

impl<T: std::fmt::Debug> std::fmt::Debug for Shared<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(&self.0, f)
    }
}
