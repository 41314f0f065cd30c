//! Latest value cell shared between threads

use std::sync::{Arc, Mutex, PoisonError};

/// Holds the most recently published value of `T`.
///
/// The scheduler thread publishes, the dashboard thread reads. Publishing
/// replaces the previous value, readers always see a complete value.
pub struct SnapshotCell<T> {
    inner: Arc<Mutex<Option<T>>>,
}

impl<T> SnapshotCell<T> {
    pub fn new() -> Self {
        Self { inner: Arc::new(Mutex::new(None)) }
    }

    /// Replace the held value, returning the previous one.
    pub fn publish(&self, value: T) -> Option<T> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner).replace(value)
    }

    /// Remove and return the held value.
    pub fn take(&self) -> Option<T> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner).take()
    }
}

impl<T: Clone> SnapshotCell<T> {
    /// Copy of the held value.
    pub fn latest(&self) -> Option<T> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl<T> Clone for SnapshotCell<T> {
    fn clone(&self) -> Self {
        Self { inner: self.inner.clone() }
    }
}

impl<T> Default for SnapshotCell<T> {
    fn default() -> Self {
        Self::new()
    }
}
