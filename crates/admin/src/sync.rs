//! Small locking helper shared across modules.

use std::sync::{Mutex, MutexGuard, PoisonError};

/// Lock a mutex, recovering the inner value if a panicking thread poisoned it.
///
/// All state behind these mutexes is valid at every step, so a poisoned lock
/// carries no torn data.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
