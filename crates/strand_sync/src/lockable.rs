//! # The Lockable Capability
//!
//! One interface for every lock in the crate. Besides the usual
//! lock / try-lock / unlock triple, each lock hands out the object a
//! [`WaitSignal`](crate::WaitSignal) actually suspends on:
//!
//! ```text
//!   NativeLock<K>               → its own host mutex
//!   TaggedRecursiveMutex<TAG>   → this thread's deferred handle onto the
//!                                 tag's shared lock (never the shared lock
//!                                 itself, which no single thread owns)
//! ```

use crate::{Guard, WaitHandle};

/// A lock usable with [`Guard`] and [`WaitSignal`](crate::WaitSignal).
pub trait Lockable {
    /// Blocks until the calling thread holds the lock.
    fn lock(&self);

    /// Acquires the lock without blocking. Returns `false` if that would block.
    fn try_lock(&self) -> bool;

    /// Releases one acquisition held by the calling thread.
    ///
    /// # Panics
    ///
    /// Panics if the calling thread does not hold the lock.
    fn unlock(&self);

    /// Lends the condvar-compatible handle of this lock to `park`.
    ///
    /// The calling thread must hold the lock. Recursion depth is saved before
    /// `park` runs and restored after it returns, so a wait releases the lock
    /// completely however deeply it was nested.
    ///
    /// # Panics
    ///
    /// Panics if the calling thread does not hold the lock.
    fn with_wait_handle(&self, park: &mut dyn FnMut(&mut WaitHandle<'_>));

    /// Acquires the lock for the lifetime of the returned guard.
    fn guard(&self) -> Guard<'_, Self>
    where
        Self: Sized,
    {
        Guard::new(self)
    }
}
