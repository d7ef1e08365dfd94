//! # Wait Signal
//!
//! Condition variable usable with a [`Guard`] over any [`Lockable`].
//!
//! `wait` never looks at the kind of lock: it asks the guarded lock for its
//! wait handle and parks the host condvar on that.
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::atomic::{AtomicBool, Ordering};
//! use std::sync::Arc;
//! use std::thread;
//! use strand_sync::{BinaryLock, Guard, WaitSignal};
//!
//! let shared = Arc::new((BinaryLock::new(), WaitSignal::new(), AtomicBool::new(false)));
//!
//! let producer = {
//!     let shared = Arc::clone(&shared);
//!     thread::spawn(move || {
//!         let (lock, signal, ready) = &*shared;
//!         let _guard = Guard::new(lock);
//!         ready.store(true, Ordering::Relaxed);
//!         signal.notify_one();
//!     })
//! };
//!
//! let (lock, signal, ready) = &*shared;
//! let mut guard = Guard::new(lock);
//! signal.wait_while(&mut guard, || !ready.load(Ordering::Relaxed));
//! drop(guard);
//! producer.join().unwrap();
//! ```

use std::fmt;

use parking_lot::Condvar;

use crate::{Guard, Lockable};

/// Condition variable that suspends on whatever lock a [`Guard`] holds.
///
/// One condvar may be used with different locks across calls, but all threads
/// waiting on it at the same moment must wait on the same lock.
pub struct WaitSignal {
    condvar: Condvar,
}

impl WaitSignal {
    /// Creates a signal with no waiters.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            condvar: Condvar::new(),
        }
    }

    /// Releases the guarded lock, sleeps until notified, and reacquires the
    /// lock before returning.
    ///
    /// Spurious wakeups happen: re-check the awaited condition in a loop, or
    /// use [`WaitSignal::wait_while`]. Recursion depth is unchanged on return.
    ///
    /// # Panics
    ///
    /// Panics if the guard is unlocked, or if other threads are waiting on
    /// this signal with a different lock. The guard still holds its lock
    /// when that panic unwinds.
    pub fn wait<M: Lockable + ?Sized>(&self, guard: &mut Guard<'_, M>) {
        assert!(guard.is_locked(), "wait on an unlocked guard");
        tracing::trace!("parking on wait signal");
        guard
            .lockable()
            .with_wait_handle(&mut |handle| self.condvar.wait(handle));
        tracing::trace!("woke from wait signal");
    }

    /// Waits for as long as `condition` returns `true`.
    ///
    /// `condition` is evaluated with the lock held, before the first wait and
    /// after every wakeup.
    ///
    /// # Panics
    ///
    /// Same as [`WaitSignal::wait`].
    pub fn wait_while<M, F>(&self, guard: &mut Guard<'_, M>, mut condition: F)
    where
        M: Lockable + ?Sized,
        F: FnMut() -> bool,
    {
        while condition() {
            self.wait(guard);
        }
    }

    /// Wakes at most one waiting thread. No-op without waiters.
    #[inline]
    pub fn notify_one(&self) {
        self.condvar.notify_one();
    }

    /// Wakes every waiting thread. No-op without waiters.
    #[inline]
    pub fn notify_all(&self) {
        self.condvar.notify_all();
    }
}

impl Default for WaitSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for WaitSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WaitSignal").finish_non_exhaustive()
    }
}
