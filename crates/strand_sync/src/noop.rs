//! # Single-Threaded Backend
//!
//! Selected when the `threads` feature is off. Same types, same methods, no
//! synchronization: every acquisition succeeds at once, every release and
//! notification does nothing, and no state survives between calls. Call sites
//! compile unchanged.

use std::fmt;
use std::marker::PhantomData;

use crate::{Guard, LockKind, Lockable};

/// Stand-in for the host wait handle. Carries nothing.
pub struct WaitHandle<'a> {
    _lock: PhantomData<&'a ()>,
}

impl fmt::Debug for WaitHandle<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("WaitHandle")
    }
}

/// No-op native lock.
pub struct NativeLock<K: LockKind> {
    kind: PhantomData<K>,
}

impl<K: LockKind> NativeLock<K> {
    /// Creates a lock.
    #[must_use]
    pub const fn new() -> Self {
        Self { kind: PhantomData }
    }

    /// Returns immediately.
    #[inline]
    pub fn lock(&self) {}

    /// Always succeeds.
    #[inline]
    #[must_use]
    pub fn try_lock(&self) -> bool {
        true
    }

    /// Returns immediately.
    #[inline]
    pub fn unlock(&self) {}

    /// Always `false`: nothing is tracked.
    #[inline]
    #[must_use]
    pub fn is_locked(&self) -> bool {
        false
    }

    /// Always `false`: nothing is tracked.
    #[inline]
    #[must_use]
    pub fn is_held_by_current_thread(&self) -> bool {
        false
    }

    /// Always 0: nothing is tracked.
    #[inline]
    #[must_use]
    pub fn depth(&self) -> usize {
        0
    }
}

impl<K: LockKind> Lockable for NativeLock<K> {
    #[inline]
    fn lock(&self) {}

    #[inline]
    fn try_lock(&self) -> bool {
        true
    }

    #[inline]
    fn unlock(&self) {}

    #[inline]
    fn with_wait_handle(&self, park: &mut dyn FnMut(&mut WaitHandle<'_>)) {
        park(&mut WaitHandle { _lock: PhantomData });
    }
}

impl<K: LockKind> Default for NativeLock<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: LockKind> fmt::Debug for NativeLock<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeLock")
            .field("kind", &K::NAME)
            .field("locked", &false)
            .finish()
    }
}

/// No-op tagged recursive mutex.
#[derive(Clone, Copy, Default)]
pub struct TaggedRecursiveMutex<const TAG: usize> {
    _private: (),
}

impl<const TAG: usize> TaggedRecursiveMutex<TAG> {
    /// Creates a handle.
    #[must_use]
    pub const fn new() -> Self {
        Self { _private: () }
    }

    /// The tag identifying this lock.
    #[inline]
    #[must_use]
    pub const fn tag(&self) -> usize {
        TAG
    }

    /// Returns immediately.
    #[inline]
    pub fn lock(&self) {}

    /// Always succeeds.
    #[inline]
    #[must_use]
    pub fn try_lock(&self) -> bool {
        true
    }

    /// Returns immediately.
    #[inline]
    pub fn unlock(&self) {}

    /// Always 0: nothing is tracked.
    #[inline]
    #[must_use]
    pub fn depth(&self) -> usize {
        0
    }

    /// Always `false`: nothing is tracked.
    #[inline]
    #[must_use]
    pub fn is_held_by_current_thread(&self) -> bool {
        false
    }
}

impl<const TAG: usize> Lockable for TaggedRecursiveMutex<TAG> {
    #[inline]
    fn lock(&self) {}

    #[inline]
    fn try_lock(&self) -> bool {
        true
    }

    #[inline]
    fn unlock(&self) {}

    #[inline]
    fn with_wait_handle(&self, park: &mut dyn FnMut(&mut WaitHandle<'_>)) {
        park(&mut WaitHandle { _lock: PhantomData });
    }
}

impl<const TAG: usize> fmt::Debug for TaggedRecursiveMutex<TAG> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaggedRecursiveMutex")
            .field("tag", &TAG)
            .field("depth", &0usize)
            .finish()
    }
}

/// No-op wait signal. Waiting returns at once, like a spurious wakeup.
#[derive(Default)]
pub struct WaitSignal {
    _private: (),
}

impl WaitSignal {
    /// Creates a signal.
    #[must_use]
    pub const fn new() -> Self {
        Self { _private: () }
    }

    /// Returns immediately.
    ///
    /// # Panics
    ///
    /// Panics if the guard is unlocked.
    #[inline]
    pub fn wait<M: Lockable + ?Sized>(&self, guard: &mut Guard<'_, M>) {
        assert!(guard.is_locked(), "wait on an unlocked guard");
        guard.lockable().with_wait_handle(&mut |_handle| {});
    }

    /// Evaluates `condition` once and returns.
    ///
    /// Nothing can change the condition while a single thread is parked, so
    /// looping on it would never end.
    ///
    /// # Panics
    ///
    /// Panics if the guard is unlocked.
    #[inline]
    pub fn wait_while<M, F>(&self, guard: &mut Guard<'_, M>, mut condition: F)
    where
        M: Lockable + ?Sized,
        F: FnMut() -> bool,
    {
        if condition() {
            self.wait(guard);
        }
    }

    /// Returns immediately.
    #[inline]
    pub fn notify_one(&self) {}

    /// Returns immediately.
    #[inline]
    pub fn notify_all(&self) {}
}

impl fmt::Debug for WaitSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WaitSignal").finish_non_exhaustive()
    }
}
