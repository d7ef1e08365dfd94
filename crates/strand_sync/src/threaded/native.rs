//! # Native Locks
//!
//! A host mutex plus owner/depth bookkeeping. Both kinds share one layout:
//!
//! ```text
//!   ┌───────────────────────────────────┐
//!   │ NativeLock<K>                     │
//!   │   raw:   parking_lot::Mutex<()>   │ ← held with its guard forgotten
//!   │   owner: thread id (0 = nobody)   │ ← written only by the holder
//!   │   depth: acquisitions by owner    │ ← touched only by the holder
//!   └───────────────────────────────────┘
//! ```
//!
//! `Binary` refuses re-entry, `Recursive` counts it.
//!
//! ## Safety Note
//!
//! Releasing and lending the raw mutex without a live guard needs
//! `force_unlock` and `make_guard_unchecked`. Both are only reached after
//! checking that the calling thread is the recorded owner.

#![allow(unsafe_code)]

use std::fmt;
use std::marker::PhantomData;
use std::mem::{self, ManuallyDrop};
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;

use super::current_thread_id;
use crate::{LockKind, Lockable, WaitHandle};

/// Thin wrapper over a host mutex, binary or recursive depending on `K`.
///
/// Use the [`BinaryLock`](crate::BinaryLock) and
/// [`RecursiveLock`](crate::RecursiveLock) aliases.
pub struct NativeLock<K: LockKind> {
    raw: Mutex<()>,
    /// Thread id of the holder, 0 when free.
    owner: AtomicUsize,
    /// Number of unmatched acquisitions by `owner`.
    depth: AtomicUsize,
    kind: PhantomData<K>,
}

impl<K: LockKind> NativeLock<K> {
    /// Creates an unlocked lock.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            raw: parking_lot::const_mutex(()),
            owner: AtomicUsize::new(0),
            depth: AtomicUsize::new(0),
            kind: PhantomData,
        }
    }

    /// Blocks until the calling thread holds the lock.
    ///
    /// # Panics
    ///
    /// Panics if a binary lock is re-acquired by the thread already holding it,
    /// which would otherwise deadlock.
    pub fn lock(&self) {
        let me = current_thread_id();
        if self.owner.load(Ordering::Relaxed) == me {
            assert!(
                K::REENTRANT,
                "{} lock re-acquired by its owning thread",
                K::NAME
            );
            self.depth.fetch_add(1, Ordering::Relaxed);
            return;
        }

        let guard = match self.raw.try_lock() {
            Some(guard) => guard,
            None => {
                tracing::trace!(kind = K::NAME, "native lock contended");
                self.raw.lock()
            }
        };
        mem::forget(guard);
        self.take_ownership(me, 1);
    }

    /// Acquires the lock without blocking.
    ///
    /// A recursive lock already held by the caller is re-entered; a binary one
    /// reports `false`.
    #[must_use]
    pub fn try_lock(&self) -> bool {
        let me = current_thread_id();
        if self.owner.load(Ordering::Relaxed) == me {
            if K::REENTRANT {
                self.depth.fetch_add(1, Ordering::Relaxed);
            }
            return K::REENTRANT;
        }

        match self.raw.try_lock() {
            Some(guard) => {
                mem::forget(guard);
                self.take_ownership(me, 1);
                true
            }
            None => false,
        }
    }

    /// Releases one acquisition.
    ///
    /// # Panics
    ///
    /// Panics if the calling thread does not hold the lock.
    pub fn unlock(&self) {
        self.assert_owned("unlock");
        let remaining = self.depth.load(Ordering::Relaxed) - 1;
        self.depth.store(remaining, Ordering::Relaxed);
        if remaining == 0 {
            self.owner.store(0, Ordering::Relaxed);
            // SAFETY: the calling thread is the recorded owner, so `raw` is
            // locked by this thread through a forgotten guard.
            unsafe { self.raw.force_unlock() };
        }
    }

    /// Whether any thread holds the lock.
    #[inline]
    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.raw.is_locked()
    }

    /// Whether the calling thread holds the lock.
    #[inline]
    #[must_use]
    pub fn is_held_by_current_thread(&self) -> bool {
        self.owner.load(Ordering::Relaxed) == current_thread_id()
    }

    /// Number of unmatched acquisitions by the calling thread (0 if it does
    /// not hold the lock).
    #[must_use]
    pub fn depth(&self) -> usize {
        if self.is_held_by_current_thread() {
            self.depth.load(Ordering::Relaxed)
        } else {
            0
        }
    }

    fn take_ownership(&self, me: usize, depth: usize) {
        self.owner.store(me, Ordering::Relaxed);
        self.depth.store(depth, Ordering::Relaxed);
    }

    fn assert_owned(&self, operation: &str) {
        assert!(
            self.is_held_by_current_thread(),
            "{operation} of a {} lock not held by the current thread",
            K::NAME
        );
    }
}

impl<K: LockKind> Lockable for NativeLock<K> {
    #[inline]
    fn lock(&self) {
        NativeLock::lock(self);
    }

    #[inline]
    fn try_lock(&self) -> bool {
        NativeLock::try_lock(self)
    }

    #[inline]
    fn unlock(&self) {
        NativeLock::unlock(self);
    }

    fn with_wait_handle(&self, park: &mut dyn FnMut(&mut WaitHandle<'_>)) {
        self.assert_owned("wait");

        // Other threads take the lock while we are parked; clear ownership
        // before the condvar releases it.
        let _reclaim = Reclaim {
            lock: self,
            owner: current_thread_id(),
            depth: self.depth.swap(0, Ordering::Relaxed),
        };
        self.owner.store(0, Ordering::Relaxed);

        // SAFETY: `raw` is locked by this thread through a forgotten guard.
        // The rebuilt guard stands in for that acquisition while parked and is
        // never dropped, so the mutex stays locked once `park` returns or
        // unwinds.
        let mut handle = ManuallyDrop::new(unsafe { self.raw.make_guard_unchecked() });
        park(&mut *handle);
    }
}

/// Restores the waiter's ownership when a wait ends, by return or by panic.
struct Reclaim<'a, K: LockKind> {
    lock: &'a NativeLock<K>,
    owner: usize,
    depth: usize,
}

impl<K: LockKind> Drop for Reclaim<'_, K> {
    fn drop(&mut self) {
        self.lock.take_ownership(self.owner, self.depth);
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
            .field("locked", &self.is_locked())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use crate::{BinaryLock, RecursiveLock};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::thread;
    use std::time::Duration;

    fn try_from_other_thread<F: FnOnce() -> bool + Send>(f: F) -> bool {
        thread::scope(|s| s.spawn(f).join().unwrap())
    }

    #[test]
    fn test_binary_lock_unlock() {
        let lock = BinaryLock::new();
        assert!(!lock.is_locked());

        lock.lock();
        assert!(lock.is_locked());
        assert!(lock.is_held_by_current_thread());
        assert_eq!(lock.depth(), 1);

        lock.unlock();
        assert!(!lock.is_locked());
        assert_eq!(lock.depth(), 0);
    }

    #[test]
    fn test_binary_try_lock_held_elsewhere() {
        let lock = BinaryLock::new();
        lock.lock();

        let acquired = try_from_other_thread(|| lock.try_lock());
        assert!(!acquired);
        // No side effects on the holder.
        assert_eq!(lock.depth(), 1);

        lock.unlock();
        let acquired = try_from_other_thread(|| {
            let ok = lock.try_lock();
            lock.unlock();
            ok
        });
        assert!(acquired);
    }

    #[test]
    fn test_binary_try_lock_by_owner_fails() {
        let lock = BinaryLock::new();
        lock.lock();
        assert!(!lock.try_lock());
        assert_eq!(lock.depth(), 1);
        lock.unlock();
    }

    #[test]
    #[should_panic(expected = "binary lock re-acquired by its owning thread")]
    fn test_binary_relock_by_owner_panics() {
        let lock = BinaryLock::new();
        lock.lock();
        lock.lock();
    }

    #[test]
    #[should_panic(expected = "unlock of a binary lock not held by the current thread")]
    fn test_unlock_unheld_panics() {
        let lock = BinaryLock::new();
        lock.unlock();
    }

    #[test]
    #[should_panic(expected = "unlock of a recursive lock not held by the current thread")]
    fn test_unlock_from_other_thread_panics() {
        let lock = RecursiveLock::new();
        lock.lock();
        let result = thread::scope(|s| s.spawn(|| lock.unlock()).join());
        lock.unlock();
        if let Err(panic) = result {
            std::panic::resume_unwind(panic);
        }
    }

    #[test]
    fn test_recursive_depth() {
        let lock = RecursiveLock::new();
        for expected in 1..=3 {
            lock.lock();
            assert_eq!(lock.depth(), expected);
        }

        lock.unlock();
        lock.unlock();
        assert_eq!(lock.depth(), 1);
        assert!(!try_from_other_thread(|| lock.try_lock()));

        lock.unlock();
        assert!(!lock.is_locked());
    }

    #[test]
    fn test_recursive_try_lock_by_owner_increments() {
        let lock = RecursiveLock::new();
        assert!(lock.try_lock());
        assert!(lock.try_lock());
        assert_eq!(lock.depth(), 2);
        lock.unlock();
        lock.unlock();
        assert!(!lock.is_locked());
    }

    #[test]
    fn test_contended_lock_blocks_until_release() {
        let lock = BinaryLock::new();
        let entered = AtomicBool::new(false);
        lock.lock();

        thread::scope(|s| {
            s.spawn(|| {
                lock.lock();
                entered.store(true, Ordering::SeqCst);
                lock.unlock();
            });

            thread::sleep(Duration::from_millis(50));
            assert!(!entered.load(Ordering::SeqCst));
            lock.unlock();
        });

        assert!(entered.load(Ordering::SeqCst));
    }

    #[test]
    fn test_lock_held_by_exited_thread_stays_held() {
        for _ in 0..50 {
            let lock = RecursiveLock::new();
            thread::scope(|s| {
                s.spawn(|| lock.lock());
            });

            // A later thread never inherits the exited owner's identity.
            let acquired = try_from_other_thread(|| lock.try_lock());
            assert!(!acquired);
            assert!(lock.is_locked());
            assert!(!lock.is_held_by_current_thread());
        }
    }

    #[test]
    fn test_debug_output() {
        let lock = RecursiveLock::new();
        let text = format!("{lock:?}");
        assert!(text.contains("recursive"));
        assert!(text.contains("locked: false"));
    }
}
