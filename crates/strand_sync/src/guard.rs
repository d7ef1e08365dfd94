//! # Scoped Lock Guard
//!
//! RAII holder for any [`Lockable`]. Acquires on construction, releases on
//! drop, and can be unlocked and relocked explicitly in between.
//!
//! The guard tracks whether it currently holds its lock: dropping a guard
//! after an explicit [`Guard::unlock`] releases nothing, so a guard never
//! gives back an acquisition it does not own.

use std::fmt;
use std::marker::PhantomData;

use crate::{LockError, LockResult, Lockable};

/// Scoped acquisition of a [`Lockable`].
///
/// ## Usage
///
/// ```rust
/// use strand_sync::{BinaryLock, Guard};
///
/// let lock = BinaryLock::new();
/// {
///     let mut guard = Guard::new(&lock);
///     // critical section
///     guard.unlock();
///     // lock is free here
///     guard.relock();
/// } // released
/// assert!(lock.try_lock());
/// lock.unlock();
/// ```
#[must_use = "the lock is released as soon as the guard is dropped"]
pub struct Guard<'a, M: Lockable + ?Sized> {
    lock: &'a M,
    locked: bool,
    /// Acquisitions belong to the thread that made them.
    _not_send: PhantomData<*const ()>,
}

impl<'a, M: Lockable + ?Sized> Guard<'a, M> {
    /// Blocks until `lock` is acquired and returns a guard holding it.
    pub fn new(lock: &'a M) -> Self {
        lock.lock();
        Self {
            lock,
            locked: true,
            _not_send: PhantomData,
        }
    }

    /// Acquires `lock` without blocking.
    ///
    /// # Errors
    ///
    /// Returns [`LockError::WouldBlock`] if another thread holds the lock.
    pub fn try_new(lock: &'a M) -> LockResult<Self> {
        if !lock.try_lock() {
            return Err(LockError::WouldBlock);
        }
        Ok(Self {
            lock,
            locked: true,
            _not_send: PhantomData,
        })
    }

    /// Releases the lock while keeping the guard alive.
    ///
    /// # Panics
    ///
    /// Panics if the guard is already unlocked.
    pub fn unlock(&mut self) {
        assert!(self.locked, "guard is already unlocked");
        self.lock.unlock();
        self.locked = false;
    }

    /// Reacquires the lock after [`Guard::unlock`], blocking if necessary.
    ///
    /// # Panics
    ///
    /// Panics if the guard already holds its lock.
    pub fn relock(&mut self) {
        assert!(!self.locked, "guard already holds its lock");
        self.lock.lock();
        self.locked = true;
    }

    /// Reacquires the lock without blocking.
    ///
    /// # Errors
    ///
    /// [`LockError::AlreadyLocked`] if the guard holds its lock,
    /// [`LockError::WouldBlock`] if another thread does.
    pub fn try_relock(&mut self) -> LockResult<()> {
        if self.locked {
            return Err(LockError::AlreadyLocked);
        }
        if !self.lock.try_lock() {
            return Err(LockError::WouldBlock);
        }
        self.locked = true;
        Ok(())
    }

    /// Whether the guard currently holds its lock.
    #[inline]
    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// The lock this guard acquires.
    #[inline]
    #[must_use]
    pub fn lockable(&self) -> &'a M {
        self.lock
    }
}

impl<M: Lockable + ?Sized> Drop for Guard<'_, M> {
    fn drop(&mut self) {
        if self.locked {
            self.lock.unlock();
        }
    }
}

impl<M: Lockable + ?Sized> fmt::Debug for Guard<'_, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Guard")
            .field("locked", &self.locked)
            .finish_non_exhaustive()
    }
}
