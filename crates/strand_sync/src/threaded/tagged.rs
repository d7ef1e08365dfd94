//! # Tagged Recursive Mutex
//!
//! A recursive mutex identified by a compile-time tag rather than by a value.
//!
//! ```text
//!   TaggedRecursiveMutex<7>  TaggedRecursiveMutex<7>  TaggedRecursiveMutex<9>
//!            │                        │                        │
//!            └──────────┬─────────────┘                        │
//!                       ▼                                      ▼
//!              REGISTRY[7]: Mutex<()>                 REGISTRY[9]: Mutex<()>
//!                       ▲                                      ▲
//!        ┌──────────────┴──────────────┐                       │
//!   thread A SLOTS[7]            thread B SLOTS[7]       thread A SLOTS[9]
//!   { handle, depth }            { handle, depth }       { handle, depth }
//! ```
//!
//! Every handle with the same tag is the same logical lock, process-wide. The
//! registry holds one leaked host mutex per tag, created on first use. Each
//! thread keeps, per tag, a deferred handle onto that mutex (engaged while the
//! thread holds it) and its recursion depth. Only the owning thread touches
//! its slot, so the re-entrant path takes no lock at all.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;

use parking_lot::{Mutex, MutexGuard, RwLock};

use crate::{Lockable, WaitHandle};

/// Shared lock per tag. Entries are never removed.
static REGISTRY: RwLock<BTreeMap<usize, &'static Mutex<()>>> =
    parking_lot::const_rwlock(BTreeMap::new());

thread_local! {
    static SLOTS: RefCell<BTreeMap<usize, TagSlot>> = const { RefCell::new(BTreeMap::new()) };
}

/// This thread's view of one tag.
struct TagSlot {
    shared: &'static Mutex<()>,
    /// Engaged exactly while `depth > 0`, except while lent to a wait.
    handle: Option<MutexGuard<'static, ()>>,
    depth: usize,
}

fn shared_lock(tag: usize) -> &'static Mutex<()> {
    if let Some(&shared) = REGISTRY.read().get(&tag) {
        return shared;
    }

    let mut registry = REGISTRY.write();
    if let Some(&shared) = registry.get(&tag) {
        return shared;
    }
    let shared: &'static Mutex<()> = Box::leak(Box::new(Mutex::new(())));
    registry.insert(tag, shared);
    drop(registry);

    // Subscribers may take tagged locks themselves: log with nothing held.
    tracing::debug!(tag, "registered shared lock for tag");
    shared
}

/// Runs `f` on this thread's slot for `tag`. `f` must not block or call out.
fn with_slot<R>(tag: usize, f: impl FnOnce(&mut TagSlot) -> R) -> R {
    SLOTS.with(|slots| {
        let known = slots.borrow().get(&tag).map(|slot| slot.shared);
        let shared = known.unwrap_or_else(|| shared_lock(tag));

        let mut slots = slots.borrow_mut();
        let slot = slots.entry(tag).or_insert_with(|| TagSlot {
            shared,
            handle: None,
            depth: 0,
        });
        f(slot)
    })
}

/// A handle taken out of its slot for a wait. Put back on drop, so an unwind
/// out of the wait leaves the lock held and the slot consistent.
struct Lent<const TAG: usize> {
    handle: Option<MutexGuard<'static, ()>>,
}

impl<const TAG: usize> Drop for Lent<TAG> {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            with_slot(TAG, |slot| slot.handle = Some(handle));
        }
    }
}

/// Recursive mutex shared by every value carrying the same `TAG`.
///
/// Values are zero-sized handles: construct one wherever the lock is needed
/// instead of passing a shared object around.
///
/// ## Usage
///
/// ```rust
/// use strand_sync::{Guard, Lockable, TaggedRecursiveMutex};
///
/// const REGISTRY_LOCK: usize = 42;
///
/// fn register() {
///     let mutex = TaggedRecursiveMutex::<REGISTRY_LOCK>::new();
///     let _guard = mutex.guard();
/// }
///
/// let mutex = TaggedRecursiveMutex::<REGISTRY_LOCK>::new();
/// let _guard = Guard::new(&mutex);
/// register(); // re-enters the same lock
/// assert_eq!(mutex.depth(), 1);
/// ```
#[derive(Clone, Copy, Default)]
pub struct TaggedRecursiveMutex<const TAG: usize> {
    _private: (),
}

impl<const TAG: usize> TaggedRecursiveMutex<TAG> {
    /// Creates a handle onto the lock for `TAG`.
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

    /// Blocks until the calling thread holds the lock for `TAG`.
    ///
    /// Re-entry by the holding thread only bumps its depth.
    pub fn lock(&self) {
        let contended = with_slot(TAG, |slot| {
            if slot.depth == 0 {
                match slot.shared.try_lock() {
                    Some(handle) => slot.handle = Some(handle),
                    None => return Some(slot.shared),
                }
            }
            slot.depth += 1;
            None
        });

        // Block outside the slot borrow; only this thread writes the slot.
        if let Some(shared) = contended {
            tracing::trace!(tag = TAG, "tagged lock contended");
            let handle = shared.lock();
            with_slot(TAG, |slot| {
                slot.handle = Some(handle);
                slot.depth = 1;
            });
        }
    }

    /// Acquires the lock without blocking.
    ///
    /// Succeeds at once if the calling thread already holds it. On failure
    /// nothing changes.
    #[must_use]
    pub fn try_lock(&self) -> bool {
        with_slot(TAG, |slot| {
            if slot.depth > 0 {
                slot.depth += 1;
                return true;
            }
            match slot.shared.try_lock() {
                Some(handle) => {
                    slot.handle = Some(handle);
                    slot.depth = 1;
                    true
                }
                None => false,
            }
        })
    }

    /// Releases one acquisition; the last one frees the lock for other threads.
    ///
    /// # Panics
    ///
    /// Panics if the calling thread does not hold the lock.
    pub fn unlock(&self) {
        with_slot(TAG, |slot| {
            assert!(
                slot.depth > 0,
                "unlock of tagged lock {TAG} not held by the current thread"
            );
            slot.depth -= 1;
            if slot.depth == 0 {
                slot.handle = None;
            }
        });
    }

    /// Number of unmatched acquisitions by the calling thread.
    #[must_use]
    pub fn depth(&self) -> usize {
        SLOTS.with(|slots| slots.borrow().get(&TAG).map_or(0, |slot| slot.depth))
    }

    /// Whether the calling thread holds the lock.
    #[inline]
    #[must_use]
    pub fn is_held_by_current_thread(&self) -> bool {
        self.depth() > 0
    }
}

impl<const TAG: usize> Lockable for TaggedRecursiveMutex<TAG> {
    #[inline]
    fn lock(&self) {
        TaggedRecursiveMutex::lock(self);
    }

    #[inline]
    fn try_lock(&self) -> bool {
        TaggedRecursiveMutex::try_lock(self)
    }

    #[inline]
    fn unlock(&self) {
        TaggedRecursiveMutex::unlock(self);
    }

    fn with_wait_handle(&self, park: &mut dyn FnMut(&mut WaitHandle<'_>)) {
        // The handle leaves the slot while parked so the thread-local borrow is
        // not held across the wait. Depth stays put and is what we resume with.
        let mut lent = Lent::<TAG> {
            handle: with_slot(TAG, |slot| {
                if slot.depth > 0 {
                    slot.handle.take()
                } else {
                    None
                }
            }),
        };
        let Some(handle) = lent.handle.as_mut() else {
            panic!("wait on tagged lock {TAG} not held by the current thread");
        };

        park(handle);
    }
}

impl<const TAG: usize> fmt::Debug for TaggedRecursiveMutex<TAG> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaggedRecursiveMutex")
            .field("tag", &TAG)
            .field("depth", &self.depth())
            .finish()
    }
}
