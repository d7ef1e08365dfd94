//! # Threaded Backend
//!
//! Real synchronization on top of `parking_lot`.
//!
//! Every lock here ultimately sits on a `parking_lot::Mutex<()>` acquired
//! without a live guard, with ownership tracked beside it. That is what lets
//! the same lock be released explicitly, re-entered by its owner, and handed
//! to a `parking_lot::Condvar` as an ordinary `MutexGuard` while waiting.

use std::sync::atomic::{AtomicUsize, Ordering};

mod native;
mod signal;
mod tagged;

pub use native::NativeLock;
pub use signal::WaitSignal;
pub use tagged::TaggedRecursiveMutex;

/// The object a [`WaitSignal`] suspends on: a guard over a host mutex that
/// the waiting thread holds.
pub type WaitHandle<'a> = parking_lot::MutexGuard<'a, ()>;

/// Next id handed out by [`current_thread_id`]. Zero means "no owner".
static NEXT_THREAD_ID: AtomicUsize = AtomicUsize::new(1);

thread_local! {
    static THREAD_ID: usize = NEXT_THREAD_ID.fetch_add(1, Ordering::Relaxed);
}

/// Identifier of the calling thread, never zero and never reused by a later
/// thread in this process.
///
/// A lock whose owner exited without releasing it stays held: no other
/// thread can ever match the recorded owner and re-enter it.
#[inline]
pub(crate) fn current_thread_id() -> usize {
    THREAD_ID.with(|id| *id)
}
