//! # STRAND Synchronization Primitives
//!
//! Locks and wait signals for code that must run both on threaded hosts and
//! on single-threaded builds without touching a call site.
//!
//! ## Building Blocks
//!
//! ```text
//!   BinaryLock / RecursiveLock      TaggedRecursiveMutex<TAG>
//!   (NativeLock<Kind>)              (shared lock per TAG + TLS depth)
//!            │                                 │
//!            └────────────┬────────────────────┘
//!                         ▼
//!                    Lockable trait
//!                         │
//!                         ▼
//!                    Guard<'_, M>  ──── wait(&mut guard) ────▶  WaitSignal
//! ```
//!
//! Every lock implements [`Lockable`]. A [`Guard`] holds any of them for a
//! scope, and a [`WaitSignal`] can suspend on any guard: it reaches through
//! the guard to the lock's real wait handle, so waiting never branches on the
//! kind of lock involved.
//!
//! ## Build Modes
//!
//! The `threads` feature (on by default) selects the real implementation on
//! top of `parking_lot`. Without it every primitive is a zero-sized no-op
//! exposing the exact same API; [`IS_THREADED`] reports which one was built.
//!
//! ## Example
//!
//! ```rust
//! use strand_sync::{Guard, TaggedRecursiveMutex, WaitSignal};
//!
//! const WINDOW_STATE: usize = 0;
//!
//! let mutex = TaggedRecursiveMutex::<WINDOW_STATE>::new();
//! let signal = WaitSignal::new();
//!
//! let mut guard = Guard::new(&mutex);
//! // Any handle with the same tag is the same lock, and it is re-entrant.
//! let alias = TaggedRecursiveMutex::<WINDOW_STATE>::new();
//! let nested = Guard::new(&alias);
//! drop(nested);
//!
//! signal.notify_all();
//! guard.unlock();
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

mod error;
mod guard;
mod kind;
mod lockable;

#[cfg(feature = "threads")]
mod threaded;
#[cfg(feature = "threads")]
use threaded as backend;

#[cfg(not(feature = "threads"))]
mod noop;
#[cfg(not(feature = "threads"))]
use noop as backend;

pub use backend::{NativeLock, TaggedRecursiveMutex, WaitHandle, WaitSignal};
pub use error::{LockError, LockResult};
pub use guard::Guard;
pub use kind::{Binary, LockKind, Recursive};
pub use lockable::Lockable;

/// Non-reentrant native lock.
pub type BinaryLock = NativeLock<Binary>;

/// Native lock the holding thread may acquire repeatedly.
pub type RecursiveLock = NativeLock<Recursive>;

/// `true` when built with real synchronization, `false` for the no-op build.
pub const IS_THREADED: bool = cfg!(feature = "threads");
