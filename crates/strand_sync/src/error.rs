//! # Lock Error Types
//!
//! Reportable outcomes of non-blocking acquisition. Misuse (releasing a lock
//! the caller does not hold, waiting on an unlocked guard) is not reported
//! here: it panics at the call site.

use thiserror::Error;

/// Errors returned by the non-blocking guard operations.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockError {
    /// The lock is held by another thread.
    #[error("lock is held by another thread")]
    WouldBlock,

    /// The guard already holds its lock.
    #[error("guard already holds its lock")]
    AlreadyLocked,
}

/// Result type for non-blocking lock operations.
pub type LockResult<T> = Result<T, LockError>;
