//! Lock kind markers for [`NativeLock`](crate::NativeLock).

mod private {
    pub trait Sealed {}
}

/// Selects the re-entrancy behaviour of a native lock.
///
/// Sealed: only [`Binary`] and [`Recursive`] exist.
pub trait LockKind: private::Sealed + Send + Sync + 'static {
    /// Whether the holding thread may acquire the lock again.
    const REENTRANT: bool;

    /// Human-readable kind name used in panic messages and `Debug` output.
    const NAME: &'static str;
}

/// Non-reentrant kind. Re-acquiring on the owning thread is a logic error.
#[derive(Debug)]
pub enum Binary {}

/// Reentrant kind. The owner must release once per acquisition.
#[derive(Debug)]
pub enum Recursive {}

impl private::Sealed for Binary {}
impl private::Sealed for Recursive {}

impl LockKind for Binary {
    const REENTRANT: bool = false;
    const NAME: &'static str = "binary";
}

impl LockKind for Recursive {
    const REENTRANT: bool = true;
    const NAME: &'static str = "recursive";
}
