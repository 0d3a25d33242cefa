//! Kernel error codes
//!
//! Errors are returned by value through [`OsResult`], never by unwinding.
//! The set is POSIX-aligned: each variant mirrors the errno a POSIX thread
//! API would report for the same condition.

/// Kernel error type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OsError {
    /// An argument or object state is invalid for the call (`EINVAL`).
    ///
    /// Also reported when a priority-protect mutex is requested by a
    /// thread running above the ceiling.
    InvalidArgument,
    /// The operation is not permitted in the calling context (`EPERM`),
    /// e.g. blocking from an interrupt handler, locking while the
    /// scheduler is locked, or unlocking a mutex owned by another thread.
    NotPermitted,
    /// A resource limit was hit, retry may succeed later (`EAGAIN`),
    /// e.g. recursion overflow on a recursive mutex.
    Again,
    /// The call would deadlock the calling thread (`EDEADLK`).
    Deadlock,
    /// The object is not available without blocking (`EWOULDBLOCK`).
    WouldBlock,
    /// The wait deadline expired (`ETIMEDOUT`).
    TimedOut,
    /// The wait was aborted by task interruption (`EINTR`).
    Interrupted,
    /// A robust mutex was acquired after its owner terminated while
    /// holding it (`EOWNERDEAD`). The caller owns the mutex but the
    /// protected state may be inconsistent.
    OwnerDead,
    /// The mutex is permanently unusable (`ENOTRECOVERABLE`).
    ///
    /// Also returned as a diagnostic when a normal non-robust mutex is
    /// unlocked by a task that does not own it, which POSIX leaves
    /// undefined.
    NotRecoverable,
    /// The requested attribute combination is not supported (`ENOTSUP`).
    NotSupported,
}

/// Result type alias for kernel operations
pub type OsResult<T> = Result<T, OsError>;
