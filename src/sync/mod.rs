//! Synchronization primitives
//!
//! Contains the wait-list machinery shared by all blocking objects, the
//! POSIX-inspired mutex and the counting semaphore.

pub mod wait_list;

#[cfg(feature = "mutex")]
pub mod mutex;

#[cfg(feature = "sem")]
pub mod sem;
