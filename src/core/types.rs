//! Core type definitions
//!
//! These types provide strong typing for kernel primitives.

/// Task priority (larger value = more urgent)
pub type OsPrio = u8;

/// Tick counter type
pub type OsTick = u32;

/// Semaphore counter type
pub type OsSemCtr = u32;

/// Nesting counter
pub type OsNestingCtr = u8;

/// Mutex recursion counter type
pub type OsMutexCtr = u16;

/// Stack element type
pub type OsStkElement = u32;

/// Task state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OsTaskState {
    /// Task is ready to run
    Ready = 0,
    /// Task is delayed until a tick deadline
    Delayed = 1,
    /// Task is pending on a kernel object
    Pend = 2,
    /// Task is pending on a kernel object with a timeout
    PendTimeout = 3,
}

/// What the task is pending on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OsPendOn {
    Nothing = 0,
    Mutex = 1,
    Semaphore = 2,
}

/// Outcome of a pend, written by whoever wakes the task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OsPendStatus {
    /// Woken by a post/unlock
    Ok = 0,
    /// The wait deadline expired
    Timeout = 1,
    /// The wait was aborted via task interruption
    Interrupted = 2,
    /// The kernel object was reset while the task was waiting
    Reset = 3,
}

/// Kernel object type marker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum OsObjType {
    None = 0,
    Mutex = 0x4D555458, // 'MUTX'
    Sem = 0x53454D41,   // 'SEMA'
}
