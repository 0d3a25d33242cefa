//! Task Control Block (TCB) definition
//!
//! The TCB contains all the information needed to manage a task,
//! including the intrusive links for the ready list, the wait list of a
//! kernel object and the timeout wheel of a clock.

use core::ptr::NonNull;

use crate::sync::wait_list::WaitList;
use crate::time::TickClock;
use crate::types::{OsPendOn, OsPendStatus, OsPrio, OsStkElement, OsTaskState, OsTick};

/// Task Control Block
#[repr(C)]
pub struct OsTcb {
    // ============ Stack pointer ============
    /// Current stack pointer, must stay at offset 0 for the port layer
    pub stk_ptr: *mut OsStkElement,

    // ============ Stack information ============
    /// Base of stack
    pub stk_base: *mut OsStkElement,
    /// Stack limit pointer
    pub stk_limit: *mut OsStkElement,
    /// Stack size in words
    pub stk_size: usize,

    // ============ Task identification ============
    /// Task name
    pub name: &'static str,

    // ============ Ready list links ============
    /// Next TCB in ready list
    pub next_ptr: Option<NonNull<OsTcb>>,
    /// Previous TCB in ready list
    pub prev_ptr: Option<NonNull<OsTcb>>,

    // ============ Wait list links ============
    /// Next TCB in a wait list
    pub wait_next_ptr: Option<NonNull<OsTcb>>,
    /// Previous TCB in a wait list
    pub wait_prev_ptr: Option<NonNull<OsTcb>>,
    /// Wait list this task is linked into, null when unlinked
    pub wait_list: *mut WaitList,
    /// Kernel object this task is pending on
    pub wait_obj: *const (),
    /// What kind of object the task is pending on
    pub pend_on: OsPendOn,
    /// Outcome of the pend, written by the waking party
    pub pend_status: OsPendStatus,

    // ============ Timeout links ============
    /// Next TCB in the clock's timeout wheel slot
    pub tick_next_ptr: Option<NonNull<OsTcb>>,
    /// Previous TCB in the clock's timeout wheel slot
    pub tick_prev_ptr: Option<NonNull<OsTcb>>,
    /// Clock whose wheel this task is linked into, null when unlinked
    pub tick_clock: *const TickClock,
    /// Absolute tick at which the delay or wait expires
    pub tick_expiry: OsTick,
    /// Which wheel slot this task is in
    pub tick_slot: u8,

    // ============ Priority ============
    /// Current (effective) priority, may be boosted by a mutex
    pub prio: OsPrio,
    /// Assigned base priority
    pub base_prio: OsPrio,

    // ============ State ============
    /// Current task state
    pub task_state: OsTaskState,

    // ============ Synchronization bookkeeping ============
    /// Wait-abort flag, makes pending calls return `Interrupted`
    pub interrupted: bool,
    /// Number of mutexes currently held by this task
    pub acquired_mutexes: u8,

    // ============ Task entry point ============
    /// Task function address
    pub task_entry_addr: usize,
    /// Task argument
    pub task_entry_arg: *mut (),
}

impl OsTcb {
    /// Create a new, uninitialized TCB
    pub const fn new() -> Self {
        OsTcb {
            stk_ptr: core::ptr::null_mut(),
            stk_base: core::ptr::null_mut(),
            stk_limit: core::ptr::null_mut(),
            stk_size: 0,

            name: "",

            next_ptr: None,
            prev_ptr: None,

            wait_next_ptr: None,
            wait_prev_ptr: None,
            wait_list: core::ptr::null_mut(),
            wait_obj: core::ptr::null(),
            pend_on: OsPendOn::Nothing,
            pend_status: OsPendStatus::Ok,

            tick_next_ptr: None,
            tick_prev_ptr: None,
            tick_clock: core::ptr::null(),
            tick_expiry: 0,
            tick_slot: 0,

            prio: 0,
            base_prio: 0,

            task_state: OsTaskState::Ready,

            interrupted: false,
            acquired_mutexes: 0,

            task_entry_addr: 0,
            task_entry_arg: core::ptr::null_mut(),
        }
    }

    /// Initialize TCB to default values
    pub fn init(&mut self) {
        *self = Self::new();
    }

    /// Check if task is ready to run
    #[inline]
    pub fn is_ready(&self) -> bool {
        self.task_state == OsTaskState::Ready
    }

    /// Check if task is pending on a kernel object
    #[inline]
    pub fn is_pending(&self) -> bool {
        matches!(
            self.task_state,
            OsTaskState::Pend | OsTaskState::PendTimeout
        )
    }
}

impl Default for OsTcb {
    fn default() -> Self {
        Self::new()
    }
}

unsafe impl Send for OsTcb {}
unsafe impl Sync for OsTcb {}
