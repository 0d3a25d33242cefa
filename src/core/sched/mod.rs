//! Scheduler module
//!
//! Priority-based preemptive scheduler. Equal-priority tasks run FIFO in
//! their ready-list order. Also provides the scheduler-level critical
//! section guards used by the synchronization primitives.

mod rdy_list;

pub use rdy_list::ReadyList;

use core::ptr::NonNull;

use crate::critical::{is_isr_context, CriticalSection};
use crate::kernel;
use crate::task::OsTcb;
use crate::types::OsPrio;

/// Main scheduling point
///
/// Determines the highest priority ready task and triggers a context
/// switch if needed. Called after any operation that may change task
/// readiness: blocking, wakeups, priority changes and timer expiry.
pub fn os_sched() {
    if !kernel::KERNEL.is_running() {
        return;
    }

    if is_isr_context() {
        return;
    }

    if kernel::KERNEL.sched_lock_nesting() > 0 {
        return;
    }

    let _cs = CriticalSection::enter();

    let high_prio = unsafe { kernel::prio_table().get_highest() };

    unsafe {
        if let Some(high_rdy) = kernel::rdy_list(high_prio).head() {
            kernel::set_prio_high_rdy(high_prio);
            kernel::set_tcb_high_rdy_ptr(Some(high_rdy));

            if Some(high_rdy) != kernel::tcb_cur_ptr() {
                crate::port::os_ctx_sw();
            }
        }
    }
}

// ============ Scheduler critical sections ============

/// RAII guard that locks the scheduler
///
/// Interrupts remain enabled; only preemption is suppressed. Dropping the
/// outermost guard reschedules, so task state changes made inside the
/// section take effect in a single transition at its close.
pub struct SchedCriticalSection {
    _private: (),
}

impl SchedCriticalSection {
    #[inline]
    pub fn enter() -> Self {
        kernel::KERNEL.sched_lock_nest();
        SchedCriticalSection { _private: () }
    }
}

impl Drop for SchedCriticalSection {
    #[inline]
    fn drop(&mut self) {
        if kernel::KERNEL.sched_unlock_nest() == 0 {
            os_sched();
        }
    }
}

/// RAII guard that re-enables scheduling inside a scheduler critical
/// section
///
/// Used around priority updates that must become visible to the scheduler
/// immediately, before the enclosing section ends.
pub struct UncriticalSection {
    _private: (),
}

impl UncriticalSection {
    #[inline]
    pub fn enter() -> Self {
        if kernel::KERNEL.sched_unlock_nest() == 0 {
            os_sched();
        }
        UncriticalSection { _private: () }
    }
}

impl Drop for UncriticalSection {
    #[inline]
    fn drop(&mut self) {
        kernel::KERNEL.sched_lock_nest();
    }
}

// ============ Ready list operations ============

/// Make a task ready
///
/// # Safety
/// `tcb` must be valid and not linked into any ready list; the caller
/// must hold a critical section.
pub(crate) unsafe fn os_rdy_list_insert(tcb: NonNull<OsTcb>) {
    let prio = unsafe { tcb.as_ref().prio };

    unsafe {
        kernel::rdy_list(prio).insert_tail(tcb);
        kernel::prio_table().insert(prio);
    }
}

/// Remove a task from its ready list
///
/// # Safety
/// `tcb` must be linked into the ready list matching its priority; the
/// caller must hold a critical section.
pub(crate) unsafe fn os_rdy_list_remove(tcb: NonNull<OsTcb>) {
    let prio = unsafe { tcb.as_ref().prio };

    unsafe {
        let rdy_list = kernel::rdy_list(prio);
        rdy_list.remove(tcb);

        if rdy_list.is_empty() {
            kernel::prio_table().remove(prio);
        }
    }
}

/// Move a ready task to a different priority
///
/// # Safety
/// `tcb` must be linked into the ready list matching its current
/// priority; the caller must hold a critical section.
pub(crate) unsafe fn os_rdy_list_change_prio(tcb: NonNull<OsTcb>, new_prio: OsPrio) {
    let tcb_ref = unsafe { &mut *tcb.as_ptr() };
    let old_prio = tcb_ref.prio;

    if old_prio == new_prio {
        return;
    }

    unsafe {
        let old_rdy_list = kernel::rdy_list(old_prio);
        old_rdy_list.remove(tcb);
        if old_rdy_list.is_empty() {
            kernel::prio_table().remove(old_prio);
        }
    }

    tcb_ref.prio = new_prio;

    unsafe {
        kernel::rdy_list(new_prio).insert_tail(tcb);
        kernel::prio_table().insert(new_prio);
    }
}
