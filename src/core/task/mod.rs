//! Task management module
//!
//! Provides task creation, priority updates and wait interruption.

mod tcb;

pub use tcb::OsTcb;

use core::ptr::NonNull;

use crate::config::{CFG_PRIO_MAX, CFG_STK_SIZE_MIN};
use crate::critical::{critical_section, is_isr_context};
use crate::error::{OsError, OsResult};
use crate::kernel;
use crate::sched;
use crate::sync::wait_list::WaitList;
use crate::time::TickClock;
use crate::types::{OsPendOn, OsPendStatus, OsPrio, OsStkElement, OsTaskState};

/// Task entry point function type
pub type OsTaskFn = fn(*mut ()) -> !;

/// Create a new task using static references
///
/// # Arguments
/// * `tcb` - Static mutable reference to the Task Control Block
/// * `stack` - Static mutable reference to the stack array
/// * `name` - Task name for debugging
/// * `task_fn` - Task entry point function
/// * `prio` - Task priority (larger = more urgent)
///
/// # Example
/// ```ignore
/// static mut TASK_TCB: OsTcb = OsTcb::new();
/// static mut TASK_STK: [OsStkElement; 256] = [0; 256];
///
/// fn my_task(_: *mut ()) -> ! {
///     loop { /* ... */ }
/// }
///
/// // In main:
/// os_task_create(
///     unsafe { &mut TASK_TCB },
///     unsafe { &mut TASK_STK },
///     "MyTask",
///     my_task,
///     20,
/// ).expect("Task creation failed");
/// ```
pub fn os_task_create(
    tcb: &'static mut OsTcb,
    stack: &'static mut [OsStkElement],
    name: &'static str,
    task_fn: OsTaskFn,
    prio: OsPrio,
) -> OsResult<()> {
    unsafe {
        os_task_create_internal(
            tcb as *mut OsTcb,
            name,
            task_fn,
            core::ptr::null_mut(),
            prio,
            stack.as_mut_ptr(),
            stack.len(),
        )
    }
}

/// Internal task creation for kernel use
#[doc(hidden)]
pub unsafe fn os_task_create_internal(
    tcb: *mut OsTcb,
    name: &'static str,
    task_fn: OsTaskFn,
    arg: *mut (),
    prio: OsPrio,
    stk_base: *mut OsStkElement,
    stk_size: usize,
) -> OsResult<()> {
    if tcb.is_null() || stk_base.is_null() {
        return Err(OsError::InvalidArgument);
    }

    if stk_size < CFG_STK_SIZE_MIN {
        return Err(OsError::InvalidArgument);
    }

    if prio as usize >= CFG_PRIO_MAX {
        return Err(OsError::InvalidArgument);
    }

    if is_isr_context() {
        return Err(OsError::NotPermitted);
    }

    critical_section(|_cs| {
        let tcb_ref = unsafe { &mut *tcb };
        tcb_ref.init();

        tcb_ref.name = name;
        tcb_ref.prio = prio;
        tcb_ref.base_prio = prio;
        tcb_ref.task_state = OsTaskState::Ready;

        let stk_ptr = unsafe { crate::port::os_task_stk_init(task_fn, arg, stk_base, stk_size) };
        tcb_ref.stk_ptr = stk_ptr;
        tcb_ref.stk_base = stk_base;
        tcb_ref.stk_size = stk_size;
        tcb_ref.stk_limit = unsafe { stk_base.add(stk_size / 10) }; // 10% watermark

        tcb_ref.task_entry_addr = task_fn as usize;
        tcb_ref.task_entry_arg = arg;

        let tcb_nonnull = unsafe { NonNull::new_unchecked(tcb) };
        unsafe {
            sched::os_rdy_list_insert(tcb_nonnull);
        }
    });

    if kernel::KERNEL.is_running() {
        sched::os_sched();
    }

    Ok(())
}

/// Apply a new effective priority to a task
///
/// Used by the mutex protocols to boost and restore the owner. The task
/// is repositioned in whatever scheduler structure it currently occupies:
/// its ready list, or the priority-ordered wait list it is pending on.
/// The base priority is left untouched.
pub(crate) unsafe fn os_task_set_prio(tcb: NonNull<OsTcb>, new_prio: OsPrio) {
    critical_section(|_cs| {
        let tcb_ref = unsafe { &mut *tcb.as_ptr() };

        if tcb_ref.prio == new_prio {
            return;
        }

        match tcb_ref.task_state {
            OsTaskState::Ready => unsafe {
                sched::os_rdy_list_change_prio(tcb, new_prio);
            },
            OsTaskState::Pend | OsTaskState::PendTimeout => {
                tcb_ref.prio = new_prio;
                if !tcb_ref.wait_list.is_null() {
                    unsafe { (*tcb_ref.wait_list).requeue(tcb) };
                }
            }
            _ => {
                tcb_ref.prio = new_prio;
            }
        }
    });

    sched::os_sched();
}

/// Interrupt a task's wait
///
/// Sets the task's `interrupted` flag. If the task is pending on a kernel
/// object it is detached from the object's wait list and from its clock,
/// marked [`OsPendStatus::Interrupted`] and made ready; its wait loop then
/// returns [`OsError::Interrupted`]. The flag stays set until cleared with
/// [`os_task_clear_interrupt`]; a later wait observes it at its next
/// wakeup and aborts as well.
pub fn os_task_interrupt(tcb: NonNull<OsTcb>) -> OsResult<()> {
    if !kernel::KERNEL.is_running() {
        return Err(OsError::NotPermitted);
    }

    critical_section(|_cs| {
        let tcb_ref = unsafe { &mut *tcb.as_ptr() };

        tcb_ref.interrupted = true;

        if tcb_ref.is_pending() {
            unsafe {
                WaitList::unlink(tcb);
                TickClock::unlink(tcb);
            }
            tcb_ref.pend_on = OsPendOn::Nothing;
            tcb_ref.wait_obj = core::ptr::null();
            tcb_ref.pend_status = OsPendStatus::Interrupted;
            tcb_ref.task_state = OsTaskState::Ready;
            unsafe {
                sched::os_rdy_list_insert(tcb);
            }
        }
    });

    sched::os_sched();

    Ok(())
}

/// Clear a task's `interrupted` flag
pub fn os_task_clear_interrupt(tcb: NonNull<OsTcb>) {
    critical_section(|_cs| {
        let tcb_ref = unsafe { &mut *tcb.as_ptr() };
        tcb_ref.interrupted = false;
    });
}
