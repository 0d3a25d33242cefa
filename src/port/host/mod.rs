//! Host port
//!
//! Runs the kernel's data structures without real context switching, for
//! tests and tooling on the development machine. A registered switch hook
//! stands in for the PendSV handler: whenever the scheduler would switch
//! tasks, the hook runs and may play the part of the other tasks before
//! control returns to the caller. Together with [`switch_to`] this forms
//! a deterministic scheduler for driving blocking kernel paths from plain
//! host tests.
//!
//! The hook is re-entrant: waking a task from inside the hook reschedules
//! and dispatches the hook again. Hooks are therefore usually written as
//! phase machines that ignore invocations they do not expect.

use core::ptr::NonNull;
use core::sync::atomic::{AtomicPtr, Ordering};

use crate::kernel;
use crate::task::{OsTaskFn, OsTcb};
use crate::types::OsStkElement;

static SWITCH_HOOK: AtomicPtr<()> = AtomicPtr::new(core::ptr::null_mut());

/// Install or clear the context-switch hook
///
/// The hook fires on every task-level context switch the scheduler
/// requests.
pub fn set_switch_hook(hook: Option<fn()>) {
    let raw = match hook {
        Some(f) => f as *mut (),
        None => core::ptr::null_mut(),
    };
    SWITCH_HOOK.store(raw, Ordering::SeqCst);
}

/// Mark the kernel as running without starting real multitasking
pub fn boot() {
    kernel::KERNEL.set_running(true);
}

/// Designate the simulated current task
pub fn switch_to(tcb: NonNull<OsTcb>) {
    unsafe {
        kernel::set_tcb_cur_ptr(Some(tcb));
        kernel::set_prio_cur(tcb.as_ref().prio);
    }
}

/// Get the simulated current task
pub fn current() -> Option<NonNull<OsTcb>> {
    unsafe { kernel::tcb_cur_ptr() }
}

pub unsafe fn os_start_high_rdy() {
    panic!("os_start_high_rdy not available on this platform");
}

/// Task-level context switch: invoke the registered hook
pub fn os_ctx_sw() {
    let raw = SWITCH_HOOK.load(Ordering::SeqCst);
    if raw.is_null() {
        return;
    }

    let hook: fn() = unsafe { core::mem::transmute(raw) };
    hook();
}

/// Interrupt-level context switch
///
/// The host port only switches at task-level reschedule points.
pub fn os_int_ctx_sw() {}

pub unsafe fn os_task_stk_init(
    _task_fn: OsTaskFn,
    _arg: *mut (),
    stk_base: *mut OsStkElement,
    stk_size: usize,
) -> *mut OsStkElement {
    // Return top of stack; the stack is never executed on the host.
    unsafe { stk_base.add(stk_size - 1) }
}

pub fn os_cpu_systick_init(_freq: u32) {}
