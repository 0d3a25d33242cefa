//! A small preemptive RTOS kernel with POSIX-inspired mutexes
//!
//! The kernel provides:
//! - Priority-based preemptive scheduling (FIFO among equal priorities)
//! - Mutexes with normal/errorcheck/recursive types and priority
//!   inheritance / priority ceiling protocols
//! - Counting semaphores
//! - Tick-based delays and timed waits on per-clock timeout wheels
//! - Context switching for ARM Cortex-M

#![no_std]
#![deny(unsafe_op_in_unsafe_fn)]

#[cfg(test)]
extern crate std;

// ============ Critical Section ============

#[cfg(target_arch = "arm")]
mod cs_impl {
    use cortex_m::interrupt;
    use cortex_m::register::primask;
    use critical_section::{set_impl, Impl, RawRestoreState};

    struct SingleCoreCriticalSection;
    set_impl!(SingleCoreCriticalSection);

    unsafe impl Impl for SingleCoreCriticalSection {
        unsafe fn acquire() -> RawRestoreState {
            let was_active = primask::read().is_active();
            interrupt::disable();
            was_active
        }

        unsafe fn release(was_active: RawRestoreState) {
            if was_active {
                unsafe { interrupt::enable() }
            }
        }
    }
}

// ============ Modules ============

mod lang_items;
pub mod log;

pub mod core;
pub mod port;
pub mod sync;

// ============ Re-exports ============

pub use crate::core::config;
pub use crate::core::config::*;
pub use crate::core::critical;
pub use crate::core::error;
pub use crate::core::error::{OsError, OsResult};
pub use crate::core::kernel;
pub use crate::core::kernel::{os_init, os_int_enter, os_int_exit, os_start};
pub use crate::core::prio;
pub use crate::core::sched;
pub use crate::core::task;
pub use crate::core::task::{os_task_clear_interrupt, os_task_create, os_task_interrupt};
pub use crate::core::time;
pub use crate::core::time::{os_time_dly, os_time_get, TickClock, SYSCLOCK};
pub use crate::core::types;
pub use crate::core::types::*;

#[cfg(feature = "mutex")]
pub use sync::mutex;
#[cfg(feature = "sem")]
pub use sync::sem;
