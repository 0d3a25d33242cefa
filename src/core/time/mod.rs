//! Time management
//!
//! A [`TickClock`] pairs a monotonic tick counter with a timeout wheel:
//! the ordered set of tasks whose delay or wait expires at a known tick.
//! `SYSCLOCK` is the clock driven from the SysTick interrupt; kernel
//! objects may reference an application-driven clock instead through
//! their attributes.

use core::cell::UnsafeCell;
use core::ptr::NonNull;
use core::sync::atomic::{AtomicU32, Ordering};

use crate::config::CFG_TICK_WHEEL_SIZE;
use crate::critical::{critical_section, is_isr_context};
use crate::error::{OsError, OsResult};
use crate::kernel;
use crate::sched;
use crate::sync::wait_list::WaitList;
use crate::task::OsTcb;
use crate::types::{OsPendOn, OsPendStatus, OsTaskState, OsTick};

/// A monotonic tick source with an attached timeout wheel
pub struct TickClock {
    counter: AtomicU32,
    wheel: UnsafeCell<[Option<NonNull<OsTcb>>; CFG_TICK_WHEEL_SIZE]>,
}

// The wheel is only touched inside interrupt critical sections.
unsafe impl Sync for TickClock {}

impl TickClock {
    /// Create a new clock at tick zero
    pub const fn new() -> Self {
        TickClock {
            counter: AtomicU32::new(0),
            wheel: UnsafeCell::new([None; CFG_TICK_WHEEL_SIZE]),
        }
    }

    /// Current tick count
    #[inline(always)]
    pub fn now(&self) -> OsTick {
        self.counter.load(Ordering::Relaxed)
    }

    /// Reset the clock to its initial state
    pub(crate) fn reset(&self) {
        self.counter.store(0, Ordering::Relaxed);
        critical_section(|_cs| {
            let wheel = unsafe { &mut *self.wheel.get() };
            for slot in wheel.iter_mut() {
                *slot = None;
            }
        });
    }

    /// Attach a task to the wheel with an absolute expiry tick
    ///
    /// # Safety
    /// `tcb` must be valid and not linked into any wheel; the caller must
    /// hold an interrupt critical section.
    pub(crate) unsafe fn wheel_insert(&self, tcb: NonNull<OsTcb>, expiry: OsTick) {
        let tcb_ref = unsafe { &mut *tcb.as_ptr() };
        let slot = (expiry as usize) % CFG_TICK_WHEEL_SIZE;
        let wheel = unsafe { &mut *self.wheel.get() };

        tcb_ref.tick_expiry = expiry;
        tcb_ref.tick_slot = slot as u8;
        tcb_ref.tick_clock = self as *const TickClock;

        // Insert at head of slot
        tcb_ref.tick_next_ptr = wheel[slot];
        tcb_ref.tick_prev_ptr = None;

        if let Some(mut old_head) = wheel[slot] {
            unsafe { old_head.as_mut().tick_prev_ptr = Some(tcb) };
        }

        wheel[slot] = Some(tcb);
    }

    /// Detach a task from whatever wheel it is linked into
    ///
    /// Idempotent: a no-op when the tick handler already removed it.
    ///
    /// # Safety
    /// The caller must hold an interrupt critical section.
    pub(crate) unsafe fn unlink(tcb: NonNull<OsTcb>) {
        let clock = unsafe { tcb.as_ref().tick_clock };
        if clock.is_null() {
            return;
        }
        unsafe { (*clock).wheel_remove(tcb) };
    }

    unsafe fn wheel_remove(&self, tcb: NonNull<OsTcb>) {
        let tcb_ref = unsafe { &mut *tcb.as_ptr() };
        let slot = tcb_ref.tick_slot as usize;
        let wheel = unsafe { &mut *self.wheel.get() };

        if let Some(mut prev) = tcb_ref.tick_prev_ptr {
            unsafe { prev.as_mut().tick_next_ptr = tcb_ref.tick_next_ptr };
        } else {
            wheel[slot] = tcb_ref.tick_next_ptr;
        }

        if let Some(mut next) = tcb_ref.tick_next_ptr {
            unsafe { next.as_mut().tick_prev_ptr = tcb_ref.tick_prev_ptr };
        }

        tcb_ref.tick_next_ptr = None;
        tcb_ref.tick_prev_ptr = None;
        tcb_ref.tick_clock = core::ptr::null();
    }

    /// Advance the clock by one tick and expire due entries
    ///
    /// A due `Delayed` task becomes ready. A due `PendTimeout` task is
    /// additionally detached from the wait list of the object it pends
    /// on and marked [`OsPendStatus::Timeout`]; its wait loop observes
    /// `now() >= deadline` and reports the timeout.
    pub fn tick(&self) {
        let now = self.counter.fetch_add(1, Ordering::Relaxed).wrapping_add(1);

        critical_section(|_cs| {
            let slot = (now as usize) % CFG_TICK_WHEEL_SIZE;
            let wheel = unsafe { &mut *self.wheel.get() };

            let mut current = wheel[slot];
            while let Some(tcb_ptr) = current {
                let tcb = unsafe { &mut *tcb_ptr.as_ptr() };
                let next = tcb.tick_next_ptr;

                // Entries land in their slot once per wheel rotation;
                // only expire those whose deadline has been reached.
                if (now.wrapping_sub(tcb.tick_expiry) as i32) >= 0 {
                    unsafe { self.wheel_remove(tcb_ptr) };

                    match tcb.task_state {
                        OsTaskState::Delayed => {
                            tcb.task_state = OsTaskState::Ready;
                            unsafe { sched::os_rdy_list_insert(tcb_ptr) };
                        }
                        OsTaskState::PendTimeout => {
                            unsafe { WaitList::unlink(tcb_ptr) };
                            tcb.pend_on = OsPendOn::Nothing;
                            tcb.wait_obj = core::ptr::null();
                            tcb.pend_status = OsPendStatus::Timeout;
                            tcb.task_state = OsTaskState::Ready;
                            unsafe { sched::os_rdy_list_insert(tcb_ptr) };
                        }
                        _ => {}
                    }
                }

                current = next;
            }
        });
    }
}

impl Default for TickClock {
    fn default() -> Self {
        Self::new()
    }
}

/// The system clock, advanced from the SysTick interrupt
pub static SYSCLOCK: TickClock = TickClock::new();

/// Get the system clock tick count
#[inline]
pub fn os_time_get() -> OsTick {
    SYSCLOCK.now()
}

/// Delay the calling task for a number of system ticks
///
/// The task leaves the ready list and is parked on the system clock's
/// wheel until the expiry tick.
pub fn os_time_dly(ticks: OsTick) -> OsResult<()> {
    if !kernel::KERNEL.is_running() {
        return Err(OsError::NotPermitted);
    }

    if is_isr_context() {
        return Err(OsError::NotPermitted);
    }

    if kernel::KERNEL.sched_lock_nesting() > 0 {
        return Err(OsError::NotPermitted);
    }

    if ticks == 0 {
        return Ok(());
    }

    critical_section(|_cs| {
        unsafe {
            if let Some(cur_tcb) = kernel::tcb_cur_ptr() {
                let tcb = &mut *cur_tcb.as_ptr();

                tcb.task_state = OsTaskState::Delayed;

                let expiry = SYSCLOCK.now().wrapping_add(ticks);
                SYSCLOCK.wheel_insert(cur_tcb, expiry);

                sched::os_rdy_list_remove(cur_tcb);
            }
        }
    });

    sched::os_sched();

    Ok(())
}

/// System tick handler
pub fn os_tick_handler() {
    if !kernel::KERNEL.is_running() {
        return;
    }

    kernel::os_int_enter();

    SYSCLOCK.tick();

    kernel::os_int_exit();
}

/// SysTick interrupt handler
#[cfg(target_arch = "arm")]
#[no_mangle]
pub extern "C" fn SysTick() {
    os_tick_handler();
}
