//! Counting semaphore
//!
//! Semaphores synchronise tasks and count shared resources. Waiters queue
//! in priority order (FIFO among equals) on the same wait-list machinery
//! as the mutex; a post hands the permit straight to the most urgent
//! waiter instead of bumping the counter.

use crate::critical::{is_isr_context, CriticalSection};
use crate::error::{OsError, OsResult};
use crate::kernel;
use crate::sched::{self, SchedCriticalSection};
use crate::sync::wait_list::WaitList;
use crate::time::{TickClock, SYSCLOCK};
use crate::types::{OsObjType, OsPendOn, OsPendStatus, OsSemCtr, OsTaskState, OsTick};

/// Counting semaphore
pub struct OsSem {
    /// Object type marker
    obj_type: OsObjType,
    /// Tasks waiting on this semaphore
    wait_list: WaitList,
    /// Current count
    count: OsSemCtr,
    /// Clock used for timed pends
    clock: &'static TickClock,
    /// Name for diagnostics
    name: &'static str,
}

impl OsSem {
    /// Create a new semaphore with an initial count
    pub const fn new(count: OsSemCtr) -> Self {
        OsSem {
            obj_type: OsObjType::None,
            wait_list: WaitList::new(),
            count,
            clock: &SYSCLOCK,
            name: "",
        }
    }

    /// Initialize the semaphore
    pub fn create(&mut self, count: OsSemCtr, name: &'static str) -> OsResult<()> {
        if is_isr_context() {
            return Err(OsError::NotPermitted);
        }

        let _cs = CriticalSection::enter();

        self.obj_type = OsObjType::Sem;
        self.wait_list.init();
        self.count = count;
        self.name = name;

        Ok(())
    }

    /// Get current semaphore count
    #[inline(always)]
    pub fn count(&self) -> OsSemCtr {
        self.count
    }

    /// Semaphore name
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Take the semaphore without blocking
    pub fn try_pend(&mut self) -> OsResult<()> {
        if is_isr_context() {
            return Err(OsError::NotPermitted);
        }

        if self.obj_type != OsObjType::Sem {
            return Err(OsError::InvalidArgument);
        }

        let _scs = SchedCriticalSection::enter();

        if self.count > 0 {
            self.count -= 1;
            Ok(())
        } else {
            Err(OsError::WouldBlock)
        }
    }

    /// Wait on the semaphore
    pub fn pend(&mut self) -> OsResult<()> {
        self.pend_common(None)
    }

    /// Wait on the semaphore, giving up after `timeout` clock ticks
    pub fn timed_pend(&mut self, timeout: OsTick) -> OsResult<()> {
        self.pend_common(Some(timeout))
    }

    fn pend_common(&mut self, timeout: Option<OsTick>) -> OsResult<()> {
        if is_isr_context() {
            return Err(OsError::NotPermitted);
        }

        if kernel::KERNEL.sched_lock_nesting() > 0 {
            return Err(OsError::NotPermitted);
        }

        if !kernel::KERNEL.is_running() {
            return Err(OsError::NotPermitted);
        }

        if self.obj_type != OsObjType::Sem {
            return Err(OsError::InvalidArgument);
        }

        let crt = unsafe { kernel::tcb_cur_ptr() }.ok_or(OsError::NotPermitted)?;

        {
            let _scs = SchedCriticalSection::enter();

            if self.count > 0 {
                self.count -= 1;
                return Ok(());
            }

            {
                let _ics = CriticalSection::enter();
                let obj = self as *mut OsSem as *const ();

                unsafe {
                    sched::os_rdy_list_remove(crt);

                    let tcb = &mut *crt.as_ptr();
                    tcb.pend_status = OsPendStatus::Ok;
                    tcb.task_state = if timeout.is_some() {
                        OsTaskState::PendTimeout
                    } else {
                        OsTaskState::Pend
                    };

                    self.wait_list.link(crt, obj, OsPendOn::Semaphore);

                    if let Some(d) = timeout {
                        let deadline = self.clock.now().wrapping_add(d);
                        self.clock.wheel_insert(crt, deadline);
                    }
                }
            }
        }

        sched::os_sched();

        {
            let _ics = CriticalSection::enter();
            unsafe {
                WaitList::unlink(crt);
                TickClock::unlink(crt);
            }
        }

        // A post hands the permit over directly, so the wake status is
        // the whole story.
        match unsafe { crt.as_ref().pend_status } {
            OsPendStatus::Ok => Ok(()),
            OsPendStatus::Timeout => Err(OsError::TimedOut),
            OsPendStatus::Interrupted => Err(OsError::Interrupted),
            OsPendStatus::Reset => Err(OsError::Interrupted),
        }
    }

    /// Signal the semaphore
    ///
    /// Wakes the most urgent waiter if there is one, handing it the
    /// permit; otherwise increments the count.
    pub fn post(&mut self) -> OsResult<OsSemCtr> {
        if self.obj_type != OsObjType::Sem {
            return Err(OsError::InvalidArgument);
        }

        let _scs = SchedCriticalSection::enter();

        if let Some(waiter) = self.wait_list.head() {
            let _ics = CriticalSection::enter();

            unsafe {
                WaitList::unlink(waiter);
                TickClock::unlink(waiter);

                let w = &mut *waiter.as_ptr();
                w.pend_on = OsPendOn::Nothing;
                w.wait_obj = core::ptr::null();
                w.pend_status = OsPendStatus::Ok;
                w.task_state = OsTaskState::Ready;

                sched::os_rdy_list_insert(waiter);
            }

            Ok(self.count)
        } else {
            if self.count == OsSemCtr::MAX {
                return Err(OsError::Again);
            }
            self.count += 1;
            Ok(self.count)
        }
    }
}

impl Default for OsSem {
    fn default() -> Self {
        Self::new(0)
    }
}

// ============ Safe Wrapper ============

use core::cell::UnsafeCell;

/// Shareable wrapper around [`OsSem`]
pub struct Semaphore {
    inner: UnsafeCell<OsSem>,
}

unsafe impl Sync for Semaphore {}
unsafe impl Send for Semaphore {}

impl Semaphore {
    pub const fn new(count: OsSemCtr) -> Self {
        Semaphore {
            inner: UnsafeCell::new(OsSem::new(count)),
        }
    }

    pub fn create(&self, count: OsSemCtr, name: &'static str) -> OsResult<()> {
        unsafe { (*self.inner.get()).create(count, name) }
    }

    pub fn wait(&self) -> OsResult<()> {
        unsafe { (*self.inner.get()).pend() }
    }

    pub fn timed_wait(&self, timeout: OsTick) -> OsResult<()> {
        unsafe { (*self.inner.get()).timed_pend(timeout) }
    }

    pub fn try_wait(&self) -> OsResult<()> {
        unsafe { (*self.inner.get()).try_pend() }
    }

    pub fn signal(&self) -> OsResult<OsSemCtr> {
        unsafe { (*self.inner.get()).post() }
    }

    #[inline]
    pub fn count(&self) -> OsSemCtr {
        unsafe { (*self.inner.get()).count() }
    }
}

impl Default for Semaphore {
    fn default() -> Self {
        Self::new(0)
    }
}
