//! POSIX-inspired mutex
//!
//! A mutex serialises access of multiple tasks to shared data. The
//! behavior of lock and unlock calls is selected per mutex through
//! [`MutexAttr`]: the type (normal, error-checking, recursive), the
//! priority protocol (none, inheritance, ceiling protection) and the
//! robustness. Lock requests block in priority order with FIFO ordering
//! among equals; the waiting task itself is the intrusive wait node, so
//! blocking allocates nothing.
//!
//! Priority protocols:
//! - `inherit`: while a more urgent task waits, the owner executes at the
//!   waiter's priority. The boost propagates along the blocked-on chain
//!   when the owner itself waits on another inheritance mutex.
//! - `protect`: while the mutex is held, the owner executes at least at
//!   the mutex's priority ceiling. Requests from above the ceiling fail
//!   with [`OsError::InvalidArgument`].
//!
//! Robust mutexes are accepted at the attribute level but rejected at
//! creation with [`OsError::NotSupported`]. Since no robust mutex can
//! exist, only the surface of that feature remains: `consistent()`
//! reports `InvalidArgument` on every mutex that can be created, and the
//! consistency/recoverability introspection always reads true.

use core::ptr::NonNull;

use crate::config::CFG_PRIO_MAX;
use crate::critical::{is_isr_context, CriticalSection};
use crate::error::{OsError, OsResult};
use crate::kernel;
use crate::sched::{self, SchedCriticalSection, UncriticalSection};
use crate::sync::wait_list::WaitList;
use crate::task::{self, OsTcb};
use crate::time::{TickClock, SYSCLOCK};
use crate::types::{OsMutexCtr, OsObjType, OsPendOn, OsPendStatus, OsPrio, OsTaskState, OsTick};

/// Mutex type, selects relock and foreign-unlock behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutexType {
    /// No relock detection: relocking deadlocks the caller
    Normal,
    /// Relock and foreign unlock return errors
    ErrorCheck,
    /// Relock increments a count up to `max_count`
    Recursive,
    /// Implementation-chosen mapping; resolves to [`MutexType::Normal`]
    Default,
}

impl MutexType {
    fn resolve(self) -> Self {
        match self {
            MutexType::Default => MutexType::Normal,
            other => other,
        }
    }
}

/// Priority protocol applied while the mutex is held
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    /// Ownership does not affect the owner's priority
    None,
    /// Owner inherits the priority of its most urgent waiter
    Inherit,
    /// Owner runs at least at the mutex's priority ceiling
    Protect,
}

/// Behavior when the owner terminates while holding the mutex
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Robustness {
    /// Owner death stalls the mutex; waiters block forever
    Stalled,
    /// Owner death is reported to the next acquirer via `OwnerDead`
    Robust,
}

/// Mutex attributes, frozen into the mutex at [`OsMutex::create`]
///
/// The member variables are public and may be adjusted freely before
/// creation; later changes to the attribute object do not affect mutexes
/// already created from it.
#[derive(Clone, Copy)]
pub struct MutexAttr {
    /// Mutex type
    pub mx_type: MutexType,
    /// Priority protocol
    pub protocol: Protocol,
    /// Robustness
    pub robustness: Robustness,
    /// Priority ceiling, used when `protocol` is [`Protocol::Protect`]
    pub prio_ceiling: OsPrio,
    /// Recursion limit for recursive mutexes
    pub max_count: OsMutexCtr,
    /// Clock used for timed locks
    pub clock: &'static TickClock,
    /// Human-readable label
    pub name: &'static str,
}

impl MutexAttr {
    /// Attributes of a plain normal mutex
    pub const fn new() -> Self {
        MutexAttr {
            mx_type: MutexType::Normal,
            protocol: Protocol::None,
            robustness: Robustness::Stalled,
            prio_ceiling: (CFG_PRIO_MAX - 1) as OsPrio,
            max_count: 1,
            clock: &SYSCLOCK,
            name: "",
        }
    }

    /// Attributes of a recursive mutex with the given recursion limit
    pub const fn recursive(max_count: OsMutexCtr) -> Self {
        MutexAttr {
            mx_type: MutexType::Recursive,
            max_count,
            ..Self::new()
        }
    }
}

impl Default for MutexAttr {
    fn default() -> Self {
        Self::new()
    }
}

/// Mutex with POSIX-inspired semantics
pub struct OsMutex {
    /// Object type marker
    obj_type: OsObjType,
    /// Resolved mutex type
    mx_type: MutexType,
    /// Priority protocol
    protocol: Protocol,
    /// Robustness
    robustness: Robustness,
    /// Priority ceiling
    prio_ceiling: OsPrio,
    /// Recursion limit (1 unless recursive)
    max_count: OsMutexCtr,
    /// Clock for timed locks
    clock: &'static TickClock,
    /// Name for diagnostics
    name: &'static str,
    /// Tasks blocked on this mutex
    wait_list: WaitList,
    /// Task that owns the mutex
    owner: Option<NonNull<OsTcb>>,
    /// Recursion depth, 0 iff unowned
    count: OsMutexCtr,
    /// Owner's priority at acquisition, restored on release
    owner_prio: OsPrio,
    /// Priority the owner is currently boosted to
    boosted_prio: Option<OsPrio>,
    /// Robust-mutex bookkeeping, constant true while robust creation is
    /// rejected
    consistent: bool,
    /// Robust-mutex bookkeeping, constant true while robust creation is
    /// rejected
    recoverable: bool,
}

impl OsMutex {
    /// Create a new mutex in the uncreated state
    pub const fn new() -> Self {
        OsMutex {
            obj_type: OsObjType::None,
            mx_type: MutexType::Normal,
            protocol: Protocol::None,
            robustness: Robustness::Stalled,
            prio_ceiling: (CFG_PRIO_MAX - 1) as OsPrio,
            max_count: 1,
            clock: &SYSCLOCK,
            name: "",
            wait_list: WaitList::new(),
            owner: None,
            count: 0,
            owner_prio: 0,
            boosted_prio: None,
            consistent: true,
            recoverable: true,
        }
    }

    /// Initialize the mutex from attributes
    ///
    /// The attributes are captured by value; mutating the source
    /// afterwards does not affect this mutex.
    pub fn create(&mut self, attr: &MutexAttr) -> OsResult<()> {
        if is_isr_context() {
            return Err(OsError::NotPermitted);
        }

        if attr.robustness == Robustness::Robust {
            // Robust mutexes are not yet supported.
            return Err(OsError::NotSupported);
        }

        if attr.prio_ceiling as usize >= CFG_PRIO_MAX {
            return Err(OsError::InvalidArgument);
        }

        if attr.mx_type == MutexType::Recursive && attr.max_count == 0 {
            return Err(OsError::InvalidArgument);
        }

        let _cs = CriticalSection::enter();

        self.obj_type = OsObjType::Mutex;
        self.mx_type = attr.mx_type.resolve();
        self.protocol = attr.protocol;
        self.robustness = attr.robustness;
        self.prio_ceiling = attr.prio_ceiling;
        self.max_count = if attr.mx_type == MutexType::Recursive {
            attr.max_count
        } else {
            1
        };
        self.clock = attr.clock;
        self.name = attr.name;
        self.wait_list.init();
        self.owner = None;
        self.count = 0;
        self.owner_prio = 0;
        self.boosted_prio = None;
        self.consistent = true;
        self.recoverable = true;

        Ok(())
    }

    // ============ Introspection ============

    /// Check if the mutex is owned
    #[inline]
    pub fn is_owned(&self) -> bool {
        self.owner.is_some()
    }

    /// Current priority of the owner, if any
    pub fn owner_prio(&self) -> Option<OsPrio> {
        self.owner.map(|ptr| unsafe { ptr.as_ref().prio })
    }

    /// Current recursion depth
    #[inline]
    pub fn count(&self) -> OsMutexCtr {
        self.count
    }

    /// Check if any task is blocked on the mutex
    #[inline]
    pub fn has_waiters(&self) -> bool {
        !self.wait_list.is_empty()
    }

    /// Current priority ceiling
    #[inline]
    pub fn prio_ceiling(&self) -> OsPrio {
        self.prio_ceiling
    }

    /// Check if the protected state is marked consistent
    #[inline]
    pub fn is_consistent(&self) -> bool {
        self.consistent
    }

    /// Check if the mutex is still usable
    #[inline]
    pub fn is_recoverable(&self) -> bool {
        self.recoverable
    }

    /// Mutex name
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    // ============ Acquisition ============

    /// Single non-blocking acquisition attempt
    ///
    /// Must run inside a scheduler critical section. Applies the priority
    /// protocol: the protect ceiling boost on acquisition, the
    /// inheritance boost of the owner on contention. Returns
    /// `WouldBlock` when the caller has to wait.
    fn _try_lock(&mut self, crt: NonNull<OsTcb>, adhere_protocol: bool) -> OsResult<()> {
        let crt_ref = unsafe { &mut *crt.as_ptr() };

        // First lock.
        if self.owner.is_none() {
            self.owner = Some(crt);
            self.count = 1;
            crt_ref.acquired_mutexes += 1;

            match self.protocol {
                Protocol::None => {}
                Protocol::Inherit => {
                    // Save owner priority for the restore on release.
                    self.owner_prio = crt_ref.prio;
                }
                Protocol::Protect => {
                    if adhere_protocol && crt_ref.prio > self.prio_ceiling {
                        // Over-ceiling request: back the acquisition out.
                        crt_ref.acquired_mutexes -= 1;
                        self.owner = None;
                        self.count = 0;
                        return Err(OsError::InvalidArgument);
                    }

                    self.owner_prio = crt_ref.prio;
                    if adhere_protocol && self.prio_ceiling > crt_ref.prio {
                        self.boosted_prio = Some(self.prio_ceiling);

                        let _ucs = UncriticalSection::enter();
                        unsafe { task::os_task_set_prio(crt, self.prio_ceiling) };
                    }
                }
            }

            crate::klog!(trace, "mutex {} locked", self.name);

            return Ok(());
        }

        // Relock by the owner.
        if self.owner == Some(crt) {
            return match self.mx_type {
                MutexType::Recursive => {
                    if self.count >= self.max_count {
                        return Err(OsError::Again);
                    }
                    self.count += 1;
                    Ok(())
                }
                MutexType::ErrorCheck => Err(OsError::Deadlock),
                // A normal mutex blocks on itself: the caller's lock
                // loop realises the deadlock.
                _ => Err(OsError::WouldBlock),
            };
        }

        // Owned by another task.
        if let Some(owner) = self.owner {
            if self.protocol == Protocol::Inherit {
                let prio = crt_ref.prio;
                if prio > unsafe { owner.as_ref().prio } {
                    self.boosted_prio = Some(prio);

                    let this: *mut OsMutex = self;
                    let _ucs = UncriticalSection::enter();
                    unsafe { Self::boost_chain(this, owner, prio, crt) };
                }
            }
        }

        Err(OsError::WouldBlock)
    }

    /// Propagate an inheritance boost along the blocked-on chain
    ///
    /// Raises `owner` to `prio`; if that owner is itself pending on
    /// another inheritance mutex, the boost continues to that mutex's
    /// owner. The walk stops at an unblocked task, at a less urgent
    /// boost, or when it bites its own tail (a deadlock cycle).
    ///
    /// # Safety
    /// Must run inside a scheduler critical section; every TCB and mutex
    /// reachable through the chain must be valid.
    unsafe fn boost_chain(
        this: *mut OsMutex,
        owner: NonNull<OsTcb>,
        prio: OsPrio,
        requester: NonNull<OsTcb>,
    ) {
        let mut cur = owner;

        loop {
            unsafe { task::os_task_set_prio(cur, prio) };

            let cur_ref = unsafe { cur.as_ref() };
            if cur_ref.pend_on != OsPendOn::Mutex {
                break;
            }

            let next_mx = cur_ref.wait_obj as *mut OsMutex;
            if next_mx.is_null() || core::ptr::eq(next_mx, this) {
                break;
            }

            let next_mx = unsafe { &mut *next_mx };
            if next_mx.protocol != Protocol::Inherit {
                break;
            }

            let next_owner = match next_mx.owner {
                Some(ptr) => ptr,
                None => break,
            };

            if next_owner == requester {
                // The chain closed on the requester: a deadlock cycle.
                crate::klog!(error, "mutex {} deadlock cycle detected", next_mx.name);
                break;
            }

            if prio <= unsafe { next_owner.as_ref().prio } {
                break;
            }

            next_mx.boosted_prio = Some(prio);
            cur = next_owner;
        }
    }

    /// Try to lock the mutex without blocking
    ///
    /// Like [`OsMutex::lock`] except that the call returns immediately
    /// with `WouldBlock` when the mutex is held by another task.
    pub fn try_lock(&mut self) -> OsResult<()> {
        if is_isr_context() {
            return Err(OsError::NotPermitted);
        }

        if self.obj_type != OsObjType::Mutex {
            return Err(OsError::InvalidArgument);
        }

        let crt = unsafe { kernel::tcb_cur_ptr() }.ok_or(OsError::NotPermitted)?;

        let _scs = SchedCriticalSection::enter();
        self._try_lock(crt, true)
    }

    /// Lock the mutex, blocking until it is available
    ///
    /// If the mutex is free it is locked immediately; otherwise the
    /// calling task waits in priority order until the owner releases it.
    /// A task relocking a normal mutex deadlocks itself; an error-checking
    /// mutex reports `Deadlock`; a recursive mutex counts up to its
    /// recursion limit.
    pub fn lock(&mut self) -> OsResult<()> {
        self.lock_common(None, true)
    }

    /// Lock the mutex, giving up after `timeout` clock ticks
    ///
    /// The deadline is `clock.now() + timeout` on the clock captured at
    /// creation; the wait expires once the clock reaches it. The timeout
    /// is never reported when the mutex can be locked immediately.
    pub fn timed_lock(&mut self, timeout: OsTick) -> OsResult<()> {
        self.lock_common(Some(timeout), true)
    }

    fn lock_common(&mut self, timeout: Option<OsTick>, adhere_protocol: bool) -> OsResult<()> {
        if is_isr_context() {
            return Err(OsError::NotPermitted);
        }

        if kernel::KERNEL.sched_lock_nesting() > 0 {
            return Err(OsError::NotPermitted);
        }

        if !kernel::KERNEL.is_running() {
            return Err(OsError::NotPermitted);
        }

        if self.obj_type != OsObjType::Mutex {
            return Err(OsError::InvalidArgument);
        }

        let crt = unsafe { kernel::tcb_cur_ptr() }.ok_or(OsError::NotPermitted)?;

        // Fast path before paying for the wait loop.
        {
            let _scs = SchedCriticalSection::enter();
            match self._try_lock(crt, adhere_protocol) {
                Err(OsError::WouldBlock) => {}
                res => return res,
            }
        }

        let deadline = timeout.map(|d| self.clock.now().wrapping_add(d));

        loop {
            {
                let _scs = SchedCriticalSection::enter();

                match self._try_lock(crt, adhere_protocol) {
                    Err(OsError::WouldBlock) => {}
                    res => return res,
                }

                {
                    // The wait-list links are shared with the tick
                    // interrupt, so the surgery needs interrupts masked.
                    let _ics = CriticalSection::enter();
                    let obj = self as *mut OsMutex as *const ();

                    unsafe {
                        sched::os_rdy_list_remove(crt);

                        let tcb = &mut *crt.as_ptr();
                        tcb.pend_status = OsPendStatus::Ok;
                        tcb.task_state = if deadline.is_some() {
                            OsTaskState::PendTimeout
                        } else {
                            OsTaskState::Pend
                        };

                        self.wait_list.link(crt, obj, OsPendOn::Mutex);

                        if let Some(dl) = deadline {
                            self.clock.wheel_insert(crt, dl);
                        }
                    }
                }
                // Closing the scheduler critical section suspends us.
            }

            sched::os_sched();

            // Detach from the wait list and the clock; whoever woke us
            // may have done either already.
            {
                let _ics = CriticalSection::enter();
                unsafe {
                    WaitList::unlink(crt);
                    TickClock::unlink(crt);
                }
            }

            if unsafe { crt.as_ref().interrupted } {
                crate::klog!(trace, "mutex {} wait interrupted", self.name);
                self.on_waiter_departed();
                return Err(OsError::Interrupted);
            }

            if let Some(dl) = deadline {
                if (self.clock.now().wrapping_sub(dl) as i32) >= 0 {
                    crate::klog!(trace, "mutex {} wait timed out", self.name);
                    self.on_waiter_departed();
                    return Err(OsError::TimedOut);
                }
            }
        }
    }

    /// Re-evaluate the inheritance boost after a waiter gave up
    ///
    /// Called on the timeout and interruption paths, after the departing
    /// task detached itself. With the most urgent remaining waiter at
    /// priority `M`, the owner keeps a boost only while `M` is above its
    /// saved acquisition priority; otherwise the boost is dropped.
    fn on_waiter_departed(&mut self) {
        if self.protocol != Protocol::Inherit {
            return;
        }

        let _scs = SchedCriticalSection::enter();

        let (boost, owner) = match (self.boosted_prio, self.owner) {
            (Some(b), Some(o)) => (b, o),
            _ => return,
        };

        match self.wait_list.highest_prio() {
            Some(max) if max > self.owner_prio => {
                if max != boost {
                    self.boosted_prio = Some(max);
                    let _ucs = UncriticalSection::enter();
                    unsafe { task::os_task_set_prio(owner, max) };
                }
            }
            _ => {
                self.boosted_prio = None;
                let restore = self.owner_prio;
                let _ucs = UncriticalSection::enter();
                unsafe { task::os_task_set_prio(owner, restore) };
            }
        }
    }

    // ============ Release ============

    /// Unlock the mutex
    ///
    /// For recursive mutexes the mutex becomes available once the count
    /// returns to zero. On the final unlock a boosted priority is
    /// restored and the most urgent, earliest-linked waiter is made
    /// ready; it re-races for the mutex in its own lock loop rather than
    /// receiving ownership directly.
    pub fn unlock(&mut self) -> OsResult<()> {
        if is_isr_context() {
            return Err(OsError::NotPermitted);
        }

        if self.obj_type != OsObjType::Mutex {
            return Err(OsError::InvalidArgument);
        }

        let crt = unsafe { kernel::tcb_cur_ptr() }.ok_or(OsError::NotPermitted)?;

        let _scs = SchedCriticalSection::enter();

        if self.owner == Some(crt) {
            if self.mx_type == MutexType::Recursive && self.count > 1 {
                self.count -= 1;
                return Ok(());
            }

            if self.boosted_prio.is_some() {
                // Takes effect when the critical section closes.
                let restore = self.owner_prio;
                unsafe { task::os_task_set_prio(crt, restore) };
                self.boosted_prio = None;
            }

            unsafe {
                if let Some(waiter) = self.wait_list.head() {
                    let _ics = CriticalSection::enter();

                    WaitList::unlink(waiter);
                    TickClock::unlink(waiter);

                    let w = &mut *waiter.as_ptr();
                    w.pend_on = OsPendOn::Nothing;
                    w.wait_obj = core::ptr::null();
                    w.pend_status = OsPendStatus::Ok;
                    w.task_state = OsTaskState::Ready;

                    sched::os_rdy_list_insert(waiter);
                }

                (*crt.as_ptr()).acquired_mutexes -= 1;
            }

            self.owner = None;
            self.count = 0;

            crate::klog!(trace, "mutex {} unlocked", self.name);

            return Ok(());
        }

        // Not the owner.
        if matches!(self.mx_type, MutexType::ErrorCheck | MutexType::Recursive) {
            return Err(OsError::NotPermitted);
        }

        // Unlocking a foreign normal mutex is undefined behaviour per
        // POSIX; report it instead of corrupting state.
        Err(OsError::NotRecoverable)
    }

    // ============ Robustness ============

    /// Mark the state protected by the mutex consistent again
    ///
    /// Part of the robust-mutex API: valid only on a robust mutex whose
    /// previous owner died while holding it. With robust creation
    /// rejected no such mutex exists, so the call reports
    /// `InvalidArgument` on every mutex that can be created.
    pub fn consistent(&mut self) -> OsResult<()> {
        if is_isr_context() {
            return Err(OsError::NotPermitted);
        }

        if self.robustness != Robustness::Robust {
            return Err(OsError::InvalidArgument);
        }

        if self.consistent {
            return Err(OsError::InvalidArgument);
        }

        let _cs = CriticalSection::enter();
        self.consistent = true;
        Ok(())
    }

    // ============ Priority ceiling ============

    /// Change the priority ceiling, returning the previous value
    ///
    /// The mutex is acquired without adhering to the protect protocol (no
    /// ceiling boost, no over-ceiling check), the ceiling is swapped and
    /// the mutex released. Fails with the same errors as
    /// [`OsMutex::lock`].
    pub fn set_prio_ceiling(&mut self, prio_ceiling: OsPrio) -> OsResult<OsPrio> {
        if is_isr_context() {
            return Err(OsError::NotPermitted);
        }

        if prio_ceiling as usize >= CFG_PRIO_MAX {
            return Err(OsError::InvalidArgument);
        }

        self.lock_common(None, false)?;

        let old = self.prio_ceiling;
        self.prio_ceiling = prio_ceiling;

        self.unlock()?;

        Ok(old)
    }

    // ============ Reset ============

    /// Return the mutex to its initial unlocked state
    ///
    /// Any boosted owner priority is restored and every waiter is woken;
    /// the wakers observe a release race and re-acquire or fail according
    /// to their own state. A chosen-but-not-yet-running waiter racing a
    /// concurrent unlock may lose that race; this is the documented
    /// behavior, not a fairness guarantee.
    pub fn reset(&mut self) -> OsResult<()> {
        if is_isr_context() {
            return Err(OsError::NotPermitted);
        }

        if self.obj_type != OsObjType::Mutex {
            return Err(OsError::InvalidArgument);
        }

        let _scs = SchedCriticalSection::enter();

        unsafe {
            if let Some(owner) = self.owner {
                if self.boosted_prio.is_some() {
                    let restore = self.owner_prio;
                    task::os_task_set_prio(owner, restore);
                }
                (*owner.as_ptr()).acquired_mutexes -= 1;
            }
        }

        self.wake_all(OsPendStatus::Reset);

        self.owner = None;
        self.count = 0;
        self.owner_prio = 0;
        self.boosted_prio = None;
        self.consistent = true;

        crate::klog!(debug, "mutex {} reset", self.name);

        Ok(())
    }

    /// Wake every waiter with the given pend status
    ///
    /// Must run inside a scheduler critical section.
    fn wake_all(&mut self, status: OsPendStatus) {
        unsafe {
            while let Some(waiter) = self.wait_list.head() {
                let _ics = CriticalSection::enter();

                WaitList::unlink(waiter);
                TickClock::unlink(waiter);

                let w = &mut *waiter.as_ptr();
                w.pend_on = OsPendOn::Nothing;
                w.wait_obj = core::ptr::null();
                w.pend_status = status;
                w.task_state = OsTaskState::Ready;

                sched::os_rdy_list_insert(waiter);
            }
        }
    }
}

impl Default for OsMutex {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for OsMutex {
    fn drop(&mut self) {
        // Destroying a locked or waited-on mutex is undefined behaviour.
        debug_assert!(self.owner.is_none());
        debug_assert!(self.wait_list.is_empty());
    }
}

// ============ Safe Wrapper ============

use core::cell::UnsafeCell;

/// Shareable wrapper around [`OsMutex`]
///
/// The inner mutex state is protected by the kernel's critical sections,
/// so handing out `&self` access is sound as long as all mutation goes
/// through the kernel API.
pub struct Mutex {
    inner: UnsafeCell<OsMutex>,
}

unsafe impl Sync for Mutex {}
unsafe impl Send for Mutex {}

impl Mutex {
    pub const fn new() -> Self {
        Mutex {
            inner: UnsafeCell::new(OsMutex::new()),
        }
    }

    pub fn create(&self, attr: &MutexAttr) -> OsResult<()> {
        unsafe { (*self.inner.get()).create(attr) }
    }

    pub fn lock(&self) -> OsResult<()> {
        unsafe { (*self.inner.get()).lock() }
    }

    pub fn try_lock(&self) -> OsResult<()> {
        unsafe { (*self.inner.get()).try_lock() }
    }

    pub fn timed_lock(&self, timeout: OsTick) -> OsResult<()> {
        unsafe { (*self.inner.get()).timed_lock(timeout) }
    }

    pub fn unlock(&self) -> OsResult<()> {
        unsafe { (*self.inner.get()).unlock() }
    }

    pub fn consistent(&self) -> OsResult<()> {
        unsafe { (*self.inner.get()).consistent() }
    }

    pub fn reset(&self) -> OsResult<()> {
        unsafe { (*self.inner.get()).reset() }
    }

    pub fn prio_ceiling(&self) -> OsPrio {
        unsafe { (*self.inner.get()).prio_ceiling() }
    }

    pub fn set_prio_ceiling(&self, prio_ceiling: OsPrio) -> OsResult<OsPrio> {
        unsafe { (*self.inner.get()).set_prio_ceiling(prio_ceiling) }
    }

    #[inline]
    pub fn is_owned(&self) -> bool {
        unsafe { (*self.inner.get()).is_owned() }
    }

    pub fn owner_prio(&self) -> Option<OsPrio> {
        unsafe { (*self.inner.get()).owner_prio() }
    }

    #[inline]
    pub fn count(&self) -> OsMutexCtr {
        unsafe { (*self.inner.get()).count() }
    }

    #[inline]
    pub fn has_waiters(&self) -> bool {
        unsafe { (*self.inner.get()).has_waiters() }
    }

    #[inline]
    pub fn is_consistent(&self) -> bool {
        unsafe { (*self.inner.get()).is_consistent() }
    }

    #[inline]
    pub fn is_recoverable(&self) -> bool {
        unsafe { (*self.inner.get()).is_recoverable() }
    }
}

impl Default for Mutex {
    fn default() -> Self {
        Self::new()
    }
}
