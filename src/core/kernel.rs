//! Global kernel state and initialization
//!
//! This module manages the global OS state including initialization,
//! starting the scheduler, the scheduler lock and interrupt nesting.

use core::ptr::NonNull;
use core::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use crate::config::{CFG_PRIO_IDLE, CFG_PRIO_MAX};
use crate::core::cs_cell::CsCell;
use crate::critical::{critical_section, CriticalSection};
use crate::error::{OsError, OsResult};
use crate::prio::PrioTable;
use crate::sched::ReadyList;
use crate::task::OsTcb;
use crate::types::{OsNestingCtr, OsPrio};

// ============ Kernel State Structures ============

/// Atomic kernel flags
pub struct KernelFlags {
    initialized: AtomicBool,
    running: AtomicBool,
    int_nesting: AtomicU8,
    sched_lock_nesting: AtomicU8,
}

impl KernelFlags {
    const fn new() -> Self {
        Self {
            initialized: AtomicBool::new(false),
            running: AtomicBool::new(false),
            int_nesting: AtomicU8::new(0),
            sched_lock_nesting: AtomicU8::new(0),
        }
    }

    pub(crate) fn reset(&self) {
        self.initialized.store(false, Ordering::SeqCst);
        self.running.store(false, Ordering::SeqCst);
        self.int_nesting.store(0, Ordering::SeqCst);
        self.sched_lock_nesting.store(0, Ordering::SeqCst);
    }

    /// Check if the OS is running
    #[inline(always)]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Check if the OS is initialized
    #[inline(always)]
    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::Acquire)
    }

    /// Get interrupt nesting level
    #[inline(always)]
    pub fn int_nesting(&self) -> OsNestingCtr {
        self.int_nesting.load(Ordering::Relaxed)
    }

    /// Get scheduler lock nesting level
    #[inline(always)]
    pub fn sched_lock_nesting(&self) -> OsNestingCtr {
        self.sched_lock_nesting.load(Ordering::SeqCst)
    }

    /// Enter ISR
    #[inline(always)]
    pub(crate) fn int_enter(&self) {
        if self.is_running() {
            let nesting = self.int_nesting.load(Ordering::Relaxed);
            if nesting < OsNestingCtr::MAX {
                self.int_nesting.store(nesting + 1, Ordering::Relaxed);
            }
        }
    }

    /// Decrement interrupt nesting
    #[inline(always)]
    pub(crate) fn int_nesting_dec(&self) -> OsNestingCtr {
        let nesting = self.int_nesting.load(Ordering::Relaxed);
        if nesting > 0 {
            self.int_nesting.store(nesting - 1, Ordering::Relaxed);
        }
        nesting.saturating_sub(1)
    }

    /// Set initialized flag
    #[inline(always)]
    pub(crate) fn set_initialized(&self, val: bool) {
        self.initialized.store(val, Ordering::SeqCst);
    }

    /// Set running flag
    #[inline(always)]
    pub(crate) fn set_running(&self, val: bool) {
        self.running.store(val, Ordering::SeqCst);
    }

    /// Bump the scheduler lock, used by the critical-section guards
    #[inline(always)]
    pub(crate) fn sched_lock_nest(&self) -> OsNestingCtr {
        let prev = self.sched_lock_nesting.fetch_add(1, Ordering::SeqCst);
        debug_assert!(prev < OsNestingCtr::MAX);
        prev + 1
    }

    /// Drop one scheduler lock level, returns the remaining nesting
    #[inline(always)]
    pub(crate) fn sched_unlock_nest(&self) -> OsNestingCtr {
        let prev = self.sched_lock_nesting.fetch_sub(1, Ordering::SeqCst);
        debug_assert!(prev > 0);
        prev - 1
    }

    /// Lock the scheduler, failing on nesting overflow
    pub(crate) fn try_sched_lock(&self) -> OsResult<()> {
        let nesting = self.sched_lock_nesting.load(Ordering::SeqCst);
        if nesting == OsNestingCtr::MAX {
            return Err(OsError::Again);
        }
        self.sched_lock_nesting.store(nesting + 1, Ordering::SeqCst);
        Ok(())
    }

    /// Unlock the scheduler, failing when it is not locked
    pub(crate) fn try_sched_unlock(&self) -> OsResult<OsNestingCtr> {
        let nesting = self.sched_lock_nesting.load(Ordering::SeqCst);
        if nesting == 0 {
            return Err(OsError::NotPermitted);
        }
        self.sched_lock_nesting.store(nesting - 1, Ordering::SeqCst);
        Ok(nesting - 1)
    }
}

// ============ Global Instances ============

/// Global kernel state instance
pub(crate) static KERNEL: KernelFlags = KernelFlags::new();

/// Scheduler state
pub struct SchedState {
    pub(crate) prio_tbl: PrioTable,
    pub(crate) rdy_list: [ReadyList; CFG_PRIO_MAX],
}

impl SchedState {
    const fn new() -> Self {
        Self {
            prio_tbl: PrioTable::new(),
            rdy_list: [ReadyList::new(); CFG_PRIO_MAX],
        }
    }

    pub(crate) fn reset(&mut self) {
        self.prio_tbl = PrioTable::new();
        self.rdy_list = [ReadyList::new(); CFG_PRIO_MAX];
    }
}

/// Global scheduler state instance
pub(crate) static SCHED: CsCell<SchedState> = CsCell::new(SchedState::new());

/// IDLE task TCB
static mut IDLE_TCB: OsTcb = OsTcb::new();

/// IDLE task stack
static mut IDLE_STK: [crate::types::OsStkElement; 128] = [0; 128];

// ============ CPU/Context Switch State ============

/// CPU context switch state
#[repr(C)]
pub struct CpuState {
    /// Current running task's TCB pointer
    pub tcb_cur: *mut OsTcb,
    /// Highest priority ready task's TCB pointer
    pub tcb_high_rdy: *mut OsTcb,
    /// Current running task's priority
    pub prio_cur: OsPrio,
    /// Highest ready priority
    pub prio_high_rdy: OsPrio,
}

impl CpuState {
    pub const fn new() -> Self {
        Self {
            tcb_cur: core::ptr::null_mut(),
            tcb_high_rdy: core::ptr::null_mut(),
            prio_cur: 0,
            prio_high_rdy: 0,
        }
    }

    pub fn reset(&mut self) {
        self.tcb_cur = core::ptr::null_mut();
        self.tcb_high_rdy = core::ptr::null_mut();
        self.prio_cur = 0;
        self.prio_high_rdy = 0;
    }
}

/// Global CPU state instance
#[no_mangle]
#[used]
pub static mut CPU_STATE: CpuState = CpuState::new();

// ============ Initialization ============

/// Internal IDLE task function
fn os_idle_task(_: *mut ()) -> ! {
    loop {
        #[cfg(target_arch = "arm")]
        cortex_m::asm::wfi();
        #[cfg(not(target_arch = "arm"))]
        core::hint::spin_loop();
    }
}

/// Reset global kernel state
#[allow(static_mut_refs)]
unsafe fn os_reset_globals() {
    KERNEL.reset();

    unsafe {
        CPU_STATE.reset();
        SCHED.get_unchecked().reset();
    }

    crate::time::SYSCLOCK.reset();
}

// ============ Public API ============

/// Initialize the RTOS kernel
///
/// This must be called before any other OS function. It initializes the
/// priority table, ready lists and internal state, and creates the IDLE
/// task.
#[allow(static_mut_refs)]
pub fn os_init() -> OsResult<()> {
    unsafe {
        os_reset_globals();
    }

    critical_section(|cs| {
        let sched = SCHED.get(cs);

        sched.prio_tbl.init();
        for list in sched.rdy_list.iter_mut() {
            list.init();
        }

        unsafe {
            crate::task::os_task_create_internal(
                &raw mut IDLE_TCB,
                "Idle",
                os_idle_task,
                core::ptr::null_mut(),
                CFG_PRIO_IDLE,
                IDLE_STK.as_mut_ptr(),
                IDLE_STK.len(),
            )
            .expect("IDLE task creation failed");
        }

        KERNEL.set_initialized(true);
    });

    Ok(())
}

/// Start multitasking
///
/// Starts the highest priority ready task. Under normal operation this
/// function never returns.
pub fn os_start() -> OsResult<()> {
    if !KERNEL.is_initialized() {
        return Err(OsError::NotPermitted);
    }

    if KERNEL.is_running() {
        return Err(OsError::NotPermitted);
    }

    critical_section(|cs| {
        let sched = SCHED.get(cs);

        let high_prio = sched.prio_tbl.get_highest();

        unsafe {
            CPU_STATE.prio_high_rdy = high_prio;
            CPU_STATE.prio_cur = high_prio;

            if let Some(head) = sched.rdy_list[high_prio as usize].head() {
                CPU_STATE.tcb_high_rdy = head.as_ptr();
                CPU_STATE.tcb_cur = head.as_ptr();
            } else {
                return;
            }
        }

        KERNEL.set_running(true);
    });

    crate::port::os_cpu_systick_init(16_000_000 / crate::config::CFG_TICK_RATE_HZ);

    unsafe {
        CPU_STATE.tcb_cur = CPU_STATE.tcb_high_rdy;
        crate::port::os_start_high_rdy();
    }

    Ok(())
}

/// Enter ISR
///
/// Must be called on entry of every interrupt handler that may interact
/// with the kernel, paired with [`os_int_exit`].
pub fn os_int_enter() {
    KERNEL.int_enter();
}

/// Exit ISR
///
/// At the outermost interrupt level this performs the interrupt-level
/// context switch when a more urgent task became ready.
pub fn os_int_exit() {
    if !KERNEL.is_running() {
        return;
    }

    let _cs = CriticalSection::enter();

    if KERNEL.int_nesting() == 0 {
        return;
    }

    let new_nesting = KERNEL.int_nesting_dec();

    if new_nesting == 0 && KERNEL.sched_lock_nesting() == 0 {
        let high_prio = unsafe { SCHED.get_unchecked().prio_tbl.get_highest() };

        unsafe {
            if high_prio > CPU_STATE.prio_cur {
                CPU_STATE.prio_high_rdy = high_prio;

                if let Some(head) = SCHED.get_unchecked().rdy_list[high_prio as usize].head() {
                    CPU_STATE.tcb_high_rdy = head.as_ptr();
                    crate::port::os_int_ctx_sw();
                }
            }
        }
    }
}

/// Lock the scheduler
pub fn os_sched_lock() -> OsResult<()> {
    if !KERNEL.is_running() {
        return Err(OsError::NotPermitted);
    }

    if crate::critical::is_isr_context() {
        return Err(OsError::NotPermitted);
    }

    critical_section(|_cs| KERNEL.try_sched_lock())
}

/// Unlock the scheduler
pub fn os_sched_unlock() -> OsResult<()> {
    if !KERNEL.is_running() {
        return Err(OsError::NotPermitted);
    }

    if crate::critical::is_isr_context() {
        return Err(OsError::NotPermitted);
    }

    critical_section(|_cs| {
        let remaining = KERNEL.try_sched_unlock()?;
        if remaining == 0 {
            crate::sched::os_sched();
        }
        Ok(())
    })
}

// ============ Internal accessors for other modules ============

/// Get mutable reference to the priority table
#[inline(always)]
pub(crate) unsafe fn prio_table() -> &'static mut PrioTable {
    unsafe { &mut SCHED.get_unchecked().prio_tbl }
}

/// Get reference to the ready list for a priority
#[inline(always)]
pub(crate) unsafe fn rdy_list(prio: OsPrio) -> &'static mut ReadyList {
    unsafe { &mut SCHED.get_unchecked().rdy_list[prio as usize] }
}

/// Get current TCB pointer
#[inline]
#[allow(static_mut_refs)]
pub(crate) unsafe fn tcb_cur_ptr() -> Option<NonNull<OsTcb>> {
    unsafe { NonNull::new(CPU_STATE.tcb_cur) }
}

/// Set current TCB pointer
#[inline]
#[allow(static_mut_refs)]
pub(crate) unsafe fn set_tcb_cur_ptr(tcb: Option<NonNull<OsTcb>>) {
    unsafe { CPU_STATE.tcb_cur = tcb.map_or(core::ptr::null_mut(), |p| p.as_ptr()) }
}

/// Set high ready TCB pointer
#[inline]
#[allow(static_mut_refs)]
pub(crate) unsafe fn set_tcb_high_rdy_ptr(tcb: Option<NonNull<OsTcb>>) {
    unsafe { CPU_STATE.tcb_high_rdy = tcb.map_or(core::ptr::null_mut(), |p| p.as_ptr()) }
}

/// Set current priority
#[inline]
#[allow(static_mut_refs)]
pub(crate) unsafe fn set_prio_cur(prio: OsPrio) {
    unsafe { CPU_STATE.prio_cur = prio }
}

/// Set high ready priority
#[inline]
#[allow(static_mut_refs)]
pub(crate) unsafe fn set_prio_high_rdy(prio: OsPrio) {
    unsafe { CPU_STATE.prio_high_rdy = prio }
}
