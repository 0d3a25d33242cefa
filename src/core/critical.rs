//! Interrupt-level critical sections
//!
//! The kernel uses two nesting levels of protection: the scheduler
//! critical section (see [`crate::sched`]) disables preemption only, while
//! the interrupt critical section here masks all maskable interrupts.
//! Waiter-list link pointers are mutated from the tick interrupt, so list
//! surgery always runs inside an interrupt critical section.

use core::sync::atomic::{AtomicU8, Ordering};

/// Interrupt-disable nesting depth
static CS_NESTING: AtomicU8 = AtomicU8::new(0);

/// RAII guard for interrupt critical sections
///
/// Entering disables interrupts; dropping the outermost guard re-enables
/// them. Guards nest.
pub struct CriticalSection {
    _private: (),
}

impl CriticalSection {
    /// Enter an interrupt critical section.
    #[inline(always)]
    pub fn enter() -> Self {
        #[cfg(target_arch = "arm")]
        cortex_m::interrupt::disable();

        CS_NESTING.fetch_add(1, Ordering::Acquire);
        CriticalSection { _private: () }
    }

    /// Check if any interrupt critical section is active
    #[inline(always)]
    pub fn is_active() -> bool {
        CS_NESTING.load(Ordering::Acquire) > 0
    }
}

impl Drop for CriticalSection {
    #[inline(always)]
    fn drop(&mut self) {
        let nesting = CS_NESTING.fetch_sub(1, Ordering::Release);

        if nesting == 1 {
            #[cfg(target_arch = "arm")]
            unsafe {
                cortex_m::interrupt::enable()
            };
        }
    }
}

/// Execute a closure with interrupts disabled
///
/// The closure receives a reference to the critical section guard,
/// which can be used to access [`crate::core::cs_cell::CsCell`] data.
#[inline]
pub fn critical_section<F, R>(f: F) -> R
where
    F: FnOnce(&CriticalSection) -> R,
{
    let cs = CriticalSection::enter();
    f(&cs)
}

/// Check if currently executing in an interrupt handler
///
/// On ARM this reads the IPSR exception number. On other targets the
/// kernel's interrupt nesting count stands in, which lets host tests
/// simulate handler mode through [`crate::kernel::os_int_enter`].
#[inline]
pub fn is_isr_context() -> bool {
    #[cfg(target_arch = "arm")]
    {
        let ipsr: u32;
        unsafe {
            core::arch::asm!(
                "mrs {}, IPSR",
                out(reg) ipsr,
                options(nomem, nostack, preserves_flags)
            );
        }
        ipsr != 0
    }

    #[cfg(not(target_arch = "arm"))]
    {
        crate::kernel::KERNEL.int_nesting() > 0
    }
}
