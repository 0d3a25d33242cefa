//! Compile-time configuration for the kernel
//!
//! These constants control the behavior and resource limits of the RTOS.

/// Maximum number of priority levels
///
/// Valid task priorities are `0..CFG_PRIO_MAX`, with numerically larger
/// values being more urgent.
pub const CFG_PRIO_MAX: usize = 64;

/// System tick rate in Hz
pub const CFG_TICK_RATE_HZ: u32 = 1000;

/// Minimum task stack size
pub const CFG_STK_SIZE_MIN: usize = 64;

/// Number of entries in a clock's timeout wheel
pub const CFG_TICK_WHEEL_SIZE: usize = 16;

/// Idle task priority (lowest)
pub const CFG_PRIO_IDLE: u8 = 0;
