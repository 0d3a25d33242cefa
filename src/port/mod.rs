//! Port layer - CPU-specific implementations
//!
//! Provides the hardware abstraction for context switching and tick
//! generation. On non-ARM targets the host port stands in, which lets the
//! kernel's logic run under the host test harness with simulated context
//! switches.

#[cfg(target_arch = "arm")]
pub mod cortex_m4;

#[cfg(target_arch = "arm")]
pub use cortex_m4::*;

#[cfg(not(target_arch = "arm"))]
pub mod host;

#[cfg(not(target_arch = "arm"))]
pub use host::*;
