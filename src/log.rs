//! Kernel logging
//!
//! A single level-dispatch macro routes kernel diagnostics to defmt.
//! Without the `defmt` feature every invocation compiles to nothing, so
//! callers never pay for disabled logging.

/// Log a kernel event at the given defmt level
///
/// The first argument selects the level, the rest is a defmt format
/// invocation:
///
/// ```ignore
/// crate::klog!(trace, "mutex {} locked", name);
/// crate::klog!(error, "deadlock cycle detected");
/// ```
#[cfg(feature = "defmt")]
#[macro_export]
macro_rules! klog {
    (trace, $($arg:tt)*) => { defmt::trace!($($arg)*) };
    (debug, $($arg:tt)*) => { defmt::debug!($($arg)*) };
    (info, $($arg:tt)*) => { defmt::info!($($arg)*) };
    (warn, $($arg:tt)*) => { defmt::warn!($($arg)*) };
    (error, $($arg:tt)*) => { defmt::error!($($arg)*) };
}

/// No-op version when defmt is disabled
#[cfg(not(feature = "defmt"))]
#[macro_export]
macro_rules! klog {
    ($level:ident, $($arg:tt)*) => {};
}
