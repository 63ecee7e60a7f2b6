//! Logging macros gated on a module-level `ENABLE_LOGS` flag.
//!
//! Modules that log on every call (storage reads, insight requests) define
//! `const ENABLE_LOGS: bool` and use these instead of the bare `log` macros,
//! so a noisy module can be silenced in one place:
//!
//! ```ignore
//! const ENABLE_LOGS: bool = true;
//!
//! use crate::{log_info, log_warn, log_error};
//!
//! log_info!("Restored {} entries", 3);
//! ```

/// Conditional `log::info!`.
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::info!($($arg)*);
        }
    };
}

/// Conditional `log::warn!`.
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::warn!($($arg)*);
        }
    };
}

/// Conditional `log::error!`.
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::error!($($arg)*);
        }
    };
}
