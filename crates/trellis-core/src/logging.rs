#![forbid(unsafe_code)]

//! Logging shim.
//!
//! With the `tracing` feature the level macros are `tracing`'s own. Without it
//! they expand to an empty block and their arguments are never evaluated, so
//! call sites must not rely on side effects inside log arguments.
//!
//! Downstream crates log through the crate root: `trellis_core::debug!(...)`.

#[cfg(feature = "tracing")]
pub use tracing::{debug, error, info, trace, warn};

#[cfg(not(feature = "tracing"))]
mod disabled {
    /// Discards a trace-level record.
    #[macro_export]
    macro_rules! trace {
        ($($arg:tt)*) => {{}};
    }

    /// Discards a debug-level record.
    #[macro_export]
    macro_rules! debug {
        ($($arg:tt)*) => {{}};
    }

    /// Discards an info-level record.
    #[macro_export]
    macro_rules! info {
        ($($arg:tt)*) => {{}};
    }

    /// Discards a warn-level record.
    #[macro_export]
    macro_rules! warn {
        ($($arg:tt)*) => {{}};
    }

    /// Discards an error-level record.
    #[macro_export]
    macro_rules! error {
        ($($arg:tt)*) => {{}};
    }
}
