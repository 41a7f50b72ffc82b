//! # Logging Module
//!
//! This module provides logging utilities for hdrfmt:
//! - Verbose logging that can be enabled/disabled
//! - Structured `tracing` diagnostics routed to stderr
//!
//! Everything here writes to stderr. Stdout belongs to the formatted
//! documents, listed file names and diffs, so it must stay clean for piping.
//!
//! ## Example
//!
//! ```rust
//! use hdrfmt::logging::{ColorMode, set_verbose};
//! use hdrfmt::verbose_log;
//!
//! // Enable verbose logging
//! set_verbose();
//!
//! // Let owo-colors decide based on the terminal
//! ColorMode::Auto.apply();
//!
//! // Log a verbose message (goes to stderr)
//! verbose_log!("Processing file: {}", "main.go");
//! ```

mod modes;

pub use modes::{ColorMode, init_tracing, is_quiet, is_verbose, set_quiet, set_verbose};

/// Logs a message to stderr if verbose mode is enabled.
///
/// This macro is used for detailed logging that is only shown when verbose mode
/// is enabled via [`set_verbose`]. It uses the same format string syntax as
/// the standard [`eprintln!`] macro.
#[macro_export]
macro_rules! verbose_log {
    ($($arg:tt)*) => {
        if $crate::logging::is_verbose() {
            eprintln!($($arg)*);
        }
    };
}
