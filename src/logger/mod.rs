//! Structured logging for the balance aggregator
//!
//! This module provides a small, ergonomic logging API with:
//! - Standard log levels (Error/Warning/Info/Debug/Verbose)
//! - Per-tag debug control via --debug-<tag> flags
//! - Colored console output mirrored to a daily log file
//!
//! ## Usage
//!
//! ```rust
//! use defai::logger::{self, LogTag};
//!
//! logger::error(LogTag::Rpc, "Connection failed");
//! logger::info(LogTag::Wallet, "Loaded 4 holdings");
//! logger::debug(LogTag::Rpc, "Request payload: ..."); // Only if --debug-rpc
//! ```
//!
//! Call `logger::init()` once at startup; without it only console output at
//! INFO level and above is produced.

mod config;
mod file;
mod format;
mod levels;
mod tags;

pub use levels::LogLevel;
pub use tags::LogTag;

/// Initialize the logger system
///
/// Parses command-line arguments for debug flags and opens the log file.
pub fn init() {
    config::init_from_args();
    file::init_file_logging();
}

/// Log at ERROR level (always shown)
pub fn error(tag: LogTag, message: &str) {
    log(tag, LogLevel::Error, message);
}

/// Log at WARNING level (shown even with --quiet)
pub fn warning(tag: LogTag, message: &str) {
    log(tag, LogLevel::Warning, message);
}

/// Log at INFO level (standard operations)
pub fn info(tag: LogTag, message: &str) {
    log(tag, LogLevel::Info, message);
}

/// Log at DEBUG level
///
/// Only shown when the --debug-<tag> flag for this tag is provided.
///
/// # Example
/// ```rust
/// # use defai::logger::{self, LogTag};
/// // Only shown with --debug-wallet
/// logger::debug(LogTag::Wallet, "Resolved 3 known mints");
/// ```
pub fn debug(tag: LogTag, message: &str) {
    log(tag, LogLevel::Debug, message);
}

/// Log at VERBOSE level (raw payloads and similar)
pub fn verbose(tag: LogTag, message: &str) {
    log(tag, LogLevel::Verbose, message);
}

/// Force flush all pending log writes
pub fn flush() {
    file::flush_file_logging();
}

fn log(tag: LogTag, level: LogLevel, message: &str) {
    if config::allows(tag, level) {
        format::format_and_log(tag, level, message);
    }
}
