#![deny(missing_docs)]
//! Shared logging utilities for the salesdesk workspace.
//!
//! This crate provides the `desk_*` logging macros used across the codebase,
//! a per-thread operator session tag, and a minimal test initializer for the
//! global logger.

use std::cell::RefCell;

thread_local! {
    /// Label of the operator session driving the current thread.
    static SESSION_TAG: RefCell<String> = const { RefCell::new(String::new()) };
}

/// Sets the operator session label for the current thread.
/// The driver calls this once after loading its configuration.
pub fn set_session_tag(tag: impl Into<String>) {
    let tag = tag.into();
    SESSION_TAG.with(|v| *v.borrow_mut() = tag);
}

/// Retrieves the operator session label for the current thread.
/// Returns an empty string if no tag has been set.
pub fn get_session_tag() -> String {
    SESSION_TAG.with(|v| v.borrow().clone())
}

/// Prefix for log lines written on this thread: `"[tag] "`, or nothing
/// when no session tag is set.
#[doc(hidden)]
pub fn tag_prefix() -> String {
    SESSION_TAG.with(|v| {
        let tag = v.borrow();
        if tag.is_empty() {
            String::new()
        } else {
            format!("[{tag}] ")
        }
    })
}

/// Shared body of the `desk_*` macros. The tag is only read when the level
/// is enabled.
#[doc(hidden)]
#[macro_export]
macro_rules! __desk_log {
    ($level:expr, $($arg:tt)*) => {{
        if log::log_enabled!($level) {
            log::log!($level, "{}{}", $crate::tag_prefix(), format_args!($($arg)*));
        }
    }};
}

/// Logs a trace-level message, prefixed with the session tag.
#[macro_export]
macro_rules! desk_trace {
    ($($arg:tt)*) => {
        $crate::__desk_log!(log::Level::Trace, $($arg)*)
    };
}

/// Logs a debug-level message, prefixed with the session tag.
#[macro_export]
macro_rules! desk_debug {
    ($($arg:tt)*) => {
        $crate::__desk_log!(log::Level::Debug, $($arg)*)
    };
}

/// Logs a info-level message, prefixed with the session tag.
#[macro_export]
macro_rules! desk_info {
    ($($arg:tt)*) => {
        $crate::__desk_log!(log::Level::Info, $($arg)*)
    };
}

/// Logs a warn-level message, prefixed with the session tag.
#[macro_export]
macro_rules! desk_warn {
    ($($arg:tt)*) => {
        $crate::__desk_log!(log::Level::Warn, $($arg)*)
    };
}

/// Logs a error-level message, prefixed with the session tag.
#[macro_export]
macro_rules! desk_error {
    ($($arg:tt)*) => {
        $crate::__desk_log!(log::Level::Error, $($arg)*)
    };
}

/// Initializes a simple terminal logger for use in tests.
///
/// This safely no-ops if another logger has already been initialized.
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode};

    let level = if cfg!(debug_assertions) {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    // Another test may have installed the logger already.
    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}
