//! Logging macros that capture the call site.
//!
//! Each macro formats its message like `format!` and passes `file!()`,
//! `line!()` and `module_path!()` (as the function field) to
//! [`SumoLogHandler::submit`](crate::SumoLogHandler::submit).
//!
//! # Examples
//!
//! ```no_run
//! use sumo_log_shipper::prelude::*;
//! use sumo_log_shipper::{info, warning};
//!
//! let handler = SumoLogHandler::builder()
//!     .endpoint("https://collectors.example.com/receiver/v1/http/TOKEN")
//!     .source_name("checkout-app")
//!     .build()
//!     .unwrap();
//!
//! info!(handler, "Server started");
//!
//! let order = 991;
//! warning!(handler, metadata: Metadata::new().with_field("order", order), "card declined");
//! ```

/// Submit a message at an explicit level.
///
/// An optional `metadata: <expr>,` prefix attaches per-event metadata.
#[macro_export]
macro_rules! log {
    ($handler:expr, $level:expr, metadata: $meta:expr, $($arg:tt)+) => {
        $handler.submit(
            $level,
            format!($($arg)+),
            Some($meta),
            file!(),
            module_path!(),
            line!(),
        )
    };
    ($handler:expr, $level:expr, $($arg:tt)+) => {
        $handler.submit(
            $level,
            format!($($arg)+),
            None,
            file!(),
            module_path!(),
            line!(),
        )
    };
}

/// Submit a trace-level message.
#[macro_export]
macro_rules! trace {
    ($handler:expr, $($arg:tt)+) => {
        $crate::log!($handler, $crate::LogLevel::Trace, $($arg)+)
    };
}

/// Submit a debug-level message.
#[macro_export]
macro_rules! debug {
    ($handler:expr, $($arg:tt)+) => {
        $crate::log!($handler, $crate::LogLevel::Debug, $($arg)+)
    };
}

/// Submit an info-level message.
#[macro_export]
macro_rules! info {
    ($handler:expr, $($arg:tt)+) => {
        $crate::log!($handler, $crate::LogLevel::Info, $($arg)+)
    };
}

/// Submit a notice-level message.
#[macro_export]
macro_rules! notice {
    ($handler:expr, $($arg:tt)+) => {
        $crate::log!($handler, $crate::LogLevel::Notice, $($arg)+)
    };
}

/// Submit a warning-level message.
#[macro_export]
macro_rules! warning {
    ($handler:expr, $($arg:tt)+) => {
        $crate::log!($handler, $crate::LogLevel::Warning, $($arg)+)
    };
}

/// Submit an error-level message.
#[macro_export]
macro_rules! error {
    ($handler:expr, $($arg:tt)+) => {
        $crate::log!($handler, $crate::LogLevel::Error, $($arg)+)
    };
}

/// Submit a critical-level message.
///
/// Critical events carry the highest cost and usually flush the batch
/// on their own.
#[macro_export]
macro_rules! critical {
    ($handler:expr, $($arg:tt)+) => {
        $crate::log!($handler, $crate::LogLevel::Critical, $($arg)+)
    };
}
