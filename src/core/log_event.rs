//! Log event handed from the caller to the background workers

use super::log_level::LogLevel;
use super::metadata::Metadata;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;

// Thread-local cache so repeated submits from one thread don't re-render its label
thread_local! {
    static THREAD_LABEL_CACHE: RefCell<Option<String>> = const { RefCell::new(None) };
}

/// Name of the current thread, or its debug id when unnamed
pub fn current_thread_label() -> String {
    THREAD_LABEL_CACHE.with(|cache| {
        cache
            .borrow_mut()
            .get_or_insert_with(|| {
                let thread = std::thread::current();
                match thread.name() {
                    Some(name) => name.to_string(),
                    None => format!("{:?}", thread.id()),
                }
            })
            .clone()
    })
}

/// One call to `submit`, captured on the caller's thread
///
/// Everything that can only be known on the calling thread (thread label,
/// submission time) is captured here before the hand-off.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEvent {
    pub level: LogLevel,
    pub message: String,
    pub metadata: Metadata,
    pub file: String,
    pub function: String,
    pub line: u32,
    pub thread: String,
    pub timestamp: DateTime<Utc>,
}

impl LogEvent {
    /// Capture an event on the current thread, stamped now
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            metadata: Metadata::new(),
            file: String::new(),
            function: String::new(),
            line: 0,
            thread: current_thread_label(),
            timestamp: Utc::now(),
        }
    }

    #[must_use]
    pub fn with_location(mut self, file: &str, function: &str, line: u32) -> Self {
        self.file = file.to_string();
        self.function = function.to_string();
        self.line = line;
        self
    }

    #[must_use]
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    #[must_use]
    pub fn with_thread(mut self, thread: impl Into<String>) -> Self {
        self.thread = thread.into();
        self
    }

    #[must_use]
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }
}
