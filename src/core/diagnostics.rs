//! Local diagnostics for pipeline failures
//!
//! Diagnostics describe what happened to shipped data (dropped events,
//! lost batches). They are written locally and never routed back into
//! the shipping pipeline.

use super::log_level::LogLevel;
use parking_lot::Mutex;
use std::fmt;
use std::time::Duration;

/// Something worth telling the operator about
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// Event below the minimum level, not processed
    Filtered { level: LogLevel },
    /// Event could not be encoded and was dropped
    EncodeFailed { error: String },
    /// Batch could not be compressed and was dropped
    CompressFailed { records: usize, error: String },
    /// Batch delivery failed and the batch was dropped
    SendFailed { records: usize, error: String },
    /// Batch accepted by the collector
    Sent { records: usize, bytes: usize },
    /// Handler stopped with a sub-threshold batch that will never be sent
    ShutdownWithPending { records: usize, cost: u64 },
    /// Workers were still busy when the shutdown timeout expired
    ShutdownTimedOut { timeout: Duration },
    /// A background job panicked; its event is lost
    WorkerPanicked { message: String },
}

impl Diagnostic {
    /// Whether this diagnostic reports data loss
    pub fn is_failure(&self) -> bool {
        !matches!(self, Diagnostic::Filtered { .. } | Diagnostic::Sent { .. })
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::Filtered { level } => {
                write!(f, "not processing message with level = {}", level)
            }
            Diagnostic::EncodeFailed { error } => write!(f, "failed to encode record: {}", error),
            Diagnostic::CompressFailed { records, error } => {
                write!(f, "failed to gzip {} logs: {}", records, error)
            }
            Diagnostic::SendFailed { records, error } => {
                write!(f, "failed to send {} logs to the server: {}", records, error)
            }
            Diagnostic::Sent { records, bytes } => {
                write!(f, "sent {} logs to the server ({} bytes)", records, bytes)
            }
            Diagnostic::ShutdownWithPending { records, cost } => write!(
                f,
                "shutting down with {} unsent logs (cost {} below threshold)",
                records, cost
            ),
            Diagnostic::ShutdownTimedOut { timeout } => write!(
                f,
                "workers did not finish within {:?}; queued logs may be lost",
                timeout
            ),
            Diagnostic::WorkerPanicked { message } => {
                write!(f, "background job panicked: {}", message)
            }
        }
    }
}

/// Destination for diagnostics
pub trait DiagnosticSink: Send + Sync {
    fn report(&self, diagnostic: &Diagnostic);
}

/// Writes diagnostics to stderr
///
/// Failures are always written; filtered and sent notes only when verbose.
#[derive(Debug, Clone, Copy, Default)]
pub struct StderrDiagnostics {
    verbose: bool,
}

impl StderrDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn verbose() -> Self {
        Self { verbose: true }
    }
}

impl DiagnosticSink for StderrDiagnostics {
    fn report(&self, diagnostic: &Diagnostic) {
        match diagnostic {
            Diagnostic::Filtered { .. } | Diagnostic::Sent { .. } => {
                if self.verbose {
                    eprintln!("[SUMO DEBUG] {}", diagnostic);
                }
            }
            Diagnostic::ShutdownWithPending { .. } | Diagnostic::ShutdownTimedOut { .. } => {
                eprintln!("[SUMO WARNING] {}", diagnostic);
            }
            Diagnostic::WorkerPanicked { .. } => {
                eprintln!("[SUMO CRITICAL] {}", diagnostic);
            }
            _ => eprintln!("[SUMO ERROR] {}", diagnostic),
        }
    }
}

/// Keeps every diagnostic in memory
#[derive(Debug, Default)]
pub struct MemoryDiagnostics {
    entries: Mutex<Vec<Diagnostic>>,
}

impl MemoryDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<Diagnostic> {
        self.entries.lock().clone()
    }

    pub fn failures(&self) -> Vec<Diagnostic> {
        self.entries
            .lock()
            .iter()
            .filter(|d| d.is_failure())
            .cloned()
            .collect()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

impl DiagnosticSink for MemoryDiagnostics {
    fn report(&self, diagnostic: &Diagnostic) {
        self.entries.lock().push(diagnostic.clone());
    }
}
