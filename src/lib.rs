//! # Sumo Log Shipper
//!
//! Client-side log shipping for applications that report to an HTTP log
//! collector.
//!
//! ## Features
//!
//! - **Non-blocking**: `submit` hands events to background workers and returns
//! - **Weighted batching**: severe events trigger a flush sooner than debug chatter
//! - **Compact delivery**: batches are newline-joined JSON, gzip-compressed
//! - **Best effort**: failed batches are reported locally and dropped, never retried
//!
//! ## Example
//!
//! ```no_run
//! use sumo_log_shipper::prelude::*;
//!
//! let handler = SumoLogHandler::builder()
//!     .endpoint("https://collectors.example.com/receiver/v1/http/TOKEN")
//!     .source_name("checkout-app")
//!     .build()
//!     .expect("valid configuration");
//!
//! sumo_log_shipper::info!(handler, "payment accepted for order {}", 991);
//! ```

pub mod bridge;
pub mod core;
pub mod macros;
pub mod transport;

pub mod prelude {
    pub use crate::bridge::LogBridge;
    pub use crate::core::{
        BufferState, CostTable, Diagnostic, DiagnosticSink, EnvironmentFacts, FieldValue,
        HandlerBuilder, LogEvent, LogLevel, MemoryDiagnostics, Metadata, Result, ShipperError,
        ShipperMetrics, StderrDiagnostics, SumoLogHandler, ThresholdConfig, TimestampFormat,
        DEFAULT_SHUTDOWN_TIMEOUT,
    };
    pub use crate::transport::{GzipPayload, HttpTransport, SourceTags, Transport};
}

pub use crate::bridge::LogBridge;
pub use crate::core::{
    BatchBuffer, BufferState, CostTable, Diagnostic, DiagnosticSink, EnvironmentFacts,
    FieldValue, FlushBatch, HandlerBuilder, HandlerConfig, LogEvent, LogLevel, MemoryDiagnostics,
    Metadata, RecordFormatter, Result, SerializedRecord, ShipperError, ShipperMetrics,
    StderrDiagnostics, SumoLogHandler, ThresholdConfig, TimestampFormat, DEFAULT_SHUTDOWN_TIMEOUT,
};
pub use crate::transport::{GzipPayload, HttpTransport, SourceTags, Transport};
