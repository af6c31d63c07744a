//! Core shipper types and pipeline

pub mod batch;
pub mod config;
pub mod diagnostics;
pub mod environment;
pub mod error;
pub mod handler;
pub mod log_event;
pub mod log_level;
pub mod metadata;
pub mod metrics;
pub mod pipeline;
pub mod record;
pub mod threshold;
pub mod timestamp;

pub use batch::{BatchBuffer, BufferState, FlushBatch};
pub use config::{HandlerBuilder, HandlerConfig, DEFAULT_SOURCE_CATEGORY, DEFAULT_SOURCE_HOST};
pub use diagnostics::{Diagnostic, DiagnosticSink, MemoryDiagnostics, StderrDiagnostics};
pub use environment::EnvironmentFacts;
pub use error::{Result, ShipperError};
pub use handler::{SumoLogHandler, DEFAULT_SHUTDOWN_TIMEOUT};
pub use log_event::LogEvent;
pub use log_level::LogLevel;
pub use metadata::{FieldValue, Metadata};
pub use metrics::ShipperMetrics;
pub use pipeline::{Compressor, FlushPipeline};
pub use record::{RecordFormatter, SerializedRecord};
pub use threshold::{CostTable, ThresholdConfig, DEFAULT_THRESHOLD};
pub use timestamp::TimestampFormat;
