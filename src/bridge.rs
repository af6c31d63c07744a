//! Bridge from the `log` facade
//!
//! [`LogBridge`] implements [`log::Log`] on top of a shared handler so that
//! `log::info!` and friends anywhere in the host application are shipped.
//! Records emitted by the shipper's own HTTP stack are ignored, otherwise
//! every send would log about itself and feed the next batch.

use crate::core::{LogLevel, Metadata, Result, ShipperError, SumoLogHandler};
use log::LevelFilter;
use std::sync::Arc;

/// Targets never forwarded to the collector
pub const DEFAULT_EXCLUDED_TARGETS: &[&str] = &[
    "sumo_log_shipper",
    "reqwest",
    "hyper",
    "hyper_util",
    "h2",
    "rustls",
    "tokio",
];

fn level_filter(level: LogLevel) -> LevelFilter {
    match level {
        LogLevel::Trace => LevelFilter::Trace,
        LogLevel::Debug => LevelFilter::Debug,
        LogLevel::Info | LogLevel::Notice => LevelFilter::Info,
        LogLevel::Warning => LevelFilter::Warn,
        LogLevel::Error | LogLevel::Critical => LevelFilter::Error,
    }
}

/// `log::Log` implementation backed by a [`SumoLogHandler`]
pub struct LogBridge {
    handler: Arc<SumoLogHandler>,
    excluded_targets: Vec<String>,
}

impl LogBridge {
    pub fn new(handler: Arc<SumoLogHandler>) -> Self {
        Self {
            handler,
            excluded_targets: DEFAULT_EXCLUDED_TARGETS
                .iter()
                .map(|t| t.to_string())
                .collect(),
        }
    }

    /// Also ignore records whose target starts with `prefix`
    #[must_use]
    pub fn exclude_target(mut self, prefix: impl Into<String>) -> Self {
        self.excluded_targets.push(prefix.into());
        self
    }

    /// Install as the global `log` logger
    ///
    /// # Errors
    ///
    /// Fails if a global logger has already been set.
    pub fn install(self) -> Result<()> {
        log::set_max_level(level_filter(self.handler.min_level()));
        log::set_boxed_logger(Box::new(self))
            .map_err(|e| ShipperError::other(format!("cannot install log bridge: {}", e)))
    }

    pub fn handler(&self) -> &Arc<SumoLogHandler> {
        &self.handler
    }

    fn is_excluded(&self, target: &str) -> bool {
        self.excluded_targets.iter().any(|prefix| {
            target == prefix
                || target
                    .strip_prefix(prefix.as_str())
                    .is_some_and(|rest| rest.starts_with("::"))
        })
    }
}

impl log::Log for LogBridge {
    fn enabled(&self, metadata: &log::Metadata<'_>) -> bool {
        !self.is_excluded(metadata.target()) && self.handler.is_enabled(metadata.level().into())
    }

    fn log(&self, record: &log::Record<'_>) {
        if self.is_excluded(record.target()) {
            return;
        }

        let module = record.module_path().unwrap_or_default();
        let metadata = if record.target() != module {
            Some(Metadata::new().with_field("target", record.target()))
        } else {
            None
        };

        self.handler.submit(
            record.level().into(),
            record.args().to_string(),
            metadata,
            record.file().unwrap_or_default(),
            module,
            record.line().unwrap_or(0),
        );
    }

    // Batches leave only when the threshold is crossed
    fn flush(&self) {}
}
