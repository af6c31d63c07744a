//! Handler configuration
//!
//! [`HandlerBuilder`] collects settings with a fluent API and validates them
//! into an immutable [`HandlerConfig`] when the handler is built.

use super::diagnostics::{DiagnosticSink, StderrDiagnostics};
use super::environment::EnvironmentFacts;
use super::error::{Result, ShipperError};
use super::handler::SumoLogHandler;
use super::log_level::LogLevel;
use super::threshold::{CostTable, ThresholdConfig, DEFAULT_THRESHOLD};
use super::timestamp::TimestampFormat;
use crate::transport::{SourceTags, Transport};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Default `X-Sumo-Host` tag
pub const DEFAULT_SOURCE_HOST: &str = "ios";

/// Default `X-Sumo-Category` tag
pub const DEFAULT_SOURCE_CATEGORY: &str = "prod/mobile";

/// Upper bound on the default worker count
const MAX_DEFAULT_WORKERS: usize = 4;

/// Validated, immutable handler settings
#[derive(Debug, Clone)]
pub struct HandlerConfig {
    pub endpoint: Url,
    pub tags: SourceTags,
    pub timestamp_format: TimestampFormat,
    pub min_level: LogLevel,
    pub threshold: ThresholdConfig,
    pub workers: usize,
    pub request_timeout: Option<Duration>,
    pub environment: EnvironmentFacts,
}

/// Builder for [`SumoLogHandler`]
///
/// # Example
///
/// ```no_run
/// use sumo_log_shipper::prelude::*;
///
/// let handler = SumoLogHandler::builder()
///     .endpoint("https://collectors.example.com/receiver/v1/http/TOKEN")
///     .source_name("checkout-app")
///     .min_level(LogLevel::Info)
///     .threshold(20)
///     .build()
///     .expect("valid configuration");
///
/// handler.submit(LogLevel::Warning, "card declined", None, file!(), "pay", line!());
/// ```
pub struct HandlerBuilder {
    endpoint: Option<String>,
    source_name: Option<String>,
    source_host: String,
    source_category: String,
    timestamp_format: TimestampFormat,
    min_level: LogLevel,
    costs: CostTable,
    threshold: u64,
    workers: Option<usize>,
    request_timeout: Option<Duration>,
    environment: Option<EnvironmentFacts>,
    diagnostics: Option<Arc<dyn DiagnosticSink>>,
    transport: Option<Arc<dyn Transport>>,
}

impl HandlerBuilder {
    pub fn new() -> Self {
        Self {
            endpoint: None,
            source_name: None,
            source_host: DEFAULT_SOURCE_HOST.to_string(),
            source_category: DEFAULT_SOURCE_CATEGORY.to_string(),
            timestamp_format: TimestampFormat::default(),
            min_level: LogLevel::Trace,
            costs: CostTable::DEFAULT,
            threshold: DEFAULT_THRESHOLD,
            workers: None,
            request_timeout: None,
            environment: None,
            diagnostics: None,
            transport: None,
        }
    }

    /// Collector URL (required)
    #[must_use = "builder methods return a new value"]
    pub fn endpoint(mut self, url: impl Into<String>) -> Self {
        self.endpoint = Some(url.into());
        self
    }

    /// `X-Sumo-Name` tag (required)
    #[must_use = "builder methods return a new value"]
    pub fn source_name(mut self, name: impl Into<String>) -> Self {
        self.source_name = Some(name.into());
        self
    }

    /// `X-Sumo-Host` tag
    #[must_use = "builder methods return a new value"]
    pub fn source_host(mut self, host: impl Into<String>) -> Self {
        self.source_host = host.into();
        self
    }

    /// `X-Sumo-Category` tag
    #[must_use = "builder methods return a new value"]
    pub fn source_category(mut self, category: impl Into<String>) -> Self {
        self.source_category = category.into();
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.timestamp_format = format;
        self
    }

    /// Events below this level are dropped before any background work
    #[must_use = "builder methods return a new value"]
    pub fn min_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    /// Flush once accumulated cost exceeds this value
    #[must_use = "builder methods return a new value"]
    pub fn threshold(mut self, threshold: u64) -> Self {
        self.threshold = threshold;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn costs(mut self, costs: CostTable) -> Self {
        self.costs = costs;
        self
    }

    /// Number of background workers
    #[must_use = "builder methods return a new value"]
    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = Some(workers);
        self
    }

    /// Per-request timeout; the HTTP client default applies when unset
    #[must_use = "builder methods return a new value"]
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Environment facts stamped on every record; detected when unset
    #[must_use = "builder methods return a new value"]
    pub fn environment(mut self, facts: EnvironmentFacts) -> Self {
        self.environment = Some(facts);
        self
    }

    /// Where local diagnostics go; stderr when unset
    #[must_use = "builder methods return a new value"]
    pub fn diagnostics(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.diagnostics = Some(sink);
        self
    }

    /// Replace the HTTP transport
    #[must_use = "builder methods return a new value"]
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    fn default_workers() -> usize {
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
            .clamp(1, MAX_DEFAULT_WORKERS)
    }

    /// Validate settings without starting anything
    pub fn build_config(&self) -> Result<HandlerConfig> {
        let raw = self
            .endpoint
            .as_deref()
            .ok_or_else(|| ShipperError::config("HandlerBuilder", "endpoint is required"))?;
        let endpoint = Url::parse(raw)?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(ShipperError::config(
                "HandlerBuilder",
                format!("unsupported endpoint scheme '{}'", endpoint.scheme()),
            ));
        }

        let source_name = self
            .source_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .ok_or_else(|| ShipperError::config("HandlerBuilder", "source name is required"))?;

        self.timestamp_format.validate()?;

        let workers = self.workers.unwrap_or_else(Self::default_workers);
        if workers == 0 {
            return Err(ShipperError::config(
                "HandlerBuilder",
                "at least one worker is required",
            ));
        }

        Ok(HandlerConfig {
            endpoint,
            tags: SourceTags::new(source_name, &self.source_host, &self.source_category),
            timestamp_format: self.timestamp_format.clone(),
            min_level: self.min_level,
            threshold: ThresholdConfig::new(self.costs, self.threshold),
            workers,
            request_timeout: self.request_timeout,
            environment: self.environment.clone().unwrap_or_else(EnvironmentFacts::detect),
        })
    }

    /// Validate settings and start the handler's workers
    ///
    /// # Errors
    ///
    /// Returns error for missing or invalid settings, or if a worker thread
    /// cannot be spawned.
    pub fn build(self) -> Result<SumoLogHandler> {
        let config = self.build_config()?;
        let diagnostics = self
            .diagnostics
            .unwrap_or_else(|| Arc::new(StderrDiagnostics::new()));
        SumoLogHandler::start(config, diagnostics, self.transport)
    }
}

impl Default for HandlerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
