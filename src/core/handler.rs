//! Log handler: dispatch, accumulation and shutdown

use super::{
    batch::{BatchBuffer, BufferState},
    config::{HandlerBuilder, HandlerConfig},
    diagnostics::{Diagnostic, DiagnosticSink},
    error::Result,
    log_event::LogEvent,
    log_level::LogLevel,
    metadata::{FieldValue, Metadata},
    metrics::ShipperMetrics,
    pipeline::FlushPipeline,
    record::RecordFormatter,
};
use crate::transport::{HttpTransport, Transport};
use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Default shutdown timeout used when the handler is dropped (5 seconds)
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// State shared by the handler and every background worker
struct Shared {
    formatter: RecordFormatter,
    buffer: BatchBuffer,
    pipeline: FlushPipeline,
    metrics: Arc<ShipperMetrics>,
    diagnostics: Arc<dyn DiagnosticSink>,
    live_workers: AtomicUsize,
}

impl Shared {
    /// Format one event, buffer it, and flush inline if the threshold was crossed
    fn process(&self, event: LogEvent) {
        let record = match self.formatter.format(&event) {
            Ok(record) => record,
            Err(e) => {
                self.metrics.record_encode_failure();
                self.diagnostics.report(&Diagnostic::EncodeFailed {
                    error: e.to_string(),
                });
                return;
            }
        };

        if let Some(batch) = self.buffer.append_and_take_if_due(record, event.level) {
            // Failures are reported and counted by the pipeline; the batch is gone either way
            let _ = self.pipeline.send(batch);
        }
    }

    fn run_worker(&self, receiver: Receiver<LogEvent>) {
        for event in receiver.iter() {
            let outcome =
                std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| self.process(event)));

            if let Err(panic_info) = outcome {
                let message = if let Some(s) = panic_info.downcast_ref::<&str>() {
                    s.to_string()
                } else if let Some(s) = panic_info.downcast_ref::<String>() {
                    s.clone()
                } else {
                    "Unknown panic".to_string()
                };
                self.diagnostics
                    .report(&Diagnostic::WorkerPanicked { message });
            }
            self.metrics.record_processed();
        }

        // The channel is closed and drained; the last worker out settles the remainder
        if self.live_workers.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.discard_pending();
        }
    }

    fn discard_pending(&self) {
        let pending = self.buffer.take_all();
        if !pending.is_empty() {
            self.metrics.record_lost(pending.len());
            self.diagnostics.report(&Diagnostic::ShutdownWithPending {
                records: pending.len(),
                cost: pending.cost(),
            });
        }
    }
}

/// Client-side log shipper
///
/// `submit` filters by level on the calling thread, captures the caller's
/// thread label and timestamp, and hands the event to a background worker.
/// Workers format the event, add it to the shared batch, and the worker that
/// pushes the accumulated cost over the threshold compresses and sends the
/// batch itself.
///
/// Delivery is best effort: failed batches are dropped, and a batch still
/// below the threshold when the handler stops is never sent.
pub struct SumoLogHandler {
    config: HandlerConfig,
    min_level: RwLock<LogLevel>,
    metadata: RwLock<Metadata>,
    shared: Arc<Shared>,
    sender: RwLock<Option<Sender<LogEvent>>>,
    workers: Mutex<Vec<thread::JoinHandle<()>>>,
}

impl SumoLogHandler {
    /// Create a builder for the handler
    #[must_use]
    pub fn builder() -> HandlerBuilder {
        HandlerBuilder::new()
    }

    pub(crate) fn start(
        config: HandlerConfig,
        diagnostics: Arc<dyn DiagnosticSink>,
        transport: Option<Arc<dyn Transport>>,
    ) -> Result<Self> {
        let transport: Arc<dyn Transport> = match transport {
            Some(transport) => transport,
            None => Arc::new(HttpTransport::new(
                config.endpoint.clone(),
                config.tags.clone(),
                config.request_timeout,
            )?),
        };

        let metrics = Arc::new(ShipperMetrics::new());
        let shared = Arc::new(Shared {
            formatter: RecordFormatter::new(
                config.timestamp_format.clone(),
                config.environment.clone(),
            ),
            buffer: BatchBuffer::new(config.threshold),
            pipeline: FlushPipeline::new(transport, Arc::clone(&diagnostics), Arc::clone(&metrics)),
            metrics,
            diagnostics,
            live_workers: AtomicUsize::new(0),
        });

        let (sender, receiver) = unbounded();
        let mut workers = Vec::with_capacity(config.workers);
        for idx in 0..config.workers {
            let worker_shared = Arc::clone(&shared);
            let receiver = receiver.clone();
            shared.live_workers.fetch_add(1, Ordering::AcqRel);
            let spawned = thread::Builder::new()
                .name(format!("sumo-worker-{}", idx))
                .spawn(move || worker_shared.run_worker(receiver));
            match spawned {
                Ok(handle) => workers.push(handle),
                Err(e) => {
                    shared.live_workers.fetch_sub(1, Ordering::AcqRel);
                    return Err(e.into());
                }
            }
        }

        Ok(Self {
            min_level: RwLock::new(config.min_level),
            config,
            metadata: RwLock::new(Metadata::new()),
            shared,
            sender: RwLock::new(Some(sender)),
            workers: Mutex::new(workers),
        })
    }

    /// Accept one log event
    ///
    /// Never blocks on formatting or network I/O. Events below the minimum
    /// level are dropped here; nothing is reported back to the caller.
    pub fn submit(
        &self,
        level: LogLevel,
        message: impl Into<String>,
        metadata: Option<Metadata>,
        file: &str,
        function: &str,
        line: u32,
    ) {
        if !self.accepts(level) {
            return;
        }

        let merged = {
            let base = self.metadata.read();
            match metadata {
                Some(extra) => base.clone().merged(&extra),
                None => base.clone(),
            }
        };

        let event = LogEvent::new(level, message)
            .with_location(file, function, line)
            .with_metadata(merged);
        self.dispatch(event);
    }

    /// Accept an already captured event
    ///
    /// Handler metadata is not merged; the event is shipped as given.
    pub fn submit_event(&self, event: LogEvent) {
        if self.accepts(event.level) {
            self.dispatch(event);
        }
    }

    /// Level filter, applied synchronously on the caller's thread
    fn accepts(&self, level: LogLevel) -> bool {
        if level < *self.min_level.read() {
            self.shared.metrics.record_filtered();
            self.shared
                .diagnostics
                .report(&Diagnostic::Filtered { level });
            return false;
        }
        true
    }

    fn dispatch(&self, event: LogEvent) {
        let sender = self.sender.read();
        if let Some(sender) = sender.as_ref() {
            self.shared.metrics.record_submitted();
            if sender.send(event).is_err() {
                // Workers are gone; count the job as finished so in_flight settles
                self.shared.metrics.record_processed();
            }
        }
    }

    /// Whether `level` would currently be processed
    pub fn is_enabled(&self, level: LogLevel) -> bool {
        level >= *self.min_level.read()
    }

    pub fn min_level(&self) -> LogLevel {
        *self.min_level.read()
    }

    pub fn set_min_level(&self, level: LogLevel) {
        *self.min_level.write() = level;
    }

    /// Handler-level metadata value for `key`
    pub fn metadata(&self, key: &str) -> Option<FieldValue> {
        self.metadata.read().get(key).cloned()
    }

    /// Set a metadata field attached to every subsequent event
    pub fn set_metadata(&self, key: impl Into<String>, value: impl Into<FieldValue>) {
        self.metadata.write().insert(key, value);
    }

    pub fn remove_metadata(&self, key: &str) -> Option<FieldValue> {
        self.metadata.write().remove(key)
    }

    pub fn config(&self) -> &HandlerConfig {
        &self.config
    }

    pub fn metrics(&self) -> &ShipperMetrics {
        &self.shared.metrics
    }

    /// Records and cost currently buffered
    pub fn buffer_state(&self) -> BufferState {
        self.shared.buffer.state()
    }

    /// Wait until every submitted event has been processed
    ///
    /// Returns `false` if work is still in flight when `timeout` expires.
    pub fn wait_idle(&self, timeout: Duration) -> bool {
        let start = Instant::now();
        while self.shared.metrics.in_flight() > 0 {
            if start.elapsed() >= timeout {
                return false;
            }
            thread::sleep(Duration::from_millis(2));
        }
        true
    }

    /// Stop accepting events and wait for the workers to finish
    ///
    /// Events already queued are still processed and may trigger a flush.
    /// Once the last worker exits, whatever remains below the threshold is
    /// discarded and reported as lost.
    ///
    /// Returns `true` if all workers finished within `timeout`. Workers still
    /// running after a timeout keep draining the queue; a later call waits
    /// for them again.
    pub fn shutdown(&self, timeout: Duration) -> bool {
        // Closing the channel lets workers drain the queue and exit
        drop(self.sender.write().take());

        let start = Instant::now();
        let mut workers = self.workers.lock();
        loop {
            let (finished, running): (Vec<_>, Vec<_>) =
                workers.drain(..).partition(|handle| handle.is_finished());
            *workers = running;

            for handle in finished {
                if handle.join().is_err() {
                    self.shared.diagnostics.report(&Diagnostic::WorkerPanicked {
                        message: "worker thread panicked during shutdown".to_string(),
                    });
                }
            }

            if workers.is_empty() {
                return true;
            }

            if start.elapsed() >= timeout {
                self.shared
                    .diagnostics
                    .report(&Diagnostic::ShutdownTimedOut { timeout });
                return false;
            }

            thread::sleep(Duration::from_millis(10));
        }
    }

    /// Whether `shutdown` has been called
    pub fn is_stopped(&self) -> bool {
        self.sender.read().is_none()
    }
}

impl Drop for SumoLogHandler {
    fn drop(&mut self) {
        // A timeout has already been reported by shutdown itself
        let _ = self.shutdown(DEFAULT_SHUTDOWN_TIMEOUT);
    }
}
