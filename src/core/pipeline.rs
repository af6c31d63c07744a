//! Flush/send pipeline
//!
//! Takes ownership of a detached batch, joins it, compresses it and hands it
//! to the transport. Delivery is best effort: a batch that fails to compress
//! or to send is reported and discarded, never re-queued.

use super::batch::FlushBatch;
use super::diagnostics::{Diagnostic, DiagnosticSink};
use super::error::Result;
use super::metrics::ShipperMetrics;
use crate::transport::{GzipPayload, Transport};
use std::sync::Arc;

/// Turns a joined batch into a request body
pub type Compressor = fn(&str, usize) -> Result<GzipPayload>;

pub struct FlushPipeline {
    transport: Arc<dyn Transport>,
    diagnostics: Arc<dyn DiagnosticSink>,
    metrics: Arc<ShipperMetrics>,
    compressor: Compressor,
}

impl FlushPipeline {
    pub fn new(
        transport: Arc<dyn Transport>,
        diagnostics: Arc<dyn DiagnosticSink>,
        metrics: Arc<ShipperMetrics>,
    ) -> Self {
        Self {
            transport,
            diagnostics,
            metrics,
            compressor: GzipPayload::compress,
        }
    }

    /// Replace the default best-compression gzip step
    #[must_use]
    pub fn with_compressor(mut self, compressor: Compressor) -> Self {
        self.compressor = compressor;
        self
    }

    pub fn transport(&self) -> &dyn Transport {
        self.transport.as_ref()
    }

    /// Compress and deliver one batch
    ///
    /// The batch is consumed whatever the outcome. The returned error is
    /// informational; it has already been reported and counted.
    pub fn send(&self, batch: FlushBatch) -> Result<()> {
        self.metrics.record_flush();
        if batch.is_empty() {
            return Ok(());
        }

        let records = batch.len();
        let joined = batch.joined();
        drop(batch);

        let payload = match (self.compressor)(&joined, records) {
            Ok(payload) => payload,
            Err(e) => {
                self.metrics.record_compress_failure();
                self.metrics.record_lost(records);
                self.diagnostics.report(&Diagnostic::CompressFailed {
                    records,
                    error: e.to_string(),
                });
                return Err(e);
            }
        };

        let bytes = payload.body().len();
        match self.transport.deliver(payload) {
            Ok(()) => {
                self.metrics.record_sent(records);
                self.diagnostics.report(&Diagnostic::Sent { records, bytes });
                Ok(())
            }
            Err(e) => {
                self.metrics.record_send_failure();
                self.metrics.record_lost(records);
                self.diagnostics.report(&Diagnostic::SendFailed {
                    records,
                    error: e.to_string(),
                });
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::batch::BatchBuffer;
    use crate::core::diagnostics::MemoryDiagnostics;
    use crate::core::error::ShipperError;
    use crate::core::log_event::LogEvent;
    use crate::core::log_level::LogLevel;
    use crate::core::record::RecordFormatter;
    use crate::core::threshold::ThresholdConfig;
    use flate2::read::GzDecoder;
    use crate::transport::gzip_into;
    use parking_lot::Mutex;
    use std::io::{self, Read, Write};

    #[derive(Default)]
    struct CapturingTransport {
        bodies: Mutex<Vec<Vec<u8>>>,
    }

    impl Transport for CapturingTransport {
        fn deliver(&self, payload: GzipPayload) -> Result<()> {
            self.bodies.lock().push(payload.into_body());
            Ok(())
        }

        fn name(&self) -> &str {
            "capture"
        }
    }

    struct RefusingTransport;

    impl Transport for RefusingTransport {
        fn deliver(&self, _payload: GzipPayload) -> Result<()> {
            Err(ShipperError::transport("http://collector.invalid", "connection refused"))
        }

        fn name(&self) -> &str {
            "refuse"
        }
    }

    fn due_batch(messages: &[&str]) -> FlushBatch {
        let buffer = BatchBuffer::new(ThresholdConfig::with_threshold(0));
        let formatter = RecordFormatter::default();
        for msg in messages {
            let event = LogEvent::new(LogLevel::Error, *msg).with_location("a.rs", "f", 1);
            buffer.append(formatter.format(&event).unwrap(), 10);
        }
        buffer.check_and_take_if_due().unwrap()
    }

    #[test]
    fn test_send_delivers_joined_gzip() {
        let transport = Arc::new(CapturingTransport::default());
        let diagnostics = Arc::new(MemoryDiagnostics::new());
        let metrics = Arc::new(ShipperMetrics::new());
        let pipeline = FlushPipeline::new(transport.clone(), diagnostics.clone(), metrics.clone());

        let batch = due_batch(&["one", "two"]);
        let expected = batch.joined();
        pipeline.send(batch).unwrap();

        let bodies = transport.bodies.lock();
        assert_eq!(bodies.len(), 1);
        let mut decoded = String::new();
        GzDecoder::new(&bodies[0][..]).read_to_string(&mut decoded).unwrap();
        assert_eq!(decoded, expected);

        assert_eq!(metrics.records_sent(), 2);
        assert!(matches!(diagnostics.entries()[0], Diagnostic::Sent { records: 2, .. }));
    }

    #[test]
    fn test_send_failure_drops_batch() {
        let diagnostics = Arc::new(MemoryDiagnostics::new());
        let metrics = Arc::new(ShipperMetrics::new());
        let pipeline =
            FlushPipeline::new(Arc::new(RefusingTransport), diagnostics.clone(), metrics.clone());

        assert!(pipeline.send(due_batch(&["lost"])).is_err());

        assert_eq!(metrics.send_failures(), 1);
        assert_eq!(metrics.records_lost(), 1);
        assert!(matches!(
            diagnostics.failures()[0],
            Diagnostic::SendFailed { records: 1, .. }
        ));
    }

    #[test]
    fn test_empty_batch_is_not_sent() {
        let transport = Arc::new(CapturingTransport::default());
        let metrics = Arc::new(ShipperMetrics::new());
        let pipeline = FlushPipeline::new(
            transport.clone(),
            Arc::new(MemoryDiagnostics::new()),
            metrics.clone(),
        );

        pipeline.send(BatchBuffer::default().take_all()).unwrap();
        assert!(transport.bodies.lock().is_empty());
        assert_eq!(metrics.flushes(), 1);
    }

    struct FullSink;

    impl Write for FullSink {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::Other, "no space left"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn compress_into_full_sink(joined: &str, _records: usize) -> Result<GzipPayload> {
        gzip_into(joined.as_bytes(), FullSink).map(|_| unreachable!("sink accepts no bytes"))
    }

    #[test]
    fn test_compress_failure_drops_batch() {
        let transport = Arc::new(CapturingTransport::default());
        let diagnostics = Arc::new(MemoryDiagnostics::new());
        let metrics = Arc::new(ShipperMetrics::new());
        let pipeline = FlushPipeline::new(transport.clone(), diagnostics.clone(), metrics.clone())
            .with_compressor(compress_into_full_sink);

        let err = pipeline.send(due_batch(&["one", "two", "three"])).unwrap_err();
        assert!(matches!(err, ShipperError::Compression { .. }));

        assert!(transport.bodies.lock().is_empty());
        assert_eq!(metrics.compress_failures(), 1);
        assert_eq!(metrics.send_failures(), 0);
        assert_eq!(metrics.records_lost(), 3);
        assert!(matches!(
            diagnostics.failures().as_slice(),
            [Diagnostic::CompressFailed { records: 3, .. }]
        ));
    }
}
