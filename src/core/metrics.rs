//! Shipper metrics for observability
//!
//! Counters for the life of every event: accepted, filtered, encoded,
//! flushed, delivered or lost. Counters are safe to read from any thread.
//!
//! `processed` is the hand-off point for [`ShipperMetrics::in_flight`]: it is
//! incremented with release ordering after a job's other effects, and read
//! with acquire ordering, so a caller that observes zero jobs in flight also
//! observes everything those jobs did.

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters describing handler health
///
/// # Example
///
/// ```
/// use sumo_log_shipper::ShipperMetrics;
///
/// let metrics = ShipperMetrics::new();
/// metrics.record_sent(3);
/// metrics.record_lost(1);
///
/// assert_eq!(metrics.records_sent(), 3);
/// assert_eq!(metrics.loss_rate(), 25.0);
/// ```
#[derive(Debug)]
pub struct ShipperMetrics {
    /// Events accepted by `submit` and handed to the background pool
    submitted: AtomicU64,

    /// Events dropped by the minimum-level filter
    filtered: AtomicU64,

    /// Background jobs finished, including any inline send
    processed: AtomicU64,

    /// Events dropped because they could not be encoded
    encode_failures: AtomicU64,

    /// Batches detached from the buffer
    flushes: AtomicU64,

    /// Records accepted by the collector
    records_sent: AtomicU64,

    /// Records lost to failed flushes or shutdown
    records_lost: AtomicU64,

    /// Batches whose delivery failed
    send_failures: AtomicU64,

    /// Batches that could not be compressed
    compress_failures: AtomicU64,
}

impl ShipperMetrics {
    pub const fn new() -> Self {
        Self {
            submitted: AtomicU64::new(0),
            filtered: AtomicU64::new(0),
            processed: AtomicU64::new(0),
            encode_failures: AtomicU64::new(0),
            flushes: AtomicU64::new(0),
            records_sent: AtomicU64::new(0),
            records_lost: AtomicU64::new(0),
            send_failures: AtomicU64::new(0),
            compress_failures: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn submitted(&self) -> u64 {
        self.submitted.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn filtered(&self) -> u64 {
        self.filtered.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn processed(&self) -> u64 {
        self.processed.load(Ordering::Acquire)
    }

    #[inline]
    pub fn encode_failures(&self) -> u64 {
        self.encode_failures.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn flushes(&self) -> u64 {
        self.flushes.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn records_sent(&self) -> u64 {
        self.records_sent.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn records_lost(&self) -> u64 {
        self.records_lost.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn send_failures(&self) -> u64 {
        self.send_failures.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn compress_failures(&self) -> u64 {
        self.compress_failures.load(Ordering::Relaxed)
    }

    /// Jobs handed to the pool that have not finished yet
    pub fn in_flight(&self) -> u64 {
        let processed = self.processed();
        self.submitted().saturating_sub(processed)
    }

    #[inline]
    pub fn record_submitted(&self) -> u64 {
        self.submitted.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_filtered(&self) -> u64 {
        self.filtered.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_processed(&self) -> u64 {
        self.processed.fetch_add(1, Ordering::Release)
    }

    #[inline]
    pub fn record_encode_failure(&self) -> u64 {
        self.encode_failures.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_flush(&self) -> u64 {
        self.flushes.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_sent(&self, records: usize) -> u64 {
        self.records_sent.fetch_add(records as u64, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_lost(&self, records: usize) -> u64 {
        self.records_lost.fetch_add(records as u64, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_send_failure(&self) -> u64 {
        self.send_failures.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_compress_failure(&self) -> u64 {
        self.compress_failures.fetch_add(1, Ordering::Relaxed)
    }

    /// Share of flushed records that never reached the collector (0.0 - 100.0)
    ///
    /// Returns 0.0 if nothing has been flushed yet.
    pub fn loss_rate(&self) -> f64 {
        let lost = self.records_lost() as f64;
        let total = self.records_sent() as f64 + lost;
        if total == 0.0 {
            0.0
        } else {
            (lost / total) * 100.0
        }
    }
}

impl Default for ShipperMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for ShipperMetrics {
    /// Create a snapshot of the current metrics values
    fn clone(&self) -> Self {
        Self {
            submitted: AtomicU64::new(self.submitted()),
            filtered: AtomicU64::new(self.filtered()),
            processed: AtomicU64::new(self.processed()),
            encode_failures: AtomicU64::new(self.encode_failures()),
            flushes: AtomicU64::new(self.flushes()),
            records_sent: AtomicU64::new(self.records_sent()),
            records_lost: AtomicU64::new(self.records_lost()),
            send_failures: AtomicU64::new(self.send_failures()),
            compress_failures: AtomicU64::new(self.compress_failures()),
        }
    }
}
