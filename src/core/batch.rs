//! Shared batch buffer
//!
//! The record sequence and the accumulated cost live in one struct behind
//! one mutex. Appending, and deciding-and-detaching a due batch, each happen
//! inside a single critical section, so a concurrent append can never land
//! between "decide due", "take records" and "reset cost".

use super::log_level::LogLevel;
use super::record::SerializedRecord;
use super::threshold::ThresholdConfig;
use parking_lot::Mutex;

/// Records detached from the buffer by one flush
///
/// Owned exclusively by the pipeline invocation that took it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlushBatch {
    records: Vec<SerializedRecord>,
    cost: u64,
}

impl FlushBatch {
    pub fn records(&self) -> &[SerializedRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<SerializedRecord> {
        self.records
    }

    /// Accumulated cost at the moment the batch was taken
    pub fn cost(&self) -> u64 {
        self.cost
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Newline-joined payload, one record per line
    pub fn joined(&self) -> String {
        let capacity = self.records.iter().map(|r| r.len() + 1).sum();
        let mut payload = String::with_capacity(capacity);
        for (idx, record) in self.records.iter().enumerate() {
            if idx > 0 {
                payload.push('\n');
            }
            payload.push_str(record.as_str());
        }
        payload
    }
}

/// Point-in-time view of the buffer, read under the lock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BufferState {
    pub records: usize,
    pub cost: u64,
}

#[derive(Debug, Default)]
struct Accumulator {
    records: Vec<SerializedRecord>,
    cost: u64,
}

/// Records accumulated since the last flush, plus their total cost
#[derive(Debug)]
pub struct BatchBuffer {
    policy: ThresholdConfig,
    inner: Mutex<Accumulator>,
}

impl BatchBuffer {
    pub fn new(policy: ThresholdConfig) -> Self {
        Self {
            policy,
            inner: Mutex::new(Accumulator::default()),
        }
    }

    pub fn policy(&self) -> &ThresholdConfig {
        &self.policy
    }

    /// Add a record to the tail and its cost to the counter
    pub fn append(&self, record: SerializedRecord, cost: u64) {
        let mut inner = self.inner.lock();
        inner.records.push(record);
        inner.cost = inner.cost.saturating_add(cost);
    }

    /// Detach the whole batch and reset the cost if the threshold is exceeded
    ///
    /// Returns `None` and leaves the buffer untouched when no flush is due.
    pub fn check_and_take_if_due(&self) -> Option<FlushBatch> {
        let mut inner = self.inner.lock();
        if !self.policy.is_due(inner.cost) {
            return None;
        }
        let cost = std::mem::take(&mut inner.cost);
        let records = std::mem::take(&mut inner.records);
        Some(FlushBatch { records, cost })
    }

    /// Append and evaluate the threshold in one critical section
    ///
    /// The returned batch, if any, contains `record` as its last element.
    pub fn append_and_take_if_due(
        &self,
        record: SerializedRecord,
        level: LogLevel,
    ) -> Option<FlushBatch> {
        let cost = self.policy.cost_of(level);
        let mut inner = self.inner.lock();
        inner.records.push(record);
        inner.cost = inner.cost.saturating_add(cost);
        if !self.policy.is_due(inner.cost) {
            return None;
        }
        let cost = std::mem::take(&mut inner.cost);
        let records = std::mem::take(&mut inner.records);
        Some(FlushBatch { records, cost })
    }

    /// Detach whatever is buffered regardless of the threshold
    ///
    /// Used at shutdown to account for records that will never be sent.
    pub fn take_all(&self) -> FlushBatch {
        let mut inner = self.inner.lock();
        FlushBatch {
            cost: std::mem::take(&mut inner.cost),
            records: std::mem::take(&mut inner.records),
        }
    }

    pub fn state(&self) -> BufferState {
        let inner = self.inner.lock();
        BufferState {
            records: inner.records.len(),
            cost: inner.cost,
        }
    }
}

impl Default for BatchBuffer {
    fn default() -> Self {
        Self::new(ThresholdConfig::default())
    }
}
