//! Weighted flush threshold
//!
//! Each severity level carries an integer cost. Costs accumulate as records
//! are buffered, and a flush becomes due once the running total strictly
//! exceeds the configured threshold. Severe events therefore reach the
//! collector after fewer records than routine debug chatter, and trace
//! events never move the needle.

use super::log_level::LogLevel;

/// Default threshold; a batch is flushed once accumulated cost exceeds it
pub const DEFAULT_THRESHOLD: u64 = 10;

/// Cost table indexed by [`LogLevel`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CostTable {
    costs: [u64; 7],
}

impl CostTable {
    /// trace=0, debug=1, info=5, notice=6, warning=8, error=10, critical=10
    pub const DEFAULT: CostTable = CostTable {
        costs: [0, 1, 5, 6, 8, 10, 10],
    };

    /// Build a table from explicit per-level costs
    pub fn new(costs: [u64; 7]) -> Self {
        Self { costs }
    }

    /// Override the cost of a single level
    #[must_use]
    pub fn with_cost(mut self, level: LogLevel, cost: u64) -> Self {
        self.costs[level as usize] = cost;
        self
    }

    #[inline]
    pub fn cost_of(&self, level: LogLevel) -> u64 {
        self.costs[level as usize]
    }
}

impl Default for CostTable {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Immutable flush policy shared by all background workers
///
/// # Example
///
/// ```
/// use sumo_log_shipper::{LogLevel, ThresholdConfig};
///
/// let policy = ThresholdConfig::default();
/// assert_eq!(policy.cost_of(LogLevel::Info), 5);
/// assert!(!policy.is_due(10));
/// assert!(policy.is_due(11));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThresholdConfig {
    costs: CostTable,
    threshold: u64,
}

impl ThresholdConfig {
    pub fn new(costs: CostTable, threshold: u64) -> Self {
        Self { costs, threshold }
    }

    /// Default cost table with a custom threshold
    pub fn with_threshold(threshold: u64) -> Self {
        Self::new(CostTable::DEFAULT, threshold)
    }

    #[inline]
    pub fn cost_of(&self, level: LogLevel) -> u64 {
        self.costs.cost_of(level)
    }

    /// A flush is due only when the accumulated cost is strictly greater than the threshold
    #[inline]
    pub fn is_due(&self, accumulated_cost: u64) -> bool {
        accumulated_cost > self.threshold
    }

    pub fn threshold(&self) -> u64 {
        self.threshold
    }

    pub fn costs(&self) -> &CostTable {
        &self.costs
    }
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self::new(CostTable::DEFAULT, DEFAULT_THRESHOLD)
    }
}
