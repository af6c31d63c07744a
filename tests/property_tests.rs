//! Property-based tests for sumo_log_shipper using proptest

use proptest::prelude::*;
use sumo_log_shipper::core::record::source_id;
use sumo_log_shipper::prelude::*;
use sumo_log_shipper::{BatchBuffer, RecordFormatter, SerializedRecord};

fn any_level() -> impl Strategy<Value = LogLevel> {
    prop_oneof![
        Just(LogLevel::Trace),
        Just(LogLevel::Debug),
        Just(LogLevel::Info),
        Just(LogLevel::Notice),
        Just(LogLevel::Warning),
        Just(LogLevel::Error),
        Just(LogLevel::Critical),
    ]
}

fn record(formatter: &RecordFormatter, level: LogLevel, message: &str) -> SerializedRecord {
    formatter
        .format(&LogEvent::new(level, message).with_location("src/app.rs", "run", 1))
        .unwrap()
}

// ============================================================================
// LogLevel Tests
// ============================================================================

proptest! {
    /// Test that LogLevel string conversions roundtrip correctly
    #[test]
    fn test_log_level_str_roundtrip(level in any_level()) {
        let parsed: LogLevel = level.to_str().parse().unwrap();
        prop_assert_eq!(level, parsed);

        let upper: LogLevel = level.to_str().to_uppercase().parse().unwrap();
        prop_assert_eq!(level, upper);
    }

    /// Test that costs never decrease with severity
    #[test]
    fn test_cost_is_monotonic(a in any_level(), b in any_level()) {
        let policy = ThresholdConfig::default();
        if a <= b {
            prop_assert!(policy.cost_of(a) <= policy.cost_of(b));
        }
    }
}

// ============================================================================
// Threshold Tests
// ============================================================================

proptest! {
    /// Replays a level sequence against a reference accumulator and checks
    /// every flush happens exactly at a crossing with exactly the pending set
    #[test]
    fn test_flush_exactly_at_crossings(
        levels in prop::collection::vec(any_level(), 0..200),
        threshold in 0u64..40,
    ) {
        let policy = ThresholdConfig::with_threshold(threshold);
        let buffer = BatchBuffer::new(policy);
        let formatter = RecordFormatter::default();

        let mut pending: Vec<String> = Vec::new();
        let mut pending_cost = 0u64;

        for (i, level) in levels.iter().enumerate() {
            let message = format!("event {}", i);
            let rec = record(&formatter, *level, &message);
            pending.push(rec.as_str().to_string());
            pending_cost += policy.cost_of(*level);

            match buffer.append_and_take_if_due(rec, *level) {
                Some(batch) => {
                    prop_assert!(pending_cost > threshold);
                    prop_assert_eq!(batch.cost(), pending_cost);
                    let sent: Vec<String> = batch
                        .records()
                        .iter()
                        .map(|r| r.as_str().to_string())
                        .collect();
                    prop_assert_eq!(&sent, &pending);
                    prop_assert_eq!(batch.joined(), pending.join("\n"));

                    pending.clear();
                    pending_cost = 0;
                    prop_assert_eq!(buffer.state(), BufferState::default());
                }
                None => {
                    prop_assert!(pending_cost <= threshold);
                    prop_assert_eq!(
                        buffer.state(),
                        BufferState { records: pending.len(), cost: pending_cost }
                    );
                }
            }
        }
    }

    /// Test that zero-cost events alone never trigger a flush
    #[test]
    fn test_trace_only_never_flushes(count in 0usize..500, threshold in 0u64..20) {
        let buffer = BatchBuffer::new(ThresholdConfig::with_threshold(threshold));
        let formatter = RecordFormatter::default();

        for i in 0..count {
            let rec = record(&formatter, LogLevel::Trace, &format!("t{}", i));
            prop_assert!(buffer.append_and_take_if_due(rec, LogLevel::Trace).is_none());
        }
        prop_assert_eq!(buffer.state(), BufferState { records: count, cost: 0 });
    }
}

// ============================================================================
// Record Tests
// ============================================================================

proptest! {
    /// Test that encoding the same event twice gives identical bytes
    #[test]
    fn test_formatter_is_deterministic(
        message in ".*",
        level in any_level(),
        key in "[a-z]{1,8}",
        value in any::<i64>(),
    ) {
        let formatter = RecordFormatter::new(
            TimestampFormat::default(),
            EnvironmentFacts::new("host", "linux", "6.1"),
        );
        let event = LogEvent::new(level, message)
            .with_metadata(Metadata::new().with_field(key, value));

        prop_assert_eq!(formatter.format(&event).unwrap(), formatter.format(&event).unwrap());
    }

    /// Test that arbitrary messages never break the one-record-per-line layout
    #[test]
    fn test_record_is_single_line(message in ".*", level in any_level()) {
        let rec = record(&RecordFormatter::default(), level, &message);
        prop_assert!(!rec.as_str().contains('\n'));

        let parsed: serde_json::Value = serde_json::from_str(rec.as_str()).unwrap();
        prop_assert_eq!(parsed["message"].as_str(), Some(message.as_str()));
        prop_assert_eq!(parsed["logLevel"].as_str(), Some(level.to_str()));
    }

    /// Test that the source id is always a suffix-free piece of the last segment
    #[test]
    fn test_source_id_is_within_last_segment(
        dirs in prop::collection::vec("[a-zA-Z0-9_]{1,8}", 0..4),
        stem in "[a-zA-Z0-9_]{1,12}",
        ext in "(swift|rs|m)",
    ) {
        let mut path = dirs.join("/");
        if !path.is_empty() {
            path.push('/');
        }
        path.push_str(&format!("{}.{}", stem, ext));

        prop_assert_eq!(source_id(&path), stem.as_str());
    }
}

// ============================================================================
// Gzip Tests
// ============================================================================

proptest! {
    /// Test that compressed batches decompress to the joined text
    #[test]
    fn test_gzip_preserves_body(lines in prop::collection::vec("[^\n]{0,64}", 1..20)) {
        use flate2::read::GzDecoder;
        use std::io::Read;

        let joined = lines.join("\n");
        let payload = GzipPayload::compress(&joined, lines.len()).unwrap();
        prop_assert_eq!(payload.records(), lines.len());
        prop_assert_eq!(payload.uncompressed_len(), joined.len());

        let mut text = String::new();
        GzDecoder::new(payload.body()).read_to_string(&mut text).unwrap();
        prop_assert_eq!(text, joined);
    }
}
