//! Record formatting
//!
//! Turns a [`LogEvent`] into the single-line JSON object the collector
//! ingests. Formatting is a pure function of the event, the environment
//! facts and the timestamp format, so the same inputs always yield
//! byte-identical output.

use super::environment::EnvironmentFacts;
use super::error::Result;
use super::log_event::LogEvent;
use super::metadata::Metadata;
use super::timestamp::TimestampFormat;
use serde::Serialize;
use std::fmt;

/// One encoded record, ready to be joined into a batch payload
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SerializedRecord(String);

impl SerializedRecord {
    pub(crate) fn from_encoded(encoded: String) -> Self {
        Self(encoded)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for SerializedRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SerializedRecord {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RecordJson<'a> {
    message: &'a str,
    timestamp: String,
    log_level: &'static str,
    thread: &'a str,
    file: String,
    function: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    machine: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    os_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    os_version: Option<&'a str>,
    #[serde(skip_serializing_if = "no_fields")]
    metadata: &'a Metadata,
}

fn no_fields(metadata: &&Metadata) -> bool {
    metadata.is_empty()
}

/// Short source identifier: last path segment with its extension removed
///
/// ```
/// use sumo_log_shipper::core::record::source_id;
///
/// assert_eq!(source_id("/Users/dev/App/Sources/Checkout.swift"), "Checkout");
/// assert_eq!(source_id("src\\net\\client.rs"), "client");
/// ```
pub fn source_id(path: &str) -> &str {
    let segment = path.rsplit(['/', '\\']).next().unwrap_or(path);
    match segment.split('.').next() {
        Some(stem) if !stem.is_empty() => stem,
        _ => segment,
    }
}

/// Encodes events into records
#[derive(Debug, Clone, Default)]
pub struct RecordFormatter {
    timestamp_format: TimestampFormat,
    environment: EnvironmentFacts,
}

impl RecordFormatter {
    pub fn new(timestamp_format: TimestampFormat, environment: EnvironmentFacts) -> Self {
        Self {
            timestamp_format,
            environment,
        }
    }

    pub fn timestamp_format(&self) -> &TimestampFormat {
        &self.timestamp_format
    }

    pub fn environment(&self) -> &EnvironmentFacts {
        &self.environment
    }

    /// Encode one event
    ///
    /// # Errors
    ///
    /// Fails when the timestamp cannot be rendered or JSON encoding fails.
    /// Callers drop the event in that case.
    pub fn format(&self, event: &LogEvent) -> Result<SerializedRecord> {
        let json = RecordJson {
            message: &event.message,
            timestamp: self.timestamp_format.format(&event.timestamp)?,
            log_level: event.level.to_str(),
            thread: &event.thread,
            file: format!("{}:{}", source_id(&event.file), event.line),
            function: &event.function,
            machine: self.environment.machine.as_deref(),
            os_name: self.environment.os_name.as_deref(),
            os_version: self.environment.os_version.as_deref(),
            metadata: &event.metadata,
        };

        Ok(SerializedRecord::from_encoded(serde_json::to_string(&json)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::log_level::LogLevel;
    use chrono::{TimeZone, Utc};

    fn sample_event() -> LogEvent {
        let at = Utc.with_ymd_and_hms(2025, 1, 8, 10, 30, 45).single().unwrap()
            + chrono::Duration::milliseconds(123);
        LogEvent::new(LogLevel::Warning, "card declined")
            .with_location("/Users/dev/Shop/Sources/Checkout.swift", "pay(amount:)", 88)
            .with_thread("main")
            .with_timestamp(at)
    }

    #[test]
    fn test_record_schema() {
        let formatter = RecordFormatter::new(TimestampFormat::default(), EnvironmentFacts::none());
        let record = formatter.format(&sample_event()).unwrap();

        assert_eq!(
            record.as_str(),
            r#"{"message":"card declined","timestamp":"2025-01-08T10:30:45.123+0000","logLevel":"warning","thread":"main","file":"Checkout:88","function":"pay(amount:)"}"#
        );
    }

    #[test]
    fn test_environment_and_metadata_fields() {
        let formatter = RecordFormatter::new(
            TimestampFormat::Iso8601,
            EnvironmentFacts::new("iPhone15,2", "iOS", "17.2"),
        );
        let event = sample_event().with_metadata(Metadata::new().with_field("order", 991));
        let record = formatter.format(&event).unwrap();

        let parsed: serde_json::Value = serde_json::from_str(record.as_str()).unwrap();
        assert_eq!(parsed["machine"], "iPhone15,2");
        assert_eq!(parsed["osName"], "iOS");
        assert_eq!(parsed["osVersion"], "17.2");
        assert_eq!(parsed["metadata"]["order"], 991);
        assert_eq!(parsed["timestamp"], "2025-01-08T10:30:45.123Z");
    }

    #[test]
    fn test_formatting_is_deterministic() {
        let formatter = RecordFormatter::new(
            TimestampFormat::default(),
            EnvironmentFacts::new("host", "linux", "6.1"),
        );
        let event = sample_event().with_metadata(
            Metadata::new().with_field("b", true).with_field("a", "x"),
        );

        assert_eq!(formatter.format(&event).unwrap(), formatter.format(&event).unwrap());
    }

    #[test]
    fn test_message_newlines_stay_on_one_line() {
        let formatter = RecordFormatter::default();
        let event = sample_event();
        let event = LogEvent {
            message: "line one\nline two".to_string(),
            ..event
        };

        let record = formatter.format(&event).unwrap();
        assert!(!record.as_str().contains('\n'));
    }

    #[test]
    fn test_bad_timestamp_pattern_fails_encoding() {
        let formatter =
            RecordFormatter::new(TimestampFormat::Custom("%Y-%Q".to_string()), EnvironmentFacts::none());
        assert!(formatter.format(&sample_event()).is_err());
    }

    #[test]
    fn test_source_id_edge_cases() {
        assert_eq!(source_id("main.rs"), "main");
        assert_eq!(source_id("archive.tar.gz"), "archive");
        assert_eq!(source_id("Makefile"), "Makefile");
        assert_eq!(source_id("/tmp/.hidden"), ".hidden");
        assert_eq!(source_id(""), "");
    }
}
