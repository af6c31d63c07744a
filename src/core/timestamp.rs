//! Timestamp formatting for shipped records
//!
//! The `timestamp` field of every record is rendered with one fixed format
//! chosen at construction time. The default matches the collector-side
//! parse pattern `yyyy-MM-dd'T'HH:mm:ss.SSSZ`, e.g. `2025-01-08T10:30:45.123+0000`.
//! Every format renders in UTC except [`TimestampFormat::LocalOffset`], which
//! uses the host's current offset.

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Write;

use super::error::{Result, ShipperError};

/// Timestamp format options
///
/// # Examples
///
/// ```
/// use sumo_log_shipper::TimestampFormat;
/// use chrono::{TimeZone, Utc};
///
/// let at = Utc.with_ymd_and_hms(2025, 1, 8, 10, 30, 45).unwrap();
/// let rendered = TimestampFormat::default().format(&at).unwrap();
/// assert_eq!(rendered, "2025-01-08T10:30:45.000+0000");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimestampFormat {
    /// Milliseconds with a numeric UTC offset: `2025-01-08T10:30:45.123+0000`
    #[default]
    Iso8601Offset,

    /// Same layout as `Iso8601Offset`, in the host's local offset:
    /// `2025-01-08T11:30:45.123+0100`
    LocalOffset,

    /// Milliseconds with a `Z` suffix: `2025-01-08T10:30:45.123Z`
    Iso8601,

    /// RFC 3339: `2025-01-08T10:30:45.123+00:00`
    Rfc3339,

    /// Unix timestamp in milliseconds: `1736332245123`
    UnixMillis,

    /// Any strftime-compatible format string
    ///
    /// ```
    /// use sumo_log_shipper::TimestampFormat;
    ///
    /// let format = TimestampFormat::Custom("%d/%b/%Y:%H:%M:%S %z".to_string());
    /// assert!(format.validate().is_ok());
    /// ```
    Custom(String),
}

impl TimestampFormat {
    /// Render a timestamp
    ///
    /// Only `Custom` can fail, when its pattern contains an unknown specifier.
    pub fn format(&self, datetime: &DateTime<Utc>) -> Result<String> {
        let pattern = match self {
            TimestampFormat::Iso8601Offset | TimestampFormat::LocalOffset => {
                "%Y-%m-%dT%H:%M:%S%.3f%z"
            }
            TimestampFormat::Iso8601 => "%Y-%m-%dT%H:%M:%S%.3fZ",
            TimestampFormat::Rfc3339 => "%Y-%m-%dT%H:%M:%S%.3f%:z",
            TimestampFormat::UnixMillis => return Ok(datetime.timestamp_millis().to_string()),
            TimestampFormat::Custom(pattern) => pattern.as_str(),
        };

        let mut rendered = String::with_capacity(32);
        let written = if *self == TimestampFormat::LocalOffset {
            write!(rendered, "{}", datetime.with_timezone(&Local).format(pattern))
        } else {
            write!(rendered, "{}", datetime.format(pattern))
        };
        written.map_err(|_| {
            ShipperError::config("TimestampFormat", format!("cannot render pattern '{}'", pattern))
        })?;
        Ok(rendered)
    }

    /// Reject custom patterns chrono cannot render
    pub fn validate(&self) -> Result<()> {
        if let TimestampFormat::Custom(pattern) = self {
            if pattern.is_empty() {
                return Err(ShipperError::config("TimestampFormat", "pattern is empty"));
            }
            if StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error)) {
                return Err(ShipperError::config(
                    "TimestampFormat",
                    format!("invalid strftime pattern '{}'", pattern),
                ));
            }
        }
        Ok(())
    }
}
