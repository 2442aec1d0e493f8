//! XMLTV timestamp codec.
//!
//! XMLTV writes times as `YYYYMMDDHHMMSS` optionally followed by a zone
//! suffix (`20240315143000 +0000`). Only the fixed-width prefix is read and
//! it is interpreted in the local timezone of the running process.

use std::ops::Range;
use std::str::FromStr;

use chrono::{DateTime, Local, NaiveDate, TimeZone};

/// Timestamp decoding failure.
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(clippy::module_name_repetitions)]
pub enum TimestampError {
    /// A fixed-width field is missing or not numeric.
    InvalidField {
        /// Field name (`year`, `month`, ...).
        field: &'static str,
        /// The raw timestamp.
        raw: String,
    },
    /// All fields are numeric but do not form a valid date and time.
    OutOfRange(String),
    /// The wall-clock time does not exist in the local zone (DST gap).
    NonexistentLocalTime(String),
}

impl std::fmt::Display for TimestampError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidField { field, raw } => {
                write!(f, "invalid {field} field in timestamp {raw:?}")
            }
            Self::OutOfRange(raw) => write!(f, "timestamp out of range: {raw:?}"),
            Self::NonexistentLocalTime(raw) => {
                write!(f, "timestamp does not exist in local time: {raw:?}")
            }
        }
    }
}

impl std::error::Error for TimestampError {}

/// Reads one fixed-width numeric field.
fn read_field<T: FromStr>(
    raw: &str,
    range: Range<usize>,
    field: &'static str,
) -> Result<T, TimestampError> {
    raw.get(range)
        .filter(|s| s.bytes().all(|b| b.is_ascii_digit()))
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| TimestampError::InvalidField {
            field,
            raw: String::from(raw),
        })
}

/// Decodes an XMLTV timestamp relative to a caller-supplied `now`.
///
/// An absent or empty timestamp yields `now` ("unknown, effectively now").
/// Callers should not rely on that fallback for correctness: a programme
/// without a `start` attribute appears to begin immediately.
///
/// Ambiguous local times (DST overlap) resolve to the earliest instant.
///
/// # Errors
///
/// Returns `TimestampError` when a field is missing or non-numeric, when the
/// fields do not form a calendar date/time, or when the local time falls in
/// a DST gap.
pub fn parse_timestamp_at(
    raw: Option<&str>,
    now: DateTime<Local>,
) -> Result<DateTime<Local>, TimestampError> {
    let Some(raw) = raw.filter(|s| !s.is_empty()) else {
        return Ok(now);
    };

    let year: i32 = read_field(raw, 0..4, "year")?;
    let month: u32 = read_field(raw, 4..6, "month")?;
    let day: u32 = read_field(raw, 6..8, "day")?;
    let hour: u32 = read_field(raw, 8..10, "hour")?;
    let minute: u32 = read_field(raw, 10..12, "minute")?;
    let second: u32 = read_field(raw, 12..14, "second")?;

    let naive = NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_opt(hour, minute, second))
        .ok_or_else(|| TimestampError::OutOfRange(String::from(raw)))?;

    Local
        .from_local_datetime(&naive)
        .earliest()
        .ok_or_else(|| TimestampError::NonexistentLocalTime(String::from(raw)))
}

/// Decodes an XMLTV timestamp, falling back to the current time when empty.
///
/// # Errors
///
/// See [`parse_timestamp_at`].
pub fn parse_timestamp(raw: Option<&str>) -> Result<DateTime<Local>, TimestampError> {
    parse_timestamp_at(raw, Local::now())
}
