//! Local-time normalization for NYISO timestamps.
//!
//! NYISO publishes naive wall-clock timestamps in Eastern time. Every record
//! leaves this crate in UTC, so all conversions go through here.
//!
//! DST transitions:
//! - Fall back: the 01:00–01:59 hour happens twice. The file's `Time Zone`
//!   column (`EDT`/`EST`) picks the occurrence. Callers that see the same
//!   local time twice pass daylight for the first and standard for the
//!   second; with no hint at all, standard time wins.
//! - Spring forward: 02:00–02:59 does not exist locally and is rejected.

use chrono::{DateTime, LocalResult, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use thiserror::Error;

/// Timezone of every timestamp published by the source.
pub const SOURCE_TZ: Tz = chrono_tz::America::New_York;

/// Timestamp layouts seen in NYISO CSVs (first match wins).
const TIMESTAMP_FORMATS: [&str; 4] = [
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
];

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TzError {
    #[error("unparseable local timestamp '{0}'")]
    Unparseable(String),

    #[error("local time {0} does not exist in America/New_York (DST gap)")]
    Nonexistent(NaiveDateTime),
}

/// Which side of a DST transition a local timestamp belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DstHint {
    Daylight,
    Standard,
}

impl DstHint {
    /// Parse the `Time Zone` column value; unknown values give no hint.
    pub fn from_abbreviation(abbr: &str) -> Option<Self> {
        match abbr.trim() {
            "EDT" => Some(DstHint::Daylight),
            "EST" => Some(DstHint::Standard),
            _ => None,
        }
    }
}

/// Parse a naive local timestamp in any of the known layouts.
pub fn parse_local_timestamp(text: &str) -> Result<NaiveDateTime, TzError> {
    let text = text.trim();
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .ok_or_else(|| TzError::Unparseable(text.to_string()))
}

/// Convert a naive Eastern wall-clock time to UTC.
pub fn utcify(local: NaiveDateTime, hint: Option<DstHint>) -> Result<DateTime<Utc>, TzError> {
    match SOURCE_TZ.from_local_datetime(&local) {
        LocalResult::Single(dt) => Ok(dt.with_timezone(&Utc)),
        LocalResult::Ambiguous(daylight, standard) => {
            let chosen = match hint {
                Some(DstHint::Daylight) => daylight,
                Some(DstHint::Standard) | None => standard,
            };
            Ok(chosen.with_timezone(&Utc))
        }
        LocalResult::None => Err(TzError::Nonexistent(local)),
    }
}

/// Parse and convert in one step.
pub fn utcify_str(text: &str, hint: Option<DstHint>) -> Result<DateTime<Utc>, TzError> {
    utcify(parse_local_timestamp(text)?, hint)
}

/// Eastern calendar date of a UTC instant.
pub fn local_date(instant: DateTime<Utc>) -> NaiveDate {
    instant.with_timezone(&SOURCE_TZ).date_naive()
}

/// Today's Eastern calendar date.
pub fn local_today() -> NaiveDate {
    local_date(Utc::now())
}
