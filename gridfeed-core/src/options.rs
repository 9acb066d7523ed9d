//! Request options: what to fetch, for which window, tagged how.
//!
//! Options are an immutable value handed to every client call. Nothing is
//! remembered between calls.

use crate::domain::{DataKind, Frequency, Market, RecordTags};
use crate::tz;
use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum OptionError {
    #[error("both start_at and end_at are required unless latest is set (missing {0})")]
    MissingBound(&'static str),

    #[error("start_at {start} is after end_at {end}")]
    InvertedRange {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
}

/// How records are matched against `[start_at, end_at]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WindowPolicy {
    /// `start_at <= timestamp <= end_at`.
    #[default]
    Inclusive,
    /// Historical behavior: `timestamp <= end_at && timestamp >= end_at`,
    /// which only keeps records stamped exactly at `end_at`. Kept for callers
    /// that depend on it until the intended semantics are confirmed.
    LegacyEndOnly,
}

impl WindowPolicy {
    pub fn accepts(
        self,
        timestamp: DateTime<Utc>,
        start_at: DateTime<Utc>,
        end_at: DateTime<Utc>,
    ) -> bool {
        match self {
            WindowPolicy::Inclusive => timestamp >= start_at && timestamp <= end_at,
            WindowPolicy::LegacyEndOnly => timestamp <= end_at && timestamp >= end_at,
        }
    }
}

/// A single load or trade request.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestOptions {
    pub data_kind: DataKind,
    pub latest: bool,
    pub start_at: Option<DateTime<Utc>>,
    pub end_at: Option<DateTime<Utc>>,
    pub freq: Frequency,
    pub market: Market,
    pub window: WindowPolicy,
}

impl RequestOptions {
    /// Most recent record for today.
    pub fn latest(data_kind: DataKind) -> Self {
        Self {
            data_kind,
            latest: true,
            start_at: None,
            end_at: None,
            freq: Frequency::default(),
            market: Market::default(),
            window: WindowPolicy::default(),
        }
    }

    /// All records within `[start_at, end_at]`.
    pub fn range(data_kind: DataKind, start_at: DateTime<Utc>, end_at: DateTime<Utc>) -> Self {
        Self {
            latest: false,
            start_at: Some(start_at),
            end_at: Some(end_at),
            ..Self::latest(data_kind)
        }
    }

    pub fn with_freq(mut self, freq: Frequency) -> Self {
        self.freq = freq;
        self
    }

    pub fn with_market(mut self, market: Market) -> Self {
        self.market = market;
        self
    }

    pub fn with_window(mut self, window: WindowPolicy) -> Self {
        self.window = window;
        self
    }

    pub fn with_data_kind(mut self, data_kind: DataKind) -> Self {
        self.data_kind = data_kind;
        self
    }

    /// Check bounds. `latest` requests ignore them entirely.
    pub fn validate(&self) -> Result<(), OptionError> {
        if self.latest {
            return Ok(());
        }
        let (start, end) = self.bounds()?;
        if start > end {
            return Err(OptionError::InvertedRange { start, end });
        }
        Ok(())
    }

    /// The `(start_at, end_at)` pair of a ranged request.
    pub fn bounds(&self) -> Result<(DateTime<Utc>, DateTime<Utc>), OptionError> {
        let start = self.start_at.ok_or(OptionError::MissingBound("start_at"))?;
        let end = self.end_at.ok_or(OptionError::MissingBound("end_at"))?;
        Ok((start, end))
    }

    /// Eastern calendar dates whose files cover the request, in order.
    ///
    /// `today` is only consulted for `latest` requests.
    pub fn dates(&self, today: NaiveDate) -> Result<Vec<NaiveDate>, OptionError> {
        if self.latest {
            return Ok(vec![today]);
        }
        self.validate()?;
        let (start, end) = self.bounds()?;
        Ok(days_between(tz::local_date(start), tz::local_date(end)))
    }

    pub fn tags(&self) -> RecordTags {
        RecordTags::new(self.freq, self.market)
    }
}

/// Inclusive list of calendar days; empty when `start > end`.
pub fn days_between(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    start.iter_days().take_while(|d| *d <= end).collect()
}
