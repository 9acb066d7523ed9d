//! Enumerated request/record tags: data kind, frequency, market.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Which NYISO dataset a request targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataKind {
    Load,
    Trade,
}

impl DataKind {
    /// Directory and file-suffix label of the published CSV.
    pub fn label(self) -> &'static str {
        match self {
            DataKind::Load => "pal",
            DataKind::Trade => "ExternalLimitsFlows",
        }
    }
}

impl fmt::Display for DataKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataKind::Load => f.write_str("load"),
            DataKind::Trade => f.write_str("trade"),
        }
    }
}

/// Sampling interval of a record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Frequency {
    #[default]
    #[serde(rename = "five-minute")]
    FiveMinute,
    #[serde(rename = "ten-minute")]
    TenMinute,
    #[serde(rename = "fifteen-minute")]
    FifteenMinute,
    #[serde(rename = "hourly")]
    Hourly,
    #[serde(rename = "n/a")]
    NotApplicable,
}

impl Frequency {
    pub const ALL: [Frequency; 5] = [
        Frequency::FiveMinute,
        Frequency::TenMinute,
        Frequency::FifteenMinute,
        Frequency::Hourly,
        Frequency::NotApplicable,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Frequency::FiveMinute => "five-minute",
            Frequency::TenMinute => "ten-minute",
            Frequency::FifteenMinute => "fifteen-minute",
            Frequency::Hourly => "hourly",
            Frequency::NotApplicable => "n/a",
        }
    }
}

/// Market a record was published for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Market {
    #[default]
    #[serde(rename = "five-minute-real-time")]
    FiveMinuteRealTime,
    #[serde(rename = "hourly-real-time")]
    HourlyRealTime,
    #[serde(rename = "day-ahead-hourly")]
    DayAheadHourly,
}

impl Market {
    pub const ALL: [Market; 3] = [
        Market::FiveMinuteRealTime,
        Market::HourlyRealTime,
        Market::DayAheadHourly,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Market::FiveMinuteRealTime => "five-minute-real-time",
            Market::HourlyRealTime => "hourly-real-time",
            Market::DayAheadHourly => "day-ahead-hourly",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Market {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unrecognized frequency or market name.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown {kind} '{value}' (expected one of: {expected})")]
pub struct ParseChoiceError {
    pub kind: &'static str,
    pub value: String,
    pub expected: String,
}

impl FromStr for Frequency {
    type Err = ParseChoiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Frequency::ALL
            .into_iter()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| ParseChoiceError {
                kind: "frequency",
                value: s.to_string(),
                expected: Frequency::ALL.map(Frequency::as_str).join(", "),
            })
    }
}

impl FromStr for Market {
    type Err = ParseChoiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Market::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| ParseChoiceError {
                kind: "market",
                value: s.to_string(),
                expected: Market::ALL.map(Market::as_str).join(", "),
            })
    }
}
