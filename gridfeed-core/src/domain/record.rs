//! Uniform time-series record emitted by every parser.

use super::choices::{Frequency, Market};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Balancing authority name stamped on every record.
pub const BA_NAME: &str = "NYISO";

/// The single measured quantity carried by a record.
///
/// Serialized as one key/value pair next to the other record fields, so a
/// load record reads `{"timestamp": ..., "load": 250.0, ...}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum Measurement {
    #[serde(rename = "load")]
    Load(f64),
    #[serde(rename = "imp_MW")]
    ImportMw(f64),
    #[serde(rename = "exp_MW")]
    ExportMw(f64),
}

impl Measurement {
    pub fn value(&self) -> f64 {
        match *self {
            Measurement::Load(v) | Measurement::ImportMw(v) | Measurement::ExportMw(v) => v,
        }
    }

    /// Output field name for this measurement.
    pub fn field(&self) -> &'static str {
        match self {
            Measurement::Load(_) => "load",
            Measurement::ImportMw(_) => "imp_MW",
            Measurement::ExportMw(_) => "exp_MW",
        }
    }
}

/// Tags shared by every record produced for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordTags {
    pub freq: Frequency,
    pub market: Market,
    pub ba_name: &'static str,
}

impl RecordTags {
    pub fn new(freq: Frequency, market: Market) -> Self {
        Self {
            freq,
            market,
            ba_name: BA_NAME,
        }
    }
}

impl Default for RecordTags {
    fn default() -> Self {
        Self::new(Frequency::default(), Market::default())
    }
}

/// One timestamped observation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub measurement: Measurement,
    pub freq: Frequency,
    pub market: Market,
    pub ba_name: String,
}

impl Record {
    pub fn new(timestamp: DateTime<Utc>, measurement: Measurement, tags: &RecordTags) -> Self {
        Self {
            timestamp,
            measurement,
            freq: tags.freq,
            market: tags.market,
            ba_name: tags.ba_name.to_string(),
        }
    }

    pub fn value(&self) -> f64 {
        self.measurement.value()
    }
}
