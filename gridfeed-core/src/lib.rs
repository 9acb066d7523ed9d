//! Gridfeed Core — NYISO load and interchange data as uniform UTC records.
//!
//! - `client`: the adapter (`get_load`, `get_trade`)
//! - `data`: CSV sources, table reshaping, load/trade parsers
//! - `domain`: record and tag types
//! - `options`: request options, validation, date-range expansion
//! - `tz`: Eastern wall-clock → UTC conversion
//! - `config`: TOML client configuration

pub mod client;
pub mod config;
pub mod data;
pub mod domain;
pub mod options;
pub mod tz;

pub use client::{ClientError, NyisoClient};
pub use config::{ClientConfig, ConfigError};
pub use data::{CsvSource, DataError};
pub use domain::{DataKind, Frequency, Market, Measurement, Record, RecordTags};
pub use options::{OptionError, RequestOptions, WindowPolicy};
