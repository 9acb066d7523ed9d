//! Fetching and shaping NYISO CSV data.

pub mod http;
pub mod local;
pub mod parse;
pub mod provider;
pub mod table;

pub use http::HttpSource;
pub use local::{DirSource, MemorySource};
pub use parse::{external_interfaces, parse_load, parse_trade, Neighbor, Parser, EXTERNAL_NEIGHBORS};
pub use provider::{CsvSource, DataError};
pub use table::{group_sum, Pivot, Table};
