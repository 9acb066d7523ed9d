//! CSV source trait and structured error types.
//!
//! The `CsvSource` trait abstracts over where CSV text comes from (the NYISO
//! public site, fixtures on disk, in-memory maps) so the client can be driven
//! without a network in tests.

use crate::tz::TzError;
use thiserror::Error;

/// Errors from fetching or shaping NYISO data.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("network error fetching {url}: {reason}")]
    Transport { url: String, reason: String },

    #[error("HTTP {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("missing column '{0}'")]
    MissingColumn(String),

    #[error("pivot column '{0}' not present in data")]
    MissingPivotColumn(String),

    #[error("duplicate entry for ({row}, {column})")]
    DuplicateEntry { row: String, column: String },

    #[error("invalid number '{value}' in column '{column}'")]
    InvalidNumber { column: String, value: String },

    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(#[from] TzError),

    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),
}

impl DataError {
    /// True for failures raised while fetching, as opposed to parsing.
    pub fn is_transport(&self) -> bool {
        matches!(self, DataError::Transport { .. } | DataError::HttpStatus { .. })
    }
}

/// Something that can return the text body behind a URL.
pub trait CsvSource: Send + Sync {
    /// Human-readable name of this source.
    fn name(&self) -> &str;

    /// Fetch the full text at `url`.
    fn fetch_text(&self, url: &str) -> Result<String, DataError>;
}

impl<S: CsvSource + ?Sized> CsvSource for &S {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn fetch_text(&self, url: &str) -> Result<String, DataError> {
        (**self).fetch_text(url)
    }
}
