//! NYISO client: fetch → parse → tag → select.
//!
//! For each Eastern calendar date covered by a request, one CSV is fetched
//! from `{base_url}/{label}/{YYYYMMDD}{label}.csv`, parsed, and appended in
//! date order. The accumulated records are then reduced to the latest one or
//! to the requested window. Dates are processed one after another; there are
//! no retries and errors propagate unchanged.

use crate::config::{ClientConfig, ConfigError};
use crate::data::parse::{parse_load, parse_trade, Parser};
use crate::data::{CsvSource, DataError, HttpSource};
use crate::domain::{DataKind, Record};
use crate::options::{OptionError, RequestOptions};
use crate::tz;
use chrono::NaiveDate;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid request options: {0}")]
    Options(#[from] OptionError),

    #[error(transparent)]
    Data(#[from] DataError),

    #[error("no records found for {kind} on {dates}")]
    NoRecords { kind: DataKind, dates: String },
}

/// Grid-data adapter for NYISO.
pub struct NyisoClient<S = HttpSource> {
    source: S,
    base_url: String,
    reference_date: Option<NaiveDate>,
}

impl NyisoClient<HttpSource> {
    /// Client over the public site, configured from `config`.
    pub fn from_config(config: &ClientConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(HttpSource::new(config)?, &config.base_url))
    }
}

impl<S: CsvSource> NyisoClient<S> {
    pub fn new(source: S, base_url: &str) -> Self {
        Self {
            source,
            base_url: base_url.trim_end_matches('/').to_string(),
            reference_date: None,
        }
    }

    /// Pin "today" for `latest` requests instead of reading the clock.
    pub fn with_reference_date(mut self, date: NaiveDate) -> Self {
        self.reference_date = Some(date);
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Load records for the requested window (or the latest one).
    pub fn get_load(&self, opts: &RequestOptions) -> Result<Vec<Record>, ClientError> {
        let opts = opts.clone().with_data_kind(DataKind::Load);
        self.get_any(&opts, parse_load)
    }

    /// Import/export records for the requested window (or the latest one).
    pub fn get_trade(&self, opts: &RequestOptions) -> Result<Vec<Record>, ClientError> {
        let opts = opts.clone().with_data_kind(DataKind::Trade);
        self.get_any(&opts, parse_trade)
    }

    /// Dispatch on `opts.data_kind`.
    pub fn get(&self, opts: &RequestOptions) -> Result<Vec<Record>, ClientError> {
        match opts.data_kind {
            DataKind::Load => self.get_load(opts),
            DataKind::Trade => self.get_trade(opts),
        }
    }

    /// Shared pipeline for both data kinds.
    pub fn get_any(&self, opts: &RequestOptions, parser: Parser) -> Result<Vec<Record>, ClientError> {
        opts.validate()?;
        let today = self.reference_date.unwrap_or_else(tz::local_today);
        let dates = opts.dates(today)?;
        let label = opts.data_kind.label();
        let tags = opts.tags();

        let mut data = Vec::new();
        for date in &dates {
            let content = self.fetch_csv(*date, label)?;
            let parsed = parser(&content, &tags)?;
            if parsed.is_empty() {
                warn!(%date, label, "CSV contained no records");
            } else {
                debug!(%date, label, count = parsed.len(), "parsed records");
            }
            data.extend(parsed);
        }

        if opts.latest {
            return match data.pop() {
                Some(last) => Ok(vec![last]),
                None => Err(ClientError::NoRecords {
                    kind: opts.data_kind,
                    dates: format_dates(&dates),
                }),
            };
        }

        let (start_at, end_at) = opts.bounds()?;
        Ok(data
            .into_iter()
            .filter(|r| opts.window.accepts(r.timestamp, start_at, end_at))
            .collect())
    }

    /// URL of the CSV for `date` and `label`.
    pub fn csv_url(&self, date: NaiveDate, label: &str) -> String {
        let datestr = date.format("%Y%m%d");
        format!("{}/{label}/{datestr}{label}.csv", self.base_url)
    }

    /// Fetch the raw CSV text for one date.
    pub fn fetch_csv(&self, date: NaiveDate, label: &str) -> Result<String, DataError> {
        let url = self.csv_url(date, label);
        debug!(source = self.source.name(), %url, "fetching CSV");
        self.source.fetch_text(&url)
    }
}

fn format_dates(dates: &[NaiveDate]) -> String {
    dates
        .iter()
        .map(NaiveDate::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
