//! Typed tabular operations over parsed CSV rows.
//!
//! Two reshaping primitives cover everything the parsers need:
//! - `group_sum`: collapse rows sharing a key into one summed value.
//! - `Pivot`: a sparse (row key, column key) → value matrix, projected onto a
//!   fixed list of columns.

use super::provider::DataError;
use csv::StringRecord;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Display;

/// A CSV document with a header row.
#[derive(Debug, Clone)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<StringRecord>,
}

impl Table {
    /// Parse CSV text. Fields and headers are whitespace-trimmed.
    pub fn from_csv(text: &str) -> Result<Self, DataError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(text.as_bytes());

        let headers = reader.headers()?.iter().map(str::to_string).collect();
        let rows = reader.records().collect::<Result<Vec<_>, _>>()?;
        Ok(Self { headers, rows })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> impl Iterator<Item = &StringRecord> {
        self.rows.iter()
    }

    /// Index of a required column.
    pub fn column(&self, name: &str) -> Result<usize, DataError> {
        self.optional_column(name)
            .ok_or_else(|| DataError::MissingColumn(name.to_string()))
    }

    pub fn optional_column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }
}

/// Parse a numeric cell. Empty cells are missing values, not zero.
pub fn parse_number(row: &StringRecord, idx: usize, column: &str) -> Result<Option<f64>, DataError> {
    let raw = row.get(idx).unwrap_or_default();
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse::<f64>()
        .map(Some)
        .map_err(|_| DataError::InvalidNumber {
            column: column.to_string(),
            value: raw.to_string(),
        })
}

/// Sum values per key; output is sorted by key.
pub fn group_sum<K: Ord>(pairs: impl IntoIterator<Item = (K, f64)>) -> Vec<(K, f64)> {
    let mut groups: BTreeMap<K, f64> = BTreeMap::new();
    for (key, value) in pairs {
        *groups.entry(key).or_insert(0.0) += value;
    }
    groups.into_iter().collect()
}

/// Sparse matrix of values keyed by (row, column).
///
/// An entry with a `None` value still registers its row and column.
#[derive(Debug, Clone)]
pub struct Pivot<R> {
    cells: BTreeMap<R, BTreeMap<String, Option<f64>>>,
    columns: BTreeSet<String>,
}

impl<R: Ord + Clone + Display> Pivot<R> {
    /// Build from long-format entries. Each (row, column) pair may appear once.
    pub fn build(
        entries: impl IntoIterator<Item = (R, String, Option<f64>)>,
    ) -> Result<Self, DataError> {
        let mut cells: BTreeMap<R, BTreeMap<String, Option<f64>>> = BTreeMap::new();
        let mut columns = BTreeSet::new();

        for (row, column, value) in entries {
            let row_cells = cells.entry(row.clone()).or_default();
            if row_cells.contains_key(&column) {
                return Err(DataError::DuplicateEntry {
                    row: row.to_string(),
                    column,
                });
            }
            columns.insert(column.clone());
            row_cells.insert(column, value);
        }

        Ok(Self { cells, columns })
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(String::as_str)
    }

    pub fn row_count(&self) -> usize {
        self.cells.len()
    }

    /// Rows in ascending key order, restricted to `columns` in the given order.
    ///
    /// Every requested column must occur somewhere in the data; individual
    /// cells may still be absent or blank (`None`).
    pub fn project(&self, columns: &[&str]) -> Result<Vec<(R, Vec<Option<f64>>)>, DataError> {
        if let Some(missing) = columns.iter().find(|c| !self.columns.contains(**c)) {
            return Err(DataError::MissingPivotColumn(missing.to_string()));
        }

        Ok(self
            .cells
            .iter()
            .map(|(row, row_cells)| {
                let values = columns
                    .iter()
                    .map(|c| row_cells.get(*c).copied().flatten())
                    .collect();
                (row.clone(), values)
            })
            .collect())
    }
}
