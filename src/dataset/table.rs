use crate::dataset::header::default_headers;
use crate::dataset::header::normalize_headers;
use crate::error::RustyDocxError;
use serde::Serialize;
use thiserror::Error;

/// Errors related to the shape of an extracted table.
#[derive(Error, Debug)]
pub(crate) enum TableError {
    #[error("Table row {row} has {cells} cells but the header has {columns} columns")]
    RowWidthError { row: usize, cells: usize, columns: usize },
}

/// Rectangular dataset built from a document table: column names plus string rows.
///
/// Column names are unique and non-empty. Every row has exactly one value per column;
/// rows that had fewer cells than columns are padded with empty strings.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ResultTable {
    /// Column names
    headers: Vec<String>,
    /// Data rows, one value per column
    rows: Vec<Vec<String>>,
}

impl ResultTable {
    /// Uses the first raw row as header text and the remaining rows as data.
    pub(crate) fn with_first_row_as_header(mut rows: Vec<Vec<String>>) -> Result<Self, RustyDocxError> {
        if rows.is_empty() {
            return Ok(ResultTable::default());
        }
        let data = rows.split_off(1);
        let headers = normalize_headers(&rows[0]);
        Self::build(headers, data, 2)
    }

    /// Keeps every raw row as data and generates `Column_<n>` headers sized to the first row.
    pub(crate) fn with_default_headers(rows: Vec<Vec<String>>) -> Result<Self, RustyDocxError> {
        let columns = rows.first().map(Vec::len).unwrap_or(0);
        Self::build(default_headers(columns), rows, 1)
    }

    /// Validates and pads data rows against the header width.
    /// `first_row` is the 1-based table row number of the first data row.
    fn build(headers: Vec<String>, mut rows: Vec<Vec<String>>, first_row: usize) -> Result<Self, RustyDocxError> {
        let columns = headers.len();
        for (offset, row) in rows.iter_mut().enumerate() {
            if row.len() > columns {
                Err(TableError::RowWidthError {
                    row: first_row + offset,
                    cells: row.len(),
                    columns,
                })?;
            }
            row.resize(columns, String::new());
        }
        Ok(ResultTable { headers, rows })
    }

    /// Column names in table order
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Data rows in table order
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// True when there is nothing to show: no data rows or no columns.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() || self.headers.is_empty()
    }

    /// Splits the table into its headers and rows.
    pub fn into_parts(self) -> (Vec<String>, Vec<Vec<String>>) {
        (self.headers, self.rows)
    }
}
