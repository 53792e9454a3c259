//! # Table Extractor
//!
//! Entry point of the crate: turns the bytes of a Word document into the dataset of
//! its last table. The routine is a pure function of its inputs; it holds no state
//! between calls and never returns an error or panics on malformed input. Every
//! failure becomes [`Extraction::Unparseable`] with a readable diagnostic.
use crate::dataset::table::ResultTable;
use crate::document::Document;
use crate::error::RustyDocxError;
use serde::Serialize;
use std::fmt;
use tracing::debug;
use tracing::warn;

/// Header mode applied when the caller does not choose one.
pub const DEFAULT_HEADER_MODE: bool = true;

/// Immutable extraction request: the complete document bytes and the header mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExtractRequest<'a> {
    /// Content of the `.docx` file, fully buffered
    pub bytes: &'a [u8],
    /// Use the first table row as column names instead of generating `Column_<n>`
    pub use_first_row_as_header: bool,
}

impl<'a> ExtractRequest<'a> {
    pub fn new(bytes: &'a [u8], use_first_row_as_header: bool) -> Self {
        ExtractRequest { bytes, use_first_row_as_header }
    }

    /// Runs the extraction for this request.
    pub fn extract(&self) -> Extraction {
        extract_last_table(self.bytes, self.use_first_row_as_header)
    }
}

/// Expected reasons for a document to have no usable table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Absence {
    /// The document body holds no table
    NoTables,
    /// The last table has no rows
    EmptyTable,
}

impl fmt::Display for Absence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Absence::NoTables => f.write_str("The document contains no tables"),
            Absence::EmptyTable => f.write_str("The last table of the document has no rows"),
        }
    }
}

/// Outcome of one extraction call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Extraction {
    /// The last table, possibly without data rows
    Table(ResultTable),
    /// The document is readable but has no usable table
    Absent(Absence),
    /// The document or its last table could not be read
    Unparseable(String),
}

impl Extraction {
    /// The extracted table, if any.
    pub fn table(&self) -> Option<&ResultTable> {
        match self {
            Extraction::Table(table) => Some(table),
            _ => None,
        }
    }

    pub fn into_table(self) -> Option<ResultTable> {
        match self {
            Extraction::Table(table) => Some(table),
            _ => None,
        }
    }

    /// True when there is no table to show, whatever the cause.
    pub fn is_absent(&self) -> bool {
        !matches!(self, Extraction::Table(_))
    }

    /// Human-readable cause of an unparseable document.
    pub fn diagnostic(&self) -> Option<&str> {
        match self {
            Extraction::Unparseable(message) => Some(message),
            _ => None,
        }
    }
}

/// Extracts the last table of a Word document.
///
/// # Arguments
///
/// * `bytes` - Complete content of the `.docx` file
/// * `use_first_row_as_header` - Take column names from the first row (normalized to be
///   unique and non-empty) instead of generating `Column_1 .. Column_n`
///
/// # Returns
///
/// * `Extraction::Table` - Headers plus data rows; a header-only table gives zero rows
/// * `Extraction::Absent` - No table in the body, or the last table has no rows
/// * `Extraction::Unparseable` - The bytes are not a readable Word document
pub fn extract_last_table(bytes: &[u8], use_first_row_as_header: bool) -> Extraction {
    match try_extract_last_table(bytes, use_first_row_as_header) {
        Ok(extraction) => extraction,
        Err(error) => {
            warn!(%error, size = bytes.len(), "could not extract a table from the document");
            Extraction::Unparseable(error.to_string())
        }
    }
}

fn try_extract_last_table(bytes: &[u8], use_first_row_as_header: bool) -> Result<Extraction, RustyDocxError> {
    let mut document = Document::open(bytes)?;
    let scan = document.scan_tables()?;
    debug!(tables = scan.table_count, "scanned document body");

    let Some(rows) = scan.last_table else {
        return Ok(Extraction::Absent(Absence::NoTables));
    };
    if rows.is_empty() {
        return Ok(Extraction::Absent(Absence::EmptyTable));
    }
    debug!(rows = rows.len(), columns = rows[0].len(), use_first_row_as_header, "read last table");

    let table = if use_first_row_as_header {
        ResultTable::with_first_row_as_header(rows)?
    } else {
        ResultTable::with_default_headers(rows)?
    };
    Ok(Extraction::Table(table))
}
