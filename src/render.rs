//! Text, CSV and JSON renderings of extracted tables and session outcomes.
use crate::dataset::table::ResultTable;
use crate::extractor::Extraction;
use crate::session::Session;
use crate::session::SessionStatus;
use crate::session::StatusKind;
use csv::WriterBuilder;
use serde::Serialize;
use std::borrow::Cow;
use thiserror::Error;

/// Column separator of the text grid
const GRID_SEPARATOR: &str = " | ";
/// Separator of the rule under the grid header
const GRID_RULE_SEPARATOR: &str = "-+-";

/// Errors raised while rendering a table.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("{0}")]
    CsvError(#[from] csv::Error),

    #[error("{0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid UTF-8 in CSV output: {0}")]
    Utf8Error(#[from] std::string::FromUtf8Error),

    #[error("{0}")]
    JsonError(#[from] serde_json::Error),
}

/// Renders a table as an aligned text grid: header line, rule, then one line per row.
///
/// Columns are padded to their widest value counted in characters. Line feeds and
/// tabs inside cells are shown escaped so that every row stays on one line.
pub fn grid(table: &ResultTable) -> String {
    let headers = table.headers().iter().map(|header| escape(header)).collect::<Vec<_>>();
    let rows = table
        .rows()
        .iter()
        .map(|row| row.iter().map(|cell| escape(cell)).collect::<Vec<_>>())
        .collect::<Vec<_>>();

    let mut widths = headers.iter().map(|header| header.chars().count()).collect::<Vec<_>>();
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut output = String::new();
    push_line(&mut output, &headers, &widths);
    let rule = widths.iter().map(|width| "-".repeat(*width)).collect::<Vec<_>>();
    output.push_str(&rule.join(GRID_RULE_SEPARATOR));
    output.push('\n');
    for row in &rows {
        push_line(&mut output, row, &widths);
    }
    output
}

fn push_line(output: &mut String, cells: &[Cow<str>], widths: &[usize]) {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join(GRID_SEPARATOR);
    output.push_str(line.trim_end());
    output.push('\n');
}

fn escape(value: &str) -> Cow<'_, str> {
    if value.contains(['\n', '\t', '\r']) {
        Cow::Owned(value.replace('\r', "\\r").replace('\n', "\\n").replace('\t', "\\t"))
    } else {
        Cow::Borrowed(value)
    }
}

/// Renders headers and rows as CSV with the given delimiter.
pub fn csv(table: &ResultTable, delimiter: u8) -> Result<String, RenderError> {
    let mut writer = WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(Vec::<u8>::new());
    writer.write_record(table.headers())?;
    for row in table.rows() {
        writer.write_record(row)?;
    }
    writer.flush()?;

    let bytes = writer
        .into_inner()
        .map_err(|error| RenderError::CsvError(error.into_error().into()))?;
    Ok(String::from_utf8(bytes)?)
}

/// Serializable summary of a session's outcome.
#[derive(Debug, Serialize)]
pub struct Report<'a> {
    pub file: &'a str,
    pub status: StatusKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
    /// Reason the document gave no table
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<&'a [String]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rows: Option<&'a [Vec<String>]>,
}

impl<'a> Report<'a> {
    pub fn new(session: &'a Session) -> Self {
        let status = session.status();
        let table = session.outcome().and_then(Extraction::table);
        let detail = match session.outcome() {
            Some(Extraction::Absent(absence)) => Some(absence.to_string()),
            Some(Extraction::Unparseable(message)) => Some(message.clone()),
            _ => None,
        };
        Report {
            file: session.document_name().unwrap_or_default(),
            status: status.kind(),
            message: status.message(),
            detail,
            headers: table.map(ResultTable::headers),
            rows: table.map(ResultTable::rows),
        }
    }

    /// One compact JSON object, without trailing newline.
    pub fn to_json(&self) -> Result<String, RenderError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Renders a session for the terminal: a title line with the document name, then the
/// table grid or the status message.
pub fn text(session: &Session) -> String {
    let report = Report::new(session);
    let mut output = format!("== {} ==\n", report.file);
    match session.status() {
        SessionStatus::Table(table) => output.push_str(&grid(table)),
        status => {
            if let Some(message) = status.message() {
                output.push_str(message);
                output.push('\n');
            }
            if let Some(detail) = &report.detail {
                output.push_str(&format!("({detail})\n"));
            }
        }
    }
    output
}
